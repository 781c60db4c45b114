//! Framework de self-test no alvo
//!
//! Os testes rodam na própria placa (feature `self_test`), sem `std` e sem
//! harness. Cada suite é uma lista estática de `TestCase`.

/// Resultado de teste
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestResult {
    Passed,
    Failed,
    Skipped,
}

/// Um caso de teste
pub struct TestCase {
    pub name: &'static str,
    pub func: fn() -> TestResult,
}

impl TestCase {
    pub const fn new(name: &'static str, func: fn() -> TestResult) -> Self {
        Self { name, func }
    }
}

/// Contagem final de uma suite
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SuiteReport {
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl SuiteReport {
    pub fn ok(&self) -> bool {
        self.failed == 0
    }
}

/// Executa suite de testes
pub fn run_test_suite(name: &str, tests: &[TestCase]) -> SuiteReport {
    crate::klog!("=== Suite: ");
    crate::klog!(name);
    crate::knl!();

    let mut report = SuiteReport::default();

    for test in tests {
        match (test.func)() {
            TestResult::Passed => {
                crate::klog!("[PASS] ");
                report.passed += 1;
            }
            TestResult::Failed => {
                crate::klog!("[FAIL] ");
                report.failed += 1;
            }
            TestResult::Skipped => {
                crate::klog!("[SKIP] ");
                report.skipped += 1;
            }
        }
        crate::klog!(test.name);
        crate::knl!();
    }

    crate::kinfo!("Resultados: passed=", report.passed);
    if !report.ok() {
        crate::kerror!("Falhas=", report.failed);
    }
    report
}
