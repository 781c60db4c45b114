//! Testes do driver CpuFreq no host
//!
//! # Como Executar
//!
//! ```bash
//! cargo test --lib cpufreq::tests
//! cargo test --lib cpufreq::tests::concurrency
//! ```
//!
//! # Estrutura
//!
//! - `controller.rs`  - init/verify/target_index/get/teardown
//! - `concurrency.rs` - transições simultâneas de várias threads
//!
//! O hardware é simulado: `MockClocks` faz o papel da API de clock e
//! `SimulatedCgu` modela o CGU_DIV, incluindo o tempo que UPDT fica ligado
//! depois de uma escrita.

#![cfg(test)]


use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::Mutex;
use std::vec::Vec;

use embedded_hal::delay::DelayNs;

use crate::clock::{ClockError, ClockHandle, ClockService, Hertz};
use crate::config::{BoardConfig, SC5XX_CGU0_DIV};
use crate::cpufreq::{FrequencyController, FrequencyTable};
use crate::hal::cgu::{CguDiv, CguDivFlags};
use crate::hal::mmio::RegisterIo;

/// SYS_CLKIN0 dos testes: 50 MHz * MSEL 80 = VCO de 4 GHz
pub const SYS_CLKIN0_HZ: Hertz = 50_000_000;

/// Bits fora de CSEL/UPDT que nenhuma transição pode alterar
pub const CGU_OTHER_BITS: u32 = 0x5A00_0300;

/// CSEL inicial: 4 → 1 GHz
pub const CGU_INITIAL: u32 = CGU_OTHER_BITS | 4;

// =============================================================================
// API DE CLOCK
// =============================================================================

/// API de clock com um único nó, `sys_clkin0`.
pub struct MockClocks {
    pub rate_hz: AtomicU64,
    pub rate_fails: AtomicBool,
    pub set_rate_error: Mutex<Option<ClockError>>,
    pub set_rate_calls: Mutex<Vec<Hertz>>,
    pub resolved: AtomicU32,
    pub released: AtomicU32,
    known_name: &'static str,
}

impl MockClocks {
    pub fn new() -> Self {
        Self::with_name("sys_clkin0")
    }

    pub fn with_name(known_name: &'static str) -> Self {
        Self {
            rate_hz: AtomicU64::new(SYS_CLKIN0_HZ),
            rate_fails: AtomicBool::new(false),
            set_rate_error: Mutex::new(None),
            set_rate_calls: Mutex::new(Vec::new()),
            resolved: AtomicU32::new(0),
            released: AtomicU32::new(0),
            known_name,
        }
    }
}

impl ClockService for &MockClocks {
    fn resolve(&self, name: &str) -> Result<ClockHandle, ClockError> {
        if name != self.known_name {
            return Err(ClockError::NotFound);
        }
        self.resolved.fetch_add(1, Ordering::SeqCst);
        Ok(ClockHandle::new(7))
    }

    fn rate(&self, handle: &ClockHandle) -> Result<Hertz, ClockError> {
        assert_eq!(handle.id(), 7);
        if self.rate_fails.load(Ordering::SeqCst) {
            return Err(ClockError::Unavailable);
        }
        Ok(self.rate_hz.load(Ordering::SeqCst))
    }

    fn set_rate(&self, handle: &ClockHandle, rate: Hertz) -> Result<(), ClockError> {
        assert_eq!(handle.id(), 7);
        self.set_rate_calls.lock().unwrap().push(rate);
        if let Some(err) = *self.set_rate_error.lock().unwrap() {
            return Err(err);
        }
        self.rate_hz.store(rate, Ordering::SeqCst);
        Ok(())
    }

    fn release(&self, handle: ClockHandle) {
        assert_eq!(handle.id(), 7);
        self.released.fetch_add(1, Ordering::SeqCst);
    }
}

// =============================================================================
// CGU_DIV SIMULADO
// =============================================================================

#[derive(Debug, Default)]
struct CguState {
    value: u32,
    /// Leituras restantes com UPDT ligado
    pending_reads: u32,
}

/// Modelo do CGU_DIV.
///
/// Uma escrita com UPDT deixa o bit ligado pelas próximas `apply_reads`
/// leituras. Com `stuck`, UPDT nunca limpa.
pub struct SimulatedCgu {
    state: Mutex<CguState>,
    apply_reads: u32,
    pub stuck: AtomicBool,
    pub reads: AtomicU32,
    pub writes: AtomicU32,
    /// Escritas feitas com uma atualização ainda pendente
    pub writes_while_pending: AtomicU32,
    /// Escritas que alteraram bits fora de CSEL/UPDT
    pub torn_writes: AtomicU32,
}

impl SimulatedCgu {
    pub fn new(initial: u32, apply_reads: u32) -> Self {
        Self {
            state: Mutex::new(CguState {
                value: initial,
                pending_reads: 0,
            }),
            apply_reads,
            stuck: AtomicBool::new(false),
            reads: AtomicU32::new(0),
            writes: AtomicU32::new(0),
            writes_while_pending: AtomicU32::new(0),
            torn_writes: AtomicU32::new(0),
        }
    }

    pub fn stuck(initial: u32) -> Self {
        let cgu = Self::new(initial, 0);
        cgu.stuck.store(true, Ordering::SeqCst);
        cgu
    }

    pub fn csel(&self) -> u8 {
        CguDiv::from_bits(self.state.lock().unwrap().value).csel()
    }

    pub fn value(&self) -> u32 {
        self.state.lock().unwrap().value
    }
}

impl RegisterIo for &SimulatedCgu {
    fn read32(&self, address: usize) -> u32 {
        assert_eq!(address, SC5XX_CGU0_DIV);
        self.reads.fetch_add(1, Ordering::SeqCst);

        let mut state = self.state.lock().unwrap();
        if self.stuck.load(Ordering::SeqCst) {
            return state.value | CguDivFlags::UPDT.bits();
        }
        if state.pending_reads > 0 {
            state.pending_reads -= 1;
            return state.value | CguDivFlags::UPDT.bits();
        }
        state.value
    }

    fn write32(&self, address: usize, value: u32) {
        assert_eq!(address, SC5XX_CGU0_DIV);
        self.writes.fetch_add(1, Ordering::SeqCst);

        let mut state = self.state.lock().unwrap();
        if state.pending_reads > 0 {
            self.writes_while_pending.fetch_add(1, Ordering::SeqCst);
        }

        let preserved = value & !(CguDiv::CSEL_MASK | CguDivFlags::UPDT.bits());
        if preserved != CGU_OTHER_BITS {
            self.torn_writes.fetch_add(1, Ordering::SeqCst);
        }

        // UPDT é um gatilho: não fica armazenado no valor
        state.value = value & !CguDivFlags::UPDT.bits();
        if value & CguDivFlags::UPDT.bits() != 0 {
            state.pending_reads = self.apply_reads;
        }
    }
}

// =============================================================================
// DELAYS
// =============================================================================

/// Não dorme; cede a CPU para as outras threads de teste.
pub struct YieldDelay;

impl DelayNs for YieldDelay {
    fn delay_ns(&mut self, _ns: u32) {
        std::thread::yield_now();
    }
}

/// Dorme de verdade (para medir tempo de parede).
pub struct StdDelay;

impl DelayNs for StdDelay {
    fn delay_ns(&mut self, ns: u32) {
        std::thread::sleep(std::time::Duration::from_nanos(ns as u64));
    }
}

// =============================================================================
// HELPERS
// =============================================================================

pub type TestController<'a> = FrequencyController<'a, &'a MockClocks, &'a SimulatedCgu, YieldDelay>;

/// Controlador já inicializado sobre os mocks.
pub fn create_test_controller<'a>(
    board: &'a BoardConfig,
    table: &'a FrequencyTable,
    clocks: &'a MockClocks,
    cgu: &'a SimulatedCgu,
) -> TestController<'a> {
    let mut ctrl = FrequencyController::new(board, table, clocks, cgu, YieldDelay);
    ctrl.init().expect("init com clock válido");
    ctrl
}
