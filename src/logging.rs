// =============================================================================
// CPUFREQ LOGGING - ZERO OVERHEAD
// =============================================================================
//
// Sistema de logging do driver de frequência com custo ZERO em release.
//
// ARQUITETURA:
// - Usa features do Cargo para compile-time filtering
// - Com feature "no_logs", TODOS os macros viram expressões vazias
//   (os argumentos são apenas referenciados, via klog_discard!)
// - SEM core::fmt - Apenas strings literais + valores em hex
// - SEM alocação
// - Escreve no LogSink instalado pela plataforma (UART, buffer de boot...)
//
// NÍVEIS DE LOG (do mais crítico ao menos):
// - ERROR: Falhas de hardware (UPDT preso, clock ausente)
// - WARN:  Pedidos rejeitados do framework
// - INFO:  Init/teardown do driver
// - DEBUG: Cada transição de frequência
// - TRACE: Cada leitura/escrita do CGU_DIV
//
// FEATURES:
// - no_logs:   Remove 100% dos logs
// - log_error: ERROR e WARN
// - log_info:  ERROR, WARN, INFO
// - log_debug: ERROR, WARN, INFO, DEBUG
// - log_trace: Todos os níveis (padrão)
//
// COMO USAR:
//   kinfo!("(CpuFreq) Driver registrado");
//   kdebug!("(CpuFreq) Alvo kHz=", target);
//
// =============================================================================

use spin::Once;

// =============================================================================
// DESTINO DOS LOGS
// =============================================================================

/// Destino final das mensagens de log.
///
/// A plataforma instala um sink uma única vez durante o boot. Enquanto nenhum
/// sink estiver instalado, as mensagens são descartadas.
pub trait LogSink: Sync {
    /// Escreve uma string crua (sem newline).
    fn write_str(&self, s: &str);
}

static SINK: Once<&'static dyn LogSink> = Once::new();

/// Instala o sink global. Chamadas subsequentes são ignoradas.
pub fn set_sink(sink: &'static dyn LogSink) {
    SINK.call_once(|| sink);
}

/// Envia uma string para o sink.
#[inline]
pub fn emit_str(s: &str) {
    if let Some(sink) = SINK.get() {
        sink.write_str(s);
    }
}

/// Envia uma nova linha.
#[inline]
pub fn emit_nl() {
    emit_str("\r\n");
}

/// Envia um valor u64 em formato hexadecimal.
///
/// Formato de saída: 0x0123456789ABCDEF (sempre 18 caracteres)
pub fn emit_hex(value: u64) {
    const DIGITS: &[u8; 16] = b"0123456789ABCDEF";

    let mut buf = [0u8; 18];
    buf[0] = b'0';
    buf[1] = b'x';
    for i in 0..16 {
        let nibble = (value >> (60 - i * 4)) & 0xF;
        buf[2 + i] = DIGITS[nibble as usize];
    }

    // SAFETY: buf contém apenas ASCII
    emit_str(unsafe { core::str::from_utf8_unchecked(&buf) });
}

// =============================================================================
// PREFIXOS COM CORES ANSI
// =============================================================================

pub const P_ERROR: &str = "\x1b[1;31m[ERRO]\x1b[0m ";
pub const P_WARN: &str = "\x1b[1;33m[WARN]\x1b[0m ";
pub const P_INFO: &str = "\x1b[32m[INFO]\x1b[0m ";
pub const P_DEBUG: &str = "\x1b[36m[DEBG]\x1b[0m ";
pub const P_TRACE: &str = "\x1b[35m[TRAC]\x1b[0m ";

// =============================================================================
// MACROS DE LOG - NÍVEL ERROR
// =============================================================================

#[cfg(not(feature = "no_logs"))]
#[macro_export]
macro_rules! kerror {
    ($msg:expr) => {{
        $crate::logging::emit_str($crate::logging::P_ERROR);
        $crate::logging::emit_str($msg);
        $crate::logging::emit_nl();
    }};
    ($msg:expr, $val:expr) => {{
        $crate::logging::emit_str($crate::logging::P_ERROR);
        $crate::logging::emit_str($msg);
        $crate::logging::emit_hex($val as u64);
        $crate::logging::emit_nl();
    }};
}

#[cfg(feature = "no_logs")]
#[macro_export]
macro_rules! kerror {
    ($($t:tt)*) => {{ $crate::klog_discard!($($t)*) }};
}

// =============================================================================
// MACROS DE LOG - NÍVEL WARN
// =============================================================================

#[cfg(not(feature = "no_logs"))]
#[macro_export]
macro_rules! kwarn {
    ($msg:expr) => {{
        $crate::logging::emit_str($crate::logging::P_WARN);
        $crate::logging::emit_str($msg);
        $crate::logging::emit_nl();
    }};
    ($msg:expr, $val:expr) => {{
        $crate::logging::emit_str($crate::logging::P_WARN);
        $crate::logging::emit_str($msg);
        $crate::logging::emit_hex($val as u64);
        $crate::logging::emit_nl();
    }};
}

#[cfg(feature = "no_logs")]
#[macro_export]
macro_rules! kwarn {
    ($($t:tt)*) => {{ $crate::klog_discard!($($t)*) }};
}

// =============================================================================
// MACROS DE LOG - NÍVEL INFO
// =============================================================================

#[cfg(any(feature = "log_info", feature = "log_debug", feature = "log_trace"))]
#[macro_export]
macro_rules! kinfo {
    ($msg:expr) => {{
        $crate::logging::emit_str($crate::logging::P_INFO);
        $crate::logging::emit_str($msg);
        $crate::logging::emit_nl();
    }};
    ($msg:expr, $val:expr) => {{
        $crate::logging::emit_str($crate::logging::P_INFO);
        $crate::logging::emit_str($msg);
        $crate::logging::emit_hex($val as u64);
        $crate::logging::emit_nl();
    }};
}

#[cfg(not(any(feature = "log_info", feature = "log_debug", feature = "log_trace")))]
#[macro_export]
macro_rules! kinfo {
    ($($t:tt)*) => {{ $crate::klog_discard!($($t)*) }};
}

// =============================================================================
// MACROS DE LOG - NÍVEL DEBUG
// =============================================================================

#[cfg(any(feature = "log_debug", feature = "log_trace"))]
#[macro_export]
macro_rules! kdebug {
    ($msg:expr) => {{
        $crate::logging::emit_str($crate::logging::P_DEBUG);
        $crate::logging::emit_str($msg);
        $crate::logging::emit_nl();
    }};
    ($msg:expr, $val:expr) => {{
        $crate::logging::emit_str($crate::logging::P_DEBUG);
        $crate::logging::emit_str($msg);
        $crate::logging::emit_hex($val as u64);
        $crate::logging::emit_nl();
    }};
}

#[cfg(not(any(feature = "log_debug", feature = "log_trace")))]
#[macro_export]
macro_rules! kdebug {
    ($($t:tt)*) => {{ $crate::klog_discard!($($t)*) }};
}

// =============================================================================
// MACROS DE LOG - NÍVEL TRACE
// =============================================================================

#[cfg(feature = "log_trace")]
#[macro_export]
macro_rules! ktrace {
    ($msg:expr) => {{
        $crate::logging::emit_str($crate::logging::P_TRACE);
        $crate::logging::emit_str($msg);
        $crate::logging::emit_nl();
    }};
    ($msg:expr, $val:expr) => {{
        $crate::logging::emit_str($crate::logging::P_TRACE);
        $crate::logging::emit_str($msg);
        $crate::logging::emit_hex($val as u64);
        $crate::logging::emit_nl();
    }};
}

#[cfg(not(feature = "log_trace"))]
#[macro_export]
macro_rules! ktrace {
    ($($t:tt)*) => {{ $crate::klog_discard!($($t)*) }};
}

// =============================================================================
// MACROS AUXILIARES
// =============================================================================

/// klog! - Log genérico sem prefixo de nível.
///
/// ```ignore
/// klog!("Idx=", idx, " kHz=", freq);
/// ```
#[cfg(not(feature = "no_logs"))]
#[macro_export]
macro_rules! klog {
    ($msg:expr) => {{
        $crate::logging::emit_str($msg);
    }};
    ($msg:expr, $val:expr) => {{
        $crate::logging::emit_str($msg);
        $crate::logging::emit_hex($val as u64);
    }};
    ($msg1:expr, $val1:expr, $msg2:expr, $val2:expr) => {{
        $crate::logging::emit_str($msg1);
        $crate::logging::emit_hex($val1 as u64);
        $crate::logging::emit_str($msg2);
        $crate::logging::emit_hex($val2 as u64);
    }};
}

#[cfg(feature = "no_logs")]
#[macro_export]
macro_rules! klog {
    ($($t:tt)*) => {{ $crate::klog_discard!($($t)*) }};
}

/// klog_discard! - Corpo das variantes desligadas.
///
/// Só toma referência dos argumentos: nada é emitido e nenhum código sobra,
/// mas variáveis usadas apenas em log não viram `unused_variables`.
#[doc(hidden)]
#[macro_export]
macro_rules! klog_discard {
    ($($arg:expr),* $(,)?) => {{
        $( let _ = &$arg; )*
    }};
}

/// knl! - Emite apenas newline.
#[cfg(not(feature = "no_logs"))]
#[macro_export]
macro_rules! knl {
    () => {{
        $crate::logging::emit_nl();
    }};
}

#[cfg(feature = "no_logs")]
#[macro_export]
macro_rules! knl {
    () => {{}};
}
