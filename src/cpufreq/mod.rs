//! # CPU Frequency Scaling (DVFS) - ADSP-SC5xx
//!
//! Expõe a escala de frequência da CCLK ao framework de power management.
//!
//! ## Componentes
//!
//! ```text
//! FrequencyController ─┬─ FrequencyTable   (pontos suportados, imutável)
//!                      ├─ ClockSource      (SYS_CLKIN0, handle exclusivo)
//!                      └─ DivisorRegister  (CGU_DIV.CSEL / UPDT, sob lock)
//! ```
//!
//! ## Regras
//!
//! - Frequências do framework em **kHz**; API de clock em **Hz**.
//! - O CGU_DIV é sempre relido, nunca cacheado.
//! - A espera por UPDT é sempre limitada e termina em `TransitionTimeout`.

pub mod controller;
pub mod divisor;
pub mod driver;
pub mod state;
pub mod table;


#[cfg(test)]
mod tests;

/// Unidade de frequência em KHz
pub type FrequencyKHz = u32;

pub use controller::FrequencyController;
pub use driver::{CapabilityDescriptor, CpuFreqDriver};
pub use state::TransitionState;
pub use table::{FrequencyTable, OperatingPoint, PolicyBounds, SENTINEL};
