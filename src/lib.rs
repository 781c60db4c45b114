//! Driver de escala de frequência da CPU para ADSP-SC5xx.
//!
//! Ponto central de exportação dos módulos do driver.
//!
//! A plataforma fornece três coisas: uma implementação de `ClockService`
//! (API de clock), um `RegisterIo` (acesso ao CGU_DIV) e um `DelayNs`
//! (espera entre leituras de UPDT). O resto é portável e roda no host.

#![cfg_attr(not(test), no_std)]

// Macros de log primeiro: os demais módulos dependem delas
pub mod logging;

pub mod clock; // API de clock da plataforma
pub mod config; // Placas, endereços e constantes
pub mod cpufreq; // Tabela, divisores e FrequencyController
pub mod error; // Erros e errno
pub mod hal; // CGU_DIV e MMIO
pub mod klib; // Self-test no alvo

pub use clock::{ClockError, ClockHandle, ClockService, ClockSource, Hertz};
pub use config::{BoardConfig, BoardId};
pub use cpufreq::{CpuFreqDriver, FrequencyController, FrequencyKHz, FrequencyTable, PolicyBounds};
pub use error::{CpuFreqError, CpuFreqResult};
