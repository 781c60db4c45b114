//! Hardware Abstraction Layer (HAL)
//!
//! Acesso ao hardware do SC5xx usado pelo driver de frequência.
//!
//! - `mmio`: leitura/escrita de registradores de 32 bits
//! - `cgu`:  CGU_DIV (campos CSEL e UPDT)

pub mod cgu;
pub mod mmio;

pub use cgu::{CguDiv, CguDivFlags, DivisorRegister, DivisorRegisterState, Idle};
pub use mmio::{MmioRegisterIo, RegisterIo};
