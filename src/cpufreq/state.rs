//! Estados de uma requisição de transição.
//!
//! ```text
//! Idle → Verifying → AwaitingRegister → Computing → Committing → Idle
//!   └──────────────────── (qualquer) ──→ Failed ──→ Idle
//! ```
//!
//! O estado é apenas observável (debug/sysfs); quem serializa o hardware é o
//! mutex do controlador.

use core::sync::atomic::{AtomicU8, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TransitionState {
    /// Pronto para o próximo pedido.
    Idle = 0,
    /// Validando limites ou índice.
    Verifying = 1,
    /// Esperando CGU_DIV.UPDT limpar.
    AwaitingRegister = 2,
    /// Calculando o novo CSEL.
    Computing = 3,
    /// Escrevendo o CSEL (ou chamando set_rate).
    Committing = 4,
    /// Pedido falhou; volta a Idle logo em seguida.
    Failed = 5,
}

impl From<u8> for TransitionState {
    fn from(val: u8) -> Self {
        match val {
            1 => TransitionState::Verifying,
            2 => TransitionState::AwaitingRegister,
            3 => TransitionState::Computing,
            4 => TransitionState::Committing,
            5 => TransitionState::Failed,
            _ => TransitionState::Idle,
        }
    }
}

/// Célula atômica com o estado atual.
///
/// Vale a última escrita: vários pedidos simultâneos compartilham a mesma
/// célula.
#[derive(Debug)]
pub struct StateCell(AtomicU8);

impl StateCell {
    pub const fn new() -> Self {
        Self(AtomicU8::new(TransitionState::Idle as u8))
    }

    pub fn get(&self) -> TransitionState {
        TransitionState::from(self.0.load(Ordering::Relaxed))
    }

    pub fn set(&self, state: TransitionState) {
        self.0.store(state as u8, Ordering::Relaxed);
    }
}

impl Default for StateCell {
    fn default() -> Self {
        Self::new()
    }
}
