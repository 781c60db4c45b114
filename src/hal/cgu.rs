//! CGU_DIV - Registrador de divisores do Clock Generation Unit.
//!
//! A CCLK é derivada do SYS_CLKIN0. O campo CSEL seleciona o divisor aplicado
//! à saída do PLL e só entra em vigor quando o bit UPDT é escrito. Enquanto o
//! hardware aplica a mudança, UPDT permanece em 1.
//!
//! ```text
//!  31            15   14   13          4  3      0
//! ┌────────────────┬──────┬─────────────┬────────┐
//! │   (outros)     │ UPDT │  (outros)   │  CSEL  │
//! └────────────────┴──────┴─────────────┴────────┘
//! ```
//!
//! O estado do registrador nunca é cacheado: toda decisão parte de uma leitura
//! nova do hardware.

use bitflags::bitflags;
use embedded_hal::delay::DelayNs;

use super::mmio::RegisterIo;
use crate::error::{CpuFreqError, CpuFreqResult};

bitflags! {
    /// Bits de controle do CGU_DIV.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct CguDivFlags: u32 {
        /// Leitura: atualização pendente. Escrita: dispara a atualização.
        const UPDT = 1 << 14;
    }
}

/// Valor tipado do CGU_DIV.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct CguDiv(u32);

impl CguDiv {
    /// Máscara do campo CSEL
    pub const CSEL_MASK: u32 = 0x000F;
    const CSEL_SHIFT: u32 = Self::CSEL_MASK.trailing_zeros();

    /// Menor CSEL utilizável (0 dividiria por zero)
    pub const CSEL_MIN: u8 = 1;
    /// Maior valor representável em 4 bits
    pub const CSEL_MAX: u8 = (Self::CSEL_MASK >> Self::CSEL_SHIFT) as u8;

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub fn flags(self) -> CguDivFlags {
        CguDivFlags::from_bits_truncate(self.0)
    }

    pub fn update_pending(self) -> bool {
        self.flags().contains(CguDivFlags::UPDT)
    }

    pub fn csel(self) -> u8 {
        ((self.0 & Self::CSEL_MASK) >> Self::CSEL_SHIFT) as u8
    }

    /// Substitui apenas o campo CSEL.
    pub fn with_csel(self, csel: u8) -> Self {
        let field = ((csel as u32) << Self::CSEL_SHIFT) & Self::CSEL_MASK;
        Self((self.0 & !Self::CSEL_MASK) | field)
    }

    /// Liga o bit UPDT.
    pub fn with_update(self) -> Self {
        Self(self.0 | CguDivFlags::UPDT.bits())
    }
}

/// Campos do CGU_DIV relevantes para uma transição.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DivisorRegisterState {
    pub update_pending: bool,
    pub divisor_field: u8,
}

impl From<CguDiv> for DivisorRegisterState {
    fn from(reg: CguDiv) -> Self {
        Self {
            update_pending: reg.update_pending(),
            divisor_field: reg.csel(),
        }
    }
}

/// Resultado de `await_idle` bem sucedido.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Idle {
    /// Quantas leituras foram necessárias até UPDT limpar
    pub polls: u32,
}

/// Um CGU_DIV em um endereço físico.
///
/// Não há lock aqui: quem serializa o read-modify-write é o
/// `FrequencyController`, que guarda este objeto dentro do seu mutex.
pub struct DivisorRegister<R: RegisterIo> {
    io: R,
    address: usize,
}

impl<R: RegisterIo> DivisorRegister<R> {
    pub const fn new(io: R, address: usize) -> Self {
        Self { io, address }
    }

    pub fn address(&self) -> usize {
        self.address
    }

    /// Leitura crua do registrador.
    pub fn read_raw(&self) -> CguDiv {
        let reg = CguDiv::from_bits(self.io.read32(self.address));
        crate::ktrace!("(CGU) CGU_DIV lido=", reg.bits());
        reg
    }

    pub fn read(&self) -> DivisorRegisterState {
        self.read_raw().into()
    }

    /// Read-modify-write do CSEL.
    ///
    /// Todos os bits fora de CSEL são preservados como lidos. Com `trigger`,
    /// UPDT também é ligado. Uma única escrita é emitida.
    pub fn write_divisor(&self, value: u8, trigger: bool) {
        debug_assert!(value <= CguDiv::CSEL_MAX);

        let mut next = self.read_raw().with_csel(value);
        if trigger {
            next = next.with_update();
        }

        crate::ktrace!("(CGU) CGU_DIV escrito=", next.bits());
        self.io.write32(self.address, next.bits());
    }

    /// Espera UPDT limpar, lendo no máximo `max_attempts` vezes.
    ///
    /// Entre leituras dorme `poll_interval_ns`. `max_attempts == 0` ainda faz
    /// uma leitura. Esgotadas as tentativas retorna `TransitionTimeout`.
    pub fn await_idle<D: DelayNs>(
        &self,
        delay: &mut D,
        poll_interval_ns: u32,
        max_attempts: u32,
    ) -> CpuFreqResult<Idle> {
        let attempts = max_attempts.max(1);

        for poll in 1..=attempts {
            if !self.read().update_pending {
                return Ok(Idle { polls: poll });
            }
            if poll < attempts {
                delay.delay_ns(poll_interval_ns);
            }
        }

        crate::kerror!("(CGU) UPDT não limpou, tentativas=", attempts);
        Err(CpuFreqError::TransitionTimeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;

    const ADDR: usize = 0x3108_D00C;

    /// Registrador em RAM; UPDT limpa sozinho após `busy_reads` leituras.
    struct FakeCgu {
        value: Cell<u32>,
        busy_reads: Cell<u32>,
        reads: Cell<u32>,
        writes: Cell<u32>,
    }

    impl FakeCgu {
        fn new(value: u32, busy_reads: u32) -> Self {
            Self {
                value: Cell::new(value),
                busy_reads: Cell::new(busy_reads),
                reads: Cell::new(0),
                writes: Cell::new(0),
            }
        }
    }

    impl RegisterIo for &FakeCgu {
        fn read32(&self, address: usize) -> u32 {
            assert_eq!(address, ADDR);
            self.reads.set(self.reads.get() + 1);
            let busy = self.busy_reads.get();
            if busy == 0 {
                self.value.set(self.value.get() & !CguDivFlags::UPDT.bits());
            } else {
                self.busy_reads.set(busy - 1);
            }
            self.value.get()
        }

        fn write32(&self, address: usize, value: u32) {
            assert_eq!(address, ADDR);
            self.writes.set(self.writes.get() + 1);
            self.value.set(value);
        }
    }

    struct CountingDelay(u32);

    impl DelayNs for CountingDelay {
        fn delay_ns(&mut self, _ns: u32) {
            self.0 += 1;
        }
    }

    #[test]
    fn test_field_accessors() {
        let reg = CguDiv::from_bits(0x1234_4005);
        assert!(reg.update_pending());
        assert_eq!(reg.csel(), 5);
        assert_eq!(CguDiv::CSEL_MAX, 15);

        let cleared = CguDiv::from_bits(0x1234_0005);
        assert!(!cleared.update_pending());
    }

    #[test]
    fn test_with_csel_preserves_other_bits() {
        let reg = CguDiv::from_bits(0xABCD_00F7).with_csel(4);
        assert_eq!(reg.bits(), 0xABCD_00F4);
        assert_eq!(reg.with_update().bits(), 0xABCD_40F4);
    }

    #[test]
    fn test_write_divisor_rmw() {
        let cgu = FakeCgu::new(0x0102_0302, 0);
        let reg = DivisorRegister::new(&cgu, ADDR);

        reg.write_divisor(5, true);
        assert_eq!(cgu.writes.get(), 1);
        assert_eq!(cgu.value.get(), 0x0102_4305);

        let cgu = FakeCgu::new(0x0102_0302, 0);
        let reg = DivisorRegister::new(&cgu, ADDR);
        reg.write_divisor(9, false);
        assert_eq!(cgu.value.get(), 0x0102_0309);
    }

    #[test]
    fn test_await_idle_waits_for_updt() {
        let cgu = FakeCgu::new(0x4004, 3);
        let reg = DivisorRegister::new(&cgu, ADDR);
        let mut delay = CountingDelay(0);

        let idle = reg.await_idle(&mut delay, 1_000, 10).unwrap();
        assert_eq!(idle.polls, 4);
        assert_eq!(delay.0, 3);
    }

    #[test]
    fn test_await_idle_is_bounded() {
        let cgu = FakeCgu::new(0x4004, u32::MAX);
        let reg = DivisorRegister::new(&cgu, ADDR);
        let mut delay = CountingDelay(0);

        let res = reg.await_idle(&mut delay, 1_000, 25);
        assert_eq!(res, Err(CpuFreqError::TransitionTimeout));
        assert_eq!(cgu.reads.get(), 25);
        assert_eq!(delay.0, 24);
    }

    #[test]
    fn test_await_idle_zero_attempts_still_polls_once() {
        let cgu = FakeCgu::new(0x0004, 0);
        let reg = DivisorRegister::new(&cgu, ADDR);
        let mut delay = CountingDelay(0);

        assert_eq!(reg.await_idle(&mut delay, 1_000, 0), Ok(Idle { polls: 1 }));
    }
}
