//! Acesso a registradores de 32 bits.
//!
//! O driver nunca desreferencia ponteiros de hardware diretamente: toda leitura
//! e escrita passa por `RegisterIo`, o que permite trocar o MMIO real por um
//! modelo do CGU nos testes.

use core::ptr::NonNull;

use volatile::VolatilePtr;

/// Leitura/escrita de registradores por endereço físico.
pub trait RegisterIo {
    fn read32(&self, address: usize) -> u32;

    fn write32(&self, address: usize, value: u32);
}

/// MMIO real via ponteiros voláteis.
///
/// Endereços físicos são traduzidos somando `phys_offset` (base da janela de
/// I/O mapeada pelo kernel, zero em identity map).
#[derive(Debug, Clone, Copy)]
pub struct MmioRegisterIo {
    phys_offset: usize,
}

impl MmioRegisterIo {
    /// # Safety
    ///
    /// Todo endereço físico passado a `read32`/`write32` somado a
    /// `phys_offset` precisa ser um registrador mapeado, alinhado a 4 bytes e
    /// válido durante toda a vida deste objeto.
    pub const unsafe fn new(phys_offset: usize) -> Self {
        Self { phys_offset }
    }

    #[inline]
    fn ptr(&self, address: usize) -> VolatilePtr<'static, u32> {
        let virt = (self.phys_offset + address) as *mut u32;
        // SAFETY: contrato de `new` garante um registrador mapeado e não nulo
        unsafe { VolatilePtr::new(NonNull::new_unchecked(virt)) }
    }
}

impl RegisterIo for MmioRegisterIo {
    #[inline]
    fn read32(&self, address: usize) -> u32 {
        self.ptr(address).read()
    }

    #[inline]
    fn write32(&self, address: usize, value: u32) {
        self.ptr(address).write(value);
    }
}
