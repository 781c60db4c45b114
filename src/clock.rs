//! Interface com a API de clock da plataforma.
//!
//! O driver só conversa com o framework de clocks por meio de `ClockService`.
//! `ClockSource` é o dono exclusivo do handle resolvido no init: nenhum outro
//! componente recebe uma cópia dele.
//!
//! Erros da plataforma sobem sem retry e sem tradução.

/// Frequência em Hz (unidade da API de clock)
pub type Hertz = u64;

/// Erros reportados pela API de clock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockError {
    /// Nenhum nó de clock com esse nome
    NotFound,
    /// O clock existe mas a taxa não pode ser lida
    Unavailable,
    /// Erro da plataforma (errno negativo, repassado como veio)
    Platform(i32),
}

impl ClockError {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound => "Clock não encontrado",
            Self::Unavailable => "Taxa do clock indisponível",
            Self::Platform(_) => "Falha na API de clock",
        }
    }

    pub fn as_errno(&self) -> isize {
        match self {
            Self::NotFound => crate::error::Errno::ENOENT.as_isize(),
            Self::Unavailable => crate::error::Errno::EIO.as_isize(),
            Self::Platform(code) => *code as isize,
        }
    }
}

/// Referência opaca a um nó de clock.
///
/// Não implementa `Clone`: o handle tem um único dono e volta para a
/// plataforma em `ClockService::release`.
#[derive(Debug, PartialEq, Eq)]
pub struct ClockHandle(usize);

impl ClockHandle {
    /// Usado pela implementação de `ClockService` ao resolver um nó.
    pub const fn new(id: usize) -> Self {
        Self(id)
    }

    pub fn id(&self) -> usize {
        self.0
    }
}

/// API de clock consumida pelo driver (clk_get/clk_get_rate/clk_set_rate/clk_put).
pub trait ClockService {
    fn resolve(&self, name: &str) -> Result<ClockHandle, ClockError>;

    fn rate(&self, handle: &ClockHandle) -> Result<Hertz, ClockError>;

    fn set_rate(&self, handle: &ClockHandle, rate: Hertz) -> Result<(), ClockError>;

    fn release(&self, handle: ClockHandle);
}

/// Clock de referência da CPU, com o handle adquirido no init.
pub struct ClockSource<C: ClockService> {
    service: C,
    handle: Option<ClockHandle>,
}

impl<C: ClockService> ClockSource<C> {
    pub const fn new(service: C) -> Self {
        Self {
            service,
            handle: None,
        }
    }

    /// Resolve o nó `name` e guarda o handle.
    ///
    /// Um handle já guardado só é devolvido depois que o novo foi resolvido.
    pub fn acquire(&mut self, name: &str) -> Result<(), ClockError> {
        let handle = self.service.resolve(name)?;
        crate::ktrace!("(Clock) Handle adquirido id=", handle.id());
        self.release();
        self.handle = Some(handle);
        Ok(())
    }

    pub fn is_bound(&self) -> bool {
        self.handle.is_some()
    }

    pub fn rate(&self) -> Result<Hertz, ClockError> {
        let handle = self.handle.as_ref().ok_or(ClockError::NotFound)?;
        self.service.rate(handle)
    }

    pub fn set_rate(&self, rate: Hertz) -> Result<(), ClockError> {
        let handle = self.handle.as_ref().ok_or(ClockError::NotFound)?;
        self.service.set_rate(handle, rate)
    }

    /// Devolve o handle à plataforma. Sem efeito se nada foi adquirido.
    pub fn release(&mut self) {
        if let Some(handle) = self.handle.take() {
            crate::ktrace!("(Clock) Handle liberado id=", handle.id());
            self.service.release(handle);
        }
    }

    pub fn service(&self) -> &C {
        &self.service
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;

    struct FixedClock {
        released: Cell<u32>,
    }

    impl ClockService for FixedClock {
        fn resolve(&self, name: &str) -> Result<ClockHandle, ClockError> {
            match name {
                "sys_clkin0" => Ok(ClockHandle::new(1)),
                _ => Err(ClockError::NotFound),
            }
        }

        fn rate(&self, _handle: &ClockHandle) -> Result<Hertz, ClockError> {
            Ok(25_000_000)
        }

        fn set_rate(&self, _handle: &ClockHandle, _rate: Hertz) -> Result<(), ClockError> {
            Err(ClockError::Platform(-22))
        }

        fn release(&self, _handle: ClockHandle) {
            self.released.set(self.released.get() + 1);
        }
    }

    fn fixed() -> ClockSource<FixedClock> {
        ClockSource::new(FixedClock {
            released: Cell::new(0),
        })
    }

    #[test]
    fn test_unbound_source() {
        let mut src = fixed();
        assert!(!src.is_bound());
        assert_eq!(src.rate(), Err(ClockError::NotFound));
        assert_eq!(src.set_rate(1), Err(ClockError::NotFound));

        src.release();
        assert_eq!(src.service().released.get(), 0);
    }

    #[test]
    fn test_acquire_and_release_once() {
        let mut src = fixed();
        assert_eq!(src.acquire("pll0"), Err(ClockError::NotFound));
        assert!(!src.is_bound());

        src.acquire("sys_clkin0").unwrap();
        assert_eq!(src.rate(), Ok(25_000_000));
        assert_eq!(src.set_rate(1), Err(ClockError::Platform(-22)));

        src.release();
        src.release();
        assert_eq!(src.service().released.get(), 1);
        assert!(!src.is_bound());
    }

    #[test]
    fn test_reacquire_releases_previous_handle() {
        let mut src = fixed();
        src.acquire("sys_clkin0").unwrap();
        src.acquire("sys_clkin0").unwrap();
        assert_eq!(src.service().released.get(), 1);
        assert!(src.is_bound());

        // Falha na resolução mantém o handle atual
        assert_eq!(src.acquire("pll0"), Err(ClockError::NotFound));
        assert_eq!(src.service().released.get(), 1);
        assert!(src.is_bound());

        src.release();
        assert_eq!(src.service().released.get(), 2);
    }

    #[test]
    fn test_errno() {
        assert_eq!(ClockError::NotFound.as_errno(), -2);
        assert_eq!(ClockError::Unavailable.as_errno(), -5);
        assert_eq!(ClockError::Platform(-16).as_errno(), -16);
    }
}
