//! Tipos de Erro do Driver CpuFreq
//!
//! Todo erro volta ao chamador como valor tipado. Nenhum é fatal: o
//! controlador sempre retorna a `Idle` pronto para o próximo pedido.
//!
//! O framework de power management espera códigos POSIX negativos, então
//! cada variante tem um mapeamento fixo via `as_errno()`.

use crate::clock::ClockError;

/// Códigos POSIX usados na fronteira com o framework.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Errno {
    ENOENT = 2,     // No such file or directory
    EIO = 5,        // I/O error
    EBUSY = 16,     // Device or resource busy
    ENODEV = 19,    // No such device
    EINVAL = 22,    // Invalid argument
    ERANGE = 34,    // Math result not representable
    ETIMEDOUT = 110, // Connection timed out
}

impl Errno {
    pub fn as_isize(self) -> isize {
        -(self as i32) as isize
    }
}

/// Erros do driver de frequência
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CpuFreqError {
    /// Clock não resolvido, driver não inicializado ou placa sem frequências
    DeviceNotFound,
    /// Índice além da última entrada válida da tabela
    InvalidIndex,
    /// Nenhum divisor de 4 bits reproduz a frequência dentro da tolerância
    OutOfRange,
    /// UPDT não limpou dentro do orçamento de polling
    TransitionTimeout,
    /// Falha da API de clock da plataforma, repassada sem alteração
    Clock(ClockError),
    /// Tabela de frequências malformada
    InvalidTable,
    /// Driver já inicializado
    Busy,
}

impl CpuFreqError {
    /// Retorna descrição legível do erro
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DeviceNotFound => "Dispositivo de clock não encontrado",
            Self::InvalidIndex => "Índice de frequência inválido",
            Self::OutOfRange => "Frequência não representável pelo divisor",
            Self::TransitionTimeout => "Timeout aguardando CGU_DIV.UPDT",
            Self::Clock(e) => e.as_str(),
            Self::InvalidTable => "Tabela de frequências inválida",
            Self::Busy => "Driver já inicializado",
        }
    }

    /// Código POSIX negativo para o framework
    pub fn as_errno(&self) -> isize {
        let errno = match self {
            Self::DeviceNotFound => Errno::ENODEV,
            Self::InvalidIndex | Self::InvalidTable => Errno::EINVAL,
            Self::OutOfRange => Errno::ERANGE,
            Self::TransitionTimeout => Errno::ETIMEDOUT,
            Self::Busy => Errno::EBUSY,
            Self::Clock(e) => return e.as_errno(),
        };
        errno.as_isize()
    }
}

impl From<ClockError> for CpuFreqError {
    fn from(err: ClockError) -> Self {
        Self::Clock(err)
    }
}

impl core::fmt::Display for CpuFreqError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Tipo Result específico do driver
pub type CpuFreqResult<T> = Result<T, CpuFreqError>;
