//! Tabela de frequências suportadas.
//!
//! Cada entrada carrega em `remaining` quantas entradas válidas vêm depois
//! dela, o que dispensa um campo de tamanho separado. A tabela termina em uma
//! sentinela (`SENTINEL`, `remaining = -1`). Exemplo com 3 pontos:
//!
//! ```text
//! idx  frequency   remaining
//!  0   1_000_000       2
//!  1     900_000       1
//!  2     800_000       0
//!  3   SENTINEL       -1
//! ```
//!
//! A tabela é construída uma vez a partir da configuração da placa e nunca
//! mais muda. O controlador a recebe por referência.

use super::FrequencyKHz;
use crate::config::{BoardConfig, MAX_OPERATING_POINTS};
use crate::error::{CpuFreqError, CpuFreqResult};

/// Marca de fim da tabela
pub const SENTINEL: FrequencyKHz = u32::MAX;

/// Um par (índice, frequência) suportado.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperatingPoint {
    pub frequency: FrequencyKHz,
    pub index: usize,
    /// Entradas válidas restantes depois desta (-1 na sentinela)
    pub remaining: i32,
}

impl OperatingPoint {
    const EMPTY: Self = Self {
        frequency: 0,
        index: 0,
        remaining: 0,
    };

    pub fn is_sentinel(&self) -> bool {
        self.frequency == SENTINEL && self.remaining == -1
    }
}

/// Limites de frequência de uma política.
///
/// `{0, 0}` significa "a placa não publica frequências".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolicyBounds {
    pub min: FrequencyKHz,
    pub max: FrequencyKHz,
}

impl PolicyBounds {
    pub const NONE: Self = Self { min: 0, max: 0 };

    pub const fn new(min: FrequencyKHz, max: FrequencyKHz) -> Self {
        Self { min, max }
    }

    pub fn is_none(&self) -> bool {
        self.min == 0 && self.max == 0
    }

    /// Ajusta `self` para dentro de `limits`.
    ///
    /// O máximo é limitado primeiro; o mínimo nunca passa do novo máximo, de
    /// forma que o resultado sempre respeita `min <= max`.
    pub fn clamp_within(self, limits: PolicyBounds) -> Self {
        let max = self.max.clamp(limits.min, limits.max);
        let min = self.min.clamp(limits.min, max);
        Self { min, max }
    }
}

/// Tabela imutável de pontos de operação, terminada por sentinela.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyTable {
    entries: [OperatingPoint; MAX_OPERATING_POINTS],
    /// Total de entradas, sentinela incluída
    len: usize,
}

impl FrequencyTable {
    /// Tabela padrão de dois pontos: {max, min, sentinela}.
    ///
    /// Placas sem frequências geram uma tabela degenerada com zeros.
    pub fn from_board(board: &BoardConfig) -> Self {
        Self::build(&[board.max_khz(), board.min_khz()])
    }

    /// Tabela customizada, em ordem não crescente de frequência.
    pub fn from_frequencies(freqs: &[FrequencyKHz]) -> CpuFreqResult<Self> {
        if freqs.is_empty() || freqs.len() >= MAX_OPERATING_POINTS {
            return Err(CpuFreqError::InvalidTable);
        }
        if freqs.contains(&SENTINEL) {
            return Err(CpuFreqError::InvalidTable);
        }
        if freqs.windows(2).any(|w| w[1] > w[0]) {
            return Err(CpuFreqError::InvalidTable);
        }
        Ok(Self::build(freqs))
    }

    fn build(freqs: &[FrequencyKHz]) -> Self {
        let mut entries = [OperatingPoint::EMPTY; MAX_OPERATING_POINTS];
        let valid = freqs.len();

        for (i, &frequency) in freqs.iter().enumerate() {
            entries[i] = OperatingPoint {
                frequency,
                index: i,
                remaining: (valid - 1 - i) as i32,
            };
        }
        entries[valid] = OperatingPoint {
            frequency: SENTINEL,
            index: valid,
            remaining: -1,
        };

        Self {
            entries,
            len: valid + 1,
        }
    }

    /// Total de entradas, sentinela incluída.
    pub fn entry_count(&self) -> usize {
        self.len
    }

    /// Entradas antes da sentinela.
    pub fn valid_count(&self) -> usize {
        self.len - 1
    }

    pub fn at(&self, index: usize) -> CpuFreqResult<OperatingPoint> {
        self.entries()
            .get(index)
            .copied()
            .ok_or(CpuFreqError::OutOfRange)
    }

    /// Todas as entradas, sentinela incluída.
    pub fn entries(&self) -> &[OperatingPoint] {
        &self.entries[..self.len]
    }

    /// Pontos de operação válidos (sem a sentinela).
    pub fn iter(&self) -> impl Iterator<Item = &OperatingPoint> {
        self.entries[..self.valid_count()].iter()
    }

    /// `frequency` é um ponto de operação válido?
    pub fn contains(&self, frequency: FrequencyKHz) -> bool {
        self.iter().any(|op| op.frequency == frequency)
    }

    /// Limites publicados: máximo da primeira entrada, mínimo da última válida.
    pub fn bounds(&self) -> PolicyBounds {
        let first = self.entries[0].frequency;
        let last = self.entries[self.valid_count() - 1].frequency;
        PolicyBounds::new(last, first)
    }
}
