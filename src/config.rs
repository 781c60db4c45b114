//! # Configuração do Driver CpuFreq
//!
//! Define constantes de temporização e a tabela de placas suportadas.
//!
//! A variante de placa é escolhida em runtime (`BoardId`), nunca por
//! compilação condicional. Cada `BoardConfig` carrega tudo que o driver
//! precisa saber sobre o hardware: nome do clock de referência, endereço do
//! CGU_DIV, limites de frequência e constantes do PLL.

use crate::cpufreq::FrequencyKHz;

// =============================================================================
// IDENTIFICAÇÃO DO DRIVER
// =============================================================================

/// Nome publicado para o framework de power management
pub const DRIVER_NAME: &str = "adsp-sc5xx cpufreq";

/// Clock que alimenta a CCLK em todas as variantes (gerado pelo CGU0, sempre ativo)
pub const CLK_SYS_CLKIN0: &str = "sys_clkin0";

/// Endereço físico do CGU0_DIV nas variantes que o mapeiam
pub const SC5XX_CGU0_DIV: usize = 0x3108_D00C;

// =============================================================================
// TEMPORIZAÇÃO DAS TRANSIÇÕES
// =============================================================================

/// Latência máxima de uma troca de frequência (publicada ao framework)
pub const TRANSITION_LATENCY_NS: u32 = 50_000;

/// Intervalo entre leituras do bit UPDT
pub const UPDT_POLL_INTERVAL_NS: u32 = 1_000;

/// Número máximo de leituras do bit UPDT antes de desistir (200 µs no total)
pub const UPDT_POLL_MAX_ATTEMPTS: u32 = 200;

// Orçamento de polling >= 2x a latência publicada
const _: () = assert!(
    (UPDT_POLL_INTERVAL_NS as u64) * (UPDT_POLL_MAX_ATTEMPTS as u64)
        >= 2 * (TRANSITION_LATENCY_NS as u64)
);

// =============================================================================
// CÁLCULO DE DIVISOR
// =============================================================================

/// Erro máximo aceito entre a frequência pedida e a obtida (0.1%)
pub const DIVISOR_TOLERANCE_PPM: u64 = 1_000;

/// Capacidade da tabela de frequências (15 pontos + sentinela)
pub const MAX_OPERATING_POINTS: usize = 16;

// =============================================================================
// PLACAS
// =============================================================================

/// Variantes de placa conhecidas
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardId {
    /// ADSP-SC58x (Cortex-A5)
    Sc58x,
    /// ADSP-SC59x 32-bit (sem mapeamento do CGU_DIV)
    Sc59x,
    /// ADSP-SC598 (Cortex-A55, 64-bit)
    Sc59x64,
    /// Placa sem suporte a DVFS (nenhuma frequência publicada)
    Generic,
}

impl BoardId {
    /// Resolve a variante a partir da string `compatible` do device tree.
    pub fn from_compatible(compatible: &str) -> Option<Self> {
        match compatible {
            "adi,sc58x" | "adi,sc582" | "adi,sc583" | "adi,sc584" | "adi,sc587"
            | "adi,sc589" => Some(Self::Sc58x),
            "adi,sc59x" | "adi,sc592" | "adi,sc594" => Some(Self::Sc59x),
            "adi,sc59x-64" | "adi,sc598" => Some(Self::Sc59x64),
            _ => None,
        }
    }

    /// Configuração de hardware desta variante.
    pub fn config(self) -> &'static BoardConfig {
        match self {
            Self::Sc58x => &SC58X,
            Self::Sc59x => &SC59X,
            Self::Sc59x64 => &SC59X_64,
            Self::Generic => &GENERIC,
        }
    }
}

/// Parâmetros de hardware de uma placa.
///
/// CCLK = SYS_CLKIN0 * MSEL / ((DF + 1) * CSEL)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardConfig {
    pub id: BoardId,
    /// Nome do nó de clock resolvido no init
    pub clock_name: &'static str,
    /// Endereço físico do CGU_DIV, `None` se a variante não o expõe
    pub cgu_div: Option<usize>,
    pub min_mhz: u32,
    pub max_mhz: u32,
    /// Multiplicador do PLL (CGU_CTL.MSEL)
    pub pll_msel: u32,
    /// Fator de divisão do PLL (CGU_CTL.DF)
    pub pll_df: u32,
}

impl BoardConfig {
    pub const fn min_khz(&self) -> FrequencyKHz {
        self.min_mhz * 1000
    }

    pub const fn max_khz(&self) -> FrequencyKHz {
        self.max_mhz * 1000
    }

    /// A placa publica pelo menos uma frequência válida?
    pub const fn has_frequencies(&self) -> bool {
        self.min_mhz != 0 || self.max_mhz != 0
    }
}

pub static SC58X: BoardConfig = BoardConfig {
    id: BoardId::Sc58x,
    clock_name: CLK_SYS_CLKIN0,
    cgu_div: Some(SC5XX_CGU0_DIV),
    min_mhz: 800,
    max_mhz: 1000,
    pll_msel: 80,
    pll_df: 0,
};

pub static SC59X: BoardConfig = BoardConfig {
    id: BoardId::Sc59x,
    clock_name: CLK_SYS_CLKIN0,
    cgu_div: None,
    min_mhz: 800,
    max_mhz: 1000,
    pll_msel: 80,
    pll_df: 0,
};

pub static SC59X_64: BoardConfig = BoardConfig {
    id: BoardId::Sc59x64,
    clock_name: CLK_SYS_CLKIN0,
    cgu_div: Some(SC5XX_CGU0_DIV),
    min_mhz: 800,
    max_mhz: 1000,
    pll_msel: 80,
    pll_df: 0,
};

pub static GENERIC: BoardConfig = BoardConfig {
    id: BoardId::Generic,
    clock_name: CLK_SYS_CLKIN0,
    cgu_div: None,
    min_mhz: 0,
    max_mhz: 0,
    pll_msel: 1,
    pll_df: 0,
};
