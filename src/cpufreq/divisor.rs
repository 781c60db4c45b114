//! Cálculo da CCLK a partir do CSEL e vice-versa.
//!
//! ```text
//! CCLK = (SYS_CLKIN0 / (DF + 1)) * MSEL / CSEL
//! CSEL = SYS_CLKIN0 * MSEL / ((DF + 1) * CCLK)
//! ```
//!
//! As contas são feitas em u64 e na ordem multiplicação-antes-da-divisão,
//! para não perder precisão no SYS_CLKIN0 / (DF + 1).

use super::FrequencyKHz;
use crate::clock::Hertz;
use crate::config::{BoardConfig, DIVISOR_TOLERANCE_PPM};
use crate::error::{CpuFreqError, CpuFreqResult};
use crate::hal::cgu::CguDiv;

pub fn khz_to_hz(khz: FrequencyKHz) -> Hertz {
    khz as Hertz * 1000
}

/// Converte Hz para kHz, saturando em `u32::MAX`.
pub fn hz_to_khz(hz: Hertz) -> FrequencyKHz {
    u32::try_from(hz / 1000).unwrap_or(u32::MAX)
}

/// Frequência efetiva da CCLK para um CSEL. `None` para CSEL = 0.
pub fn cclk_hz(board: &BoardConfig, source_hz: Hertz, csel: u8) -> Option<Hertz> {
    if csel == 0 {
        return None;
    }
    let vco = source_hz.saturating_mul(board.pll_msel as u64);
    Some(vco / ((board.pll_df as u64 + 1) * csel as u64))
}

/// `actual` está a no máximo `DIVISOR_TOLERANCE_PPM` de `target`?
pub fn within_tolerance(actual: Hertz, target: Hertz) -> bool {
    actual.abs_diff(target).saturating_mul(1_000_000)
        <= target.saturating_mul(DIVISOR_TOLERANCE_PPM)
}

/// CSEL que leva a CCLK a `target`.
///
/// O divisor é arredondado para o inteiro mais próximo e limitado a
/// `CSEL_MIN..=CSEL_MAX`. Se o resultado não reproduz o alvo dentro da
/// tolerância, retorna `OutOfRange`.
pub fn divisor_for(board: &BoardConfig, source_hz: Hertz, target: FrequencyKHz) -> CpuFreqResult<u8> {
    let target_hz = khz_to_hz(target);
    if target_hz == 0 || source_hz == 0 {
        return Err(CpuFreqError::OutOfRange);
    }

    let vco = source_hz.saturating_mul(board.pll_msel as u64);
    let den = (board.pll_df as u64 + 1) * target_hz;
    let rounded = vco.saturating_add(den / 2) / den;
    let csel = rounded.clamp(CguDiv::CSEL_MIN as u64, CguDiv::CSEL_MAX as u64) as u8;

    match cclk_hz(board, source_hz, csel) {
        Some(actual) if within_tolerance(actual, target_hz) => Ok(csel),
        _ => {
            crate::kwarn!("(CpuFreq) Nenhum CSEL reproduz kHz=", target);
            Err(CpuFreqError::OutOfRange)
        }
    }
}
