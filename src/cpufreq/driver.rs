//! Interface exposta ao framework de power management.
//!
//! O framework decide QUAL frequência usar (governadores ficam fora deste
//! crate). O driver apenas publica o que o hardware suporta e executa a
//! transição pedida.

use super::table::{FrequencyTable, PolicyBounds};
use super::FrequencyKHz;
use crate::error::CpuFreqResult;

/// O que o driver publica no init.
#[derive(Debug, Clone, Copy)]
pub struct CapabilityDescriptor<'a> {
    /// Pior caso de uma troca de frequência
    pub transition_latency_ns: u32,
    pub frequency_table: &'a FrequencyTable,
}

/// Interface para o driver de hardware (chamado pelo framework)
pub trait CpuFreqDriver {
    /// Nome do driver
    fn name(&self) -> &'static str;

    /// Adquire o clock e publica tabela + latência
    fn init(&mut self) -> CpuFreqResult<CapabilityDescriptor<'_>>;

    /// Ajusta os limites pedidos para dentro do suportado
    fn verify(&self, requested: PolicyBounds) -> CpuFreqResult<PolicyBounds>;

    /// Muda para a entrada `index` da tabela
    fn target_index(&self, index: usize) -> CpuFreqResult<()>;

    /// Frequência atual (0 = indisponível)
    fn get(&self) -> FrequencyKHz;

    /// Libera o clock
    fn teardown(&mut self);
}
