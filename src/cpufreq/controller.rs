//! FrequencyController - orquestra verificação e transições de frequência.
//!
//! # Fluxo de uma transição (placa com CGU_DIV)
//!
//! ```text
//! target_index(i)
//!   ├─ valida i contra a tabela            (Verifying)
//!   ├─ lock do CGU_DIV
//!   ├─ espera UPDT limpar, com limite      (AwaitingRegister)
//!   ├─ lê CSEL, calcula CCLK atual          (Computing)
//!   │    └─ já no alvo? → retorna sem escrever
//!   ├─ calcula novo CSEL
//!   └─ RMW: CSEL + UPDT                     (Committing)
//! ```
//!
//! Placas sem CGU_DIV mapeado delegam a troca para `ClockService::set_rate`.
//!
//! # Concorrência
//!
//! CPUs no mesmo domínio de clock compartilham o CGU_DIV. Todo acesso ao
//! registrador (e ao set_rate) passa por um único `spin::Mutex`, então nenhum
//! read-modify-write intercala com outro. A espera por UPDT acontece com o
//! lock adquirido e é sempre limitada por `poll_max_attempts`.
//!
//! A transição não espera a confirmação do hardware depois do commit: quem
//! quiser observar a nova frequência consulta `get()`.

use embedded_hal::delay::DelayNs;
use spin::Mutex;

use super::divisor::{cclk_hz, divisor_for, hz_to_khz, khz_to_hz};
use super::driver::{CapabilityDescriptor, CpuFreqDriver};
use super::state::{StateCell, TransitionState};
use super::table::{FrequencyTable, PolicyBounds};
use super::FrequencyKHz;
use crate::clock::{ClockService, ClockSource};
use crate::config::{
    BoardConfig, DRIVER_NAME, TRANSITION_LATENCY_NS, UPDT_POLL_INTERVAL_NS, UPDT_POLL_MAX_ATTEMPTS,
};
use crate::error::{CpuFreqError, CpuFreqResult};
use crate::hal::cgu::DivisorRegister;
use crate::hal::mmio::RegisterIo;

/// Recursos protegidos pelo lock de transição.
struct Hardware<R: RegisterIo, D: DelayNs> {
    divisor: Option<DivisorRegister<R>>,
    delay: D,
}

/// Driver de frequência da CCLK.
pub struct FrequencyController<'a, C, R, D>
where
    C: ClockService,
    R: RegisterIo,
    D: DelayNs,
{
    board: &'a BoardConfig,
    table: &'a FrequencyTable,
    clock: ClockSource<C>,
    hw: Mutex<Hardware<R, D>>,
    poll_interval_ns: u32,
    poll_max_attempts: u32,
    state: StateCell,
}

impl<'a, C, R, D> FrequencyController<'a, C, R, D>
where
    C: ClockService,
    R: RegisterIo,
    D: DelayNs,
{
    /// Cria o controlador. Nada é tocado no hardware até `init()`.
    ///
    /// `io` só é usado se a placa mapeia o CGU_DIV.
    pub fn new(
        board: &'a BoardConfig,
        table: &'a FrequencyTable,
        clocks: C,
        io: R,
        delay: D,
    ) -> Self {
        let divisor = board
            .cgu_div
            .map(|address| DivisorRegister::new(io, address));

        Self {
            board,
            table,
            clock: ClockSource::new(clocks),
            hw: Mutex::new(Hardware { divisor, delay }),
            poll_interval_ns: UPDT_POLL_INTERVAL_NS,
            poll_max_attempts: UPDT_POLL_MAX_ATTEMPTS,
            state: StateCell::new(),
        }
    }

    /// Substitui o orçamento de polling do UPDT.
    pub fn with_poll_budget(mut self, interval_ns: u32, max_attempts: u32) -> Self {
        self.poll_interval_ns = interval_ns;
        self.poll_max_attempts = max_attempts;
        self
    }

    pub fn board(&self) -> &'a BoardConfig {
        self.board
    }

    pub fn table(&self) -> &'a FrequencyTable {
        self.table
    }

    /// Último estado escrito.
    ///
    /// Transições escrevem o estado com o lock do CGU_DIV adquirido, mas
    /// `verify` e a validação de `target_index` não. Com pedidos em paralelo
    /// o valor é só indicativo; sem pedidos em andamento é sempre `Idle`.
    pub fn state(&self) -> TransitionState {
        self.state.get()
    }

    pub fn is_bound(&self) -> bool {
        self.clock.is_bound()
    }

    pub fn clock_service(&self) -> &C {
        self.clock.service()
    }

    // =========================================================================
    // CICLO DE VIDA
    // =========================================================================

    /// Resolve o clock de referência e publica tabela + latência.
    pub fn init(&mut self) -> CpuFreqResult<CapabilityDescriptor<'a>> {
        if self.clock.is_bound() {
            crate::kwarn!("(CpuFreq) init repetido rejeitado");
            return Err(CpuFreqError::Busy);
        }

        if let Err(err) = self.clock.acquire(self.board.clock_name) {
            crate::kerror!("(CpuFreq) Clock de referência ausente, errno=", err.as_errno());
            return Err(CpuFreqError::DeviceNotFound);
        }

        for op in self.table.iter() {
            crate::klog!("(CpuFreq) Tabela idx=", op.index, " kHz=", op.frequency);
            crate::knl!();
        }
        crate::kinfo!("(CpuFreq) Driver pronto, latência ns=", TRANSITION_LATENCY_NS);

        Ok(CapabilityDescriptor {
            transition_latency_ns: TRANSITION_LATENCY_NS,
            frequency_table: self.table,
        })
    }

    /// Libera o clock. Pode ser chamado mais de uma vez.
    pub fn teardown(&mut self) {
        if self.clock.is_bound() {
            crate::kinfo!("(CpuFreq) Driver removido");
        }
        self.clock.release();
        self.state.set(TransitionState::Idle);
    }

    // =========================================================================
    // OPERAÇÕES DO FRAMEWORK
    // =========================================================================

    /// Ajusta `requested` para dentro dos limites da tabela.
    ///
    /// `{0, 0}` em qualquer um dos lados significa "sem frequências" e
    /// resulta em `DeviceNotFound`.
    pub fn verify(&self, requested: PolicyBounds) -> CpuFreqResult<PolicyBounds> {
        self.state.set(TransitionState::Verifying);

        let limits = self.table.bounds();
        let result = if limits.is_none() || requested.is_none() {
            crate::kwarn!("(CpuFreq) verify sem frequências publicadas");
            Err(CpuFreqError::DeviceNotFound)
        } else {
            Ok(requested.clamp_within(limits))
        };

        self.finish(result)
    }

    /// Muda a CCLK para a entrada `index` da tabela.
    pub fn target_index(&self, index: usize) -> CpuFreqResult<()> {
        self.state.set(TransitionState::Verifying);

        match self.resolve_target(index) {
            Ok(target) => self.transition(target),
            Err(err) => self.finish(Err(err)),
        }
    }

    fn resolve_target(&self, index: usize) -> CpuFreqResult<FrequencyKHz> {
        if index >= self.table.valid_count() {
            crate::kwarn!("(CpuFreq) Índice de frequência inválido=", index);
            return Err(CpuFreqError::InvalidIndex);
        }
        if !self.clock.is_bound() {
            return Err(CpuFreqError::DeviceNotFound);
        }

        let target = self.table.at(index)?.frequency;
        let current = self.get();
        if current == 0 && target == 0 {
            return Err(CpuFreqError::DeviceNotFound);
        }
        Ok(target)
    }

    /// Leva a CCLK a `target` kHz.
    pub fn transition(&self, target: FrequencyKHz) -> CpuFreqResult<()> {
        if !self.clock.is_bound() {
            return self.finish(Err(CpuFreqError::DeviceNotFound));
        }

        let mut hw = self.hw.lock();
        let Hardware { divisor, delay } = &mut *hw;

        let result = match divisor {
            Some(reg) => self.commit_divisor(reg, delay, target),
            None => self.commit_clock_rate(target),
        };

        // Fecha com o lock ainda adquirido: outra transição não intercala estados
        self.finish(result)
    }

    fn commit_divisor(
        &self,
        reg: &DivisorRegister<R>,
        delay: &mut D,
        target: FrequencyKHz,
    ) -> CpuFreqResult<()> {
        self.state.set(TransitionState::AwaitingRegister);
        let idle = reg.await_idle(delay, self.poll_interval_ns, self.poll_max_attempts)?;
        crate::ktrace!("(CpuFreq) UPDT livre após leituras=", idle.polls);

        self.state.set(TransitionState::Computing);
        let source_hz = self.clock.rate()?;
        let current = reg.read().divisor_field;

        if cclk_hz(self.board, source_hz, current) == Some(khz_to_hz(target)) {
            crate::kdebug!("(CpuFreq) Já na frequência alvo kHz=", target);
            return Ok(());
        }

        let csel = divisor_for(self.board, source_hz, target)?;
        if csel == current {
            crate::kdebug!("(CpuFreq) CSEL já é o mais próximo=", csel);
            return Ok(());
        }

        self.state.set(TransitionState::Committing);
        reg.write_divisor(csel, true);
        crate::kdebug!("(CpuFreq) Transição disparada, kHz=", target);
        Ok(())
    }

    fn commit_clock_rate(&self, target: FrequencyKHz) -> CpuFreqResult<()> {
        self.state.set(TransitionState::Computing);

        // Sem CGU_DIV só vale o que a tabela publica; 0 Hz pararia o SYS_CLKIN0
        if target == 0 || !self.table.contains(target) {
            crate::kwarn!("(CpuFreq) Frequência fora da tabela kHz=", target);
            return Err(CpuFreqError::OutOfRange);
        }

        if let Ok(rate) = self.clock.rate() {
            if hz_to_khz(rate) == target {
                crate::kdebug!("(CpuFreq) Já na frequência alvo kHz=", target);
                return Ok(());
            }
        }

        self.state.set(TransitionState::Committing);
        self.clock.set_rate(khz_to_hz(target))?;
        crate::kdebug!("(CpuFreq) set_rate kHz=", target);
        Ok(())
    }

    /// Frequência atual da CCLK em kHz. Retorna 0 se não puder ser lida.
    pub fn get(&self) -> FrequencyKHz {
        if !self.clock.is_bound() {
            return 0;
        }

        let source_hz = match self.clock.rate() {
            Ok(rate) => rate,
            Err(err) => {
                crate::kwarn!("(CpuFreq) Taxa do clock indisponível, errno=", err.as_errno());
                return 0;
            }
        };

        let hw = self.hw.lock();
        match &hw.divisor {
            Some(reg) => cclk_hz(self.board, source_hz, reg.read().divisor_field)
                .map(hz_to_khz)
                .unwrap_or(0),
            None => hz_to_khz(source_hz),
        }
    }

    /// Fecha o pedido: falhas passam por `Failed`, tudo termina em `Idle`.
    fn finish<T>(&self, result: CpuFreqResult<T>) -> CpuFreqResult<T> {
        if let Err(err) = &result {
            self.state.set(TransitionState::Failed);
            crate::kdebug!("(CpuFreq) Pedido falhou, errno=", err.as_errno());
        }
        self.state.set(TransitionState::Idle);
        result
    }
}

impl<C, R, D> CpuFreqDriver for FrequencyController<'_, C, R, D>
where
    C: ClockService,
    R: RegisterIo,
    D: DelayNs,
{
    fn name(&self) -> &'static str {
        DRIVER_NAME
    }

    fn init(&mut self) -> CpuFreqResult<CapabilityDescriptor<'_>> {
        FrequencyController::init(self)
    }

    fn verify(&self, requested: PolicyBounds) -> CpuFreqResult<PolicyBounds> {
        FrequencyController::verify(self, requested)
    }

    fn target_index(&self, index: usize) -> CpuFreqResult<()> {
        FrequencyController::target_index(self, index)
    }

    fn get(&self) -> FrequencyKHz {
        FrequencyController::get(self)
    }

    fn teardown(&mut self) {
        FrequencyController::teardown(self)
    }
}

impl<C, R, D> Drop for FrequencyController<'_, C, R, D>
where
    C: ClockService,
    R: RegisterIo,
    D: DelayNs,
{
    fn drop(&mut self) {
        self.clock.release();
    }
}
