//! Session service — the hexagonal core.
//!
//! [`SessionService`] owns the FSM and its context and exposes a clean,
//! hardware-agnostic API. All I/O flows through port traits injected at
//! the call site, making the entire controller testable with mock
//! adapters.
//!
//! ```text
//!  SampleSource ──▶ ┌───────────────────────────┐
//!    ClockPort  ──▶ │       SessionService      │ ──▶ ConsolePort
//!  ConsolePort  ──▶ │  FSM · intake · telemetry │
//!                   └───────────────────────────┘
//! ```

use crate::config::SystemConfig;
use crate::session::context::SessionContext;
use crate::session::run::SessionSummary;
use crate::session::states::build_state_table;
use crate::session::{Fsm, StateId};

use super::ports::{ClockPort, ConsolePort, SampleSource};

/// The session service orchestrates one cooperative control loop.
pub struct SessionService {
    fsm: Fsm,
    ctx: SessionContext,
}

impl SessionService {
    /// Construct the service from configuration.
    ///
    /// Does **not** start the FSM — call [`start`](Self::start) next.
    pub fn new(config: SystemConfig) -> Self {
        let ctx = SessionContext::new(config);
        let fsm = Fsm::new(build_state_table(), StateId::AwaitingConfig);
        Self { fsm, ctx }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Run the initial state's `on_enter` (issues the first prompt).
    /// The prompt is queued; the first [`tick`](Self::tick) flushes it.
    pub fn start(&mut self) {
        self.fsm.start(&mut self.ctx);
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one full control cycle: poll inputs → FSM tick → flush output.
    ///
    /// Inputs are polled only where the current state consumes them: the
    /// console during the two interactive states, the ADC while a run is
    /// active. A ready sample is accepted at most once per tick and
    /// never batched.
    pub fn tick(
        &mut self,
        adc: &mut impl SampleSource,
        console: &mut impl ConsolePort,
        clock: &impl ClockPort,
    ) -> StateId {
        self.ctx.now_secs = clock.uptime_us() as f64 / 1e6;

        match self.fsm.current_state() {
            StateId::AwaitingConfig | StateId::AwaitingRerunDecision => {
                if self.ctx.pending_line.is_none() {
                    self.ctx.pending_line = console.poll_line();
                }
            }
            StateId::Running => {
                if self.ctx.pending_sample.is_none() && adc.sample_ready() {
                    match adc.read_raw() {
                        Ok(raw) => self.ctx.pending_sample = Some(raw),
                        Err(e) => log::warn!("ADC read failed mid-run: {e}"),
                    }
                }
            }
            StateId::Finished | StateId::Halted => {}
        }

        self.fsm.tick(&mut self.ctx);

        for line in self.ctx.outbox.iter() {
            console.write_line(line);
        }
        self.ctx.outbox.clear();

        self.fsm.current_state()
    }

    // ── Queries ───────────────────────────────────────────────

    /// Current FSM state.
    pub fn state(&self) -> StateId {
        self.fsm.current_state()
    }

    /// The controller has parked itself permanently.
    pub fn is_halted(&self) -> bool {
        self.state() == StateId::Halted
    }

    /// Samples folded into the active run so far.
    pub fn run_sample_count(&self) -> u64 {
        self.ctx.run.sample_count
    }

    /// Summary of the most recently finished run.
    pub fn last_summary(&self) -> Option<SessionSummary> {
        self.ctx.last_summary
    }

    /// Recommended main-loop sleep before the next tick: tight while a
    /// run is sampling, relaxed while waiting on a human.
    pub fn idle_hint_ms(&self) -> u32 {
        match self.state() {
            StateId::Running | StateId::Finished => self.ctx.system.poll_interval_ms,
            StateId::AwaitingConfig | StateId::AwaitingRerunDecision | StateId::Halted => {
                self.ctx.system.idle_backoff_ms
            }
        }
    }
}
