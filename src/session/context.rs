//! Shared mutable context threaded through every state handler.
//!
//! `SessionContext` is the single struct that state handlers read from
//! and write to: the accepted configuration, the run aggregates, the
//! per-tick inputs the service collected from the ports, and the
//! outbound line queue the service drains to the console afterwards.

use crate::config::{SessionConfig, SystemConfig};
use crate::intake::ConfigIntake;
use crate::session::run::{RunState, SessionSummary};
use crate::telemetry::{self, OutQueue};

/// Longest serial input line the device accepts; anything beyond is
/// truncated by the console adapter.
pub const INPUT_LINE_CAP: usize = 64;

/// One received serial line, terminator stripped.
pub type InputLine = heapless::String<INPUT_LINE_CAP>;

/// The shared context passed to every state handler function.
pub struct SessionContext {
    /// Build-time device configuration.
    pub system: SystemConfig,
    /// Active per-run configuration; `None` until intake completes.
    pub session: Option<SessionConfig>,
    /// Streaming aggregates of the active run.
    pub run: RunState,
    /// Parser for the configuration phase.
    pub intake: ConfigIntake,

    // -- Per-tick inputs (written by the service before each tick) --
    /// Monotonic uptime in seconds.
    pub now_secs: f64,
    /// One complete serial input line, if any arrived.
    pub pending_line: Option<InputLine>,
    /// One raw ADC reading, if a conversion was ready.
    pub pending_sample: Option<i32>,

    // -- Outputs (drained by the service after each tick) --
    /// Protocol lines queued for the console.
    pub outbox: OutQueue,

    /// Uptime at which an accepted configuration starts the run
    /// (end of the settle window).
    pub arm_at_secs: f64,
    /// Summary of the most recently finished run.
    pub last_summary: Option<SessionSummary>,
}

impl SessionContext {
    pub fn new(system: SystemConfig) -> Self {
        Self {
            system,
            session: None,
            run: RunState::default(),
            intake: ConfigIntake::new(),
            now_secs: 0.0,
            pending_line: None,
            pending_sample: None,
            outbox: OutQueue::new(),
            arm_at_secs: 0.0,
            last_summary: None,
        }
    }

    /// Queue one protocol line for the console.
    pub fn emit(&mut self, args: core::fmt::Arguments<'_>) {
        telemetry::push_line(&mut self.outbox, args);
    }
}
