//! Concrete state handler functions and table builder.
//!
//! Each state is defined by plain `fn` pointers — no closures, no dynamic
//! dispatch, no heap. Lifecycle of one measurement session:
//!
//! ```text
//!  AWAITING_CONFIG ──[config accepted, settle elapsed]──▶ RUNNING
//!        ▲                                                   │
//!        │                                        [duration reached,
//!        │                                         boundary sample kept]
//!        │                                                   ▼
//!        │                                               FINISHED
//!        │                                                   │
//!        │                                          [summary emitted]
//!        │                                                   ▼
//!        └────────────[reply "y"]────────── AWAITING_RERUN_DECISION
//!                                                            │
//!                                                  [any other reply]
//!                                                            ▼
//!                                                         HALTED
//! ```

use log::{info, warn};

use super::context::SessionContext;
use super::run::{RunState, Sample};
use super::{StateDescriptor, StateId};
use crate::intake::{self, Progress};
use crate::telemetry;

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static state table. Called once at startup.
pub fn build_state_table() -> [StateDescriptor; StateId::COUNT] {
    [
        // Index 0 — AwaitingConfig
        StateDescriptor {
            id: StateId::AwaitingConfig,
            name: "AwaitingConfig",
            on_enter: Some(awaiting_config_enter),
            on_exit: None,
            on_update: awaiting_config_update,
        },
        // Index 1 — Running
        StateDescriptor {
            id: StateId::Running,
            name: "Running",
            on_enter: Some(running_enter),
            on_exit: Some(running_exit),
            on_update: running_update,
        },
        // Index 2 — Finished
        StateDescriptor {
            id: StateId::Finished,
            name: "Finished",
            on_enter: Some(finished_enter),
            on_exit: None,
            on_update: finished_update,
        },
        // Index 3 — AwaitingRerunDecision
        StateDescriptor {
            id: StateId::AwaitingRerunDecision,
            name: "AwaitingRerunDecision",
            on_enter: Some(awaiting_rerun_enter),
            on_exit: None,
            on_update: awaiting_rerun_update,
        },
        // Index 4 — Halted
        StateDescriptor {
            id: StateId::Halted,
            name: "Halted",
            on_enter: Some(halted_enter),
            on_exit: None,
            on_update: halted_update,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  AWAITING_CONFIG — collect duration and calibration weight over serial
// ═══════════════════════════════════════════════════════════════════════════

fn awaiting_config_enter(ctx: &mut SessionContext) {
    ctx.intake.reset();
    ctx.session = None;
    ctx.run = RunState::default();
    ctx.emit(format_args!("{}", telemetry::PROMPT_DURATION));
    info!("CONFIG: waiting for duration and calibration weight");
}

fn awaiting_config_update(ctx: &mut SessionContext) -> Option<StateId> {
    // Config already accepted: hold through the settle window, then start.
    if let Some(cfg) = ctx.session {
        // Keystrokes during the settle window are noise.
        ctx.pending_line = None;
        if ctx.now_secs >= ctx.arm_at_secs {
            info!("CONFIG: settle elapsed, starting {}s run", cfg.duration_secs);
            return Some(StateId::Running);
        }
        return None;
    }

    let Some(line) = ctx.pending_line.take() else {
        return None;
    };

    let had_duration = ctx.intake.has_duration();
    match ctx.intake.push_line(&line, ctx.system.max_duration_secs) {
        Progress::AwaitingDuration => {}
        Progress::AwaitingWeight => {
            if !had_duration {
                ctx.emit(format_args!("{}", telemetry::PROMPT_CAL_WEIGHT));
            }
        }
        Progress::Complete(cfg) => {
            telemetry::emit_config_echo(&mut ctx.outbox, &cfg);
            ctx.session = Some(cfg);
            ctx.arm_at_secs = ctx.now_secs + ctx.system.start_delay_secs;
            info!(
                "CONFIG: accepted, duration {}s, calibration weight {}g",
                cfg.duration_secs, cfg.calibration_weight_g
            );
        }
    }
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  RUNNING — timestamp, calibrate, accumulate, stream
// ═══════════════════════════════════════════════════════════════════════════

fn running_enter(ctx: &mut SessionContext) {
    ctx.run.begin(ctx.now_secs);
    ctx.emit(format_args!("{}", telemetry::MARKER_START));
}

fn running_exit(ctx: &mut SessionContext) {
    info!("RUN: sampling stopped after {} samples", ctx.run.sample_count);
}

fn running_update(ctx: &mut SessionContext) -> Option<StateId> {
    let Some(raw) = ctx.pending_sample.take() else {
        return None;
    };
    let Some(cfg) = ctx.session else {
        // Unreachable through normal transitions; park rather than sample
        // against a missing configuration.
        warn!("RUN: sample with no active configuration, halting");
        return Some(StateId::Halted);
    };

    let elapsed = ctx.now_secs - ctx.run.started_at_secs;
    let weight = ctx.system.calibration.weight_grams(raw);
    ctx.run.record(raw, weight);

    let sample = Sample {
        elapsed_secs: elapsed,
        raw_count: raw,
        weight_grams: weight,
    };
    telemetry::emit_sample(&mut ctx.outbox, &sample);

    // Termination is checked after the sample is folded in, so the
    // reading that crosses the duration threshold is kept.
    if elapsed >= f64::from(cfg.duration_secs) {
        ctx.run.finished = true;
        return Some(StateId::Finished);
    }
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  FINISHED — derive and emit the summary
// ═══════════════════════════════════════════════════════════════════════════

fn finished_enter(ctx: &mut SessionContext) {
    let Some(cfg) = ctx.session else {
        return;
    };
    let summary = ctx.run.summary(&cfg, &ctx.system.calibration);
    telemetry::emit_summary(&mut ctx.outbox, &summary);
    ctx.last_summary = Some(summary);
    info!(
        "RUN: finished, {} samples, avg weight {:.6}g",
        ctx.run.sample_count, summary.average_weight
    );
}

fn finished_update(_ctx: &mut SessionContext) -> Option<StateId> {
    Some(StateId::AwaitingRerunDecision)
}

// ═══════════════════════════════════════════════════════════════════════════
//  AWAITING_RERUN_DECISION — one more session, or park for good
// ═══════════════════════════════════════════════════════════════════════════

fn awaiting_rerun_enter(ctx: &mut SessionContext) {
    ctx.emit(format_args!("{}", telemetry::PROMPT_RERUN));
}

fn awaiting_rerun_update(ctx: &mut SessionContext) -> Option<StateId> {
    let Some(line) = ctx.pending_line.take() else {
        return None;
    };
    if intake::parse_yes_no(&line) {
        info!("RERUN: affirmative, reconfiguring");
        return Some(StateId::AwaitingConfig);
    }
    ctx.emit(format_args!("{}", telemetry::HALT_NOTICE));
    Some(StateId::Halted)
}

// ═══════════════════════════════════════════════════════════════════════════
//  HALTED — terminal; nothing in, nothing out
// ═══════════════════════════════════════════════════════════════════════════

fn halted_enter(ctx: &mut SessionContext) {
    ctx.pending_sample = None;
    ctx.pending_line = None;
    info!("HALTED: no further sampling or serial activity until reset");
}

fn halted_update(_ctx: &mut SessionContext) -> Option<StateId> {
    None
}
