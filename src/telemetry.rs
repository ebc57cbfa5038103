//! Serial telemetry emitter.
//!
//! Formats every line the device puts on the wire: prompts, run markers,
//! the per-sample record, and the end-of-run summary block. The
//! per-sample line is parsed by the companion plotting script as
//! whitespace-separated `label: value` tokens — field order, labels, and
//! decimal precision are a protocol contract and must not change without
//! a version bump on both ends.

use core::fmt::Write;

use log::warn;

use crate::config::SessionConfig;
use crate::session::run::{Sample, SessionSummary};

/// Longest line the emitter produces (the parameter echo).
pub const LINE_CAP: usize = 96;

/// Upper bound on lines queued by a single controller tick
/// (config echo block plus markers).
pub const OUTBOX_CAP: usize = 16;

pub type OutLine = heapless::String<LINE_CAP>;
pub type OutQueue = heapless::Vec<OutLine, OUTBOX_CAP>;

// ── Prompts and markers ───────────────────────────────────────

pub const PROMPT_DURATION: &str = "Enter duration (seconds): ";
pub const PROMPT_CAL_WEIGHT: &str = "Enter calibration weight (in grams): ";
pub const PROMPT_RERUN: &str = "Run again? (y/n): ";
pub const MARKER_READY: &str = "READY";
pub const MARKER_STARTING: &str = "[Starting in 1 second...]";
pub const MARKER_START: &str = "START";
pub const MARKER_DONE: &str = "Test Done";
pub const HALT_NOTICE: &str = "Halting. Reset the device to start a new session.";
pub const ERR_ADC_MISSING: &str = "ERROR: NAU7802 not detected";

/// Queue one formatted line. The queue is sized for the largest block a
/// single tick emits, so a drop here indicates a logic error upstream.
pub fn push_line(out: &mut OutQueue, args: core::fmt::Arguments<'_>) {
    let mut line = OutLine::new();
    if line.write_fmt(args).is_err() {
        warn!("telemetry: line over {LINE_CAP} bytes, truncated");
    }
    if out.push(line).is_err() {
        warn!("telemetry: outbox full, line dropped");
    }
}

/// Per-sample record.
///
/// The raw count is printed through `f64` so loosely typed consumers can
/// run a single float conversion over every field.
pub fn emit_sample(out: &mut OutQueue, sample: &Sample) {
    push_line(
        out,
        format_args!(
            "time: {:.6} raw: {:.0} modified_weight: {:.6}",
            sample.elapsed_secs,
            f64::from(sample.raw_count),
            sample.weight_grams
        ),
    );
}

/// Echo the accepted configuration and announce the imminent start.
pub fn emit_config_echo(out: &mut OutQueue, cfg: &SessionConfig) {
    push_line(out, format_args!("CONFIG RECEIVED"));
    push_line(out, format_args!("Duration (s): {}", cfg.duration_secs));
    push_line(
        out,
        format_args!("Calibration weight: {:.6}", cfg.calibration_weight_g),
    );
    push_line(out, format_args!("{MARKER_READY}"));
    push_line(out, format_args!("{MARKER_STARTING}"));
}

/// End-of-run summary block, terminated by the completion sentinel.
///
/// An undefined percent error (zero reference weight) is spelled out
/// rather than printed as an infinity the collector would mistake for a
/// measurement.
pub fn emit_summary(out: &mut OutQueue, summary: &SessionSummary) {
    push_line(
        out,
        format_args!("Average raw value: {:.6}", summary.average_raw),
    );
    push_line(
        out,
        format_args!("Average modified weight: {:.6}", summary.average_weight),
    );
    match summary.percent_error {
        Some(pct) => push_line(out, format_args!("Percent error (%): {pct:.6}")),
        None => push_line(
            out,
            format_args!("Percent error (%): undefined (calibration weight is zero)"),
        ),
    }
    push_line(
        out,
        format_args!("Calibration weight (g): {:.6}", summary.calibration_weight_g),
    );
    push_line(
        out,
        format_args!(
            "Calibration parameters: offset: {:.2} slope+: {:.2} slope-: {:.2}",
            summary.params.offset, summary.params.slope_positive, summary.params.slope_negative
        ),
    );
    push_line(out, format_args!("{MARKER_DONE}"));
}
