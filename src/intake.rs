//! Serial configuration intake.
//!
//! Collects the run duration and calibration-weight values typed over the
//! serial console at session start. Tokens are whitespace/newline
//! delimited, so a reply may carry both values on one line or spread them
//! across several. Malformed numbers parse to the default-safe `0.0` and
//! flow through the same clamping path as a valid-but-small input.

use log::info;

use crate::config::{MIN_DURATION_SECS, SessionConfig};

/// Clamp a requested duration into the acceptable range.
///
/// Effective duration is `max(MIN_DURATION_SECS, min(requested, max))`;
/// non-finite and non-positive requests land on the minimum.
pub fn clamp_duration(requested: f64, max_duration_secs: u32) -> u32 {
    if !requested.is_finite() || requested <= 0.0 {
        return MIN_DURATION_SECS;
    }
    // f64 -> u32 saturates, so oversized requests clamp to max below.
    (requested as u32).clamp(MIN_DURATION_SECS, max_duration_secs)
}

/// `true` iff the reply, trimmed, starts with the affirmative character.
pub fn parse_yes_no(line: &str) -> bool {
    line.trim()
        .chars()
        .next()
        .is_some_and(|c| c.eq_ignore_ascii_case(&'y'))
}

fn parse_number(token: &str) -> f64 {
    token.parse().unwrap_or(0.0)
}

/// Outcome of feeding one input line to the intake.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Progress {
    /// Still waiting for the duration token.
    AwaitingDuration,
    /// Duration received; waiting for the calibration weight token.
    AwaitingWeight,
    /// Both tokens received; the run can be armed.
    Complete(SessionConfig),
}

/// Incremental parser for the configuration phase.
///
/// Values are consumed in a fixed order: duration first, calibration
/// weight second. Extra tokens on a line are ignored.
#[derive(Debug, Default)]
pub struct ConfigIntake {
    duration_secs: Option<u32>,
    calibration_weight_g: Option<f64>,
}

impl ConfigIntake {
    pub fn new() -> Self {
        Self::default()
    }

    /// Discard any partially collected values.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn has_duration(&self) -> bool {
        self.duration_secs.is_some()
    }

    /// Feed one received line and report how far the intake has come.
    pub fn push_line(&mut self, line: &str, max_duration_secs: u32) -> Progress {
        for token in line.split_ascii_whitespace() {
            if self.duration_secs.is_none() {
                let requested = parse_number(token);
                let clamped = clamp_duration(requested, max_duration_secs);
                if f64::from(clamped) != requested {
                    info!("intake: duration {requested} clamped to {clamped}s");
                }
                self.duration_secs = Some(clamped);
            } else if self.calibration_weight_g.is_none() {
                self.calibration_weight_g = Some(parse_number(token));
            } else {
                break;
            }
        }

        match (self.duration_secs, self.calibration_weight_g) {
            (Some(duration_secs), Some(calibration_weight_g)) => {
                Progress::Complete(SessionConfig {
                    duration_secs,
                    calibration_weight_g,
                })
            }
            (Some(_), None) => Progress::AwaitingWeight,
            _ => Progress::AwaitingDuration,
        }
    }
}
