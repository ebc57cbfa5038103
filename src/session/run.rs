//! Run-state accumulation and the end-of-run summary.
//!
//! Only streaming aggregates are kept — a count and two sums — so memory
//! use is independent of run length and sample rate. No sample buffer
//! exists anywhere in the firmware.

use crate::calibration::CalibrationParameters;
use crate::config::SessionConfig;

/// One timestamped, calibrated reading. Produced, emitted, discarded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// Seconds since the run started; non-decreasing within a run.
    pub elapsed_secs: f64,
    /// Unprocessed 24-bit ADC output, sign-extended.
    pub raw_count: i32,
    /// Calibrated weight in grams.
    pub weight_grams: f64,
}

/// Mutable state of the active run.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunState {
    /// Monotonic uptime at which the run began.
    pub started_at_secs: f64,
    pub sample_count: u64,
    pub raw_sum: f64,
    pub weight_sum: f64,
    pub finished: bool,
}

impl RunState {
    /// Zero every aggregate and stamp the run start.
    pub fn begin(&mut self, now_secs: f64) {
        *self = Self {
            started_at_secs: now_secs,
            ..Self::default()
        };
    }

    /// Fold one accepted sample into the aggregates.
    pub fn record(&mut self, raw: i32, weight_grams: f64) {
        self.sample_count += 1;
        self.raw_sum += f64::from(raw);
        self.weight_sum += weight_grams;
    }

    pub fn average_raw(&self) -> f64 {
        if self.sample_count == 0 {
            0.0
        } else {
            self.raw_sum / self.sample_count as f64
        }
    }

    pub fn average_weight(&self) -> f64 {
        if self.sample_count == 0 {
            0.0
        } else {
            self.weight_sum / self.sample_count as f64
        }
    }

    /// Derive the read-only summary for this run.
    pub fn summary(
        &self,
        session: &SessionConfig,
        params: &CalibrationParameters,
    ) -> SessionSummary {
        SessionSummary {
            average_raw: self.average_raw(),
            average_weight: self.average_weight(),
            percent_error: percent_error(self.average_weight(), session.calibration_weight_g),
            calibration_weight_g: session.calibration_weight_g,
            params: *params,
        }
    }
}

/// Deviation of the measured average from the declared reference weight,
/// computed as `100 * (|avg| - |ref|) / ref`.
///
/// `None` when the reference weight is exactly zero: the division is
/// undefined and must surface as a sentinel, never as an infinity.
pub fn percent_error(average_weight: f64, reference_g: f64) -> Option<f64> {
    if reference_g == 0.0 {
        return None;
    }
    Some(100.0 * (average_weight.abs() - reference_g.abs()) / reference_g)
}

/// Read-only result of a finished run. Emitted once, then discarded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionSummary {
    pub average_raw: f64,
    pub average_weight: f64,
    /// `None` when the reference weight made the computation undefined.
    pub percent_error: Option<f64>,
    pub calibration_weight_g: f64,
    pub params: CalibrationParameters,
}
