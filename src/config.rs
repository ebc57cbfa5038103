//! System configuration parameters
//!
//! All tunable parameters for the acquisition device. Values are baked in
//! at build time via [`SystemConfig::default`]; the per-run duration and
//! calibration weight are entered over the serial console instead (see
//! [`crate::intake`]).

use serde::{Deserialize, Serialize};

use crate::calibration::CalibrationParameters;

/// Shortest run the device will accept. Requested durations of zero are
/// clamped up to this.
pub const MIN_DURATION_SECS: u32 = 1;

/// NAU7802 PGA gain setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdcGain {
    X1,
    X2,
    X4,
    X8,
    X16,
    X32,
    X64,
    X128,
}

/// NAU7802 conversion rate (samples per second).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdcRate {
    Sps10,
    Sps20,
    Sps40,
    Sps80,
    Sps320,
}

impl AdcRate {
    /// Nominal sample period in milliseconds, for poll-cadence sanity checks.
    pub fn period_ms(self) -> u32 {
        match self {
            Self::Sps10 => 100,
            Self::Sps20 => 50,
            Self::Sps40 => 25,
            Self::Sps80 => 13,
            Self::Sps320 => 3,
        }
    }
}

/// Per-run parameters entered over the serial console.
///
/// Immutable for the session's lifetime; replaced wholesale on re-run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Run length in seconds, already clamped to
    /// `MIN_DURATION_SECS..=max_duration_secs`.
    pub duration_secs: u32,
    /// Declared reference weight for percent-error reporting (grams).
    /// Accepted as-is, including zero and negative values.
    pub calibration_weight_g: f64,
}

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Session limits ---
    /// Longest run the device will accept (seconds). Longer requests are
    /// clamped down to this.
    pub max_duration_secs: u32,
    /// Settle window between accepting a configuration and starting the
    /// run (the `[Starting in 1 second...]` banner).
    pub start_delay_secs: f64,

    // --- ADC ---
    /// PGA gain applied to the bridge signal.
    pub adc_gain: AdcGain,
    /// Conversion rate.
    pub adc_rate: AdcRate,

    // --- Calibration ---
    /// Two-slope raw-counts-to-grams transform.
    pub calibration: CalibrationParameters,

    // --- Timing ---
    /// Main-loop poll interval while a run is active (milliseconds).
    /// Must stay below the ADC sample period or readings are dropped.
    pub poll_interval_ms: u32,
    /// Idle back-off while waiting on serial input or halted (milliseconds).
    pub idle_backoff_ms: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Session limits
            max_duration_secs: 60,
            start_delay_secs: 1.0,

            // ADC: fastest NAU7802 rate, full gain for a 2 mV/V bridge
            adc_gain: AdcGain::X128,
            adc_rate: AdcRate::Sps320,

            // Calibration
            calibration: CalibrationParameters::default(),

            // Timing
            poll_interval_ms: 1,
            idle_backoff_ms: 25,
        }
    }
}
