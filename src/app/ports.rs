//! Port traits — the hexagonal boundary between domain logic and the
//! outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ SessionService (domain)
//! ```
//!
//! Driven adapters (the ADC, the serial console, the monotonic clock)
//! implement these traits. The [`SessionService`](super::service::SessionService)
//! consumes them via generics, so the domain core never touches hardware
//! directly and the whole controller runs against mocks on the host.

use crate::config::{AdcGain, AdcRate};
use crate::error::SensorError;
use crate::session::context::InputLine;

// ───────────────────────────────────────────────────────────────
// Sample source (driven adapter: ADC → domain)
// ───────────────────────────────────────────────────────────────

/// The 24-bit converter, reduced to the four operations the controller
/// needs. Readings arrive monotonically; `sample_ready`/`read_raw` form
/// a non-blocking poll pair.
pub trait SampleSource {
    /// Apply gain and conversion-rate settings to the converter.
    fn configure(&mut self, gain: AdcGain, rate: AdcRate) -> Result<(), SensorError>;

    /// Run the converter's internal offset calibration.
    fn calibrate(&mut self) -> Result<(), SensorError>;

    /// A conversion result is waiting to be read.
    fn sample_ready(&mut self) -> bool;

    /// Read the latest conversion, sign-extended to `i32`.
    fn read_raw(&mut self) -> Result<i32, SensorError>;
}

// ───────────────────────────────────────────────────────────────
// Console (driven adapter: domain ↔ serial channel)
// ───────────────────────────────────────────────────────────────

/// Line-oriented serial channel. Writes are assumed reliable (local
/// link); a transport failure is fatal and handled by the adapter.
pub trait ConsolePort {
    /// Send one protocol line; the adapter appends the terminator.
    fn write_line(&mut self, line: &str);

    /// Non-blocking: a complete received line with the terminator
    /// stripped, or `None` if no full line has arrived yet.
    fn poll_line(&mut self) -> Option<InputLine>;
}

// ───────────────────────────────────────────────────────────────
// Clock (driven adapter: monotonic time → domain)
// ───────────────────────────────────────────────────────────────

/// Monotonic time since boot. Run-relative timestamps are differences
/// of this value, so wall-clock adjustments never touch the data.
pub trait ClockPort {
    /// Microseconds since boot.
    fn uptime_us(&self) -> u64;
}
