//! Mock hardware adapters for integration tests.
//!
//! Records every port interaction so tests can assert on the full serial
//! transcript and sampling history without touching real peripherals.

use std::collections::VecDeque;

use strainlog::app::ports::{ClockPort, ConsolePort, SampleSource};
use strainlog::config::{AdcGain, AdcRate};
use strainlog::error::SensorError;
use strainlog::session::context::InputLine;

// ── MockAdc ───────────────────────────────────────────────────

pub struct MockAdc {
    pub queue: VecDeque<i32>,
    pub configured: Option<(AdcGain, AdcRate)>,
    pub calibrated: bool,
    pub fail_init: bool,
    pub read_calls: u32,
}

#[allow(dead_code)]
impl MockAdc {
    pub fn new() -> Self {
        Self {
            queue: VecDeque::new(),
            configured: None,
            calibrated: false,
            fail_init: false,
            read_calls: 0,
        }
    }

    pub fn push_sample(&mut self, raw: i32) {
        self.queue.push_back(raw);
    }
}

impl Default for MockAdc {
    fn default() -> Self {
        Self::new()
    }
}

impl SampleSource for MockAdc {
    fn configure(&mut self, gain: AdcGain, rate: AdcRate) -> Result<(), SensorError> {
        if self.fail_init {
            return Err(SensorError::NotDetected);
        }
        self.configured = Some((gain, rate));
        Ok(())
    }

    fn calibrate(&mut self) -> Result<(), SensorError> {
        if self.fail_init {
            return Err(SensorError::CalibrationFailed);
        }
        self.calibrated = true;
        Ok(())
    }

    fn sample_ready(&mut self) -> bool {
        !self.queue.is_empty()
    }

    fn read_raw(&mut self) -> Result<i32, SensorError> {
        self.read_calls += 1;
        self.queue.pop_front().ok_or(SensorError::NotReady)
    }
}

// ── MockConsole ───────────────────────────────────────────────

pub struct MockConsole {
    rx: VecDeque<InputLine>,
    /// Every line the device wrote, in order.
    pub tx: Vec<String>,
}

#[allow(dead_code)]
impl MockConsole {
    pub fn new() -> Self {
        Self {
            rx: VecDeque::new(),
            tx: Vec::new(),
        }
    }

    /// Queue a reply as if the operator typed it.
    pub fn reply(&mut self, line: &str) {
        self.rx.push_back(InputLine::try_from(line).unwrap());
    }

    pub fn lines_matching(&self, prefix: &str) -> Vec<&String> {
        self.tx.iter().filter(|l| l.starts_with(prefix)).collect()
    }
}

impl Default for MockConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsolePort for MockConsole {
    fn write_line(&mut self, line: &str) {
        self.tx.push(line.to_string());
    }

    fn poll_line(&mut self) -> Option<InputLine> {
        self.rx.pop_front()
    }
}

// ── MockClock ─────────────────────────────────────────────────

pub struct MockClock {
    now_us: u64,
}

#[allow(dead_code)]
impl MockClock {
    pub fn new() -> Self {
        Self { now_us: 0 }
    }

    pub fn advance_secs(&mut self, secs: f64) {
        self.now_us += (secs * 1e6) as u64;
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ClockPort for MockClock {
    fn uptime_us(&self) -> u64 {
        self.now_us
    }
}
