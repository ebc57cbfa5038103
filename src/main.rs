//! Strain-gauge acquisition firmware — main entry point.
//!
//! Hexagonal architecture with a single cooperative control loop:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    Adapters (outer ring)                     │
//! │                                                              │
//! │  LoadCellSource      UartConsole        Esp32TimeAdapter     │
//! │  (SampleSource)      (ConsolePort)      (ClockPort)          │
//! │                                                              │
//! │  ──────────────── Port Trait Boundary ───────────────        │
//! │                                                              │
//! │  ┌────────────────────────────────────────────────────┐      │
//! │  │           SessionService (pure logic)              │      │
//! │  │  FSM · intake · calibration · telemetry            │      │
//! │  └────────────────────────────────────────────────────┘      │
//! └──────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

// ── Module declarations ───────────────────────────────────────
pub mod app;
pub mod calibration;
pub mod config;
pub mod error;
pub mod intake;
pub mod session;
pub mod telemetry;

pub mod adapters;
pub mod drivers;
mod pins;

// ── Imports ───────────────────────────────────────────────────
use std::thread;
use std::time::Duration;

use anyhow::Result;
use log::{error, info};

use adapters::console::UartConsole;
use adapters::loadcell::LoadCellSource;
use adapters::time::Esp32TimeAdapter;
use app::ports::{ConsolePort, SampleSource};
use app::service::SessionService;
use config::SystemConfig;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("strainlog v{} booting", env!("CARGO_PKG_VERSION"));

    let config = SystemConfig::default();
    let clock = Esp32TimeAdapter::new();

    // ── 2. Console ────────────────────────────────────────────
    let mut console = match UartConsole::new(pins::CONSOLE_BAUD) {
        Ok(c) => c,
        Err(e) => {
            // No console, no product. Log to the boot UART and park.
            error!("console init failed: {e} — halting");
            halt_forever(&config);
        }
    };

    // ── 3. Load cell ADC ──────────────────────────────────────
    let peripherals = esp_idf_hal::peripherals::Peripherals::take()?;
    let i2c_cfg = esp_idf_hal::i2c::config::Config::new().baudrate(pins::I2C_FREQ_HZ.into());
    let i2c = esp_idf_hal::i2c::I2cDriver::new(
        peripherals.i2c0,
        peripherals.pins.gpio8, // SDA
        peripherals.pins.gpio9, // SCL
        &i2c_cfg,
    )?;
    let mut adc = LoadCellSource::new(i2c, esp_idf_hal::delay::Delay::new_default());

    if let Err(e) = adc
        .configure(config.adc_gain, config.adc_rate)
        .and_then(|()| adc.calibrate())
    {
        // No recovery path short of a hardware reset: report once over
        // the wire, once to the log, then go quiet.
        console.write_line(telemetry::ERR_ADC_MISSING);
        error!("load cell init failed: {e} — halting");
        halt_forever(&config);
    }

    // ── 4. Control loop ───────────────────────────────────────
    let mut service = SessionService::new(config);
    service.start();
    info!("system ready, entering control loop");

    loop {
        service.tick(&mut adc, &mut console, &clock);
        thread::sleep(Duration::from_millis(u64::from(service.idle_hint_ms())));
    }
}

/// Bounded-idle parking loop for unrecoverable boot failures.
fn halt_forever(config: &SystemConfig) -> ! {
    loop {
        thread::sleep(Duration::from_millis(u64::from(config.idle_backoff_ms)));
    }
}
