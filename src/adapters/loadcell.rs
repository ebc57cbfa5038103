//! Load cell sample source — [`SampleSource`] over the NAU7802 driver.
//!
//! Maps driver-level failures onto the firmware's [`SensorError`]
//! taxonomy. A failed ready-poll mid-run is logged and reported as "no
//! sample"; the run simply continues with the next conversion.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use log::warn;

use crate::app::ports::SampleSource;
use crate::config::{AdcGain, AdcRate};
use crate::drivers::nau7802::{Nau7802, Nau7802Error};
use crate::error::SensorError;

pub struct LoadCellSource<I2C, D> {
    adc: Nau7802<I2C>,
    delay: D,
}

impl<I2C: I2c, D: DelayNs> LoadCellSource<I2C, D> {
    pub fn new(i2c: I2C, delay: D) -> Self {
        Self {
            adc: Nau7802::new(i2c),
            delay,
        }
    }
}

impl<I2C: I2c, D: DelayNs> SampleSource for LoadCellSource<I2C, D> {
    fn configure(&mut self, gain: AdcGain, rate: AdcRate) -> Result<(), SensorError> {
        self.adc.begin(&mut self.delay).map_err(|e| match e {
            Nau7802Error::NotDetected | Nau7802Error::PowerUpTimeout => SensorError::NotDetected,
            _ => SensorError::BusFault,
        })?;
        self.adc.set_gain(gain).map_err(|_| SensorError::BusFault)?;
        self.adc.set_rate(rate).map_err(|_| SensorError::BusFault)
    }

    fn calibrate(&mut self) -> Result<(), SensorError> {
        self.adc
            .calibrate_internal(&mut self.delay)
            .map_err(|e| match e {
                Nau7802Error::Bus(_) => SensorError::BusFault,
                _ => SensorError::CalibrationFailed,
            })
    }

    fn sample_ready(&mut self) -> bool {
        match self.adc.conversion_ready() {
            Ok(ready) => ready,
            Err(_) => {
                warn!("load cell: ready poll failed");
                false
            }
        }
    }

    fn read_raw(&mut self) -> Result<i32, SensorError> {
        self.adc.read_conversion().map_err(|_| SensorError::BusFault)
    }
}
