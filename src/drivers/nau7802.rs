//! NAU7802 24-bit bridge ADC driver.
//!
//! Register-level driver for the Nuvoton NAU7802, generic over
//! `embedded_hal::i2c::I2c` so it runs against any bus implementation.
//! Covers the subset this device uses: power-up, gain and rate
//! selection, internal offset calibration, data-ready poll, and the
//! 24-bit signed conversion read.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use crate::config::{AdcGain, AdcRate};

/// 7-bit bus address (fixed by the part).
pub const I2C_ADDR: u8 = 0x2A;

// Register map (subset)
const REG_PU_CTRL: u8 = 0x00;
const REG_CTRL1: u8 = 0x01;
const REG_CTRL2: u8 = 0x02;
const REG_ADCO_B2: u8 = 0x12;
const REG_ADC_CTRL: u8 = 0x15;
const REG_POWER: u8 = 0x1C;
const REG_REVISION: u8 = 0x1F;

// PU_CTRL bits
const PU_CTRL_RR: u8 = 1 << 0; // register reset
const PU_CTRL_PUD: u8 = 1 << 1; // power up digital
const PU_CTRL_PUA: u8 = 1 << 2; // power up analog
const PU_CTRL_PUR: u8 = 1 << 3; // power up ready (read-only)
const PU_CTRL_CS: u8 = 1 << 4; // cycle start
const PU_CTRL_CR: u8 = 1 << 5; // cycle ready (read-only)
const PU_CTRL_AVDDS: u8 = 1 << 7; // AVDD sourced from internal LDO

// CTRL2 bits
const CTRL2_CALS: u8 = 1 << 2;
const CTRL2_CAL_ERR: u8 = 1 << 3;

// POWER bits
const POWER_PGA_CAP_EN: u8 = 1 << 7;

/// Disable the ADC chopper clock (datasheet bridge configuration).
const ADC_CTRL_CHP_CLK_OFF: u8 = 0x30;

const POWER_UP_TIMEOUT_MS: u32 = 100;
const CALIBRATION_TIMEOUT_MS: u32 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nau7802Error<E> {
    /// Bus transaction failed.
    Bus(E),
    /// No acknowledge at power-up; the device is absent.
    NotDetected,
    /// The digital domain never reported ready after reset.
    PowerUpTimeout,
    /// The offset calibration never completed.
    CalibrationTimeout,
    /// The device flagged `CAL_ERR` after calibrating.
    CalibrationFailed,
}

pub struct Nau7802<I2C> {
    i2c: I2C,
}

impl<I2C: I2c> Nau7802<I2C> {
    pub fn new(i2c: I2C) -> Self {
        Self { i2c }
    }

    /// Reset the part and power up both domains.
    ///
    /// Fails with [`Nau7802Error::NotDetected`] when the device never
    /// acknowledges its address.
    pub fn begin(&mut self, delay: &mut impl DelayNs) -> Result<(), Nau7802Error<I2C::Error>> {
        // A NACK on the very first transaction means nothing on the bus.
        self.read_register(REG_REVISION)
            .map_err(|_| Nau7802Error::NotDetected)?;

        // Register reset pulse, then bring up the digital domain.
        self.write_register(REG_PU_CTRL, PU_CTRL_RR)?;
        delay.delay_ms(1);
        self.write_register(REG_PU_CTRL, PU_CTRL_PUD)?;

        let mut waited_ms = 0;
        while self.read_register(REG_PU_CTRL)? & PU_CTRL_PUR == 0 {
            if waited_ms >= POWER_UP_TIMEOUT_MS {
                return Err(Nau7802Error::PowerUpTimeout);
            }
            delay.delay_ms(1);
            waited_ms += 1;
        }

        // Analog domain up, AVDD from the internal LDO.
        let pu = self.read_register(REG_PU_CTRL)?;
        self.write_register(REG_PU_CTRL, pu | PU_CTRL_PUA | PU_CTRL_AVDDS)?;
        delay.delay_ms(1);

        // Bridge-mode housekeeping: chopper clock off, PGA bypass cap on.
        self.write_register(REG_ADC_CTRL, ADC_CTRL_CHP_CLK_OFF)?;
        let power = self.read_register(REG_POWER)?;
        self.write_register(REG_POWER, power | POWER_PGA_CAP_EN)?;

        // Start free-running conversions.
        let pu = self.read_register(REG_PU_CTRL)?;
        self.write_register(REG_PU_CTRL, pu | PU_CTRL_CS)
    }

    pub fn set_gain(&mut self, gain: AdcGain) -> Result<(), Nau7802Error<I2C::Error>> {
        let ctrl1 = self.read_register(REG_CTRL1)?;
        self.write_register(REG_CTRL1, (ctrl1 & !0x07) | gain_bits(gain))
    }

    pub fn set_rate(&mut self, rate: AdcRate) -> Result<(), Nau7802Error<I2C::Error>> {
        let ctrl2 = self.read_register(REG_CTRL2)?;
        self.write_register(REG_CTRL2, (ctrl2 & !0x70) | (rate_bits(rate) << 4))
    }

    /// Run the internal offset calibration. Blocks (bounded) until the
    /// device reports completion.
    pub fn calibrate_internal(
        &mut self,
        delay: &mut impl DelayNs,
    ) -> Result<(), Nau7802Error<I2C::Error>> {
        // CALMOD = 00 (internal offset), then pulse CALS.
        let ctrl2 = self.read_register(REG_CTRL2)? & !0x03;
        self.write_register(REG_CTRL2, ctrl2)?;
        self.write_register(REG_CTRL2, ctrl2 | CTRL2_CALS)?;

        let mut waited_ms = 0;
        loop {
            let v = self.read_register(REG_CTRL2)?;
            if v & CTRL2_CALS == 0 {
                return if v & CTRL2_CAL_ERR == 0 {
                    Ok(())
                } else {
                    Err(Nau7802Error::CalibrationFailed)
                };
            }
            if waited_ms >= CALIBRATION_TIMEOUT_MS {
                return Err(Nau7802Error::CalibrationTimeout);
            }
            delay.delay_ms(1);
            waited_ms += 1;
        }
    }

    /// Non-blocking data-ready check (`PU_CTRL.CR`).
    pub fn conversion_ready(&mut self) -> Result<bool, Nau7802Error<I2C::Error>> {
        Ok(self.read_register(REG_PU_CTRL)? & PU_CTRL_CR != 0)
    }

    /// Read the latest 24-bit conversion, sign-extended to `i32`.
    pub fn read_conversion(&mut self) -> Result<i32, Nau7802Error<I2C::Error>> {
        let mut buf = [0u8; 3];
        self.i2c
            .write_read(I2C_ADDR, &[REG_ADCO_B2], &mut buf)
            .map_err(Nau7802Error::Bus)?;
        Ok(sign_extend_24(buf[0], buf[1], buf[2]))
    }

    // -----------------------------------------------------------------------
    // Register access
    // -----------------------------------------------------------------------

    fn read_register(&mut self, reg: u8) -> Result<u8, Nau7802Error<I2C::Error>> {
        let mut buf = [0u8; 1];
        self.i2c
            .write_read(I2C_ADDR, &[reg], &mut buf)
            .map_err(Nau7802Error::Bus)?;
        Ok(buf[0])
    }

    fn write_register(&mut self, reg: u8, value: u8) -> Result<(), Nau7802Error<I2C::Error>> {
        self.i2c.write(I2C_ADDR, &[reg, value]).map_err(Nau7802Error::Bus)
    }
}

/// CTRL1.GAINS encoding: 0b000 = x1 … 0b111 = x128.
fn gain_bits(gain: AdcGain) -> u8 {
    match gain {
        AdcGain::X1 => 0b000,
        AdcGain::X2 => 0b001,
        AdcGain::X4 => 0b010,
        AdcGain::X8 => 0b011,
        AdcGain::X16 => 0b100,
        AdcGain::X32 => 0b101,
        AdcGain::X64 => 0b110,
        AdcGain::X128 => 0b111,
    }
}

/// CTRL2.CRS encoding. 0b111 is the only high-rate entry; the gaps in
/// the map are reserved on the part.
fn rate_bits(rate: AdcRate) -> u8 {
    match rate {
        AdcRate::Sps10 => 0b000,
        AdcRate::Sps20 => 0b001,
        AdcRate::Sps40 => 0b010,
        AdcRate::Sps80 => 0b011,
        AdcRate::Sps320 => 0b111,
    }
}

/// Widen a big-endian 24-bit two's-complement value to `i32`.
fn sign_extend_24(b2: u8, b1: u8, b0: u8) -> i32 {
    let v = (i32::from(b2) << 16) | (i32::from(b1) << 8) | i32::from(b0);
    (v << 8) >> 8
}
