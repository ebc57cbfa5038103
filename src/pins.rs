//! Peripheral assignments for the acquisition board.
//!
//! Single source of truth — the entry point references this module
//! rather than hard-coding bus parameters.
//!
//! Pin routing (ESP32-S3 DevKit): NAU7802 on I2C0 with SDA = GPIO8,
//! SCL = GPIO9; console on UART0 through the on-board USB bridge.

/// I2C bus speed (Hz). The NAU7802 tops out at 400 kHz.
pub const I2C_FREQ_HZ: u32 = 400_000;

/// Console baud rate — matched by the plotting script on the host.
pub const CONSOLE_BAUD: u32 = 115_200;
