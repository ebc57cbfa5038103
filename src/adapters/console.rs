//! Serial console adapter — [`ConsolePort`] over UART0.
//!
//! Line framing: input terminates on `\n` with a trailing `\r` stripped,
//! so both LF and CRLF terminals work; output lines go out with CRLF.
//! Input beyond [`INPUT_LINE_CAP`](crate::session::context::INPUT_LINE_CAP)
//! bytes is truncated with a warning.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: UART0 via the IDF driver, zero-timeout reads.
//! On host/test: an in-memory queue with `sim_push_line` for injection.

use crate::app::ports::ConsolePort;
use crate::session::context::InputLine;

// ───────────────────────────────────────────────────────────────
// ESP-IDF implementation
// ───────────────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
pub struct UartConsole {
    line: InputLine,
    overflowed: bool,
}

#[cfg(target_os = "espidf")]
impl UartConsole {
    const PORT: esp_idf_svc::sys::uart_port_t = esp_idf_svc::sys::uart_port_t_UART_NUM_0;
    const RX_BUF_BYTES: i32 = 1024;

    /// Install the UART driver. Call once at boot, before the loop.
    pub fn new(baud_rate: u32) -> crate::error::Result<Self> {
        use esp_idf_svc::sys::*;

        let cfg = uart_config_t {
            baud_rate: baud_rate as i32,
            data_bits: uart_word_length_t_UART_DATA_8_BITS,
            parity: uart_parity_t_UART_PARITY_DISABLE,
            stop_bits: uart_stop_bits_t_UART_STOP_BITS_1,
            flow_ctrl: uart_hw_flowcontrol_t_UART_HW_FLOWCTRL_DISABLE,
            ..Default::default()
        };

        // SAFETY: one-shot driver install from the single-threaded boot
        // path; no other code touches UART0 afterwards.
        let rc = unsafe { uart_param_config(Self::PORT, &cfg) };
        if rc != ESP_OK as i32 {
            return Err(crate::error::Error::Init("uart param config"));
        }
        let rc = unsafe {
            uart_driver_install(Self::PORT, Self::RX_BUF_BYTES, 0, 0, core::ptr::null_mut(), 0)
        };
        if rc != ESP_OK as i32 {
            return Err(crate::error::Error::Init("uart driver install"));
        }

        Ok(Self {
            line: InputLine::new(),
            overflowed: false,
        })
    }

    fn write_bytes(&self, data: &[u8]) {
        // SAFETY: the driver copies out of `data` before returning.
        unsafe {
            esp_idf_svc::sys::uart_write_bytes(Self::PORT, data.as_ptr().cast(), data.len());
        }
    }
}

#[cfg(target_os = "espidf")]
impl ConsolePort for UartConsole {
    fn write_line(&mut self, line: &str) {
        self.write_bytes(line.as_bytes());
        self.write_bytes(b"\r\n");
    }

    fn poll_line(&mut self) -> Option<InputLine> {
        loop {
            let mut byte = 0u8;
            // SAFETY: zero-timeout read of one byte into a local buffer.
            let n = unsafe {
                esp_idf_svc::sys::uart_read_bytes(
                    Self::PORT,
                    (&raw mut byte).cast(),
                    1,
                    0,
                )
            };
            if n <= 0 {
                return None;
            }
            if byte == b'\n' {
                if self.overflowed {
                    log::warn!("console: input line truncated");
                    self.overflowed = false;
                }
                let mut line = core::mem::take(&mut self.line);
                if line.ends_with('\r') {
                    line.pop();
                }
                return Some(line);
            }
            if self.line.push(byte as char).is_err() {
                self.overflowed = true;
            }
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Host simulation
// ───────────────────────────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
#[derive(Default)]
pub struct UartConsole {
    rx: std::collections::VecDeque<InputLine>,
    /// Every line written, for assertions.
    pub tx: Vec<String>,
}

#[cfg(not(target_os = "espidf"))]
impl UartConsole {
    pub fn new(_baud_rate: u32) -> crate::error::Result<Self> {
        Ok(Self::default())
    }

    /// Inject a line as if it had arrived over the wire.
    pub fn sim_push_line(&mut self, line: &str) {
        let mut buf = InputLine::new();
        for c in line.chars().take(buf.capacity()) {
            let _ = buf.push(c);
        }
        self.rx.push_back(buf);
    }
}

#[cfg(not(target_os = "espidf"))]
impl ConsolePort for UartConsole {
    fn write_line(&mut self, line: &str) {
        self.tx.push(line.to_string());
    }

    fn poll_line(&mut self) -> Option<InputLine> {
        self.rx.pop_front()
    }
}
