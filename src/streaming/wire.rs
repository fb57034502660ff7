//! Text wire format
//!
//! One frame is two CRLF-terminated ASCII lines:
//!
//! ```text
//! Device:AMG8833; Width:8; Height:8; Frame:42; Thermistor: 25.00; Date:2024/03/07 14:05:09,026; ThermalData:\r\n
//! 00,64,00,64,...,00,64,\r\n
//! ```
//!
//! ## Header
//!
//! - **Frame**: sequence number in decimal
//! - **Thermistor**: °C, width 5, two decimals, right-aligned
//! - **Date**: local capture time, millisecond precision
//!
//! ## Pixel line
//!
//! 64 pixels in raw register order (row 0 first, not re-oriented). Each
//! pixel is its raw high byte then its raw low byte, both as two lowercase
//! hex digits followed by a comma.
//!
//! ## Datagram
//!
//! The datagram carries the frame followed by a single NUL byte. Existing
//! receivers treat the payload as a C string and depend on the terminator.

use crate::sensor::registers::{HEIGHT, PIXEL_COUNT, WIDTH};
use crate::types::SensorReading;

/// Longest possible header line: 20-digit sequence, "-127.94" thermistor
const MAX_HEADER_LEN: usize = 128;

/// Pixel line: 64 × "hh,ll," plus CRLF
const PIXEL_LINE_LEN: usize = PIXEL_COUNT * 6 + 2;

/// Upper bound on an encoded frame, excluding the datagram terminator
pub const MAX_FRAME_LEN: usize = MAX_HEADER_LEN + PIXEL_LINE_LEN;

const HEX: &[u8; 16] = b"0123456789abcdef";

/// One encoded frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireFrame {
    text: String,
}

impl WireFrame {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.text.as_bytes()
    }

    /// Encoded length, excluding the terminator
    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Datagram payload (frame plus trailing NUL)
    pub fn datagram(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.len() + 1);
        self.write_datagram(&mut out);
        out
    }

    /// Replace the contents of `out` with the datagram payload
    ///
    /// Reuses the buffer's allocation.
    pub fn write_datagram(&self, out: &mut Vec<u8>) {
        out.clear();
        out.extend_from_slice(self.text.as_bytes());
        out.push(0);
    }
}

/// Encode a reading into its wire frame
pub fn encode(reading: &SensorReading) -> WireFrame {
    let mut text = String::with_capacity(MAX_FRAME_LEN);

    text.push_str(&format!(
        "Device:AMG8833; Width:{}; Height:{}; Frame:{}; Thermistor: {:5.2}; Date:{}; ThermalData:\r\n",
        WIDTH,
        HEIGHT,
        reading.sequence_number,
        reading.thermistor_celsius(),
        reading.captured_at.format("%Y/%m/%d %H:%M:%S,%3f"),
    ));

    for (high, low) in reading.pixels.iter_raw() {
        push_hex(&mut text, high);
        text.push(',');
        push_hex(&mut text, low);
        text.push(',');
    }
    text.push_str("\r\n");

    WireFrame { text }
}

fn push_hex(text: &mut String, byte: u8) {
    text.push(HEX[(byte >> 4) as usize] as char);
    text.push(HEX[(byte & 0x0F) as usize] as char);
}
