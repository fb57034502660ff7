//! AMG8833 register value codec
//!
//! Pixel registers hold 12-bit two's-complement values (0.25 °C/LSB) in a
//! little-endian register pair. The thermistor pair holds a 12-bit
//! sign-magnitude value (0.0625 °C/LSB) where bit 11 is the sign.

/// Pixel resolution in °C per LSB
pub const PIXEL_RESOLUTION: f32 = 0.25;

/// Thermistor resolution in °C per LSB
pub const THERMISTOR_RESOLUTION: f64 = 0.0625;

const PIXEL_SIGN_BIT: u16 = 0x0800;
const TWELVE_BIT_MASK: u16 = 0x0FFF;
const THERMISTOR_SIGN_BIT: u8 = 0x08;
const THERMISTOR_HIGH_MASK: u8 = 0x07;

/// Decode a pixel register pair into a signed 12-bit code
///
/// Bits 12-15 of the word are ignored. Any byte pair is valid input.
#[inline]
pub fn decode_pixel(high: u8, low: u8) -> i16 {
    let word = u16::from_le_bytes([low, high]) & TWELVE_BIT_MASK;
    if word & PIXEL_SIGN_BIT != 0 {
        word as i16 - 0x1000
    } else {
        word as i16
    }
}

/// Encode a 12-bit code back into its register pair `(high, low)`
///
/// Codes outside [-2048, 2047] are truncated to 12 bits.
#[inline]
pub fn encode_pixel(code: i16) -> (u8, u8) {
    let word = (code as u16) & TWELVE_BIT_MASK;
    let [low, high] = word.to_le_bytes();
    (high, low)
}

/// Decode the thermistor register pair into a signed code
#[inline]
pub fn decode_thermistor(high: u8, low: u8) -> i16 {
    let magnitude = low as i16 + (((high & THERMISTOR_HIGH_MASK) as i16) << 8);
    if high & THERMISTOR_SIGN_BIT != 0 {
        -magnitude
    } else {
        magnitude
    }
}

/// Pixel code in °C
#[inline]
pub fn pixel_celsius(code: i16) -> f32 {
    code as f32 * PIXEL_RESOLUTION
}

/// Thermistor code in °C
#[inline]
pub fn thermistor_celsius(code: i16) -> f64 {
    code as f64 * THERMISTOR_RESOLUTION
}
