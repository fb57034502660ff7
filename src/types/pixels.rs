//! 8×8 thermal pixel grid

use crate::sensor::codec::{decode_pixel, encode_pixel, pixel_celsius};
use crate::sensor::registers::{HEIGHT, PIXEL_BYTES, PIXEL_COUNT, WIDTH};

/// One thermal image in raw register order (row-major, row 0 first)
///
/// Each pixel keeps the raw 16-bit register word so the broadcast format can
/// reproduce the exact bytes the sensor returned. Row and column order follow
/// the sensor's physical layout, which is column-mirrored and row-flipped
/// relative to the camera's view; nothing here re-orients it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelGrid {
    words: [u16; PIXEL_COUNT],
}

impl PixelGrid {
    /// Build from the 128 bytes read from the pixel registers (low byte first)
    pub fn from_register_bytes(bytes: &[u8; PIXEL_BYTES]) -> Self {
        let mut words = [0u16; PIXEL_COUNT];
        for (word, pair) in words.iter_mut().zip(bytes.chunks_exact(2)) {
            *word = u16::from_le_bytes([pair[0], pair[1]]);
        }
        Self { words }
    }

    /// Build from decoded 12-bit codes
    pub fn from_codes(codes: &[i16; PIXEL_COUNT]) -> Self {
        let mut words = [0u16; PIXEL_COUNT];
        for (word, &code) in words.iter_mut().zip(codes.iter()) {
            let (high, low) = encode_pixel(code);
            *word = u16::from_le_bytes([low, high]);
        }
        Self { words }
    }

    /// Grid with every pixel set to `code`
    pub fn filled(code: i16) -> Self {
        Self::from_codes(&[code; PIXEL_COUNT])
    }

    /// Grid width in pixels
    pub const fn width(&self) -> usize {
        WIDTH
    }

    /// Grid height in pixels
    pub const fn height(&self) -> usize {
        HEIGHT
    }

    /// Number of pixels (always 64)
    pub const fn len(&self) -> usize {
        PIXEL_COUNT
    }

    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Raw register bytes of pixel `index` as `(high, low)`
    pub fn raw_bytes(&self, index: usize) -> (u8, u8) {
        let [low, high] = self.words[index].to_le_bytes();
        (high, low)
    }

    /// Decoded 12-bit code of pixel `index`
    pub fn code(&self, index: usize) -> i16 {
        let (high, low) = self.raw_bytes(index);
        decode_pixel(high, low)
    }

    /// Decoded code at `(row, col)`
    pub fn code_at(&self, row: usize, col: usize) -> i16 {
        self.code(row * WIDTH + col)
    }

    /// All decoded codes in raster order
    pub fn codes(&self) -> [i16; PIXEL_COUNT] {
        std::array::from_fn(|i| self.code(i))
    }

    /// All pixels in °C in raster order
    pub fn celsius(&self) -> [f32; PIXEL_COUNT] {
        std::array::from_fn(|i| pixel_celsius(self.code(i)))
    }

    /// Iterate raw `(high, low)` register bytes in raster order
    pub fn iter_raw(&self) -> impl Iterator<Item = (u8, u8)> + '_ {
        (0..PIXEL_COUNT).map(|i| self.raw_bytes(i))
    }
}
