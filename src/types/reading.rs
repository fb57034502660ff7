//! Sensor reading

use super::PixelGrid;
use crate::sensor::codec::thermistor_celsius;
use chrono::NaiveDateTime;

/// One complete sensor frame, stamped at acquisition
#[derive(Debug, Clone, PartialEq)]
pub struct SensorReading {
    /// Frame counter, starting at 0 and incremented per transmitted frame
    pub sequence_number: u64,
    /// Local wall-clock time the frame was read
    pub captured_at: NaiveDateTime,
    /// Thermistor code (0.0625 °C/LSB)
    pub reference_temperature: i16,
    /// Pixel image
    pub pixels: PixelGrid,
}

impl SensorReading {
    /// Thermistor temperature in °C
    pub fn thermistor_celsius(&self) -> f64 {
        thermistor_celsius(self.reference_temperature)
    }
}
