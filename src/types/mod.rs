//! Sensor data types

pub mod pixels;
pub mod reading;

pub use pixels::PixelGrid;
pub use reading::SensorReading;
