//! ThermalBridge - AMG8833 thermal sensor to UDP broadcast bridge
//!
//! Polls an 8×8 AMG8833 thermopile array over I²C and broadcasts every
//! frame as a two-line text datagram to a fixed subnet address.
//!
//! ```text
//! RegisterBus ──▶ SensorSession ──▶ encode ──▶ FrameSink (UdpBroadcaster)
//!                       ▲                            │
//!                       └──── AcquisitionLoop ───────┘
//! ```

pub mod acquisition;
pub mod bus;
pub mod cli;
pub mod config;
pub mod error;
pub mod sensor;
pub mod streaming;
pub mod types;

// Re-export commonly used types
pub use acquisition::{AcquisitionLoop, LoopOptions, LoopSummary};
pub use config::Config;
pub use error::{Error, Result};
pub use sensor::{SensorSession, SensorState};
pub use streaming::{FrameSink, NetworkTarget, UdpBroadcaster, WireFrame};
pub use types::{PixelGrid, SensorReading};
