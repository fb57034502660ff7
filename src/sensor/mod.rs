//! AMG8833 thermal sensor controller
//!
//! Owns the register bus for the lifetime of the process. Bring-up runs once
//! in [`SensorSession::initialize`]; after that the session alternates
//! between waiting for the status flag and reading a frame.
//!
//! # Session State Machine
//!
//! ```text
//! ┌───────────────┐   initialize   ┌─────────────┐
//! │ Uninitialized │ ─────────────▶ │ Configuring │
//! └───────────────┘                └──────┬──────┘
//!                                         │ sequence complete
//!                                         ▼
//!                  poll_ready = true ┌──────────┐
//!              ┌──────────────────── │   Idle   │ ◀─┐ poll_ready = false
//!              ▼                     └──────────┘ ──┘
//!     ┌────────────────┐  read_frame      ▲
//!     │ FrameAvailable │ ─────────────────┘
//!     └────────────────┘
//!                    close (from any state) ─▶ Closed
//! ```
//!
//! # Bring-up Timing
//!
//! The datasheet requires at least 50 ms after entering normal mode before
//! the initial reset, and two frame periods after the initial reset before
//! the output registers are valid. Both waits come from [`SensorTiming`] so
//! tests can run them at zero.

pub mod codec;
pub mod registers;

use crate::bus::RegisterBus;
use crate::error::{Error, Result};
use crate::types::{PixelGrid, SensorReading};
use chrono::Local;
use registers::*;
use serde::{Deserialize, Serialize};
use std::thread;
use std::time::Duration;

/// Sensor internal frame rate
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameRate {
    /// 10 frames per second
    #[default]
    Fps10,
    /// 1 frame per second
    Fps1,
}

impl FrameRate {
    /// Value written to the frame rate register
    pub fn register_value(self) -> u8 {
        match self {
            FrameRate::Fps10 => FPS_10,
            FrameRate::Fps1 => FPS_1,
        }
    }

    /// Time between sensor frames
    pub fn period(self) -> Duration {
        match self {
            FrameRate::Fps10 => Duration::from_millis(100),
            FrameRate::Fps1 => Duration::from_secs(1),
        }
    }
}

/// Delays used during bring-up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorTiming {
    /// Wait after switching to normal power mode
    pub power_up: Duration,
    /// Wait after the initial reset
    pub reset_settle: Duration,
}

impl SensorTiming {
    /// All delays zero, for tests against a mock bus
    pub const fn immediate() -> Self {
        Self {
            power_up: Duration::ZERO,
            reset_settle: Duration::ZERO,
        }
    }
}

impl Default for SensorTiming {
    fn default() -> Self {
        Self {
            power_up: Duration::from_millis(50),
            reset_settle: Duration::from_millis(200),
        }
    }
}

/// Bring-up options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorOptions {
    pub frame_rate: FrameRate,
    /// Enable the twice-moving-average output filter
    pub moving_average: bool,
    pub timing: SensorTiming,
}

impl Default for SensorOptions {
    fn default() -> Self {
        Self {
            frame_rate: FrameRate::default(),
            moving_average: true,
            timing: SensorTiming::default(),
        }
    }
}

/// Session lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorState {
    Uninitialized,
    Configuring,
    /// Waiting for the status flag
    Idle,
    /// Status flag observed, frame not yet read
    FrameAvailable,
    Closed,
}

/// Configured sensor bound to its bus
pub struct SensorSession<B: RegisterBus> {
    bus: B,
    state: SensorState,
    frames_read: u64,
}

impl<B: RegisterBus> SensorSession<B> {
    /// Run the bring-up sequence and return a ready session
    ///
    /// The first failed bus write aborts the sequence; no partially
    /// configured session is ever returned.
    pub fn initialize(bus: B, options: &SensorOptions) -> Result<Self> {
        let mut session = Self {
            bus,
            state: SensorState::Uninitialized,
            frames_read: 0,
        };
        session.state = SensorState::Configuring;
        log::info!("Initializing AMG8833 ({:?})...", options.frame_rate);

        // Normal power mode, then wait for the analog front end
        session.configure("power control", REG_POWER_CONTROL, POWER_NORMAL)?;
        sleep(options.timing.power_up);

        // Initial reset reloads adjustment values; output is invalid for two frames
        session.configure("initial reset", REG_RESET, RESET_INITIAL)?;
        sleep(options.timing.reset_settle);
        session.configure("flag reset", REG_RESET, RESET_FLAG)?;

        session.configure(
            "frame rate",
            REG_FRAME_RATE,
            options.frame_rate.register_value(),
        )?;
        session.configure(
            "interrupt control",
            REG_INTERRUPT_CONTROL,
            INTERRUPT_ABSOLUTE_ENABLED,
        )?;

        // Moving-average mode sits behind an unlock sequence on 0x1F
        for value in AVERAGE_UNLOCK_SEQUENCE {
            session.configure("average unlock", REG_AVERAGE_UNLOCK, value)?;
        }
        let average = if options.moving_average {
            AVERAGE_MOVING_ON
        } else {
            AVERAGE_MOVING_OFF
        };
        session.configure("average mode", REG_AVERAGE, average)?;
        session.configure("average lock", REG_AVERAGE_UNLOCK, AVERAGE_LOCK)?;

        session.state = SensorState::Idle;
        log::info!(
            "AMG8833 configured (moving average {})",
            if options.moving_average { "on" } else { "off" }
        );
        Ok(session)
    }

    fn configure(&mut self, step: &str, register: u8, value: u8) -> Result<()> {
        log::debug!("{}: {:#04x} <- {:#04x}", step, register, value);
        self.bus
            .write_byte(register, value)
            .map_err(|e| Error::Initialization(format!("{} failed: {}", step, e)))
    }

    /// Check the status register for a new frame
    ///
    /// Read-only on the bus. The caller owns the back-off between polls.
    pub fn poll_ready(&mut self) -> Result<bool> {
        let status = self.bus.read_byte(REG_STATUS)?;
        if status != 0 {
            log::trace!("Status {:#04x}: frame available", status);
            self.state = SensorState::FrameAvailable;
            Ok(true)
        } else {
            self.state = SensorState::Idle;
            Ok(false)
        }
    }

    /// Read the pixel and thermistor registers and acknowledge the frame
    ///
    /// Only meaningful right after [`Self::poll_ready`] returned true;
    /// otherwise the registers may hold the previous frame.
    pub fn read_frame(&mut self, sequence_number: u64) -> Result<SensorReading> {
        if self.state != SensorState::FrameAvailable {
            log::debug!("read_frame without a ready flag (state {:?})", self.state);
        }

        let mut raw = [0u8; PIXEL_BYTES];
        let blocks = raw.chunks_exact_mut(PIXEL_BLOCK_LEN).zip(REG_PIXEL_BLOCKS);
        for (chunk, register) in blocks {
            let n = self.bus.read_block(register, chunk)?;
            if n != PIXEL_BLOCK_LEN {
                return Err(Error::ShortRead {
                    register,
                    expected: PIXEL_BLOCK_LEN,
                    actual: n,
                });
            }
        }

        let high = self.bus.read_byte(REG_THERMISTOR_HIGH)?;
        let low = self.bus.read_byte(REG_THERMISTOR_LOW)?;

        // Acknowledge only once every register is in hand, so a failed read
        // leaves the flag set and the retry picks up the same frame
        self.bus.write_byte(REG_STATUS_CLEAR, STATUS_CLEAR_ALL)?;

        let reading = SensorReading {
            sequence_number,
            captured_at: Local::now().naive_local(),
            reference_temperature: codec::decode_thermistor(high, low),
            pixels: PixelGrid::from_register_bytes(&raw),
        };

        self.state = SensorState::Idle;
        self.frames_read += 1;
        Ok(reading)
    }

    /// Current lifecycle state
    pub fn state(&self) -> SensorState {
        self.state
    }

    /// Frames read since initialization
    pub fn frames_read(&self) -> u64 {
        self.frames_read
    }

    /// Release the bus
    pub fn close(mut self) {
        self.state = SensorState::Closed;
        log::info!(
            "Sensor session closed after {} frames ({:?})",
            self.frames_read,
            self.state
        );
    }
}

fn sleep(duration: Duration) {
    if !duration.is_zero() {
        thread::sleep(duration);
    }
}
