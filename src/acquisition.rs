//! Acquisition loop: poll → read → encode → send
//!
//! Single-threaded. The loop owns the sensor session and the frame sink
//! until [`AcquisitionLoop::into_parts`] hands them back for shutdown.
//!
//! # Termination
//!
//! | Cause | Result |
//! |-------|--------|
//! | Running flag cleared (Ctrl-C) | `Ok(LoopSummary)` |
//! | Sink error (send failed) | `Err`, no further frames attempted |
//! | Bus error persisting through `max_bus_retries` retries | `Err` with the last bus error |
//!
//! A successful poll or frame resets the bus error count.

use crate::bus::RegisterBus;
use crate::error::Result;
use crate::sensor::SensorSession;
use crate::streaming::{FrameSink, encode};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

/// Loop pacing and fault tolerance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopOptions {
    /// Sleep after a poll that finds no frame, and before retrying a bus error
    pub poll_interval: Duration,
    /// Retries after a bus error before the loop gives up (0: first error is fatal)
    pub max_bus_retries: u32,
    /// Log a throughput line every N frames (0 disables)
    pub stats_interval: u64,
}

impl Default for LoopOptions {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(10),
            max_bus_retries: 3,
            stats_interval: 100,
        }
    }
}

/// Counters for one run
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LoopSummary {
    /// Frames successfully handed to the sink
    pub frames_sent: u64,
    /// Status register polls
    pub polls: u64,
    /// Bus errors absorbed or returned
    pub bus_errors: u64,
    pub elapsed: Duration,
}

impl LoopSummary {
    /// Average frame rate over the run
    pub fn frames_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.frames_sent as f64 / secs
        } else {
            0.0
        }
    }
}

pub struct AcquisitionLoop<B: RegisterBus, S: FrameSink> {
    session: SensorSession<B>,
    sink: S,
    options: LoopOptions,
    running: Arc<AtomicBool>,
    /// Sequence number of the next frame; advances only after a successful send
    sequence: u64,
    polls: u64,
    bus_errors: u64,
    started: Instant,
}

impl<B: RegisterBus, S: FrameSink> AcquisitionLoop<B, S> {
    pub fn new(session: SensorSession<B>, sink: S, options: LoopOptions) -> Self {
        Self {
            session,
            sink,
            options,
            running: Arc::new(AtomicBool::new(true)),
            sequence: 0,
            polls: 0,
            bus_errors: 0,
            started: Instant::now(),
        }
    }

    /// Use an externally owned running flag (e.g., set by a signal handler)
    pub fn with_running_flag(mut self, running: Arc<AtomicBool>) -> Self {
        self.running = running;
        self
    }

    /// Handle to the running flag; store `false` to stop after the current iteration
    pub fn running_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    /// Run until stopped or a fatal error
    pub fn run(&mut self) -> Result<LoopSummary> {
        self.started = Instant::now();
        let mut consecutive_bus_errors = 0u32;
        let mut window_start = Instant::now();

        log::info!(
            "Acquisition started (poll every {:?}, bus retries {})",
            self.options.poll_interval,
            self.options.max_bus_retries
        );

        while self.running.load(Ordering::Relaxed) {
            match self.step() {
                Ok(true) => {
                    consecutive_bus_errors = 0;
                    let interval = self.options.stats_interval;
                    if interval > 0 && self.sequence % interval == 0 {
                        let secs = window_start.elapsed().as_secs_f64();
                        let rate = if secs > 0.0 { interval as f64 / secs } else { 0.0 };
                        log::info!(
                            "{} frames sent ({:.1} fps, {} bus errors)",
                            self.sequence,
                            rate,
                            self.bus_errors
                        );
                        window_start = Instant::now();
                    }
                }
                Ok(false) => {
                    consecutive_bus_errors = 0;
                    self.sleep();
                }
                Err(e) if e.is_bus_error() => {
                    self.bus_errors += 1;
                    consecutive_bus_errors += 1;
                    if consecutive_bus_errors > self.options.max_bus_retries {
                        log::error!(
                            "Giving up after {} consecutive bus errors: {}",
                            consecutive_bus_errors,
                            e
                        );
                        return Err(e);
                    }
                    log::warn!(
                        "Bus error, retry {}/{}: {}",
                        consecutive_bus_errors,
                        self.options.max_bus_retries,
                        e
                    );
                    self.sleep();
                }
                Err(e) => {
                    log::error!("Frame {} not sent: {}", self.sequence, e);
                    return Err(e);
                }
            }
        }

        let summary = self.summary();
        log::info!(
            "Acquisition stopped: {} frames in {:.1}s",
            summary.frames_sent,
            summary.elapsed.as_secs_f64()
        );
        Ok(summary)
    }

    /// One iteration; `Ok(true)` when a frame was sent
    fn step(&mut self) -> Result<bool> {
        self.polls += 1;
        if !self.session.poll_ready()? {
            return Ok(false);
        }

        let reading = self.session.read_frame(self.sequence)?;
        let frame = encode(&reading);
        self.sink.send_frame(&frame)?;

        log::debug!(
            "Frame {} sent ({} bytes, thermistor {:.2} °C)",
            reading.sequence_number,
            frame.len() + 1,
            reading.thermistor_celsius()
        );
        self.sequence += 1;
        Ok(true)
    }

    fn sleep(&self) {
        if !self.options.poll_interval.is_zero() {
            thread::sleep(self.options.poll_interval);
        }
    }

    /// Counters so far
    pub fn summary(&self) -> LoopSummary {
        LoopSummary {
            frames_sent: self.sequence,
            polls: self.polls,
            bus_errors: self.bus_errors,
            elapsed: self.started.elapsed(),
        }
    }

    /// Release the session and sink for shutdown
    pub fn into_parts(self) -> (SensorSession<B>, S) {
        (self.session, self.sink)
    }
}
