//! Acquisition pipeline tests
//!
//! Drives the full poll → read → encode → send cycle against the mock bus,
//! without I²C hardware.
//!
//! Run with: `cargo test --test acquisition`

use std::io;
use std::net::{Ipv4Addr, UdpSocket};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use thermal_bridge::bus::{BusOp, MockBus};
use thermal_bridge::sensor::registers::{
    REG_PIXEL_BLOCKS, REG_STATUS, REG_THERMISTOR_HIGH, REG_THERMISTOR_LOW,
};
use thermal_bridge::sensor::{SensorOptions, SensorTiming};
use thermal_bridge::streaming::FrameSink;
use thermal_bridge::{
    AcquisitionLoop, Error, LoopOptions, NetworkTarget, Result, SensorSession, UdpBroadcaster,
    WireFrame,
};

// ============================================================================
// Helpers
// ============================================================================

/// Sink that fails on a given attempt and stops the loop after `stop_after` frames
struct ScriptedSink {
    attempts: usize,
    fail_on: Option<usize>,
    stop_after: usize,
    running: Arc<AtomicBool>,
    frames: Vec<WireFrame>,
}

impl ScriptedSink {
    fn new(running: &Arc<AtomicBool>, stop_after: usize, fail_on: Option<usize>) -> Self {
        Self {
            attempts: 0,
            fail_on,
            stop_after,
            running: Arc::clone(running),
            frames: Vec::new(),
        }
    }
}

impl FrameSink for ScriptedSink {
    fn send_frame(&mut self, frame: &WireFrame) -> Result<()> {
        self.attempts += 1;
        if self.fail_on == Some(self.attempts) {
            return Err(Error::SendFailed(io::Error::new(
                io::ErrorKind::NetworkUnreachable,
                "network is unreachable",
            )));
        }
        self.frames.push(frame.clone());
        if self.frames.len() >= self.stop_after {
            self.running.store(false, Ordering::Relaxed);
        }
        Ok(())
    }
}

/// Clears the running flag when dropped, including during a panic unwind
struct StopOnDrop(Arc<AtomicBool>);

impl Drop for StopOnDrop {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Relaxed);
    }
}

fn loop_options() -> LoopOptions {
    LoopOptions {
        poll_interval: Duration::ZERO,
        max_bus_retries: 3,
        stats_interval: 2,
    }
}

fn open_session(bus: &MockBus) -> SensorSession<MockBus> {
    let options = SensorOptions {
        timing: SensorTiming::immediate(),
        ..Default::default()
    };
    SensorSession::initialize(bus.clone(), &options).unwrap()
}

/// Mock bus holding a 25 °C thermistor and a warm pixel in the top-left corner
fn warm_bus() -> MockBus {
    let bus = MockBus::new();
    bus.set_register(REG_STATUS, 0x02);
    bus.set_register(REG_THERMISTOR_HIGH, 0x01);
    bus.set_register(REG_THERMISTOR_LOW, 0x90);
    // Pixel 0: 0x0090 = 144 → 36 °C
    bus.set_registers(REG_PIXEL_BLOCKS[0], &[0x90, 0x00]);
    bus
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn test_send_failure_on_third_frame_stops_loop() {
    let bus = warm_bus();
    let running = Arc::new(AtomicBool::new(true));
    let sink = ScriptedSink::new(&running, 10, Some(3));

    let mut acquisition =
        AcquisitionLoop::new(open_session(&bus), sink, loop_options()).with_running_flag(running);
    let err = acquisition.run().unwrap_err();
    assert!(matches!(err, Error::SendFailed(_)));
    assert_eq!(err.exit_code(), 1);
    assert_eq!(acquisition.summary().frames_sent, 2);

    let (_, sink) = acquisition.into_parts();
    assert_eq!(sink.attempts, 3);
    assert_eq!(sink.frames.len(), 2);

    // No fourth frame was read from the sensor
    let frame_reads = bus
        .ops()
        .iter()
        .filter(|op| **op == BusOp::ReadBlock(REG_PIXEL_BLOCKS[0], 32))
        .count();
    assert_eq!(frame_reads, 3);
}

#[test]
fn test_sequence_numbers_follow_successful_sends() {
    let bus = warm_bus();
    let running = Arc::new(AtomicBool::new(true));
    let sink = ScriptedSink::new(&running, 4, None);

    let mut acquisition =
        AcquisitionLoop::new(open_session(&bus), sink, loop_options()).with_running_flag(running);
    let summary = acquisition.run().unwrap();
    assert_eq!(summary.frames_sent, 4);

    let (session, sink) = acquisition.into_parts();
    assert_eq!(session.frames_read(), 4);
    for (seq, frame) in sink.frames.iter().enumerate() {
        let text = frame.as_str();
        assert!(text.contains(&format!("; Frame:{};", seq)));
        assert!(text.contains("; Thermistor: 25.00;"));
        assert!(text.contains("ThermalData:\r\n00,90,00,00,"));
    }
    session.close();
}

#[test]
fn test_frame_read_only_after_ready_status() {
    let bus = warm_bus();
    bus.script_reads(REG_STATUS, &[0x00, 0x01, 0x00, 0x00, 0x04, 0x00]);
    let running = Arc::new(AtomicBool::new(true));
    let sink = ScriptedSink::new(&running, 3, None);

    let mut acquisition =
        AcquisitionLoop::new(open_session(&bus), sink, loop_options()).with_running_flag(running);
    bus.clear_ops();
    acquisition.run().unwrap();

    // Status reads return, in order: 0, 1, 0, 0, 4, 0, then 2 from the register
    let ops = bus.ops();
    let statuses = [0x00u8, 0x01, 0x00, 0x00, 0x04, 0x00, 0x02];
    let mut status_index = 0;
    for (i, op) in ops.iter().enumerate() {
        match op {
            BusOp::ReadByte(REG_STATUS) => status_index += 1,
            BusOp::ReadBlock(register, _) if *register == REG_PIXEL_BLOCKS[0] => {
                assert_eq!(ops[i - 1], BusOp::ReadByte(REG_STATUS));
                assert_ne!(statuses[status_index - 1], 0, "frame read after empty status");
            }
            _ => {}
        }
    }
    assert_eq!(status_index, 7);
}

#[test]
fn test_persistent_bus_failure_is_fatal() {
    let bus = warm_bus();
    bus.fail_next_reads(u32::MAX);
    let running = Arc::new(AtomicBool::new(true));
    let sink = ScriptedSink::new(&running, 1, None);

    let mut acquisition =
        AcquisitionLoop::new(open_session(&bus), sink, loop_options()).with_running_flag(running);
    let err = acquisition.run().unwrap_err();
    assert!(err.is_bus_error());
    assert_eq!(err.exit_code(), 1);
    // One failure plus max_bus_retries retries
    assert_eq!(acquisition.summary().bus_errors, 4);
}

#[test]
fn test_end_to_end_udp() {
    let receiver = UdpSocket::bind("127.0.0.1:0").unwrap();
    receiver
        .set_read_timeout(Some(Duration::from_secs(2)))
        .unwrap();
    let port = receiver.local_addr().unwrap().port();

    let bus = warm_bus();
    let session = open_session(&bus);
    let broadcaster =
        UdpBroadcaster::open(NetworkTarget::new(Ipv4Addr::LOCALHOST, port).unwrap()).unwrap();

    let mut acquisition = AcquisitionLoop::new(session, broadcaster, loop_options());
    let running = acquisition.running_flag();

    // Stop from another thread once two datagrams have arrived, or when the
    // listener fails, so the loop never outlives it
    let listener = std::thread::spawn(move || {
        let _stop = StopOnDrop(running);
        let mut datagrams = Vec::new();
        let mut buf = [0u8; 2048];
        while datagrams.len() < 2 {
            let (n, _) = receiver.recv_from(&mut buf).unwrap();
            datagrams.push(buf[..n].to_vec());
        }
        datagrams
    });

    let summary = acquisition.run().unwrap();
    let datagrams = listener.join().unwrap();
    assert!(summary.frames_sent >= 2);

    for (seq, datagram) in datagrams.iter().enumerate() {
        assert_eq!(datagram.last(), Some(&0));
        let text = std::str::from_utf8(&datagram[..datagram.len() - 1]).unwrap();
        assert!(text.starts_with(&format!(
            "Device:AMG8833; Width:8; Height:8; Frame:{}; Thermistor: 25.00; Date:",
            seq
        )));
        assert!(text.ends_with(",\r\n"));
    }

    let (session, broadcaster) = acquisition.into_parts();
    session.close();
    broadcaster.close();
}

#[test]
fn test_failed_listener_stops_loop() {
    let bus = warm_bus();
    let sink = ScriptedSink::new(&Arc::new(AtomicBool::new(true)), usize::MAX, None);
    let mut acquisition = AcquisitionLoop::new(open_session(&bus), sink, loop_options());
    let running = acquisition.running_flag();

    let listener = std::thread::spawn(move || {
        let _stop = StopOnDrop(running);
        panic!("listener failed");
    });

    // Returns only because the unwinding listener cleared the flag
    let summary = acquisition.run().unwrap();
    assert!(listener.join().is_err());
    assert_eq!(summary.bus_errors, 0);
}
