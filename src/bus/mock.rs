//! Mock register bus for testing

use super::RegisterBus;
use crate::error::{Error, Result};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

/// One recorded bus transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusOp {
    ReadByte(u8),
    WriteByte(u8, u8),
    ReadBlock(u8, usize),
}

/// In-memory register file with scripted reads and fault injection
///
/// Clones share state, so a test can keep one handle for inspection while
/// the sensor session owns the other.
#[derive(Clone)]
pub struct MockBus {
    inner: Arc<Mutex<MockBusInner>>,
}

struct MockBusInner {
    registers: [u8; 256],
    /// Per-register queues consumed by byte reads before falling back to `registers`
    scripted: Vec<VecDeque<u8>>,
    ops: Vec<BusOp>,
    fail_write_register: Option<u8>,
    failing_reads: u32,
    /// Per-register read failure counts
    failing_register_reads: Vec<u32>,
    block_limit: Option<usize>,
}

impl MockBus {
    /// Create a mock bus with all registers zeroed
    pub fn new() -> Self {
        MockBus {
            inner: Arc::new(Mutex::new(MockBusInner {
                registers: [0; 256],
                scripted: vec![VecDeque::new(); 256],
                ops: Vec::new(),
                fail_write_register: None,
                failing_reads: 0,
                failing_register_reads: vec![0; 256],
                block_limit: None,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MockBusInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Set a register's steady-state value
    pub fn set_register(&self, register: u8, value: u8) {
        self.lock().registers[register as usize] = value;
    }

    /// Fill consecutive registers starting at `start`
    pub fn set_registers(&self, start: u8, values: &[u8]) {
        let mut inner = self.lock();
        for (i, value) in values.iter().enumerate() {
            let addr = start as usize + i;
            if addr < 256 {
                inner.registers[addr] = *value;
            }
        }
    }

    /// Queue values returned by successive byte reads of `register`
    pub fn script_reads(&self, register: u8, values: &[u8]) {
        self.lock().scripted[register as usize].extend(values);
    }

    /// Make every write to `register` fail
    pub fn fail_writes_to(&self, register: u8) {
        self.lock().fail_write_register = Some(register);
    }

    /// Make the next `count` reads (byte or block) fail
    pub fn fail_next_reads(&self, count: u32) {
        self.lock().failing_reads = count;
    }

    /// Make the next `count` reads (byte or block) of `register` fail
    pub fn fail_reads_of(&self, register: u8, count: u32) {
        self.lock().failing_register_reads[register as usize] = count;
    }

    /// Truncate block reads to at most `limit` bytes
    pub fn limit_block_reads(&self, limit: usize) {
        self.lock().block_limit = Some(limit);
    }

    /// All transactions issued so far
    pub fn ops(&self) -> Vec<BusOp> {
        self.lock().ops.clone()
    }

    /// Only the writes issued so far, as (register, value) pairs
    pub fn writes(&self) -> Vec<(u8, u8)> {
        self.lock()
            .ops
            .iter()
            .filter_map(|op| match op {
                BusOp::WriteByte(register, value) => Some((*register, *value)),
                _ => None,
            })
            .collect()
    }

    /// Clear the transaction log
    pub fn clear_ops(&self) {
        self.lock().ops.clear();
    }
}

impl MockBusInner {
    fn take_read_failure(&mut self, register: u8) -> Result<()> {
        if self.failing_reads > 0 {
            self.failing_reads -= 1;
            return Err(Error::Bus {
                register,
                message: "injected read failure".to_string(),
            });
        }
        let remaining = &mut self.failing_register_reads[register as usize];
        if *remaining > 0 {
            *remaining -= 1;
            return Err(Error::Bus {
                register,
                message: "injected read failure".to_string(),
            });
        }
        Ok(())
    }
}

impl RegisterBus for MockBus {
    fn read_byte(&mut self, register: u8) -> Result<u8> {
        let mut inner = self.lock();
        inner.ops.push(BusOp::ReadByte(register));
        inner.take_read_failure(register)?;

        let value = match inner.scripted[register as usize].pop_front() {
            Some(v) => v,
            None => inner.registers[register as usize],
        };
        Ok(value)
    }

    fn write_byte(&mut self, register: u8, value: u8) -> Result<()> {
        let mut inner = self.lock();
        inner.ops.push(BusOp::WriteByte(register, value));
        if inner.fail_write_register == Some(register) {
            return Err(Error::Bus {
                register,
                message: "injected write failure".to_string(),
            });
        }
        inner.registers[register as usize] = value;
        Ok(())
    }

    fn read_block(&mut self, register: u8, buffer: &mut [u8]) -> Result<usize> {
        let mut inner = self.lock();
        inner.ops.push(BusOp::ReadBlock(register, buffer.len()));
        inner.take_read_failure(register)?;

        let mut n = buffer.len();
        if let Some(limit) = inner.block_limit {
            n = n.min(limit);
        }
        n = n.min(256 - register as usize);

        let start = register as usize;
        buffer[..n].copy_from_slice(&inner.registers[start..start + n]);
        Ok(n)
    }
}

impl Default for MockBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_reads_fall_back_to_register() {
        let mut bus = MockBus::new();
        bus.set_register(0x04, 0x02);
        bus.script_reads(0x04, &[0, 0]);

        assert_eq!(bus.read_byte(0x04).unwrap(), 0);
        assert_eq!(bus.read_byte(0x04).unwrap(), 0);
        assert_eq!(bus.read_byte(0x04).unwrap(), 0x02);
    }

    #[test]
    fn test_block_read_and_log() {
        let mut bus = MockBus::new();
        bus.set_registers(0x80, &[1, 2, 3, 4]);

        let mut buf = [0u8; 4];
        assert_eq!(bus.read_block(0x80, &mut buf).unwrap(), 4);
        assert_eq!(buf, [1, 2, 3, 4]);

        bus.write_byte(0x05, 0x06).unwrap();
        assert_eq!(
            bus.ops(),
            vec![BusOp::ReadBlock(0x80, 4), BusOp::WriteByte(0x05, 0x06)]
        );
        assert_eq!(bus.writes(), vec![(0x05, 0x06)]);
    }

    #[test]
    fn test_fault_injection() {
        let mut bus = MockBus::new();
        bus.fail_writes_to(0x02);
        bus.fail_next_reads(1);

        assert!(bus.write_byte(0x01, 0x3F).is_ok());
        assert!(bus.write_byte(0x02, 0x00).is_err());
        assert!(bus.read_byte(0x04).is_err());
        assert!(bus.read_byte(0x04).is_ok());
    }

    #[test]
    fn test_register_fault_injection() {
        let mut bus = MockBus::new();
        bus.fail_reads_of(0x0E, 1);

        assert!(bus.read_byte(0x0F).is_ok());
        assert!(bus.read_byte(0x0E).is_err());
        assert!(bus.read_byte(0x0E).is_ok());
    }

    #[test]
    fn test_block_limit() {
        let mut bus = MockBus::new();
        bus.limit_block_reads(16);
        let mut buf = [0u8; 32];
        assert_eq!(bus.read_block(0x80, &mut buf).unwrap(), 16);
    }
}
