//! Frame encoding and UDP broadcast

pub mod udp_broadcaster;
pub mod wire;

pub use udp_broadcaster::UdpBroadcaster;
pub use wire::{MAX_FRAME_LEN, WireFrame, encode};

use crate::config::MIN_PORT;
use crate::error::{Error, Result};
use std::fmt;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};

/// Destination for broadcast datagrams, fixed at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkTarget {
    address: Ipv4Addr,
    port: u16,
}

impl NetworkTarget {
    /// Create a target, rejecting privileged ports
    pub fn new(address: Ipv4Addr, port: u16) -> Result<Self> {
        if port < MIN_PORT {
            return Err(Error::InvalidParameter(format!(
                "port {} is below {}",
                port, MIN_PORT
            )));
        }
        Ok(Self { address, port })
    }

    pub fn address(&self) -> Ipv4Addr {
        self.address
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::V4(SocketAddrV4::new(self.address, self.port))
    }
}

impl fmt::Display for NetworkTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.address, self.port)
    }
}

/// Destination for encoded frames
///
/// The acquisition loop only sees this trait, so tests can capture frames or
/// inject send failures without a socket.
pub trait FrameSink {
    /// Transmit one frame; any error is fatal to the loop
    fn send_frame(&mut self, frame: &WireFrame) -> Result<()>;
}

impl<S: FrameSink + ?Sized> FrameSink for Box<S> {
    fn send_frame(&mut self, frame: &WireFrame) -> Result<()> {
        (**self).send_frame(frame)
    }
}
