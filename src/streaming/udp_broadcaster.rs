//! UDP broadcaster for encoded thermal frames
//!
//! Sends each frame as a single datagram to a fixed destination, normally
//! the subnet broadcast address. There is no client tracking and no
//! acknowledgement; any listener on the subnet receives every frame.
//!
//! The socket is bound to an ephemeral local port on all interfaces with
//! SO_BROADCAST enabled, so a broadcast destination is accepted by the
//! kernel. A unicast destination works too.

use super::{FrameSink, MAX_FRAME_LEN, NetworkTarget, WireFrame};
use crate::error::{Error, Result};
use std::io;
use std::net::{Ipv4Addr, SocketAddr, UdpSocket};

/// Broadcast socket bound to one destination
pub struct UdpBroadcaster {
    socket: UdpSocket,
    target: NetworkTarget,
    /// Reused datagram buffer (frame + NUL)
    buffer: Vec<u8>,
    datagrams_sent: u64,
}

impl UdpBroadcaster {
    /// Create the socket and enable broadcast
    pub fn open(target: NetworkTarget) -> Result<Self> {
        let socket =
            UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).map_err(Error::NetworkUnavailable)?;
        socket
            .set_broadcast(true)
            .map_err(Error::NetworkUnavailable)?;

        log::info!(
            "UDP broadcaster ready: {} -> {}",
            socket
                .local_addr()
                .map(|a| a.to_string())
                .unwrap_or_else(|_| "?".to_string()),
            target
        );

        Ok(Self {
            socket,
            target,
            buffer: Vec::with_capacity(MAX_FRAME_LEN + 1),
            datagrams_sent: 0,
        })
    }

    /// Send one frame as a single NUL-terminated datagram
    pub fn send(&mut self, frame: &WireFrame) -> Result<()> {
        frame.write_datagram(&mut self.buffer);

        let sent = self
            .socket
            .send_to(&self.buffer, self.target.socket_addr())
            .map_err(Error::SendFailed)?;

        if sent != self.buffer.len() {
            return Err(Error::SendFailed(io::Error::new(
                io::ErrorKind::WriteZero,
                format!("short send: {} of {} bytes", sent, self.buffer.len()),
            )));
        }

        self.datagrams_sent += 1;
        log::trace!("Sent {} bytes to {}", sent, self.target);
        Ok(())
    }

    pub fn target(&self) -> NetworkTarget {
        self.target
    }

    /// Local socket address
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    /// Datagrams successfully sent
    pub fn datagrams_sent(&self) -> u64 {
        self.datagrams_sent
    }

    /// Release the socket
    pub fn close(self) {
        log::info!(
            "UDP broadcaster closed after {} datagrams",
            self.datagrams_sent
        );
    }
}

impl FrameSink for UdpBroadcaster {
    fn send_frame(&mut self, frame: &WireFrame) -> Result<()> {
        self.send(frame)
    }
}
