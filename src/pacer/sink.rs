use std::io;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr, UdpSocket};

use log::debug;

/// Destination for paced packets. Each call hands one datagram to the network
/// layer; there is no acknowledgement.
pub trait PacketSink {
    fn send_packet(&mut self, payload: &[u8]) -> io::Result<()>;
}

/// Unconnected UDP socket sending every packet to a fixed target.
#[derive(Debug)]
pub struct UdpTarget {
    socket: UdpSocket,
    target: SocketAddr,
}

impl UdpTarget {
    /// Bind an ephemeral local port in the target's address family.
    pub fn open(target: SocketAddr) -> io::Result<Self> {
        let local: SocketAddr = match target {
            SocketAddr::V4(_) => (Ipv4Addr::UNSPECIFIED, 0).into(),
            SocketAddr::V6(_) => (Ipv6Addr::UNSPECIFIED, 0).into(),
        };
        let socket = UdpSocket::bind(local)?;
        debug!(
            "Sending from {} to {}",
            socket.local_addr()?,
            target
        );
        Ok(UdpTarget { socket, target })
    }

    pub fn target(&self) -> SocketAddr {
        self.target
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }
}

impl PacketSink for UdpTarget {
    fn send_packet(&mut self, payload: &[u8]) -> io::Result<()> {
        self.socket.send_to(payload, self.target).map(|_| ())
    }
}
