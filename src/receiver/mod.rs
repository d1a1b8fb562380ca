use std::io;
use std::net::{SocketAddr, UdpSocket};
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use socket2::{Domain, Protocol, Socket, Type};

use crate::error::ReceiverError;
use crate::shutdown::Shutdown;
use crate::writer::event_log::EventLog;

pub mod event;
pub mod metrics;

use event::{MonotonicClock, ReceivedEvent};

/// Largest UDP payload; used directly as the receive buffer size.
pub const MAX_DATAGRAM_SIZE: usize = 65_535;

/// How long a receive blocks before the loop re-checks the shutdown token.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, PartialEq)]
pub struct ReceiveSummary {
    pub received: u64,
    pub elapsed: Duration,
}

/// Kernel receive buffer requested for the listening socket.
pub const DEFAULT_RECV_BUFFER_BYTES: usize = 8 * 1024 * 1024;

/// Bind a listening socket whose receives time out after `read_timeout`.
///
/// The kernel receive buffer is raised to `recv_buffer_bytes` before binding,
/// `0` keeps the OS default. The kernel may clamp the request; a refused
/// request is logged, not fatal.
pub fn bind_socket(
    addr: SocketAddr,
    read_timeout: Duration,
    recv_buffer_bytes: usize,
) -> Result<UdpSocket, ReceiverError> {
    let bind_err = |source| ReceiverError::Bind { addr, source };

    let socket = Socket::new(Domain::for_address(addr), Type::DGRAM, Some(Protocol::UDP))
        .map_err(bind_err)?;
    if recv_buffer_bytes > 0 {
        if let Err(e) = socket.set_recv_buffer_size(recv_buffer_bytes) {
            warn!("Unable to set receive buffer to {} bytes: {}", recv_buffer_bytes, e);
        }
    }
    socket.bind(&addr.into()).map_err(bind_err)?;
    debug!(
        "Receive buffer on {} is {} bytes",
        addr,
        socket.recv_buffer_size().unwrap_or(0)
    );

    let socket: UdpSocket = socket.into();
    socket
        .set_read_timeout(Some(read_timeout.max(Duration::from_millis(1))))
        .map_err(bind_err)?;
    Ok(socket)
}

/// Blocking datagram listener that records one [`ReceivedEvent`] per datagram.
pub struct Receiver {
    socket: UdpSocket,
    log: EventLog,
    clock: MonotonicClock,
    buf: Vec<u8>,
    received: u64,
}

impl Receiver {
    pub fn new(socket: UdpSocket, log: EventLog) -> Self {
        Receiver {
            socket,
            log,
            clock: MonotonicClock::new(),
            buf: vec![0u8; MAX_DATAGRAM_SIZE],
            received: 0,
        }
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    pub fn received(&self) -> u64 {
        self.received
    }

    /// Receive, stamp and log datagrams until `shutdown` is triggered. The
    /// token is checked between datagrams, never between a receive and its
    /// log row.
    pub fn run(&mut self, shutdown: &Shutdown) -> Result<ReceiveSummary, ReceiverError> {
        let start = Instant::now();
        info!(
            "Listening on {}, logging to {}",
            self.socket.local_addr().map_err(ReceiverError::Receive)?,
            self.log.path().display()
        );

        while !shutdown.is_triggered() {
            let event = match self.receive_one()? {
                Some(event) => event,
                None => continue,
            };
            self.log.append(&event)?;
            self.received += 1;
            debug!(
                "recv {} bytes from {} at {}",
                event.packet_len,
                event.addr,
                event.recv_time_iso()
            );
        }

        info!("Stopped. Received: {}", self.received);
        Ok(ReceiveSummary {
            received: self.received,
            elapsed: start.elapsed(),
        })
    }

    /// Wait for one datagram. `Ok(None)` means the read timed out or was
    /// interrupted before anything arrived.
    pub fn receive_one(&mut self) -> Result<Option<ReceivedEvent>, ReceiverError> {
        match self.socket.recv_from(&mut self.buf) {
            Ok((len, addr)) => {
                let event = ReceivedEvent::capture(&self.clock, addr, len);
                metrics::udp::datagram_received();
                Ok(Some(event))
            }
            Err(e)
                if matches!(
                    e.kind(),
                    io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut | io::ErrorKind::Interrupted
                ) =>
            {
                Ok(None)
            }
            Err(e) => Err(ReceiverError::Receive(e)),
        }
    }

    /// Release the socket and hand back the log.
    pub fn into_log(self) -> EventLog {
        self.log
    }
}
