use std::io::{self, Write};
use std::net::SocketAddr;
use std::time::Instant;

use chrono::prelude::*;

/// Monotonic microsecond clock anchored at construction.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        MonotonicClock {
            origin: Instant::now(),
        }
    }

    pub fn now_us(&self) -> u64 {
        self.origin.elapsed().as_micros() as u64
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Arrival metadata of one datagram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedEvent {
    pub recv_time: DateTime<Utc>,
    pub recv_time_perf_us: u64,
    pub addr: SocketAddr,
    pub packet_len: usize,
}

impl ReceivedEvent {
    /// Stamp both clocks now.
    pub fn capture(clock: &MonotonicClock, addr: SocketAddr, packet_len: usize) -> Self {
        let recv_time = Utc::now();
        let recv_time_perf_us = clock.now_us();
        ReceivedEvent {
            recv_time,
            recv_time_perf_us,
            addr,
            packet_len,
        }
    }

    /// ISO-8601 UTC with microseconds and a `Z` suffix.
    pub fn recv_time_iso(&self) -> String {
        self.recv_time.to_rfc3339_opts(SecondsFormat::Micros, true)
    }

    /// One CSV row, newline terminated. None of the fields can contain a comma.
    pub fn write_csv_row<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(
            out,
            "{},{},{},{}",
            self.recv_time_iso(),
            self.recv_time_perf_us,
            self.addr,
            self.packet_len
        )
    }
}
