//! Test helpers and utilities for feed-replay tests
//!
//! Shared fixtures for the pacer and receiver specs.
#![allow(dead_code)]

use feed_replay::pacer::sink::PacketSink;
use feed_replay::settings::{PacerSettings, ReceiverSettings, Settings};
use feed_replay::shutdown::Shutdown;
use std::io;
use std::net::{SocketAddr, UdpSocket};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tempfile::TempDir;

/// Create a temporary directory for testing
pub fn create_temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temporary directory")
}

/// Write a JSON records file into `temp_dir`
pub fn write_records_file(temp_dir: &TempDir, filename: &str, json: &str) -> PathBuf {
    let path = temp_dir.path().join(filename);
    std::fs::write(&path, json).expect("Failed to write records file");
    path
}

/// Sink that keeps every packet with the instant it was handed over
#[derive(Default)]
pub struct RecordingSink {
    pub packets: Vec<(Instant, Vec<u8>)>,
}

impl RecordingSink {
    pub fn payloads(&self) -> Vec<String> {
        self.packets
            .iter()
            .map(|(_, p)| String::from_utf8(p.clone()).expect("payload should be UTF-8"))
            .collect()
    }
}

impl PacketSink for RecordingSink {
    fn send_packet(&mut self, payload: &[u8]) -> io::Result<()> {
        self.packets.push((Instant::now(), payload.to_vec()));
        Ok(())
    }
}

/// Sink that triggers shutdown once `after` packets went through
pub struct TriggeringSink {
    pub sent: u64,
    pub after: u64,
    pub shutdown: Shutdown,
}

impl PacketSink for TriggeringSink {
    fn send_packet(&mut self, _payload: &[u8]) -> io::Result<()> {
        self.sent += 1;
        if self.sent == self.after {
            self.shutdown.trigger();
        }
        Ok(())
    }
}

/// Sink whose sends start failing after `ok` successes
pub struct FailingSink {
    pub ok: u64,
    pub sent: u64,
}

impl PacketSink for FailingSink {
    fn send_packet(&mut self, _payload: &[u8]) -> io::Result<()> {
        if self.sent >= self.ok {
            return Err(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                "connection refused",
            ));
        }
        self.sent += 1;
        Ok(())
    }
}

/// Loopback socket to receive what a pacer sends
pub fn loopback_listener() -> (UdpSocket, SocketAddr) {
    let socket = UdpSocket::bind("127.0.0.1:0").expect("Failed to bind loopback socket");
    socket
        .set_read_timeout(Some(Duration::from_secs(2)))
        .expect("Failed to set read timeout");
    let addr = socket.local_addr().expect("Failed to read local address");
    (socket, addr)
}

/// Pacer settings pointing at `records` and `target`
pub fn pacer_settings(records: PathBuf, target: SocketAddr) -> Settings {
    Settings {
        pacer: PacerSettings {
            file: records,
            target_ip: target.ip().to_string(),
            target_port: target.port(),
            ..PacerSettings::default()
        },
        receiver: ReceiverSettings::default(),
    }
}

/// Receiver settings on an ephemeral loopback port writing into `temp_dir`
pub fn receiver_settings(temp_dir: &TempDir, filename: &str) -> Settings {
    Settings {
        pacer: PacerSettings::default(),
        receiver: ReceiverSettings {
            host: "127.0.0.1".to_string(),
            port: 0,
            output: temp_dir.path().join(filename),
            read_timeout_ms: 20,
            ..ReceiverSettings::default()
        },
    }
}

/// Poll `condition` until it holds or `max_wait` elapses
pub fn wait_for_condition<F>(condition: F, max_wait: Duration) -> Result<(), String>
where
    F: Fn() -> bool,
{
    let start = Instant::now();
    let check_interval = Duration::from_millis(10);

    while start.elapsed() < max_wait {
        if condition() {
            return Ok(());
        }
        std::thread::sleep(check_interval);
    }

    Err(format!(
        "Condition did not become true within {:?}",
        max_wait
    ))
}

/// Read a CSV log into its header and data rows
pub fn read_log(path: &std::path::Path) -> (String, Vec<Vec<String>>) {
    let content = std::fs::read_to_string(path).expect("Failed to read log");
    let mut lines = content.lines();
    let header = lines.next().unwrap_or_default().to_string();
    let rows = lines
        .map(|l| l.split(',').map(str::to_string).collect())
        .collect();
    (header, rows)
}
