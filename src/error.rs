use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;

/// Application-level errors
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    ConfigError(#[from] config::ConfigError),

    #[error("Invalid pacing configuration: {0}")]
    Pacing(#[from] PacingError),

    #[error("Failed to load records: {0}")]
    Record(#[from] RecordError),

    #[error("Pacer failed: {0}")]
    Pacer(#[from] PacerError),

    #[error("Receiver failed: {0}")]
    Receiver(#[from] ReceiverError),

    #[error("Invalid target address {0}")]
    Address(String),

    #[error("Failed to set up socket: {0}")]
    SocketSetup(#[source] io::Error),

    #[error("Blocking task failed: {0}")]
    TaskFailure(String),
}

/// Record set loading domain errors
#[derive(Error, Debug)]
pub enum RecordError {
    #[error("Failed to open record file {path}: {source}")]
    FileOpen { path: PathBuf, source: io::Error },

    #[error("Failed to parse record file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Record set loaded from {origin} is empty")]
    Empty { origin: String },

    #[error("Failed to encode record #{index}: {source}")]
    Encode {
        index: usize,
        source: serde_json::Error,
    },
}

/// Pacing parameter errors, raised before any network activity
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PacingError {
    #[error("rate and interval_ms are mutually exclusive (rate={rate}, interval_ms={interval_ms})")]
    ConflictingModes { rate: f64, interval_ms: f64 },

    #[error("rate must be a finite number of messages per second greater than 0, got {0}")]
    InvalidRate(f64),

    #[error("interval_ms must be a finite number of milliseconds >= 0, got {0}")]
    InvalidInterval(f64),

    #[error("effective interval of {0} seconds cannot be represented")]
    IntervalOutOfRange(f64),

    #[error("burst must be at least 1")]
    InvalidBurst,

    #[error("loop limit must be at least 1 when set")]
    InvalidLoopLimit,
}

/// Pacer run errors
#[derive(Error, Debug)]
pub enum PacerError {
    #[error("Failed to send packet after {sent} successful sends: {source}")]
    Send { sent: u64, source: io::Error },
}

/// Event log domain errors
#[derive(Error, Debug)]
pub enum EventLogError {
    #[error("Failed to open event log {path}: {source}")]
    FileOpen { path: PathBuf, source: io::Error },

    #[error("Failed to write to event log: {0}")]
    WriteError(#[from] io::Error),
}

/// Receiver domain errors
#[derive(Error, Debug)]
pub enum ReceiverError {
    #[error("Failed to bind {addr}: {source}")]
    Bind { addr: SocketAddr, source: io::Error },

    #[error("Failed to receive datagram: {0}")]
    Receive(#[source] io::Error),

    #[error("Event log failure: {0}")]
    EventLog(#[from] EventLogError),
}
