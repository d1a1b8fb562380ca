use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::net::{SocketAddr, ToSocketAddrs};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{AppError, PacingError};
use crate::pacer::pacing::{PacingConfig, DEFAULT_BUSY_POLL_THRESHOLD};
use crate::receiver::{DEFAULT_READ_TIMEOUT, DEFAULT_RECV_BUFFER_BYTES};
use crate::writer::event_log::OpenMode;

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct PacerSettings {
    pub file: PathBuf,
    pub target_ip: String,
    pub target_port: u16,
    /// Messages per second. Mutually exclusive with `interval_ms`.
    pub rate: Option<f64>,
    pub interval_ms: Option<f64>,
    pub burst: u32,
    /// Total packets to send; unbounded when absent.
    pub loops: Option<u64>,
    pub verbose: bool,
    pub busy_poll_threshold_us: u64,
}

impl Default for PacerSettings {
    fn default() -> Self {
        PacerSettings {
            file: PathBuf::from("sample_data.json"),
            target_ip: "127.0.0.1".to_string(),
            target_port: 9000,
            rate: None,
            interval_ms: None,
            burst: 1,
            loops: None,
            verbose: false,
            busy_poll_threshold_us: DEFAULT_BUSY_POLL_THRESHOLD.as_micros() as u64,
        }
    }
}

impl PacerSettings {
    pub fn pacing_config(&self) -> Result<PacingConfig, PacingError> {
        Ok(PacingConfig::new(self.rate, self.interval_ms)?
            .with_burst(self.burst)?
            .with_loop_limit(self.loops)?
            .with_busy_poll_threshold(Duration::from_micros(self.busy_poll_threshold_us))
            .with_verbose(self.verbose))
    }

    /// Resolve `target_ip:target_port`; host names are looked up once.
    pub fn target_addr(&self) -> Result<SocketAddr, AppError> {
        let target = format!("{}:{}", self.target_ip, self.target_port);
        (self.target_ip.as_str(), self.target_port)
            .to_socket_addrs()
            .map_err(|e| AppError::Address(format!("{}: {}", target, e)))?
            .next()
            .ok_or_else(|| AppError::Address(format!("{}: no address found", target)))
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ReceiverSettings {
    pub host: String,
    pub port: u16,
    pub output: PathBuf,
    /// Keep existing rows instead of truncating the log.
    pub append: bool,
    /// fsync after every row.
    pub sync: bool,
    pub read_timeout_ms: u64,
    /// Kernel receive buffer size; 0 keeps the OS default.
    pub recv_buffer_bytes: usize,
}

impl Default for ReceiverSettings {
    fn default() -> Self {
        ReceiverSettings {
            host: "0.0.0.0".to_string(),
            port: 9000,
            output: PathBuf::from("recv_log.csv"),
            append: false,
            sync: false,
            read_timeout_ms: DEFAULT_READ_TIMEOUT.as_millis() as u64,
            recv_buffer_bytes: DEFAULT_RECV_BUFFER_BYTES,
        }
    }
}

impl ReceiverSettings {
    pub fn listen_addr(&self) -> Result<SocketAddr, AppError> {
        format!("{}:{}", self.host, self.port)
            .parse::<SocketAddr>()
            .or_else(|_| {
                (self.host.as_str(), self.port)
                    .to_socket_addrs()
                    .map_err(|e| AppError::Address(format!("{}:{}: {}", self.host, self.port, e)))?
                    .next()
                    .ok_or_else(|| {
                        AppError::Address(format!("{}:{}: no address found", self.host, self.port))
                    })
            })
    }

    pub fn open_mode(&self) -> OpenMode {
        if self.append {
            OpenMode::Append
        } else {
            OpenMode::Truncate
        }
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms.max(1))
    }
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub pacer: PacerSettings,
    pub receiver: ReceiverSettings,
}

impl Settings {
    /// Layered load: `config/default`, `config/{RUN_MODE}`, `config/local`
    /// (all optional), then `FEED_*` environment variables, e.g.
    /// `FEED_PACER__RATE=50`.
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // This file shouldn't be checked in to git
            .add_source(File::with_name("config/local").required(false))
            .add_source(Self::environment())
            .build()?
            .try_deserialize()
    }

    /// Load a single explicit settings file, still overridable from the
    /// environment.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from(path))
            .add_source(Self::environment())
            .build()?
            .try_deserialize()
    }

    pub fn load_with(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load_from(path),
            None => Self::load(),
        }
    }

    fn environment() -> Environment {
        Environment::with_prefix("FEED")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
    }
}
