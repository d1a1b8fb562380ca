use clap::Parser;
use std::path::PathBuf;

use crate::settings::{PacerSettings, ReceiverSettings};

/// Replay JSON records as paced UDP datagrams.
///
/// Flags left unset fall back to the settings file and `FEED_PACER__*`
/// environment variables.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "feed-pacer", version)]
pub struct PacerArgs {
    /// Settings file replacing the config/ directory lookup
    #[arg(long, env = "FEED_CONFIG")]
    pub config: Option<PathBuf>,

    /// JSON file with a record or an array of records
    #[arg(long)]
    pub file: Option<PathBuf>,

    #[arg(long)]
    pub target_ip: Option<String>,

    #[arg(long)]
    pub target_port: Option<u16>,

    /// Messages per second
    #[arg(long, conflicts_with = "interval_ms")]
    pub rate: Option<f64>,

    /// Milliseconds between ticks (0 = back-to-back)
    #[arg(long)]
    pub interval_ms: Option<f64>,

    /// Packets sent per tick
    #[arg(long)]
    pub burst: Option<u32>,

    /// Total number of packets to send (default: run until interrupted)
    #[arg(long)]
    pub loops: Option<u64>,

    /// Report progress every 100 packets
    #[arg(long)]
    pub verbose: bool,
}

impl PacerArgs {
    /// Overlay the flags that were given. Choosing a timing mode on the
    /// command line clears the other mode coming from settings.
    pub fn apply(&self, settings: &mut PacerSettings) {
        if let Some(file) = &self.file {
            settings.file = file.clone();
        }
        if let Some(ip) = &self.target_ip {
            settings.target_ip = ip.clone();
        }
        if let Some(port) = self.target_port {
            settings.target_port = port;
        }
        if let Some(rate) = self.rate {
            settings.rate = Some(rate);
            settings.interval_ms = None;
        }
        if let Some(interval_ms) = self.interval_ms {
            settings.interval_ms = Some(interval_ms);
            settings.rate = None;
        }
        if let Some(burst) = self.burst {
            settings.burst = burst;
        }
        if self.loops.is_some() {
            settings.loops = self.loops;
        }
        settings.verbose |= self.verbose;
    }
}

/// Log the arrival of UDP datagrams to a CSV file.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "feed-receiver", version)]
pub struct ReceiverArgs {
    /// Settings file replacing the config/ directory lookup
    #[arg(long, env = "FEED_CONFIG")]
    pub config: Option<PathBuf>,

    #[arg(long)]
    pub host: Option<String>,

    #[arg(long)]
    pub port: Option<u16>,

    /// CSV output path
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Keep existing rows in the output file
    #[arg(long)]
    pub append: bool,

    /// fsync the log after every row
    #[arg(long)]
    pub sync: bool,
}

impl ReceiverArgs {
    pub fn apply(&self, settings: &mut ReceiverSettings) {
        if let Some(host) = &self.host {
            settings.host = host.clone();
        }
        if let Some(port) = self.port {
            settings.port = port;
        }
        if let Some(output) = &self.output {
            settings.output = output.clone();
        }
        settings.append |= self.append;
        settings.sync |= self.sync;
    }
}
