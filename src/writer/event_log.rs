use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::error::EventLogError;
use crate::receiver::event::ReceivedEvent;
use crate::writer::metrics::event_write;

pub const CSV_HEADER: &str = "recv_time_iso,recv_time_perf_us,addr,packet_len";

/// How an existing log file is treated on open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    /// Start over; the header is always written.
    Truncate,
    /// Keep existing rows; the header is written only into an empty file.
    Append,
}

/// Append-only CSV log of received datagrams. Every row is flushed before
/// `append` returns, so an abrupt stop loses at most the row in flight.
pub struct EventLog {
    path: PathBuf,
    writer: BufWriter<File>,
    sync: bool,
    rows: u64,
}

impl EventLog {
    pub fn open(
        path: impl Into<PathBuf>,
        mode: OpenMode,
        sync: bool,
    ) -> Result<Self, EventLogError> {
        let path = path.into();
        let file = Self::open_file(&path, mode)?;
        let needs_header = match mode {
            OpenMode::Truncate => true,
            OpenMode::Append => {
                file.metadata()
                    .map_err(|source| EventLogError::FileOpen {
                        path: path.clone(),
                        source,
                    })?
                    .len()
                    == 0
            }
        };

        let mut log = EventLog {
            path,
            writer: BufWriter::new(file),
            sync,
            rows: 0,
        };
        if needs_header {
            writeln!(log.writer, "{}", CSV_HEADER)?;
            log.commit()?;
        }
        info!("Logging to {} ({:?})", log.path.display(), mode);
        Ok(log)
    }

    fn open_file(path: &Path, mode: OpenMode) -> Result<File, EventLogError> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|source| EventLogError::FileOpen {
                path: path.to_path_buf(),
                source,
            })?;
        }

        let mut options = OpenOptions::new();
        match mode {
            OpenMode::Truncate => options.write(true).truncate(true),
            OpenMode::Append => options.append(true),
        };
        options
            .create(true)
            .open(path)
            .map_err(|source| EventLogError::FileOpen {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Write one row and flush it to the file.
    pub fn append(&mut self, event: &ReceivedEvent) -> Result<(), EventLogError> {
        let timer = event_write::WriteTimer::start();
        event.write_csv_row(&mut self.writer)?;
        self.commit()?;
        timer.finish();

        self.rows += 1;
        event_write::written();
        Ok(())
    }

    fn commit(&mut self) -> Result<(), EventLogError> {
        self.writer.flush()?;
        if self.sync {
            self.writer.get_ref().sync_data()?;
        }
        Ok(())
    }

    /// Rows appended through this handle, header excluded.
    pub fn rows(&self) -> u64 {
        self.rows
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flush, sync and release the file.
    pub fn close(mut self) -> Result<(), EventLogError> {
        self.writer.flush()?;
        self.writer.get_ref().sync_all()?;
        debug!("Closed {} after {} rows", self.path.display(), self.rows);
        Ok(())
    }
}
