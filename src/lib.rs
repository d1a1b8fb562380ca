pub mod cli;
pub mod error;
pub mod metrics;
pub mod pacer;
pub mod receiver;
pub mod record;
pub mod settings;
pub mod shutdown;
pub mod writer;

use std::sync::Arc;

use log::info;

use error::AppError;
use pacer::sink::UdpTarget;
use pacer::{Pacer, RunSummary};
use receiver::{ReceiveSummary, Receiver};
use record::RecordSet;
use settings::Settings;
use shutdown::Shutdown;
use writer::event_log::EventLog;

pub struct App;

impl App {
    /// Validate, load and bind, then run the pacer loop on a blocking thread
    /// until it completes or `shutdown` fires. Pacing errors surface before
    /// any socket is opened.
    pub async fn start_pacer(
        settings: Arc<Settings>,
        shutdown: Shutdown,
    ) -> Result<RunSummary, AppError> {
        let pacer_settings = &settings.pacer;
        let config = pacer_settings.pacing_config()?;

        let records = RecordSet::load(&pacer_settings.file)?;
        info!(
            "Loaded {} snapshot(s) from {}",
            records.len(),
            pacer_settings.file.display()
        );

        let target = pacer_settings.target_addr()?;
        let sink = UdpTarget::open(target).map_err(AppError::SocketSetup)?;
        info!("Sending to {}", sink.target());
        let mut pacer = Pacer::new(&records, sink, config)?;

        let summary = tokio::task::spawn_blocking(move || pacer.run(&shutdown))
            .await
            .map_err(|e| AppError::TaskFailure(format!("pacer task: {}", e)))??;
        Ok(summary)
    }

    /// Bind, open the event log, then run the receiver loop on a blocking
    /// thread until `shutdown` fires. The log is flushed and closed on the way
    /// out.
    pub async fn start_receiver(
        settings: Arc<Settings>,
        shutdown: Shutdown,
    ) -> Result<ReceiveSummary, AppError> {
        let receiver_settings = &settings.receiver;
        let addr = receiver_settings.listen_addr()?;
        let socket = receiver::bind_socket(
            addr,
            receiver_settings.read_timeout(),
            receiver_settings.recv_buffer_bytes,
        )?;
        let log = EventLog::open(
            receiver_settings.output.clone(),
            receiver_settings.open_mode(),
            receiver_settings.sync,
        )
        .map_err(error::ReceiverError::from)?;

        let mut receiver = Receiver::new(socket, log);
        let summary = tokio::task::spawn_blocking(move || {
            let summary = receiver.run(&shutdown)?;
            receiver.into_log().close()?;
            Ok::<_, error::ReceiverError>(summary)
        })
        .await
        .map_err(|e| AppError::TaskFailure(format!("receiver task: {}", e)))??;
        Ok(summary)
    }
}
