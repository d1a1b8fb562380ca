use std::env;
use std::sync::Arc;

use clap::Parser;
use log::{info, warn};

use feed_replay::cli::ReceiverArgs;
use feed_replay::error::AppError;
use feed_replay::settings::Settings;
use feed_replay::shutdown::{self, Shutdown};
use feed_replay::{metrics, App};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    pretty_env_logger::formatted_builder()
        .parse_filters(&env::var("RUST_LOG").unwrap_or_else(|_| "info".into()))
        .init();

    let args = ReceiverArgs::parse();
    let mut settings = Settings::load_with(args.config.as_deref()).map_err(AppError::from)?;
    args.apply(&mut settings.receiver);
    info!("Starting receiver with {:?}", settings.receiver);

    if let Err(e) = metrics::init() {
        warn!("Metrics disabled: {}", e);
    }

    let shutdown = Shutdown::new();
    let signal_task = shutdown::listen_for_ctrl_c(shutdown.clone());

    let summary = App::start_receiver(Arc::new(settings), shutdown).await?;
    signal_task.abort();

    info!(
        "Receiver done: {} datagrams in {:.3}s",
        summary.received,
        summary.elapsed.as_secs_f64()
    );
    metrics::log_snapshot();
    Ok(())
}
