use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use log::{error, info};
use tokio::task::JoinHandle;

/// Longest stretch a cancellable sleep runs before re-checking the flag.
pub const SHUTDOWN_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Cooperative cancellation token shared between the signal handler and a
/// blocking loop. Loops check it at the top of every iteration.
#[derive(Debug, Clone, Default)]
pub struct Shutdown {
    flag: Arc<AtomicBool>,
}

impl Shutdown {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self) {
        self.flag.store(true, Ordering::Release);
    }

    pub fn is_triggered(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }

    /// Sleep until `deadline`, waking every [`SHUTDOWN_POLL_INTERVAL`] to look
    /// at the flag. Returns `false` if the sleep was cut short by shutdown.
    pub fn sleep_until(&self, deadline: Instant) -> bool {
        loop {
            if self.is_triggered() {
                return false;
            }
            let now = Instant::now();
            if now >= deadline {
                return true;
            }
            thread::sleep((deadline - now).min(SHUTDOWN_POLL_INTERVAL));
        }
    }
}

/// Spawn a task that triggers `shutdown` on the first Ctrl-C.
pub fn listen_for_ctrl_c(shutdown: Shutdown) -> JoinHandle<()> {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Interrupt received, shutting down");
                shutdown.trigger();
            }
            Err(e) => error!("Unable to listen for the interrupt signal: {}", e),
        }
    })
}
