use metrics::{counter, histogram};
use std::time::Instant;

/// Track event log write metrics
pub mod event_write {
    use super::*;

    pub fn written() {
        counter!("events_written_total", 1);
    }

    pub fn record_latency(duration: std::time::Duration) {
        histogram!("event_write_latency_seconds", duration.as_secs_f64());
    }

    /// Measures one append, flush included
    pub struct WriteTimer {
        start: Instant,
    }

    impl WriteTimer {
        pub fn start() -> Self {
            Self {
                start: Instant::now(),
            }
        }

        pub fn finish(self) {
            record_latency(self.start.elapsed());
        }
    }
}
