use std::time::{Duration, Instant};

use log::{debug, info};

use crate::error::{PacerError, RecordError};
use crate::record::{Payload, RecordSet};
use crate::shutdown::Shutdown;

pub mod cursor;
pub mod metrics;
pub mod pacing;
pub mod sink;

use cursor::CyclicCursor;
use pacing::{PacingConfig, TickSchedule};
use sink::PacketSink;

/// A progress line is reported each time the send counter crosses a multiple
/// of this value.
pub const PROGRESS_EVERY: u64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The loop limit was reached.
    Completed,
    /// The shutdown token was triggered.
    Interrupted,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub sent: u64,
    pub ticks: u64,
    pub elapsed: Duration,
    pub outcome: RunOutcome,
}

impl RunSummary {
    pub fn achieved_rate(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.sent as f64 / secs
        } else {
            0.0
        }
    }
}

/// Whether going from `before` to `after` sent packets passes a multiple of
/// [`PROGRESS_EVERY`], landing on it included.
pub fn crossed_progress_mark(before: u64, after: u64) -> bool {
    after / PROGRESS_EVERY > before / PROGRESS_EVERY
}

/// Replays a record set into a [`PacketSink`] on a timed schedule.
///
/// Every tick picks the next record round-robin and sends its payload `burst`
/// times. The run ends after `loop_limit` packets (the final burst is cut
/// short to hit the limit exactly) or when the shutdown token is seen at the
/// top of a tick, so a burst is never split by cancellation.
pub struct Pacer<S> {
    payloads: Vec<Payload>,
    cursor: CyclicCursor,
    sink: S,
    config: PacingConfig,
    sent: u64,
    ticks: u64,
}

impl<S: PacketSink> Pacer<S> {
    pub fn new(records: &RecordSet, sink: S, config: PacingConfig) -> Result<Self, RecordError> {
        let payloads = records.payloads()?;
        let cursor = CyclicCursor::new(payloads.len()).ok_or_else(|| RecordError::Empty {
            origin: "pacer input".to_string(),
        })?;
        Ok(Pacer {
            payloads,
            cursor,
            sink,
            config,
            sent: 0,
            ticks: 0,
        })
    }

    pub fn sent(&self) -> u64 {
        self.sent
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    pub fn run(&mut self, shutdown: &Shutdown) -> Result<RunSummary, PacerError> {
        let interval = self.config.effective_interval();
        let strategy = self.config.wait_strategy();
        info!(
            "Pacing {} record(s): interval {:?} ({:?}), burst {}, limit {}",
            self.payloads.len(),
            interval,
            strategy,
            self.config.burst(),
            self.config
                .loop_limit()
                .map(|l| l.to_string())
                .unwrap_or_else(|| "none".to_string())
        );

        let start = Instant::now();
        let mut schedule = TickSchedule::new(start, interval);

        let outcome = loop {
            if self.limit_reached() {
                break RunOutcome::Completed;
            }
            if shutdown.is_triggered() {
                break RunOutcome::Interrupted;
            }

            self.tick()?;

            if self.limit_reached() {
                break RunOutcome::Completed;
            }
            let deadline = schedule.advance(Instant::now());
            strategy.wait_until(deadline, shutdown);
        };

        let summary = RunSummary {
            sent: self.sent,
            ticks: self.ticks,
            elapsed: start.elapsed(),
            outcome,
        };
        match outcome {
            RunOutcome::Completed => info!(
                "Finished requested loops: {} packets in {:.3}s ({:.1} pkt/s)",
                summary.sent,
                summary.elapsed.as_secs_f64(),
                summary.achieved_rate()
            ),
            RunOutcome::Interrupted => info!(
                "Stopped by user. Sent: {} packets in {:.3}s",
                summary.sent,
                summary.elapsed.as_secs_f64()
            ),
        }
        Ok(summary)
    }

    /// Send one burst of the next record.
    pub fn tick(&mut self) -> Result<(), PacerError> {
        let index = self.cursor.next_index();
        let sends = self.sends_this_tick();
        let before = self.sent;

        for _ in 0..sends {
            let sent = self.sent;
            self.sink
                .send_packet(self.payloads[index].as_bytes())
                .map_err(|source| PacerError::Send { sent, source })?;
            self.sent += 1;
            metrics::sends::packet_sent();
        }
        self.ticks += 1;
        metrics::sends::tick();

        if crossed_progress_mark(before, self.sent) {
            self.report_progress();
        }
        Ok(())
    }

    fn sends_this_tick(&self) -> u64 {
        let burst = u64::from(self.config.burst());
        match self.config.loop_limit() {
            Some(limit) => burst.min(limit.saturating_sub(self.sent)),
            None => burst,
        }
    }

    fn limit_reached(&self) -> bool {
        self.config
            .loop_limit()
            .map(|limit| self.sent >= limit)
            .unwrap_or(false)
    }

    fn report_progress(&self) {
        if self.config.verbose() {
            info!("Sent {} packets so far...", self.sent);
        } else {
            debug!("Sent {} packets so far...", self.sent);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io;

    #[derive(Default)]
    struct CountingSink {
        packets: Vec<Vec<u8>>,
    }

    impl PacketSink for CountingSink {
        fn send_packet(&mut self, payload: &[u8]) -> io::Result<()> {
            self.packets.push(payload.to_vec());
            Ok(())
        }
    }

    fn records() -> RecordSet {
        RecordSet::from_document(json!([{"a": 1}, {"b": 2}, {"c": 3}]), "test").unwrap()
    }

    #[test]
    fn test_last_burst_is_truncated_to_the_limit() {
        let config = PacingConfig::new(None, Some(0.0))
            .unwrap()
            .with_burst(4)
            .unwrap()
            .with_loop_limit(Some(10))
            .unwrap();
        let mut pacer = Pacer::new(&records(), CountingSink::default(), config).unwrap();

        let summary = pacer.run(&Shutdown::new()).unwrap();

        assert_eq!(summary.sent, 10);
        assert_eq!(summary.ticks, 3);
        assert_eq!(summary.outcome, RunOutcome::Completed);
        let sink = pacer.into_sink();
        assert_eq!(sink.packets.len(), 10);
        assert_eq!(sink.packets[8], br#"{"c":3}"#.to_vec());
    }

    #[test]
    fn test_tick_advances_one_record() {
        let mut pacer =
            Pacer::new(&records(), CountingSink::default(), PacingConfig::default()).unwrap();
        pacer.tick().unwrap();
        pacer.tick().unwrap();
        assert_eq!(pacer.sent(), 2);
        assert_eq!(pacer.ticks(), 2);
        assert_eq!(pacer.sink().packets[1], br#"{"b":2}"#.to_vec());
    }

    #[test]
    fn test_progress_mark_exact_hit() {
        assert!(crossed_progress_mark(99, 100));
        assert!(crossed_progress_mark(199, 200));
    }

    #[test]
    fn test_progress_mark_crossed_inside_a_burst() {
        assert!(crossed_progress_mark(99, 102));
        assert!(crossed_progress_mark(98, 300), "one report for several marks");
    }

    #[test]
    fn test_progress_mark_not_crossed() {
        assert!(!crossed_progress_mark(0, 1));
        assert!(!crossed_progress_mark(100, 101));
        assert!(!crossed_progress_mark(101, 199));
        assert!(!crossed_progress_mark(42, 42));
    }

    #[test]
    fn test_triggered_shutdown_sends_nothing() {
        let shutdown = Shutdown::new();
        shutdown.trigger();
        let mut pacer =
            Pacer::new(&records(), CountingSink::default(), PacingConfig::default()).unwrap();

        let summary = pacer.run(&shutdown).unwrap();

        assert_eq!(summary.sent, 0);
        assert_eq!(summary.outcome, RunOutcome::Interrupted);
    }
}
