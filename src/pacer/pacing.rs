use std::time::{Duration, Instant};

use crate::error::PacingError;
use crate::shutdown::Shutdown;

/// Interval used when neither a rate nor an interval is requested.
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(100);

/// Intervals at or above this use the OS sleep; shorter ones busy-poll the
/// monotonic clock and keep one core fully loaded while they do.
pub const DEFAULT_BUSY_POLL_THRESHOLD: Duration = Duration::from_millis(5);

/// How the tick interval was requested.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PacingMode {
    /// Messages per second.
    Rate(f64),
    /// Milliseconds between ticks.
    IntervalMs(f64),
    Default,
}

/// How the pacer waits for the next tick deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitStrategy {
    Sleep,
    BusyPoll,
}

impl WaitStrategy {
    /// The boundary is inclusive on the sleep side.
    pub fn for_interval(interval: Duration, busy_poll_threshold: Duration) -> Self {
        if interval >= busy_poll_threshold {
            WaitStrategy::Sleep
        } else {
            WaitStrategy::BusyPoll
        }
    }

    /// Block until `deadline` or until `shutdown` is triggered. A deadline
    /// already in the past returns at once.
    pub fn wait_until(self, deadline: Instant, shutdown: &Shutdown) {
        match self {
            WaitStrategy::Sleep => {
                shutdown.sleep_until(deadline);
            }
            WaitStrategy::BusyPoll => {
                while Instant::now() < deadline && !shutdown.is_triggered() {
                    std::hint::spin_loop();
                }
            }
        }
    }
}

/// Validated timing parameters of a pacer run.
#[derive(Debug, Clone, PartialEq)]
pub struct PacingConfig {
    mode: PacingMode,
    interval: Duration,
    burst: u32,
    loop_limit: Option<u64>,
    busy_poll_threshold: Duration,
    verbose: bool,
}

impl PacingConfig {
    /// Resolve the effective interval. `rate` and `interval_ms` are mutually
    /// exclusive; with neither the interval is [`DEFAULT_INTERVAL`].
    pub fn new(rate: Option<f64>, interval_ms: Option<f64>) -> Result<Self, PacingError> {
        let (mode, seconds) = match (rate, interval_ms) {
            (Some(rate), Some(interval_ms)) => {
                return Err(PacingError::ConflictingModes { rate, interval_ms })
            }
            (Some(rate), None) => {
                if !rate.is_finite() || rate <= 0.0 {
                    return Err(PacingError::InvalidRate(rate));
                }
                (PacingMode::Rate(rate), 1.0 / rate)
            }
            (None, Some(interval_ms)) => {
                if !interval_ms.is_finite() || interval_ms < 0.0 {
                    return Err(PacingError::InvalidInterval(interval_ms));
                }
                (PacingMode::IntervalMs(interval_ms), interval_ms / 1000.0)
            }
            (None, None) => (PacingMode::Default, DEFAULT_INTERVAL.as_secs_f64()),
        };
        let interval = Duration::try_from_secs_f64(seconds)
            .ok()
            .filter(|interval| Self::schedulable(*interval))
            .ok_or(PacingError::IntervalOutOfRange(seconds))?;

        Ok(PacingConfig {
            mode,
            interval,
            burst: 1,
            loop_limit: None,
            busy_poll_threshold: DEFAULT_BUSY_POLL_THRESHOLD,
            verbose: false,
        })
    }

    /// A run keeps its next deadline within one interval of the current
    /// instant, so twice the interval must fit on the monotonic clock.
    fn schedulable(interval: Duration) -> bool {
        interval
            .checked_mul(2)
            .and_then(|span| Instant::now().checked_add(span))
            .is_some()
    }

    pub fn with_burst(mut self, burst: u32) -> Result<Self, PacingError> {
        if burst == 0 {
            return Err(PacingError::InvalidBurst);
        }
        self.burst = burst;
        Ok(self)
    }

    pub fn with_loop_limit(mut self, loop_limit: Option<u64>) -> Result<Self, PacingError> {
        if loop_limit == Some(0) {
            return Err(PacingError::InvalidLoopLimit);
        }
        self.loop_limit = loop_limit;
        Ok(self)
    }

    pub fn with_busy_poll_threshold(mut self, threshold: Duration) -> Self {
        self.busy_poll_threshold = threshold;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn mode(&self) -> PacingMode {
        self.mode
    }

    pub fn effective_interval(&self) -> Duration {
        self.interval
    }

    pub fn burst(&self) -> u32 {
        self.burst
    }

    pub fn loop_limit(&self) -> Option<u64> {
        self.loop_limit
    }

    pub fn busy_poll_threshold(&self) -> Duration {
        self.busy_poll_threshold
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }

    pub fn wait_strategy(&self) -> WaitStrategy {
        WaitStrategy::for_interval(self.interval, self.busy_poll_threshold)
    }
}

impl Default for PacingConfig {
    fn default() -> Self {
        PacingConfig {
            mode: PacingMode::Default,
            interval: DEFAULT_INTERVAL,
            burst: 1,
            loop_limit: None,
            busy_poll_threshold: DEFAULT_BUSY_POLL_THRESHOLD,
            verbose: false,
        }
    }
}

/// Absolute tick deadlines on the monotonic clock: `start + k * interval`.
/// A tick that falls behind restarts the grid from the current instant
/// instead of firing a run of catch-up ticks.
#[derive(Debug, Clone)]
pub struct TickSchedule {
    next: Instant,
    interval: Duration,
}

impl TickSchedule {
    pub fn new(start: Instant, interval: Duration) -> Self {
        TickSchedule {
            next: start,
            interval,
        }
    }

    /// Deadline of the tick following the one just sent. A deadline past the
    /// end of the clock collapses to `now`.
    pub fn advance(&mut self, now: Instant) -> Instant {
        self.next = match self.next.checked_add(self.interval) {
            Some(next) if next >= now => next,
            _ => now,
        };
        self.next
    }
}
