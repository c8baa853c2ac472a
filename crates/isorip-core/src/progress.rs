//! Progress, rate and ETA accounting
//!
//! Rates are in blocks per second over whole elapsed seconds. A sample is due
//! once the progress interval has passed since the previous one; the engine
//! also takes a final sample when the copy ends.

use crate::session::TransferSession;
use crate::units::{format_blocks, UnitCeiling};
use std::time::{Duration, Instant};

/// Point-in-time view of a running copy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressSnapshot {
    /// Blocks copied so far (read or zero-filled)
    pub copied_blocks: u64,

    /// Expected size of the source in blocks, if known
    pub total_blocks: Option<u64>,

    /// Blocks per second since the previous sample
    pub instant_rate: u64,

    /// Blocks per second since the session started
    pub average_rate: u64,

    /// Estimated time remaining, if it can be estimated
    pub eta: Option<Duration>,

    /// Completion percentage, if the total is known
    pub percent: Option<u64>,

    /// Blocks substituted with zeros so far
    pub error_blocks: u64,

    /// Time since the session started
    pub elapsed: Duration,

    /// Whether this is the final sample of the session
    pub finished: bool,
}

impl ProgressSnapshot {
    /// Copied size for display (e.g. "1024 MiB")
    pub fn copied_display(&self) -> String {
        format_blocks(self.copied_blocks, UnitCeiling::Mib, false)
    }

    /// Instantaneous rate for display (e.g. "10 MiB/s")
    pub fn rate_display(&self) -> String {
        format_blocks(self.instant_rate, UnitCeiling::Mib, true)
    }

    /// Average rate for display
    pub fn average_display(&self) -> String {
        format_blocks(self.average_rate, UnitCeiling::Mib, true)
    }

    /// Remaining time as HH:MM:SS, or "unknown"
    pub fn eta_display(&self) -> String {
        match self.eta {
            Some(eta) => format_clock(eta.as_secs()),
            None => "unknown".to_string(),
        }
    }

    /// Percentage for display, or "?" when the total is unknown
    pub fn percent_display(&self) -> String {
        match self.percent {
            Some(p) => format!("{}%", p),
            None => "?%".to_string(),
        }
    }
}

/// Tracks sampling times and block positions for rate calculation
#[derive(Debug, Clone)]
pub struct RateTracker {
    start: Instant,
    last_sample: Instant,
    last_block: u64,
    interval: Duration,
}

impl RateTracker {
    /// Start tracking now
    pub fn new(interval: Duration) -> Self {
        Self::starting_at(Instant::now(), interval)
    }

    /// Start tracking at a given instant
    pub fn starting_at(start: Instant, interval: Duration) -> Self {
        Self {
            start,
            last_sample: start,
            last_block: 0,
            interval,
        }
    }

    /// Whether a progress sample is due at `now`
    pub fn due(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.last_sample) >= self.interval
    }

    /// Take a sample of `session` at `now` and reset the interval counters
    ///
    /// The instantaneous rate of the final sample is reported as zero: the
    /// interval since the previous sample may be arbitrarily short.
    pub fn sample(
        &mut self,
        now: Instant,
        session: &TransferSession,
        finished: bool,
    ) -> ProgressSnapshot {
        let current = session.current_block();
        let total = session.total_blocks();

        let interval_secs = now.saturating_duration_since(self.last_sample).as_secs();
        let instant_rate = if finished || interval_secs == 0 {
            0
        } else {
            current.saturating_sub(self.last_block) / interval_secs
        };

        let elapsed = now.saturating_duration_since(self.start);
        let average_rate = calculate_average_rate(current, elapsed);

        self.last_block = current;
        self.last_sample = now;

        ProgressSnapshot {
            copied_blocks: current,
            total_blocks: total,
            instant_rate,
            average_rate,
            eta: calculate_eta(current, total, average_rate),
            percent: calculate_percent(current, total),
            error_blocks: session.error_block_count(),
            elapsed,
            finished,
        }
    }
}

/// Average rate over whole seconds; under one second counts as one second
fn calculate_average_rate(blocks: u64, elapsed: Duration) -> u64 {
    let secs = elapsed.as_secs();
    if secs > 0 {
        blocks / secs
    } else {
        blocks
    }
}

/// Calculate estimated time remaining
fn calculate_eta(current: u64, total: Option<u64>, average_rate: u64) -> Option<Duration> {
    let total = total?;
    if average_rate == 0 {
        return None;
    }

    let remaining = total.saturating_sub(current);
    Some(Duration::from_secs(remaining / average_rate))
}

/// Completion percentage, capped at 100 when the source outgrows its reported size
fn calculate_percent(current: u64, total: Option<u64>) -> Option<u64> {
    match total {
        Some(0) | None => None,
        Some(total) => Some((current.saturating_mul(100) / total).min(100)),
    }
}

/// Format seconds as HH:MM:SS
pub fn format_clock(seconds: u64) -> String {
    format!(
        "{:02}:{:02}:{:02}",
        seconds / 3600,
        (seconds % 3600) / 60,
        seconds % 60
    )
}
