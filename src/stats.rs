//! Rolling statistics over recorded rate samples.
//!
//! Two independently bounded histories are kept: the full reading history
//! (1000 samples) that feeds min/max/average and the stability score, and
//! the short display history (60 samples) used for charting and trends.

use std::collections::VecDeque;

/// Capacity of the full reading history.
pub const READING_HISTORY_CAPACITY: usize = 1000;

/// Capacity of the display history.
pub const DISPLAY_HISTORY_CAPACITY: usize = 60;

/// Number of most recent readings used for the stability score.
pub const STABILITY_WINDOW: usize = 100;

/// Fixed-capacity FIFO history of rate samples.
#[derive(Debug, Clone, PartialEq)]
pub struct RateHistory {
    samples: VecDeque<u32>,
    capacity: usize,
}

impl RateHistory {
    /// Create an empty history with a specific capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a sample, evicting the oldest one if the history is full.
    pub fn push(&mut self, rate: u32) {
        if self.samples.len() >= self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(rate);
    }

    /// Rounded mean of the history, `None` when empty.
    pub fn rounded_mean(&self) -> Option<u32> {
        if self.samples.is_empty() {
            return None;
        }
        let sum: u64 = self.samples.iter().map(|&s| u64::from(s)).sum();
        let len = self.samples.len() as u64;
        // floor(sum / len + 0.5) in integer arithmetic
        Some(((2 * sum + len) / (2 * len)) as u32)
    }

    /// The last `n` samples in chronological order.
    pub fn tail(&self, n: usize) -> Vec<u32> {
        let skip = self.samples.len().saturating_sub(n);
        self.samples.iter().skip(skip).copied().collect()
    }

    /// All samples in chronological order.
    pub fn to_vec(&self) -> Vec<u32> {
        self.samples.iter().copied().collect()
    }

    /// Get an iterator over all samples, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &u32> {
        self.samples.iter()
    }

    /// Most recent sample.
    pub fn last(&self) -> Option<u32> {
        self.samples.back().copied()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

}

/// Aggregate rate statistics for the session.
#[derive(Debug, Clone, PartialEq)]
pub struct RollingStats {
    readings: RateHistory,
    display: RateHistory,
    max_rate: u32,
    /// `None` until the first sample arrives.
    min_rate: Option<u32>,
    avg_rate: u32,
}

impl RollingStats {
    pub fn new() -> Self {
        Self {
            readings: RateHistory::with_capacity(READING_HISTORY_CAPACITY),
            display: RateHistory::with_capacity(DISPLAY_HISTORY_CAPACITY),
            max_rate: 0,
            min_rate: None,
            avg_rate: 0,
        }
    }

    /// Record one rate sample.
    ///
    /// The average is recomputed over the whole bounded reading history on
    /// every call rather than maintained as a running sum.
    pub fn record_sample(&mut self, rate: u32) {
        self.readings.push(rate);

        self.max_rate = self.max_rate.max(rate);
        self.min_rate = Some(match self.min_rate {
            Some(min) => min.min(rate),
            None => rate,
        });

        if let Some(avg) = self.readings.rounded_mean() {
            self.avg_rate = avg;
        }

        self.display.push(rate);
    }

    /// Highest rate seen, 0 before any sample.
    pub fn max_rate(&self) -> u32 {
        self.max_rate
    }

    /// Lowest rate seen, with the "no samples yet" state reported as 0.
    pub fn min_rate(&self) -> u32 {
        self.min_rate.unwrap_or(0)
    }

    /// Lowest rate seen, `None` before any sample.
    pub fn min_rate_raw(&self) -> Option<u32> {
        self.min_rate
    }

    /// Rounded average over the reading history, 0 before any sample.
    pub fn avg_rate(&self) -> u32 {
        self.avg_rate
    }

    /// Full reading history (up to 1000 samples).
    pub fn readings(&self) -> &RateHistory {
        &self.readings
    }

    /// Display history (up to 60 samples).
    pub fn display_history(&self) -> &RateHistory {
        &self.display
    }

    /// The readings that feed the stability score.
    pub fn stability_window(&self) -> Vec<u32> {
        self.readings.tail(STABILITY_WINDOW)
    }

    /// Return to the initial sentinel state.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for RollingStats {
    fn default() -> Self {
        Self::new()
    }
}
