//! Rate trend indicator.
//!
//! Compares the mean of the last five display samples against the sample
//! just before them, with a ±5% band so noise does not flip the arrow.

use serde::{Deserialize, Serialize};

/// Number of most recent samples averaged for the comparison.
const RECENT_WINDOW: usize = 5;

const RISE_FACTOR: f64 = 1.05;
const FALL_FACTOR: f64 = 0.95;

/// Direction of the frame rate over the last few samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Flat,
}

impl Trend {
    pub fn glyph(&self) -> &'static str {
        match self {
            Trend::Up => "↑",
            Trend::Down => "↓",
            Trend::Flat => "→",
        }
    }
}

/// Estimate the trend over a display history.
///
/// Returns `None` with fewer than two samples; callers keep whatever they
/// showed before. A missing or zero reference sample compares the recent
/// mean against itself, which reads as [`Trend::Flat`].
pub fn estimate_trend(history: &[u32]) -> Option<Trend> {
    if history.len() < 2 {
        return None;
    }

    let recent = &history[history.len().saturating_sub(RECENT_WINDOW)..];
    let recent_avg = recent.iter().map(|&s| f64::from(s)).sum::<f64>() / recent.len() as f64;

    let prior = history
        .len()
        .checked_sub(RECENT_WINDOW + 1)
        .map(|idx| history[idx])
        .filter(|&s| s != 0)
        .map(f64::from)
        .unwrap_or(recent_avg);

    let trend = if recent_avg > prior * RISE_FACTOR {
        Trend::Up
    } else if recent_avg < prior * FALL_FACTOR {
        Trend::Down
    } else {
        Trend::Flat
    };
    Some(trend)
}
