//! Display slots and the publishers that fill them.
//!
//! The core never owns a UI; it writes text (and optionally a colour) into
//! named slots of whatever surface the host provides. A surface that lacks
//! a slot ignores the write.

use crate::quality::QualityTier;
use crate::session::{SampleUpdate, Session, SessionClock};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::time::Instant;
use tracing::debug;

/// Named places the core writes values into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DisplaySlot {
    /// Header rate readout, updated every sample.
    Rate,
    /// Large readout on the rate test screen.
    BigRate,
    MaxRate,
    MinRate,
    AvgRate,
    QualityScore,
    QualityTrend,
    RateTrend,
    SessionTime,
    SessionProgress,
    TestsCompleted,
}

impl DisplaySlot {
    pub const ALL: [DisplaySlot; 11] = [
        DisplaySlot::Rate,
        DisplaySlot::BigRate,
        DisplaySlot::MaxRate,
        DisplaySlot::MinRate,
        DisplaySlot::AvgRate,
        DisplaySlot::QualityScore,
        DisplaySlot::QualityTrend,
        DisplaySlot::RateTrend,
        DisplaySlot::SessionTime,
        DisplaySlot::SessionProgress,
        DisplaySlot::TestsCompleted,
    ];
}

/// A host surface with named display slots.
pub trait DisplaySurface {
    /// Replace the text of `slot`. Missing slots are a silent no-op.
    fn write_slot(&mut self, slot: DisplaySlot, text: &str);

    /// Set the accent colour of `slot`.
    fn set_color(&mut self, _slot: DisplaySlot, _color: &str) {}
}

/// Surface that keeps slot contents in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryDisplay {
    /// Slots that exist on this surface; `None` means all of them.
    present: Option<HashSet<DisplaySlot>>,
    texts: HashMap<DisplaySlot, String>,
    colors: HashMap<DisplaySlot, String>,
}

impl MemoryDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// A surface that only has the given slots.
    pub fn with_slots(slots: &[DisplaySlot]) -> Self {
        Self {
            present: Some(slots.iter().copied().collect()),
            ..Self::default()
        }
    }

    pub fn text(&self, slot: DisplaySlot) -> Option<&str> {
        self.texts.get(&slot).map(String::as_str)
    }

    pub fn color(&self, slot: DisplaySlot) -> Option<&str> {
        self.colors.get(&slot).map(String::as_str)
    }

    fn has_slot(&self, slot: DisplaySlot) -> bool {
        match &self.present {
            Some(present) => present.contains(&slot),
            None => true,
        }
    }
}

impl DisplaySurface for MemoryDisplay {
    fn write_slot(&mut self, slot: DisplaySlot, text: &str) {
        if self.has_slot(slot) {
            self.texts.insert(slot, text.to_string());
        }
    }

    fn set_color(&mut self, slot: DisplaySlot, color: &str) {
        if self.has_slot(slot) {
            self.colors.insert(slot, color.to_string());
        }
    }
}

/// Surface that reports every write as a `debug!` event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDisplay;

impl DisplaySurface for TracingDisplay {
    fn write_slot(&mut self, slot: DisplaySlot, text: &str) {
        debug!(?slot, text, "Display update");
    }
}

/// Colour band of the large rate readout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RateTier {
    High,
    Medium,
    Low,
}

impl RateTier {
    pub fn from_rate(rate: u32) -> Self {
        if rate >= 350 {
            RateTier::High
        } else if rate >= 200 {
            RateTier::Medium
        } else {
            RateTier::Low
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            RateTier::High => "#00ff88",
            RateTier::Medium => "#ffaa00",
            RateTier::Low => "#ff4444",
        }
    }
}

/// Verdict on the best rate reached in a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Achievement {
    Excellent,
    Good,
    NeedsAttention,
}

impl Achievement {
    pub fn from_max_rate(max_rate: u32) -> Self {
        match RateTier::from_rate(max_rate) {
            RateTier::High => Achievement::Excellent,
            RateTier::Medium => Achievement::Good,
            RateTier::Low => Achievement::NeedsAttention,
        }
    }
}

/// Header values refreshed whenever a sampling window closes.
pub fn publish_sample<D: DisplaySurface + ?Sized>(surface: &mut D, update: &SampleUpdate) {
    surface.write_slot(DisplaySlot::Rate, &update.rate.to_string());

    let tier = QualityTier::from_score(update.quality);
    surface.write_slot(DisplaySlot::QualityScore, &format!("{}%", update.quality));
    surface.set_color(DisplaySlot::QualityScore, tier.color());
    surface.write_slot(DisplaySlot::QualityTrend, tier.glyph());

    if let Some(trend) = update.trend {
        surface.write_slot(DisplaySlot::RateTrend, trend.glyph());
    }
}

/// Values of the rate test screen, refreshed by its display subscription.
pub fn publish_rate_panel<D: DisplaySurface + ?Sized>(surface: &mut D, session: &Session) {
    let rate = session.current_rate();
    surface.write_slot(DisplaySlot::BigRate, &rate.to_string());
    surface.set_color(DisplaySlot::BigRate, RateTier::from_rate(rate).color());

    let stats = session.stats();
    surface.write_slot(DisplaySlot::MaxRate, &stats.max_rate().to_string());
    surface.write_slot(DisplaySlot::MinRate, &stats.min_rate().to_string());
    surface.write_slot(DisplaySlot::AvgRate, &stats.avg_rate().to_string());
}

pub fn publish_clock<D: DisplaySurface + ?Sized>(surface: &mut D, clock: &SessionClock, now: Instant) {
    surface.write_slot(DisplaySlot::SessionTime, &clock.format_elapsed_at(now));
}

pub fn publish_progress<D: DisplaySurface + ?Sized>(
    surface: &mut D,
    clock: &SessionClock,
    now: Instant,
) {
    let percent = clock.progress_percent_at(now);
    surface.write_slot(DisplaySlot::SessionProgress, &format!("{:.1}%", percent));
}

pub fn publish_tests_completed<D: DisplaySurface + ?Sized>(surface: &mut D, session: &Session) {
    surface.write_slot(
        DisplaySlot::TestsCompleted,
        &session.tests_completed().to_string(),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trend::Trend;
    use std::time::Duration;
    use time::macros::datetime;

    #[test]
    fn test_publish_sample_writes_header() {
        let mut display = MemoryDisplay::new();
        let update = SampleUpdate {
            rate: 372,
            quality: 75,
            trend: Some(Trend::Down),
        };
        publish_sample(&mut display, &update);

        assert_eq!(display.text(DisplaySlot::Rate), Some("372"));
        assert_eq!(display.text(DisplaySlot::QualityScore), Some("75%"));
        assert_eq!(display.color(DisplaySlot::QualityScore), Some("#ffaa00"));
        assert_eq!(display.text(DisplaySlot::QualityTrend), Some("→"));
        assert_eq!(display.text(DisplaySlot::RateTrend), Some("↓"));
    }

    #[test]
    fn test_missing_trend_keeps_previous_glyph() {
        let mut display = MemoryDisplay::new();
        display.write_slot(DisplaySlot::RateTrend, "↑");
        let update = SampleUpdate {
            rate: 0,
            quality: 28,
            trend: None,
        };
        publish_sample(&mut display, &update);
        assert_eq!(display.text(DisplaySlot::RateTrend), Some("↑"));
    }

    #[test]
    fn test_rate_panel_reports_zero_min_before_samples() {
        let mut display = MemoryDisplay::new();
        let session = Session::new();
        publish_rate_panel(&mut display, &session);

        assert_eq!(display.text(DisplaySlot::BigRate), Some("0"));
        assert_eq!(display.color(DisplaySlot::BigRate), Some("#ff4444"));
        assert_eq!(display.text(DisplaySlot::MinRate), Some("0"));
        assert_eq!(display.text(DisplaySlot::MaxRate), Some("0"));
        assert_eq!(display.text(DisplaySlot::AvgRate), Some("0"));
    }

    #[test]
    fn test_absent_slots_are_ignored() {
        let mut display = MemoryDisplay::with_slots(&[DisplaySlot::Rate]);
        let update = SampleUpdate {
            rate: 390,
            quality: 95,
            trend: Some(Trend::Up),
        };
        publish_sample(&mut display, &update);

        assert_eq!(display.text(DisplaySlot::Rate), Some("390"));
        assert_eq!(display.text(DisplaySlot::QualityScore), None);
        assert_eq!(display.color(DisplaySlot::QualityScore), None);
    }

    #[test]
    fn test_clock_and_progress() {
        let start = Instant::now();
        let clock = SessionClock::starting_at(start, datetime!(2024-01-15 10:30:00 UTC));
        let mut display = MemoryDisplay::new();

        publish_clock(&mut display, &clock, start + Duration::from_secs(754));
        publish_progress(&mut display, &clock, start + Duration::from_secs(900));

        assert_eq!(display.text(DisplaySlot::SessionTime), Some("12:34"));
        assert_eq!(display.text(DisplaySlot::SessionProgress), Some("25.0%"));
    }

    #[test]
    fn test_rate_tiers_and_achievement() {
        assert_eq!(RateTier::from_rate(390), RateTier::High);
        assert_eq!(RateTier::from_rate(350), RateTier::High);
        assert_eq!(RateTier::from_rate(349), RateTier::Medium);
        assert_eq!(RateTier::from_rate(200), RateTier::Medium);
        assert_eq!(RateTier::from_rate(199), RateTier::Low);

        assert_eq!(Achievement::from_max_rate(400), Achievement::Excellent);
        assert_eq!(Achievement::from_max_rate(250), Achievement::Good);
        assert_eq!(Achievement::from_max_rate(60), Achievement::NeedsAttention);
    }

    #[test]
    fn test_tracing_display_accepts_writes() {
        let mut display = TracingDisplay;
        publish_tests_completed(&mut display, &Session::new());
    }
}
