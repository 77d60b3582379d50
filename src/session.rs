//! Session state: the single object that owns every piece of mutable
//! tester state and wires the sampling pipeline together.

use crate::error::ExportError;
use crate::export::ExportSnapshot;
use crate::quality::compute_score;
use crate::sampler::FrameRateSampler;
use crate::stats::RollingStats;
use crate::trend::{estimate_trend, Trend};
use std::time::{Duration, Instant};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::{debug, info};

/// Session length at which the progress indicator is full (1 hour).
pub const MAX_SESSION_DURATION: Duration = Duration::from_secs(3600);

/// Quality score shown before the first sample.
const INITIAL_QUALITY_SCORE: u8 = 100;

/// Start of the current session. Immutable; elapsed values are derived.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionClock {
    started: Instant,
    started_wall: OffsetDateTime,
}

impl SessionClock {
    pub fn new() -> Self {
        Self::starting_at(Instant::now(), OffsetDateTime::now_utc())
    }

    pub fn starting_at(started: Instant, started_wall: OffsetDateTime) -> Self {
        Self {
            started,
            started_wall,
        }
    }

    pub fn started(&self) -> Instant {
        self.started
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed_at(Instant::now())
    }

    pub fn elapsed_at(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.started)
    }

    /// Whole seconds since the session started.
    pub fn elapsed_secs_at(&self, now: Instant) -> u64 {
        self.elapsed_at(now).as_secs()
    }

    /// Session start as an RFC 3339 (ISO-8601) timestamp.
    pub fn started_at_rfc3339(&self) -> Result<String, time::error::Format> {
        self.started_wall.format(&Rfc3339)
    }

    /// Elapsed time as `MM:SS`; minutes keep counting past 59.
    pub fn format_elapsed_at(&self, now: Instant) -> String {
        let secs = self.elapsed_secs_at(now);
        format!("{:02}:{:02}", secs / 60, secs % 60)
    }

    /// Share of [`MAX_SESSION_DURATION`] elapsed, in percent, capped at 100.
    pub fn progress_percent_at(&self, now: Instant) -> f64 {
        let elapsed = self.elapsed_at(now).as_secs_f64();
        (elapsed / MAX_SESSION_DURATION.as_secs_f64() * 100.0).min(100.0)
    }
}

impl Default for SessionClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of a sampling window closing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleUpdate {
    /// Rate measured over the window.
    pub rate: u32,
    /// Recomputed quality score.
    pub quality: u8,
    /// Current trend; keeps the previous one when no estimate was possible.
    pub trend: Option<Trend>,
}

/// All mutable tester state for one session.
#[derive(Debug, Clone)]
pub struct Session {
    clock: SessionClock,
    sampler: FrameRateSampler,
    stats: RollingStats,
    current_rate: u32,
    quality_score: u8,
    rate_trend: Option<Trend>,
    tests_completed: u32,
}

impl Session {
    pub fn new() -> Self {
        Self::starting_at(Instant::now(), OffsetDateTime::now_utc())
    }

    pub fn starting_at(now: Instant, wall: OffsetDateTime) -> Self {
        Self {
            clock: SessionClock::starting_at(now, wall),
            sampler: FrameRateSampler::starting_at(now),
            stats: RollingStats::new(),
            current_rate: 0,
            quality_score: INITIAL_QUALITY_SCORE,
            rate_trend: None,
            tests_completed: 0,
        }
    }

    /// Register one animation frame.
    pub fn on_frame_tick(&mut self) -> Option<SampleUpdate> {
        self.on_frame_tick_at(Instant::now())
    }

    /// Register one animation frame with an explicit timestamp (for testing).
    pub fn on_frame_tick_at(&mut self, now: Instant) -> Option<SampleUpdate> {
        let rate = self.sampler.on_frame_tick_at(now)?;
        Some(self.ingest(rate))
    }

    /// Close an elapsed window while no frames are being delivered.
    pub fn on_idle_at(&mut self, now: Instant) -> Option<SampleUpdate> {
        let rate = self.sampler.close_window_at(now)?;
        Some(self.ingest(rate))
    }

    fn ingest(&mut self, rate: u32) -> SampleUpdate {
        self.current_rate = rate;
        self.stats.record_sample(rate);

        self.quality_score = compute_score(
            self.stats.avg_rate(),
            &self.stats.stability_window(),
            self.tests_completed,
        );

        let display = self.stats.display_history().to_vec();
        if let Some(trend) = estimate_trend(&display) {
            self.rate_trend = Some(trend);
        }

        debug!(
            rate,
            avg = self.stats.avg_rate(),
            quality = self.quality_score,
            "Rate sample recorded"
        );

        SampleUpdate {
            rate,
            quality: self.quality_score,
            trend: self.rate_trend,
        }
    }

    /// Count one finished screen test.
    pub fn record_test_completed(&mut self) {
        self.tests_completed = self.tests_completed.saturating_add(1);
        debug!(tests_completed = self.tests_completed, "Test completed");
    }

    /// Discard all session state and start over.
    pub fn reset(&mut self) {
        self.reset_at(Instant::now(), OffsetDateTime::now_utc());
    }

    pub fn reset_at(&mut self, now: Instant, wall: OffsetDateTime) {
        *self = Self::starting_at(now, wall);
        info!("Session statistics reset");
    }

    /// Snapshot for the export collaborator.
    pub fn snapshot(&self) -> Result<ExportSnapshot, ExportError> {
        self.snapshot_at(Instant::now())
    }

    pub fn snapshot_at(&self, now: Instant) -> Result<ExportSnapshot, ExportError> {
        Ok(ExportSnapshot {
            session_start: self.clock.started_at_rfc3339()?,
            session_duration_seconds: self.clock.elapsed_secs_at(now),
            tests_completed: self.tests_completed,
            max_rate: self.stats.max_rate(),
            min_rate: self.stats.min_rate(),
            avg_rate: self.stats.avg_rate(),
            current_rate: self.current_rate,
        })
    }

    pub fn clock(&self) -> &SessionClock {
        &self.clock
    }

    pub fn stats(&self) -> &RollingStats {
        &self.stats
    }

    pub fn current_rate(&self) -> u32 {
        self.current_rate
    }

    pub fn quality_score(&self) -> u8 {
        self.quality_score
    }

    pub fn rate_trend(&self) -> Option<Trend> {
        self.rate_trend
    }

    pub fn tests_completed(&self) -> u32 {
        self.tests_completed
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampler::SAMPLE_WINDOW;
    use time::macros::datetime;

    fn session_at(start: Instant) -> Session {
        Session::starting_at(start, datetime!(2024-01-15 10:30:00 UTC))
    }

    /// Deliver `frames` ticks that close exactly one window ending at `end`.
    fn feed_window(session: &mut Session, frames: u32, end: Instant) -> Option<SampleUpdate> {
        let mut update = None;
        for i in 0..frames {
            let at = if i + 1 == frames { end } else { end - SAMPLE_WINDOW / 2 };
            update = session.on_frame_tick_at(at);
        }
        update
    }

    #[test]
    fn test_new_session_state() {
        let session = session_at(Instant::now());
        assert_eq!(session.current_rate(), 0);
        assert_eq!(session.quality_score(), 100);
        assert_eq!(session.rate_trend(), None);
        assert_eq!(session.tests_completed(), 0);
        assert!(session.stats().readings().is_empty());
    }

    #[test]
    fn test_window_feeds_pipeline() {
        let start = Instant::now();
        let mut session = session_at(start);

        let update = feed_window(&mut session, 39, start + SAMPLE_WINDOW).unwrap();
        assert_eq!(update.rate, 390);
        assert_eq!(update.trend, None);
        assert_eq!(session.current_rate(), 390);
        assert_eq!(session.stats().max_rate(), 390);
        assert_eq!(session.stats().display_history().len(), 1);
        // 100*0.4 + 100*0.4 = 80, then 80*0.7 + 0 = 56
        assert_eq!(update.quality, 56);
        assert_eq!(session.quality_score(), 56);
    }

    #[test]
    fn test_trend_appears_after_two_samples() {
        let start = Instant::now();
        let mut session = session_at(start);

        feed_window(&mut session, 20, start + SAMPLE_WINDOW);
        let update = feed_window(&mut session, 30, start + SAMPLE_WINDOW * 2).unwrap();
        assert_eq!(update.trend, Some(Trend::Flat));
    }

    #[test]
    fn test_idle_window_records_zero() {
        let start = Instant::now();
        let mut session = session_at(start);

        assert_eq!(session.on_idle_at(start + SAMPLE_WINDOW / 2), None);
        let update = session.on_idle_at(start + SAMPLE_WINDOW).unwrap();
        assert_eq!(update.rate, 0);
        assert_eq!(session.stats().min_rate_raw(), Some(0));
    }

    #[test]
    fn test_tests_completed_raise_score() {
        let start = Instant::now();
        let mut session = session_at(start);
        for _ in 0..15 {
            session.record_test_completed();
        }
        let update = feed_window(&mut session, 39, start + SAMPLE_WINDOW).unwrap();
        // 80*0.7 + 100*0.3 = 86
        assert_eq!(update.quality, 86);
    }

    #[test]
    fn test_reset_clears_everything() {
        let start = Instant::now();
        let mut session = session_at(start);
        feed_window(&mut session, 39, start + SAMPLE_WINDOW);
        feed_window(&mut session, 39, start + SAMPLE_WINDOW * 2);
        session.record_test_completed();

        let later = start + Duration::from_secs(30);
        session.reset_at(later, datetime!(2024-01-15 10:31:00 UTC));

        assert_eq!(session.tests_completed(), 0);
        assert_eq!(session.current_rate(), 0);
        assert_eq!(session.quality_score(), 100);
        assert_eq!(session.rate_trend(), None);
        assert!(session.stats().readings().is_empty());
        assert!(session.stats().display_history().is_empty());
        assert_eq!(session.stats().min_rate_raw(), None);
        assert_eq!(session.clock().started(), later);
        // Sampler window restarted at the reset instant
        assert_eq!(session.on_frame_tick_at(later + SAMPLE_WINDOW / 2), None);
    }

    #[test]
    fn test_snapshot_substitutes_min_sentinel() {
        let start = Instant::now();
        let session = session_at(start);
        let snapshot = session.snapshot_at(start + Duration::from_millis(61_500)).unwrap();

        assert_eq!(snapshot.session_start, "2024-01-15T10:30:00Z");
        assert_eq!(snapshot.session_duration_seconds, 61);
        assert_eq!(snapshot.min_rate, 0);
        assert_eq!(snapshot.max_rate, 0);
        assert_eq!(snapshot.current_rate, 0);
    }

    #[test]
    fn test_snapshot_reflects_stats() {
        let start = Instant::now();
        let mut session = session_at(start);
        feed_window(&mut session, 30, start + SAMPLE_WINDOW);
        feed_window(&mut session, 10, start + SAMPLE_WINDOW * 2);
        session.record_test_completed();

        let snapshot = session.snapshot_at(start + SAMPLE_WINDOW * 2).unwrap();
        assert_eq!(snapshot.max_rate, 300);
        assert_eq!(snapshot.min_rate, 100);
        assert_eq!(snapshot.avg_rate, 200);
        assert_eq!(snapshot.current_rate, 100);
        assert_eq!(snapshot.tests_completed, 1);
    }

    #[test]
    fn test_clock_formatting() {
        let start = Instant::now();
        let clock = SessionClock::starting_at(start, datetime!(2024-01-15 10:30:00 UTC));

        assert_eq!(clock.format_elapsed_at(start), "00:00");
        assert_eq!(clock.format_elapsed_at(start + Duration::from_secs(65)), "01:05");
        assert_eq!(clock.format_elapsed_at(start + Duration::from_secs(6000)), "100:00");
    }

    #[test]
    fn test_progress_is_capped() {
        let start = Instant::now();
        let clock = SessionClock::starting_at(start, datetime!(2024-01-15 10:30:00 UTC));

        assert_eq!(clock.progress_percent_at(start), 0.0);
        assert_eq!(clock.progress_percent_at(start + Duration::from_secs(1800)), 50.0);
        assert_eq!(clock.progress_percent_at(start + Duration::from_secs(7200)), 100.0);
    }
}
