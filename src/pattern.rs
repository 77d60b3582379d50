//! Test patterns and the rate-display subscription tied to the active one.
//!
//! Only the frame-rate screen keeps a periodic display task alive. The
//! switcher owns at most one such task and always cancels it before
//! establishing the next pattern, so a stale task can never write into a
//! screen that is gone.

use crate::chart::{render_rate_chart, RasterCanvas};
use crate::display::{publish_rate_panel, publish_tests_completed, DisplaySurface};
use crate::recommend::recommendations;
use crate::session::Session;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Every screen the tester can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TestPattern {
    Home,
    Fps,
    DeadPixels,
    Stripes,
    Gradient,
    Contrast,
    Colors,
    Motion,
    Uniformity,
    Response,
    ViewingAngle,
    Grid,
    Statistics,
    Settings,
    Gamma,
    ColorAccuracy,
    BacklightBleed,
    Reports,
    Recommendations,
    Calibration,
}

impl TestPattern {
    pub const ALL: [TestPattern; 20] = [
        TestPattern::Home,
        TestPattern::Fps,
        TestPattern::DeadPixels,
        TestPattern::Stripes,
        TestPattern::Gradient,
        TestPattern::Contrast,
        TestPattern::Colors,
        TestPattern::Motion,
        TestPattern::Uniformity,
        TestPattern::Response,
        TestPattern::ViewingAngle,
        TestPattern::Grid,
        TestPattern::Statistics,
        TestPattern::Settings,
        TestPattern::Gamma,
        TestPattern::ColorAccuracy,
        TestPattern::BacklightBleed,
        TestPattern::Reports,
        TestPattern::Recommendations,
        TestPattern::Calibration,
    ];

    /// Screen tests; opening one counts toward the tests-completed total.
    pub fn counts_toward_progress(&self) -> bool {
        !matches!(
            self,
            TestPattern::Home
                | TestPattern::Statistics
                | TestPattern::Settings
                | TestPattern::Reports
                | TestPattern::Recommendations
        )
    }

    /// Whether the screen shows the live rate panel and chart.
    pub fn shows_rate_panel(&self) -> bool {
        matches!(self, TestPattern::Fps)
    }

    /// The screen tests in menu order.
    pub fn screen_tests() -> Vec<TestPattern> {
        Self::ALL
            .iter()
            .copied()
            .filter(TestPattern::counts_toward_progress)
            .collect()
    }
}

/// State shared between the host's timers and the display subscription.
pub struct SharedTester {
    pub session: RwLock<Session>,
    pub display: Mutex<Box<dyn DisplaySurface + Send>>,
    pub chart: Mutex<RasterCanvas>,
}

impl SharedTester {
    pub fn new(
        session: Session,
        display: Box<dyn DisplaySurface + Send>,
        chart: RasterCanvas,
    ) -> Self {
        Self {
            session: RwLock::new(session),
            display: Mutex::new(display),
            chart: Mutex::new(chart),
        }
    }
}

/// Owned handle over the periodic rate-panel task.
///
/// Dropping the handle aborts the task.
#[derive(Debug)]
pub struct DisplaySubscription {
    handle: Option<JoinHandle<()>>,
}

impl DisplaySubscription {
    /// Start republishing the rate panel and chart every `period`.
    pub fn start(shared: Arc<SharedTester>, period: Duration) -> Self {
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                let session = shared.session.read().await;
                {
                    let mut display = shared.display.lock().await;
                    publish_rate_panel(&mut **display, &session);
                }
                let mut chart = shared.chart.lock().await;
                render_rate_chart(&mut *chart, &session.stats().display_history().to_vec());
            }
        });
        Self {
            handle: Some(handle),
        }
    }

    /// Whether the task is still running.
    pub fn is_active(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Abort the task and wait until it has stopped.
    ///
    /// Returns `true` if the task was still running when cancelled.
    pub async fn cancel(mut self) -> bool {
        match self.handle.take() {
            Some(handle) => {
                handle.abort();
                matches!(handle.await, Err(e) if e.is_cancelled())
            }
            None => false,
        }
    }
}

impl Drop for DisplaySubscription {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

/// Tracks the active pattern and its display subscription.
pub struct PatternSwitcher {
    shared: Arc<SharedTester>,
    period: Duration,
    current: TestPattern,
    subscription: Option<DisplaySubscription>,
}

impl PatternSwitcher {
    /// Start on the home screen with no subscription.
    pub fn new(shared: Arc<SharedTester>, period: Duration) -> Self {
        Self {
            shared,
            period,
            current: TestPattern::Home,
            subscription: None,
        }
    }

    pub fn current(&self) -> TestPattern {
        self.current
    }

    pub fn has_subscription(&self) -> bool {
        self.subscription
            .as_ref()
            .is_some_and(DisplaySubscription::is_active)
    }

    /// Open `pattern`.
    ///
    /// The prior subscription is cancelled first; screen tests then bump
    /// the tests-completed counter, and the rate screen gets a fresh
    /// subscription.
    pub async fn switch_to(&mut self, pattern: TestPattern) {
        self.cancel_subscription().await;
        self.current = pattern;
        info!(?pattern, "Switched test pattern");

        if pattern.counts_toward_progress() {
            let mut session = self.shared.session.write().await;
            session.record_test_completed();
            let mut display = self.shared.display.lock().await;
            publish_tests_completed(&mut **display, &session);
        }

        if pattern == TestPattern::Recommendations {
            let session = self.shared.session.read().await;
            for item in recommendations(&session) {
                info!(
                    priority = ?item.priority,
                    action = ?item.action,
                    "{}: {}",
                    item.title,
                    item.description
                );
            }
        }

        if pattern.shows_rate_panel() {
            self.subscription = Some(DisplaySubscription::start(
                Arc::clone(&self.shared),
                self.period,
            ));
        }
    }

    /// Leave the current screen (exit button or Escape).
    pub async fn go_home(&mut self) {
        self.cancel_subscription().await;
        if self.current != TestPattern::Home {
            self.current = TestPattern::Home;
            info!("Returned to home screen");
        }
    }

    async fn cancel_subscription(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            let was_running = subscription.cancel().await;
            debug!(was_running, "Rate display subscription cancelled");
        }
    }
}
