//! Monitor tester host - drives the tester core headlessly.
//!
//! Tokio timers stand in for the browser: one task delivers animation-frame
//! ticks, others refresh the session clock and progress readouts, and a
//! playlist task walks through the test patterns.

use monitor_tester::chart::RasterCanvas;
use monitor_tester::config::{app_config_dir, Config, ConfigManager};
use monitor_tester::display::{
    publish_clock, publish_progress, publish_sample, Achievement, TracingDisplay,
};
use monitor_tester::error::TesterError;
use monitor_tester::logging;
use monitor_tester::pattern::{PatternSwitcher, SharedTester};
use monitor_tester::session::Session;
use monitor_tester::settings::SettingsStore;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{error, info};

/// Graceful shutdown timeout in seconds
const SHUTDOWN_TIMEOUT_SECS: u64 = 2;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _log_guard = logging::init_logging().map_err(|e| {
        eprintln!("Failed to initialize logging: {}", e);
        e
    })?;

    info!("Monitor tester starting...");

    let result = run_tester().await;

    match &result {
        Ok(()) => info!("Monitor tester shut down gracefully"),
        Err(e) => error!("Monitor tester error: {}", e),
    }

    result.map_err(Into::into)
}

async fn run_tester() -> Result<(), TesterError> {
    let config_path = ConfigManager::default_path();
    let config_manager = ConfigManager::load_or_default(&config_path)?;
    info!("Configuration loaded from {:?}", config_path);
    let config = config_manager.get();

    let settings_store = SettingsStore::in_dir(&app_config_dir());
    let settings = settings_store.load();

    let shared = Arc::new(SharedTester::new(
        Session::new(),
        Box::new(TracingDisplay),
        RasterCanvas::chart()?,
    ));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let signal_tx = shutdown_tx.clone();
    tokio::spawn(async move {
        if let Err(e) = setup_signal_handlers(signal_tx).await {
            error!("Signal handler error: {}", e);
        }
    });

    let frame_handle = tokio::spawn(run_frame_ticks(
        Arc::clone(&shared),
        config.frame_interval(),
        shutdown_rx.clone(),
    ));
    let clock_handle = tokio::spawn(run_session_clock(
        Arc::clone(&shared),
        config.session_clock_interval(),
        shutdown_rx.clone(),
    ));
    let progress_handle = tokio::spawn(run_progress(
        Arc::clone(&shared),
        config.progress_interval(),
        shutdown_rx.clone(),
    ));
    let playlist_handle = tokio::spawn(run_playlist(
        Arc::clone(&shared),
        config.clone(),
        shutdown_rx.clone(),
    ));

    info!(
        patterns = config.playlist.len(),
        frame_rate_hz = config.host_frame_rate_hz,
        "Monitor tester running"
    );

    let mut main_rx = shutdown_rx.clone();
    main_rx.changed().await.ok();

    info!("Shutdown signal received, stopping tasks...");

    let shutdown_timeout = Duration::from_secs(SHUTDOWN_TIMEOUT_SECS);
    let _ = tokio::time::timeout(shutdown_timeout, async {
        let _ = tokio::join!(frame_handle, clock_handle, progress_handle, playlist_handle);
    })
    .await;

    settings_store.save(&settings);

    let session = shared.session.read().await;
    let snapshot = session.snapshot()?;
    info!(
        achievement = ?Achievement::from_max_rate(snapshot.max_rate),
        quality = session.quality_score(),
        "Session results:\n{}",
        snapshot.to_json_pretty()?
    );

    Ok(())
}

/// Set up signal handlers for graceful shutdown.
/// Handles SIGTERM and SIGINT
#[cfg(unix)]
async fn setup_signal_handlers(
    shutdown_tx: watch::Sender<bool>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    tokio::select! {
        _ = sigterm.recv() => {
            info!("Received SIGTERM");
        }
        _ = sigint.recv() => {
            info!("Received SIGINT");
        }
    }

    let _ = shutdown_tx.send(true);
    Ok(())
}

/// Ctrl+C handler for non-Unix platforms
#[cfg(not(unix))]
async fn setup_signal_handlers(
    shutdown_tx: watch::Sender<bool>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tokio::signal::ctrl_c().await?;
    info!("Received Ctrl+C");
    let _ = shutdown_tx.send(true);
    Ok(())
}

/// Deliver one frame tick per interval, standing in for the animation-frame callback.
async fn run_frame_ticks(
    shared: Arc<SharedTester>,
    frame_interval: Duration,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(frame_interval);
    // A stalled host loses frames, it does not replay them
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = shutdown_rx.changed() => {
                if *shutdown_rx.borrow() {
                    info!("Frame ticks stopping");
                    break;
                }
            }
            _ = ticker.tick() => {
                let update = shared.session.write().await.on_frame_tick();
                if let Some(update) = update {
                    let mut display = shared.display.lock().await;
                    publish_sample(&mut **display, &update);
                }
            }
        }
    }
}

async fn run_session_clock(
    shared: Arc<SharedTester>,
    period: Duration,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(period);
    loop {
        tokio::select! {
            _ = shutdown_rx.changed() => {
                if *shutdown_rx.borrow() {
                    break;
                }
            }
            _ = ticker.tick() => {
                let clock = *shared.session.read().await.clock();
                let mut display = shared.display.lock().await;
                publish_clock(&mut **display, &clock, Instant::now());
            }
        }
    }
}

async fn run_progress(
    shared: Arc<SharedTester>,
    period: Duration,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(period);
    loop {
        tokio::select! {
            _ = shutdown_rx.changed() => {
                if *shutdown_rx.borrow() {
                    break;
                }
            }
            _ = ticker.tick() => {
                let clock = *shared.session.read().await.clock();
                let mut display = shared.display.lock().await;
                publish_progress(&mut **display, &clock, Instant::now());
            }
        }
    }
}

/// Walk the playlist, dwelling on each pattern, then return home.
async fn run_playlist(
    shared: Arc<SharedTester>,
    config: Config,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let mut switcher = PatternSwitcher::new(shared, config.rate_display_interval());

    for pattern in &config.playlist {
        switcher.switch_to(*pattern).await;

        tokio::select! {
            _ = shutdown_rx.changed() => {
                if *shutdown_rx.borrow() {
                    break;
                }
            }
            _ = tokio::time::sleep(config.pattern_dwell()) => {}
        }
    }

    switcher.go_home().await;
    info!("Playlist finished");
}
