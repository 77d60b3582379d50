//! Configuration module for the headless tester host.
//!
//! This module handles loading, saving, and validating the timer cadences
//! and pattern playlist the host binary runs with.

use crate::error::ConfigError;
use crate::pattern::TestPattern;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use std::time::Duration;

/// Highest animation-frame cadence the host will simulate.
const MAX_HOST_FRAME_RATE_HZ: u32 = 1000;

/// Host configuration.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Cadence of simulated animation-frame callbacks.
    pub host_frame_rate_hz: u32,
    /// Period of the rate-panel display subscription.
    pub rate_display_interval_ms: u64,
    /// Period of the session clock readout.
    pub session_clock_interval_ms: u64,
    /// Period of the session progress indicator.
    pub progress_interval_ms: u64,
    /// Time spent on each playlist entry.
    pub pattern_dwell_ms: u64,
    /// Patterns the host walks through, in order.
    pub playlist: Vec<TestPattern>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host_frame_rate_hz: 390,
            rate_display_interval_ms: 100,
            session_clock_interval_ms: 1000,
            progress_interval_ms: 100,
            pattern_dwell_ms: 3000,
            playlist: TestPattern::screen_tests(),
        }
    }
}

impl Config {
    /// Validate configuration values.
    /// Returns Ok(()) if valid, Err with descriptive message if invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host_frame_rate_hz == 0 || self.host_frame_rate_hz > MAX_HOST_FRAME_RATE_HZ {
            return Err(ConfigError::ValidationError(format!(
                "host_frame_rate_hz ({}) must be between 1 and {}",
                self.host_frame_rate_hz, MAX_HOST_FRAME_RATE_HZ
            )));
        }

        let intervals = [
            ("rate_display_interval_ms", self.rate_display_interval_ms),
            ("session_clock_interval_ms", self.session_clock_interval_ms),
            ("progress_interval_ms", self.progress_interval_ms),
            ("pattern_dwell_ms", self.pattern_dwell_ms),
        ];
        for (name, value) in intervals {
            if value == 0 {
                return Err(ConfigError::ValidationError(format!(
                    "{} must be greater than zero",
                    name
                )));
            }
        }

        if self.playlist.is_empty() {
            return Err(ConfigError::ValidationError(
                "playlist must contain at least one pattern".to_string(),
            ));
        }

        Ok(())
    }

    /// Interval between simulated frame callbacks.
    pub fn frame_interval(&self) -> Duration {
        Duration::from_nanos(1_000_000_000 / u64::from(self.host_frame_rate_hz.max(1)))
    }

    pub fn rate_display_interval(&self) -> Duration {
        Duration::from_millis(self.rate_display_interval_ms)
    }

    pub fn session_clock_interval(&self) -> Duration {
        Duration::from_millis(self.session_clock_interval_ms)
    }

    pub fn progress_interval(&self) -> Duration {
        Duration::from_millis(self.progress_interval_ms)
    }

    pub fn pattern_dwell(&self) -> Duration {
        Duration::from_millis(self.pattern_dwell_ms)
    }
}

/// Configuration manager with file I/O.
pub struct ConfigManager {
    config: RwLock<Config>,
    path: PathBuf,
}

impl ConfigManager {
    /// Load configuration from file or use defaults.
    /// If the file doesn't exist, returns a manager with default config.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        let config = if path.exists() {
            let contents = fs::read_to_string(path).map_err(|e| {
                ConfigError::ParseError(format!("Failed to read config file: {}", e))
            })?;

            let config: Config = serde_json::from_str(&contents)
                .map_err(|e| ConfigError::ParseError(format!("Invalid JSON: {}", e)))?;

            config.validate()?;
            config
        } else {
            Config::default()
        };

        Ok(Self {
            config: RwLock::new(config),
            path: path.to_path_buf(),
        })
    }

    /// Save configuration to file using atomic write.
    pub fn save(&self) -> Result<(), ConfigError> {
        let json = {
            let config = self.config.read().map_err(|_| {
                ConfigError::ValidationError("Failed to acquire read lock".to_string())
            })?;
            serde_json::to_string_pretty(&*config).map_err(|e| {
                ConfigError::ParseError(format!("Failed to serialize config: {}", e))
            })?
        };

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Write to a temp file, then rename over the target
        let temp_path = self.path.with_extension("json.tmp");
        {
            let mut file = fs::File::create(&temp_path)?;
            file.write_all(json.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&temp_path, &self.path)?;

        Ok(())
    }

    /// Get current configuration.
    pub fn get(&self) -> Config {
        self.config
            .read()
            .map(|c| c.clone())
            .unwrap_or_else(|_| Config::default())
    }

    /// Update configuration with validation, then persist it.
    pub fn update(&self, config: Config) -> Result<(), ConfigError> {
        config.validate()?;

        {
            let mut current = self.config.write().map_err(|_| {
                ConfigError::ValidationError("Failed to acquire write lock".to_string())
            })?;
            *current = config;
        }

        self.save()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Default config path (`<config dir>/monitor-tester/config.json`).
    pub fn default_path() -> PathBuf {
        app_config_dir().join("config.json")
    }
}

/// Per-user configuration directory of the tester.
pub fn app_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("monitor-tester")
}
