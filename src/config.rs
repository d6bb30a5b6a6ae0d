//! Configuration management

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

const APP_DIR: &str = "snapview";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Seconds between snapshot requests
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: f64,
    /// Per-request HTTP timeout
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
    /// Channels synthesized when discovery returns nothing
    #[serde(default = "default_fallback_channels")]
    pub fallback_channel_count: usize,
    #[serde(default = "default_window_width")]
    pub window_width: f32,
    #[serde(default = "default_window_height")]
    pub window_height: f32,
    /// Overrides the directory holding saved cameras
    #[serde(default)]
    pub cameras_dir: Option<PathBuf>,
}

/// Shortest polling cadence accepted, in seconds
pub const MIN_REFRESH_INTERVAL_SECS: f64 = 0.05;

fn default_refresh_interval() -> f64 { 1.0 }
fn default_timeout() -> u64 { 5 }
fn default_fallback_channels() -> usize { 32 }
fn default_window_width() -> f32 { 800.0 }
fn default_window_height() -> f32 { 600.0 }

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: 1.0,
            request_timeout_secs: 5,
            fallback_channel_count: 32,
            window_width: 800.0,
            window_height: 600.0,
            cameras_dir: None,
        }
    }
}

impl AppConfig {
    fn app_dir() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(APP_DIR);
        path
    }

    fn config_path() -> PathBuf {
        let mut path = Self::app_dir();
        fs::create_dir_all(&path).ok();
        path.push("config.json");
        path
    }

    /// Load settings, writing a default file on first run so it can be edited
    pub fn load() -> Self {
        let path = Self::config_path();

        if !path.exists() {
            let config = Self::default();
            config.save();
            return config;
        }

        if let Ok(content) = fs::read_to_string(&path) {
            match Self::from_json(&content) {
                Ok(config) => return config,
                Err(e) => log::warn!("Ignoring unreadable config {}: {}", path.display(), e),
            }
        }

        Self::default()
    }

    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    pub fn save(&self) {
        let path = Self::config_path();
        if let Ok(content) = serde_json::to_string_pretty(self) {
            let _ = fs::write(path, content);
        }
    }

    /// Directory holding one file per saved camera
    pub fn cameras_dir(&self) -> PathBuf {
        self.cameras_dir
            .clone()
            .unwrap_or_else(|| Self::app_dir().join("cameras"))
    }

    /// Polling cadence, never shorter than 50ms
    pub fn refresh_interval(&self) -> Duration {
        let secs = self.refresh_interval_secs;
        let secs = if !secs.is_finite() {
            log::warn!("Invalid refresh interval {}, using default", secs);
            default_refresh_interval()
        } else if secs < MIN_REFRESH_INTERVAL_SECS {
            log::warn!(
                "Refresh interval {}s raised to {}s",
                secs,
                MIN_REFRESH_INTERVAL_SECS
            );
            MIN_REFRESH_INTERVAL_SECS
        } else {
            secs
        };
        Duration::from_secs_f64(secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn fallback_channel_count(&self) -> usize {
        self.fallback_channel_count.max(1)
    }
}
