//! Dashboard configuration
//!
//! Values are layered: built-in defaults, then a YAML file, then the
//! environment (including a `.env` file), then command-line overrides.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::workflow::StageTiming;

pub const DEFAULT_BASE_URL: &str = "https://ongroundai-backend.onrender.com";

/// Environment variable overriding the backend base URL.
pub const BASE_URL_ENV: &str = "ONGROUND_BASE_URL";

const APP_NAME: &str = "onground-dashboard";

pub fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", APP_NAME)
}

/// `<config dir>/config.yaml`
pub fn default_config_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join("config.yaml"))
}

/// `<data dir>/onground-dashboard.log`
pub fn default_log_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.data_dir().join(format!("{}.log", APP_NAME)))
}

/// Simulated stage durations, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub ingest_step_ms: u64,
    pub delay_analysis_ms: u64,
    pub safety_analysis_ms: u64,
    pub report_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            ingest_step_ms: 400,
            delay_analysis_ms: 1200,
            safety_analysis_ms: 1500,
            report_ms: 2100,
        }
    }
}

impl From<TimingConfig> for StageTiming {
    fn from(timing: TimingConfig) -> Self {
        StageTiming {
            ingest_step: Duration::from_millis(timing.ingest_step_ms),
            delay_analysis: Duration::from_millis(timing.delay_analysis_ms),
            safety_analysis: Duration::from_millis(timing.safety_analysis_ms),
            report: Duration::from_millis(timing.report_ms),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub base_url: String,
    pub request_timeout_secs: u64,
    /// UI redraw and input poll interval.
    pub tick_rate_ms: u64,
    /// Log file for terminal mode; falls back to the platform data directory.
    pub log_file: Option<PathBuf>,
    pub timing: TimingConfig,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: 30,
            tick_rate_ms: 50,
            log_file: None,
            timing: TimingConfig::default(),
        }
    }
}

impl DashboardConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml).context("Failed to parse dashboard config YAML")
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_yaml_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    /// Build the effective configuration.
    ///
    /// An explicit `path` must exist; the default location is only read when
    /// present.
    pub fn load(path: Option<&Path>, base_url: Option<&str>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_yaml_file(path)?,
            None => match default_config_path() {
                Some(path) if path.exists() => Self::from_yaml_file(&path)?,
                _ => Self::default(),
            },
        };

        dotenv::dotenv().ok();
        config.apply_base_url(std::env::var(BASE_URL_ENV).ok().as_deref());
        config.apply_base_url(base_url);

        Ok(config)
    }

    /// Override the base URL when `url` is present and non-blank.
    pub fn apply_base_url(&mut self, url: Option<&str>) {
        if let Some(url) = url.map(str::trim).filter(|u| !u.is_empty()) {
            self.base_url = url.to_string();
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_rate_ms.max(1))
    }

    pub fn stage_timing(&self) -> StageTiming {
        self.timing.into()
    }

    pub fn log_path(&self) -> Option<PathBuf> {
        self.log_file.clone().or_else(default_log_path)
    }
}
