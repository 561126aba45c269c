use crate::error::{DriverError, Result};
use crate::generators::{RandomMode, Waveform, MAX_INTEGER_CHANNELS};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CHANNELS: usize = 10;
pub const DEFAULT_CONSUMER: &str = "./graphing";
pub const DEFAULT_LOG_FILE: &str = "dump.txt";
pub const DEFAULT_INTERVAL_MS: u64 = 1;
pub const DEFAULT_SHUTDOWN_TIMEOUT_MS: u64 = 3000;

/// Run-wide settings for one driver session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Total values per frame, special channels included
    pub channels: usize,

    /// Consumer program; receives `channels` as its first argument
    pub consumer: PathBuf,

    /// Extra arguments passed after the channel count
    pub consumer_args: Vec<String>,

    /// Where the consumer's stderr is written
    pub log_file: PathBuf,

    pub interval_ms: u64,
    pub shutdown_timeout_ms: u64,

    /// Stop after this many frames; unlimited when absent
    pub frame_limit: Option<u64>,

    pub random_mode: RandomMode,
    pub seed: Option<u64>,

    /// Send `exit` to the consumer on an external stop
    pub send_exit_command: bool,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            channels: DEFAULT_CHANNELS,
            consumer: PathBuf::from(DEFAULT_CONSUMER),
            consumer_args: Vec::new(),
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            interval_ms: DEFAULT_INTERVAL_MS,
            shutdown_timeout_ms: DEFAULT_SHUTDOWN_TIMEOUT_MS,
            frame_limit: None,
            random_mode: RandomMode::Float,
            seed: None,
            send_exit_command: true,
        }
    }
}

impl DriverConfig {
    /// Build from a JSON object. Missing keys keep their defaults.
    pub fn from_json(config: Value) -> Result<Self> {
        let config: Self = serde_json::from_value(config)
            .map_err(|e| DriverError::Configuration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let config = Self::load_file(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a JSON config file without validating it, so callers can layer
    /// overrides on top before calling [`DriverConfig::validate`].
    pub fn load_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            DriverError::Configuration(format!("cannot read {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&text).map_err(|e| {
            DriverError::Configuration(format!("cannot parse {}: {}", path.display(), e))
        })
    }

    pub fn validate(&self) -> Result<()> {
        validate_channels(self.channels, self.random_mode)?;
        if self.shutdown_timeout_ms == 0 {
            return Err(DriverError::Configuration(
                "shutdown timeout must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms)
    }
}

/// Reject channel counts that cannot hold the special catalog, or that ask
/// for more distinct integers than the smallest amplitude allows.
pub fn validate_channels(channels: usize, mode: RandomMode) -> Result<()> {
    let special = Waveform::CATALOG.len();
    if channels < special {
        return Err(DriverError::Configuration(format!(
            "channel count {} is smaller than the {} special channels",
            channels, special
        )));
    }
    if mode == RandomMode::Integer && channels - special > MAX_INTEGER_CHANNELS {
        return Err(DriverError::Configuration(format!(
            "integer mode supports at most {} random channels, got {}",
            MAX_INTEGER_CHANNELS,
            channels - special
        )));
    }
    Ok(())
}
