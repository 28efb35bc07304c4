//! Survey configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// Default number of full sweeps before a channel is picked.
pub const DEFAULT_NUM_REQ_SURVEYS: u32 = 10;
/// Default off-channel dwell per measurement, in milliseconds.
pub const DEFAULT_ROC_DURATION_MS: u32 = 5;

/// Tunables for one automatic channel selection run.
///
/// Short dwells and few rounds finish quickly but only see short bursts of
/// traffic; raise both for a more representative picture of each channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AcsConfig {
    /// Number of full rounds over all enabled channels.
    pub num_req_surveys: u32,
    /// Off-channel dwell duration handed to the driver.
    pub roc_duration_ms: u32,
}

impl Default for AcsConfig {
    fn default() -> Self {
        Self {
            num_req_surveys: DEFAULT_NUM_REQ_SURVEYS,
            roc_duration_ms: DEFAULT_ROC_DURATION_MS,
        }
    }
}

impl AcsConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        if self.num_req_surveys == 0 {
            return Err(ConfigError::Invalid(
                "num_req_surveys must be at least 1".to_string(),
            ));
        }
        if self.roc_duration_ms == 0 {
            return Err(ConfigError::Invalid(
                "roc_duration_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Load a JSON config file. Missing fields keep their defaults.
    pub fn load_from_path(path: &Path) -> ConfigResult<Self> {
        let config: Self = load_json(path)?;
        config.validate()?;
        Ok(config)
    }
}

/// Read and deserialize a JSON document from disk.
pub fn load_json<T: for<'de> Deserialize<'de>>(path: &Path) -> ConfigResult<T> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
