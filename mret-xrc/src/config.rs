//! Runtime configuration for the XRC layer.

use crate::error::{XrcError, XrcResult};
use crate::events::DEFAULT_MAX_EVENTS_PER_TICK;
use crate::interface::EngineSettings;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for the XRC manager and engine start-up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct XrcConfig {
    /// Session server host.
    pub server: String,
    /// Session server port.
    pub port: u16,
    /// Directory the engine library is discovered under.
    pub engine_root: PathBuf,
    /// Group advertised sessions are scoped to.
    pub session_group: String,
    /// Maximum events dispatched per `update()`.
    pub max_events_per_tick: usize,
}

impl Default for XrcConfig {
    fn default() -> Self {
        Self {
            server: "127.0.0.1".to_string(),
            port: 1883,
            engine_root: PathBuf::from("."),
            session_group: "MRET".to_string(),
            max_events_per_tick: DEFAULT_MAX_EVENTS_PER_TICK,
        }
    }
}

impl XrcConfig {
    /// Loads and validates a JSON config file.
    pub fn from_file(path: impl AsRef<Path>) -> XrcResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Parses and validates a JSON config. Missing fields take defaults.
    pub fn from_json_str(text: &str) -> XrcResult<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> XrcResult<()> {
        if self.max_events_per_tick == 0 {
            return Err(XrcError::Config(
                "max_events_per_tick must be at least 1".to_string(),
            ));
        }
        if self.server.is_empty() {
            return Err(XrcError::Config("server must not be empty".to_string()));
        }
        Ok(())
    }

    /// Settings handed to the engine at start-up.
    #[must_use]
    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            server: self.server.clone(),
            port: self.port,
            group: self.session_group.clone(),
        }
    }
}
