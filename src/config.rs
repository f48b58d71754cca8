//! Engine configuration.
//!
//! Configuration is read once at startup and never changes afterwards. It can
//! be loaded from JSON or from `ITEMFLOW_*` environment variables.

use crate::tracking::domain::ItemKind;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Environment variable holding the fallback cleanup delay in seconds.
pub const DELETE_DELAY_ENV: &str = "ITEMFLOW_DELETE_DELAY";

/// Environment variable holding the minimal re-arm delay in milliseconds.
pub const MIN_REARM_DELAY_ENV: &str = "ITEMFLOW_MIN_REARM_DELAY_MS";

const DEFAULT_DELETE_DELAY_SECS: u64 = 86_400;
const DEFAULT_MIN_REARM_DELAY_MS: u64 = 1_000;

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The JSON document could not be parsed.
    #[error("invalid configuration JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// An environment variable held a malformed value.
    #[error("invalid value '{value}' for {key}: expected a non-negative integer")]
    InvalidValue {
        /// Offending variable name.
        key: String,
        /// Offending value.
        value: String,
    },
}

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Cleanup delay per item kind, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteDelays {
    /// Delay after a bug enters a cleanup state.
    #[serde(default = "default_delete_delay")]
    pub bug: u64,
    /// Delay after a todo enters a cleanup state.
    #[serde(default = "default_delete_delay")]
    pub todo: u64,
    /// Delay after a feature enters a cleanup state.
    #[serde(default = "default_delete_delay")]
    pub feature: u64,
    /// Delay after an idea enters a cleanup state.
    #[serde(default = "default_delete_delay")]
    pub idea: u64,
}

impl DeleteDelays {
    /// Uses the same delay for every kind.
    #[must_use]
    pub const fn uniform(seconds: u64) -> Self {
        Self {
            bug: seconds,
            todo: seconds,
            feature: seconds,
            idea: seconds,
        }
    }

    /// Returns the delay for `kind` in seconds.
    #[must_use]
    pub const fn for_kind(&self, kind: ItemKind) -> u64 {
        match kind {
            ItemKind::Bug => self.bug,
            ItemKind::Todo => self.todo,
            ItemKind::Feature => self.feature,
            ItemKind::Idea => self.idea,
        }
    }

    const fn slot_mut(&mut self, kind: ItemKind) -> &mut u64 {
        match kind {
            ItemKind::Bug => &mut self.bug,
            ItemKind::Todo => &mut self.todo,
            ItemKind::Feature => &mut self.feature,
            ItemKind::Idea => &mut self.idea,
        }
    }
}

impl Default for DeleteDelays {
    fn default() -> Self {
        Self::uniform(DEFAULT_DELETE_DELAY_SECS)
    }
}

const fn default_delete_delay() -> u64 {
    DEFAULT_DELETE_DELAY_SECS
}

const fn default_min_rearm_delay_ms() -> u64 {
    DEFAULT_MIN_REARM_DELAY_MS
}

/// Lifecycle engine configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Cleanup delays per kind.
    #[serde(default)]
    pub delete_delay_secs: DeleteDelays,
    /// Floor applied to re-armed timers during recovery.
    #[serde(default = "default_min_rearm_delay_ms")]
    pub min_rearm_delay_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            delete_delay_secs: DeleteDelays::default(),
            min_rearm_delay_ms: DEFAULT_MIN_REARM_DELAY_MS,
        }
    }
}

impl EngineConfig {
    /// Parses configuration from a JSON document. Missing fields take their
    /// defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] when the document is malformed.
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Loads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when a variable is not an
    /// integer.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration from an arbitrary variable source.
    ///
    /// Per-kind delays read `ITEMFLOW_<KIND>_DELETE_DELAY` and fall back to
    /// `ITEMFLOW_DELETE_DELAY`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when a variable is not an
    /// integer.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let fallback = parse_var(&lookup, DELETE_DELAY_ENV)?.unwrap_or(DEFAULT_DELETE_DELAY_SECS);
        let mut delays = DeleteDelays::uniform(fallback);
        for kind in ItemKind::ALL {
            let key = kind_delay_key(kind);
            if let Some(seconds) = parse_var(&lookup, &key)? {
                *delays.slot_mut(kind) = seconds;
            }
        }
        let min_rearm_delay_ms =
            parse_var(&lookup, MIN_REARM_DELAY_ENV)?.unwrap_or(DEFAULT_MIN_REARM_DELAY_MS);
        Ok(Self {
            delete_delay_secs: delays,
            min_rearm_delay_ms,
        })
    }

    /// Returns the cleanup delay for `kind`.
    #[must_use]
    pub const fn delete_delay(&self, kind: ItemKind) -> Duration {
        Duration::from_secs(self.delete_delay_secs.for_kind(kind))
    }

    /// Returns the floor applied to re-armed timers.
    #[must_use]
    pub const fn min_rearm_delay(&self) -> Duration {
        Duration::from_millis(self.min_rearm_delay_ms)
    }
}

/// Returns the per-kind delay variable name, such as
/// `ITEMFLOW_BUG_DELETE_DELAY`.
#[must_use]
pub fn kind_delay_key(kind: ItemKind) -> String {
    format!("ITEMFLOW_{}_DELETE_DELAY", kind.as_str().to_ascii_uppercase())
}

fn parse_var<F>(lookup: &F, key: &str) -> ConfigResult<Option<u64>>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    raw.trim()
        .parse::<u64>()
        .map(Some)
        .map_err(|_| ConfigError::InvalidValue {
            key: key.to_owned(),
            value: raw,
        })
}
