//! Error types
//!
//! Physical mishaps (falling off, spinning out) are never errors; they end
//! the session with a failure outcome instead.

use thiserror::Error;

/// Why a spawn request was turned down. A failed spawn changes nothing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpawnError {
    /// The picked catalog entry's visual resource is not loaded yet
    #[error("asset '{key}' is not ready")]
    AssetUnavailable {
        /// Catalog key of the entry that was picked
        key: String,
    },

    /// Spawn requested while no session is running
    #[error("no session is running")]
    NotPlaying,

    /// Catalog has no entries to pick from
    #[error("asset catalog is empty")]
    EmptyCatalog,
}

/// Settings could not be loaded or are out of range
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("failed to read settings: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed settings JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid setting '{field}': {reason}")]
    Invalid {
        field: &'static str,
        reason: String,
    },
}

impl SettingsError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}
