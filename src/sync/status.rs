//! Sync status vocabulary shared by every editable field

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Aggregate sync state of a debouncer.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum SyncStatus {
    /// An edit is queued and about to be written
    NotSynced,
    /// All known work is complete and the last write, if any, succeeded
    #[default]
    Synced,
    /// A write is in flight
    Syncing,
    /// The most recent write failed
    Error,
}

impl SyncStatus {
    /// True while local edits have not reached the server yet.
    pub fn is_dirty(&self) -> bool {
        matches!(self, Self::NotSynced | Self::Syncing)
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotSynced => write!(f, "not-synced"),
            Self::Synced => write!(f, "synced"),
            Self::Syncing => write!(f, "syncing"),
            Self::Error => write!(f, "error"),
        }
    }
}

impl FromStr for SyncStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "not-synced" | "not_synced" => Ok(Self::NotSynced),
            "synced" => Ok(Self::Synced),
            "syncing" => Ok(Self::Syncing),
            "error" => Ok(Self::Error),
            _ => Err(format!("Unknown sync status: {}", s)),
        }
    }
}
