//! Observable sync state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle of the most recent sync operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    #[default]
    Idle,
    Syncing,
    Success,
    Error,
}

/// Last-known sync outcome, kept available for display at all times.
///
/// Mutated only by the sync service; subscribers receive value snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncState {
    pub status: SyncStatus,
    /// Instant of the last successful sync, if any.
    pub last_sync: Option<DateTime<Utc>>,
    /// Message of the last failure, cleared when a new operation starts.
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let state = SyncState::default();
        assert_eq!(state.status, SyncStatus::Idle);
        assert!(state.last_sync.is_none());
        assert!(state.error.is_none());
    }

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&SyncStatus::Syncing).unwrap(),
            "\"syncing\""
        );
    }
}
