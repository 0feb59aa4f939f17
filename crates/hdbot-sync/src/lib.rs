//! # hdbot-sync
//!
//! Keeps local campaign state current and serves it cache-aside.
//!
//! - [`store`] — async handle over the SQLite snapshot store (the only writer)
//! - [`engine`] — fetch → normalize → persist, single-flight per season
//! - [`reader`] — cache-aside reads that backfill on miss
//! - [`trigger`] — the authenticated "update now" entry point used by the poller
//!
//! ## Error propagation
//!
//! Remote and store errors pass through the engine unchanged. The reader is
//! the one place that reinterprets an error: a [`ValidationError`] raised
//! while backfilling means the season does not exist upstream and becomes
//! [`SyncError::NotFound`].

pub mod engine;
mod flight;
pub mod reader;
pub mod store;
pub mod trigger;

#[cfg(test)]
mod tests_support;

use std::sync::Arc;

use hdbot_db::DbError;
use hdbot_remote::{RemoteError, ValidationError};
use hdbot_types::Season;

pub use engine::SyncEngine;
pub use reader::CampaignReader;
pub use store::SnapshotStore;
pub use trigger::{TriggerError, UpdateReport, UpdateTrigger};

/// Error types for synchronization and reads.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SyncError {
    /// Fetching from upstream failed (including payload validation).
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// The local store failed.
    #[error("store error: {0}")]
    Store(Arc<DbError>),

    /// A caller-supplied argument was malformed.
    #[error("invalid argument: {0}")]
    InvalidArgument(ValidationError),

    /// Nothing exists for the requested season, locally or upstream.
    /// `None` means no status has been fetched yet, so "current" is unknown.
    #[error("{}", not_found_message(*.season))]
    NotFound { season: Option<Season> },

    /// The in-flight update this caller was waiting on was abandoned.
    ///
    /// Resolved inside the engine by retrying; callers never see it.
    #[error("in-flight update for season {season} was abandoned")]
    Conflict { season: Season },
}

fn not_found_message(season: Option<Season>) -> String {
    match season {
        Some(s) => format!("couldn't find campaign with season {s}"),
        None => "no campaign status has been fetched yet".to_string(),
    }
}

impl From<DbError> for SyncError {
    fn from(e: DbError) -> Self {
        Self::Store(Arc::new(e))
    }
}

impl SyncError {
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Remote(RemoteError::Validation(_)))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Convenience result type for sync operations.
pub type Result<T> = std::result::Result<T, SyncError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_messages() {
        let err = SyncError::NotFound { season: Some(999) };
        assert_eq!(err.to_string(), "couldn't find campaign with season 999");
        let err = SyncError::NotFound { season: None };
        assert_eq!(err.to_string(), "no campaign status has been fetched yet");
    }

    #[test]
    fn test_store_error_wraps() {
        let err: SyncError = DbError::UnsupportedVersion { found: 2, supported: 1 }.into();
        assert!(matches!(err, SyncError::Store(_)));
        assert!(!err.is_validation());
    }

    #[test]
    fn test_validation_classification() {
        let err: SyncError = RemoteError::from(ValidationError::null("season")).into();
        assert!(err.is_validation());
        assert!(!err.is_not_found());
    }
}
