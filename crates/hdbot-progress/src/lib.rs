//! # hdbot-progress
//!
//! Turns a campaign snapshot into what the map and alert strip show.
//!
//! Every function here is pure: given `(snapshot, now)` it allocates a fresh
//! result and never touches shared state. Malformed input yields a
//! [`DerivationError`] naming the field, never a zero or NaN.
//!
//! ## Modules
//!
//! - [`sectors`] — per-faction sector ownership, Super Earth, the whole galaxy
//! - [`events`] — ahead/behind/on-track projection for a single event
//! - [`alerts`] — active events ordered for display
//! - [`duration`] — remaining-time text and season elapsed time
//! - [`stats`] — season-wide statistics totals

pub mod alerts;
pub mod duration;
pub mod events;
pub mod sectors;
pub mod stats;

use hdbot_types::FactionId;
use serde::Serialize;

pub use alerts::{active_alerts, Alert, AlertProgress};
pub use duration::{humanize_remaining, season_elapsed, SeasonElapsed};
pub use events::{derive_event_progress, ProgressStatus, ProgressSummary};
pub use sectors::{
    derive_galaxy, derive_sector_state, derive_super_earth, EventFlag, Front, Galaxy,
    MapPosition, SectorState, SectorStatus, SuperEarthState, SUPER_EARTH,
};
pub use stats::{statistics_totals, StatisticsTotals};

/// Error types for progress derivation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DerivationError {
    /// A field holds a value no projection can be computed from.
    #[error("cannot derive from `{field}`: {reason}")]
    InvalidField {
        /// Path of the offending field, e.g. `campaigns[0].points_max`.
        field: String,
        /// Why the value is unusable.
        reason: String,
    },

    /// The snapshot has no campaign for the requested faction.
    #[error("no campaign for faction {faction}")]
    UnknownFaction {
        /// The faction that was asked for.
        faction: FactionId,
    },
}

impl DerivationError {
    pub(crate) fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// The field the error is about.
    pub fn field(&self) -> &str {
        match self {
            Self::InvalidField { field, .. } => field,
            Self::UnknownFaction { .. } => "faction",
        }
    }
}

/// Convenience result type for derivation.
pub type Result<T> = std::result::Result<T, DerivationError>;
