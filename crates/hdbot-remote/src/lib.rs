//! # hdbot-remote
//!
//! Client for the upstream campaign authority.
//!
//! Two resources are fetched: the campaign *status* (which season is
//! current) and a *season snapshot*. Payloads are decoded leniently
//! (numeric strings are accepted) and then checked strictly; anything that
//! does not fit the domain model is a [`ValidationError`], never a panic.
//!
//! No retry logic lives here. Callers decide retry policy.
//!
//! ## Modules
//!
//! - [`wire`] — upstream JSON shapes
//! - [`normalize`] — wire shapes to domain types
//! - [`http`] — the `reqwest` implementation of [`CampaignSource`]

pub mod http;
pub mod normalize;
pub mod wire;

use std::future::Future;

use hdbot_types::{CampaignSnapshot, Season, Status};

pub use http::HttpSource;

/// Why a payload field was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationReason {
    /// The field was `null` or absent.
    Null,
    /// The field had the wrong type or an unparseable value.
    Invalid(String),
    /// The value parsed but breaks a model invariant.
    Constraint(String),
}

impl std::fmt::Display for ValidationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Null => f.write_str("received null"),
            Self::Invalid(detail) => write!(f, "invalid value: {detail}"),
            Self::Constraint(detail) => write!(f, "constraint violated: {detail}"),
        }
    }
}

/// A structurally invalid upstream payload or request argument.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("validation failed for `{field}`: {reason}")]
pub struct ValidationError {
    /// Dotted path of the offending field, e.g. `campaigns[1].points_max`.
    pub field: String,
    pub reason: ValidationReason,
}

impl ValidationError {
    pub fn null(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: ValidationReason::Null,
        }
    }

    pub fn invalid(field: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: ValidationReason::Invalid(detail.into()),
        }
    }

    pub fn constraint(field: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: ValidationReason::Constraint(detail.into()),
        }
    }
}

/// Error types for upstream fetches.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RemoteError {
    /// Connection, DNS or transport failure.
    #[error("network error: {0}")]
    Network(String),

    /// The upstream answered with a non-2xx status.
    #[error("upstream returned HTTP {status} for {url}")]
    HttpStatus { status: u16, url: String },

    /// The request or the surrounding operation ran out of time.
    #[error("upstream request timed out")]
    Timeout,

    /// The payload arrived but does not fit the model.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl RemoteError {
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// Convenience result type for remote operations.
pub type Result<T> = std::result::Result<T, RemoteError>;

/// A normalized value together with the raw payload it came from.
///
/// The raw payload is persisted so it can be served back verbatim.
#[derive(Debug, Clone)]
pub struct Fetched<T> {
    pub value: T,
    pub raw: serde_json::Value,
}

/// Source of authoritative campaign data.
///
/// Implementors provide the actual network I/O. This abstraction allows
/// the synchronization logic to be tested without a real upstream.
pub trait CampaignSource: Send + Sync {
    /// Fetch the current campaign status.
    fn fetch_status(&self) -> impl Future<Output = Result<Fetched<Status>>> + Send;

    /// Fetch a season snapshot. `None` asks for the current season.
    fn fetch_season(
        &self,
        season: Option<Season>,
    ) -> impl Future<Output = Result<Fetched<CampaignSnapshot>>> + Send;
}

/// Reject season arguments that can never name a season.
pub fn check_season_arg(season: Option<Season>) -> std::result::Result<(), ValidationError> {
    match season {
        Some(s) if !hdbot_types::is_valid_season(s) => Err(ValidationError::invalid(
            "season",
            "must be a positive integer",
        )),
        _ => Ok(()),
    }
}
