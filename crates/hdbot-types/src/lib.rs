//! # hdbot-types
//!
//! Shared domain types for the campaign tracker workspace.
//!
//! These are the *normalized* shapes: everything upstream sends is decoded
//! and checked by `hdbot-remote` before it becomes one of these, and
//! everything `hdbot-db` persists is one of these serialized as JSON.

pub mod campaign;
pub mod event;
pub mod stats;

pub use campaign::{Campaign, CampaignSnapshot, CampaignStatus, Status};
pub use event::{Event, EventKind, EventStatus};
pub use stats::{BigCount, FactionStats};

/// A season number. Seasons start at 1; 0 is never a valid season.
pub type Season = u32;

/// Index of a faction in the campaign list (0 = Bugs, 1 = Cyborgs, 2 = Illuminate).
pub type FactionId = u8;

/// A map region index. 0 = homeworld defend target, 1..=10 = sectors, 11 = enemy homeworld.
pub type RegionId = u8;

/// Unix timestamp in seconds.
pub type UnixTime = i64;

/// Number of contested sectors per faction.
pub const SECTOR_COUNT: u8 = 10;

/// Region index of a faction's homeworld (the attack event target).
pub const HOMEWORLD_REGION: RegionId = 11;

/// Region index used by defend events that target Super Earth itself.
pub const SUPER_EARTH_REGION: RegionId = 0;

/// Map index under which Super Earth is drawn, after the three enemy factions.
pub const SUPER_EARTH_FACTION: FactionId = 3;

/// Current Unix time in seconds.
pub fn unix_now() -> UnixTime {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as UnixTime
}

/// Check that a season number is usable as a key.
pub fn is_valid_season(season: Season) -> bool {
    season > 0
}
