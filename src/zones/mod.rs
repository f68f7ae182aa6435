//! Zones: library, hand, battlefield, graveyard, stack, exile.
//!
//! ## Key Types
//!
//! - `Zone`: The kind of zone
//! - `ZoneKey`: A concrete zone (per-player zones carry their owner)
//! - `ZoneManager`: Object location tracking and movement
//! - `ZonePosition`: Position specifier for ordered zones

pub mod manager;

pub use manager::{Zone, ZoneKey, ZoneManager, ZonePosition};
