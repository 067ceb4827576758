//! Data models for the trip planner
//!
//! - Location: coordinates, display name and stable id
//! - Recommendation: nearby places tagged with their originating area

pub mod location;
pub mod recommendation;

pub use location::{Location, LocationId};
pub use recommendation::{Area, AreaKind, PlaceKey, Recommendation, Restaurant, icon_for};
