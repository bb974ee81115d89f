//! Core data models for the geocoding engine.

pub mod admin;
pub mod identifier;
pub mod region;

pub use admin::AdminLevel;
pub use identifier::IdentifierType;
pub use region::{BoundingRect, GeoPoint, Region, RegionRecord};
