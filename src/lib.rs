//! Geomapper - bidirectional administrative-region geocoding
//!
//! Reverse geocoding maps coordinates to the country or subdivision polygon
//! that owns them. Forward geocoding maps names and codes to region records.
//! Both run over a corpus of `admin*.json` GeoJSON boundary files.

pub mod config;
pub mod engine;
pub mod error;
pub mod gazetteer;
pub mod infer;
pub mod models;
pub mod pip;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::EngineConfig;
pub use engine::{GeoEngine, GeoIndex};
pub use error::GeoError;
pub use models::{AdminLevel, BoundingRect, GeoPoint, IdentifierType, Region, RegionRecord};
