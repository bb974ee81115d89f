//! Point-in-Polygon (PIP) reverse geocoding.
//!
//! Loads admin boundaries from the GeoJSON corpus and resolves coordinates
//! to regions using an R-tree of boundary anchor points.

mod boundary;
mod corpus;
mod geometry;
mod index;
mod resolver;

pub use boundary::{AdminBoundary, FeatureError};
pub use corpus::BoundaryCorpus;
pub use geometry::{BoundaryGeometry, GeometryError, RawGeometry};
pub use index::AdminSpatialIndex;
pub use resolver::{
    RegionResolver, ResolverOptions, DEFAULT_CACHE_CAPACITY, DEFAULT_CANDIDATES,
    DEFAULT_MAX_FALLBACK_DISTANCE,
};
