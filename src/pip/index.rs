//! Nearest-neighbour index over boundary anchor points.

use rstar::primitives::GeomWithData;
use rstar::RTree;
use std::sync::Arc;
use tracing::info;

use super::AdminBoundary;
use crate::models::{AdminLevel, GeoPoint};

/// Index entry: an anchor point in `[lon, lat]` tagged with its boundary slot
type IndexEntry = GeomWithData<[f64; 2], usize>;

/// Spatial index for the boundaries of one admin level using an R-tree.
///
/// Every boundary contributes its representative point, and large polygons
/// also contribute sampled exterior vertices, so oddly shaped regions are
/// still found among the nearest candidates.
pub struct AdminSpatialIndex {
    level: AdminLevel,
    tree: RTree<IndexEntry>,
    boundaries: Vec<Arc<AdminBoundary>>,
}

impl AdminSpatialIndex {
    /// Build spatial index from admin boundaries
    pub fn build(level: AdminLevel, boundaries: &[Arc<AdminBoundary>]) -> Self {
        let mut entries = Vec::with_capacity(boundaries.len());
        for (slot, boundary) in boundaries.iter().enumerate() {
            let anchor = boundary.region.point;
            entries.push(IndexEntry::new([anchor.lon, anchor.lat], slot));
            entries.extend(
                boundary
                    .geometry
                    .index_points()
                    .into_iter()
                    .map(|p| IndexEntry::new([p.lon, p.lat], slot)),
            );
        }

        let tree = RTree::bulk_load(entries);

        info!(
            "Spatial index for {} built with {} entries over {} boundaries",
            level,
            tree.size(),
            boundaries.len()
        );

        Self {
            level,
            tree,
            boundaries: boundaries.to_vec(),
        }
    }

    /// Up to `k` distinct boundaries ordered by their nearest entry's distance
    pub fn query(&self, point: GeoPoint, k: usize) -> Vec<&Arc<AdminBoundary>> {
        let mut seen = vec![false; self.boundaries.len()];
        let mut candidates = Vec::with_capacity(k.min(self.boundaries.len()));

        for entry in self.tree.nearest_neighbor_iter(&[point.lon, point.lat]) {
            if candidates.len() >= k {
                break;
            }
            if !std::mem::replace(&mut seen[entry.data], true) {
                candidates.push(&self.boundaries[entry.data]);
            }
        }

        candidates
    }

    pub fn level(&self) -> AdminLevel {
        self.level
    }

    /// Number of index entries
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    pub fn boundary_count(&self) -> usize {
        self.boundaries.len()
    }
}
