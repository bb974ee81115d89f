//! Reverse geocoding: coordinates to the region that owns them.

use geo::Point;
use lru::LruCache;
use rayon::prelude::*;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};
use tracing::debug;

use super::{AdminBoundary, AdminSpatialIndex, BoundaryCorpus};
use crate::error::{GeoError, Result};
use crate::models::{AdminLevel, GeoPoint, RegionRecord};

/// Default number of nearest candidates tested for containment
pub const DEFAULT_CANDIDATES: usize = 30;

/// Default distance, in degrees, under which a point outside every candidate
/// is still assigned to the nearest one
pub const DEFAULT_MAX_FALLBACK_DISTANCE: f64 = 0.2;

pub const DEFAULT_CACHE_CAPACITY: usize = 700;

/// Cache key: exact coordinate bits plus the level whose index was queried
type CacheKey = (u64, u64, AdminLevel);

/// Tuning knobs for [`RegionResolver`]
#[derive(Debug, Clone, Copy)]
pub struct ResolverOptions {
    pub candidates: usize,
    pub max_fallback_distance: f64,
    pub cache_capacity: NonZeroUsize,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            candidates: DEFAULT_CANDIDATES,
            max_fallback_distance: DEFAULT_MAX_FALLBACK_DISTANCE,
            cache_capacity: NonZeroUsize::new(DEFAULT_CACHE_CAPACITY)
                .unwrap_or(NonZeroUsize::MIN),
        }
    }
}

/// Point-in-polygon region resolver with a bounded memo cache.
///
/// Country queries are answered through the level 1 index and mapped to the
/// owning country's record, so only levels 1 and 2 are spatially indexed.
pub struct RegionResolver {
    corpus: Arc<BoundaryCorpus>,
    subdivision1: AdminSpatialIndex,
    subdivision2: AdminSpatialIndex,
    options: ResolverOptions,
    cache: Mutex<LruCache<CacheKey, Option<Arc<AdminBoundary>>>>,
}

impl RegionResolver {
    pub fn new(corpus: Arc<BoundaryCorpus>, options: ResolverOptions) -> Self {
        let subdivision1 = AdminSpatialIndex::build(
            AdminLevel::Subdivision1,
            corpus.indexed(AdminLevel::Subdivision1),
        );
        let subdivision2 = AdminSpatialIndex::build(
            AdminLevel::Subdivision2,
            corpus.indexed(AdminLevel::Subdivision2),
        );

        Self {
            corpus,
            subdivision1,
            subdivision2,
            options,
            cache: Mutex::new(LruCache::new(options.cache_capacity)),
        }
    }

    /// Resolve `[lat, lon]` pairs to regions at `level`.
    ///
    /// The output always has the input's length and order. Pairs with a
    /// non-finite component resolve to [`RegionRecord::Null`].
    pub fn resolve(&self, coords: &[[f64; 2]], level: AdminLevel) -> Vec<RegionRecord> {
        debug!("Resolving {} coordinates at {}", coords.len(), level);

        coords
            .par_iter()
            .map(|&[lat, lon]| self.resolve_point(GeoPoint::new(lat, lon), level))
            .collect()
    }

    /// Like [`resolve`](Self::resolve) for untyped input, validating the
    /// level and that every row is a `[lat, lon]` pair.
    pub fn resolve_rows(&self, rows: &[Vec<f64>], level: u8) -> Result<Vec<RegionRecord>> {
        let level = AdminLevel::try_from(level)?;
        let coords = rows
            .iter()
            .enumerate()
            .map(|(index, row)| match row.as_slice() {
                &[lat, lon] => Ok([lat, lon]),
                other => Err(GeoError::InvalidCoordinate {
                    index,
                    len: other.len(),
                }),
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(self.resolve(&coords, level))
    }

    /// Resolve a single point
    pub fn resolve_point(&self, point: GeoPoint, level: AdminLevel) -> RegionRecord {
        if !point.is_valid() {
            return RegionRecord::Null;
        }

        let owner = self.owner(point, level.index_level());

        let owner = if level == AdminLevel::Country {
            owner.and_then(|b| self.corpus.country(b.country_code()).cloned())
        } else {
            owner
        };

        owner
            .map(|b| RegionRecord::from(Arc::clone(&b.region)))
            .unwrap_or_default()
    }

    fn index(&self, level: AdminLevel) -> &AdminSpatialIndex {
        match level {
            AdminLevel::Subdivision2 => &self.subdivision2,
            _ => &self.subdivision1,
        }
    }

    /// Memoized owning boundary at an indexed level
    fn owner(&self, point: GeoPoint, level: AdminLevel) -> Option<Arc<AdminBoundary>> {
        let key = (point.lat.to_bits(), point.lon.to_bits(), level);

        if let Ok(mut cache) = self.cache.lock() {
            if let Some(hit) = cache.get(&key) {
                return hit.clone();
            }
        }

        let owner = self.locate(point, level);

        if let Ok(mut cache) = self.cache.lock() {
            cache.put(key, owner.clone());
        }
        owner
    }

    /// Containment test over the nearest candidates, falling back to the
    /// closest candidate within the distance threshold
    fn locate(&self, point: GeoPoint, level: AdminLevel) -> Option<Arc<AdminBoundary>> {
        let candidates = self.index(level).query(point, self.options.candidates);
        let p = Point::new(point.lon, point.lat);

        if let Some(owner) = candidates.iter().find(|b| b.geometry.contains(&p)) {
            return Some(Arc::clone(owner));
        }

        let (nearest, distance) = candidates
            .iter()
            .map(|b| (*b, b.geometry.distance(&p)))
            .min_by(|a, b| a.1.total_cmp(&b.1))?;

        if distance < self.options.max_fallback_distance {
            debug!(
                "({}, {}) outside all candidates, assigned to {} at distance {:.4}",
                point.lat,
                point.lon,
                nearest.id(),
                distance
            );
            Some(Arc::clone(nearest))
        } else {
            None
        }
    }

    /// Number of memoized lookups currently held
    pub fn cached(&self) -> usize {
        self.cache.lock().map(|cache| cache.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use std::fs;
    use std::path::Path;

    fn square(id: &str, cc: &str, x0: f64, y0: f64, size: f64) -> Value {
        json!({
            "type": "Feature",
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[x0, y0], [x0 + size, y0], [x0 + size, y0 + size], [x0, y0 + size], [x0, y0]]]
            },
            "properties": {"_id": id, "adm0_a3": cc, "name": id}
        })
    }

    fn write(dir: &Path, name: &str, features: Vec<Value>) {
        let collection = json!({"type": "FeatureCollection", "features": features});
        fs::write(dir.join(name), collection.to_string()).unwrap();
    }

    /// Country AAA spans x 0..2, y 0..1 and is split into two provinces
    fn resolver(capacity: usize) -> RegionResolver {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "admin0.json", vec![square("AAA", "AAA", 0.0, 0.0, 2.0)]);
        write(
            dir.path(),
            "admin1.json",
            vec![
                square("AAA-W", "AAA", 0.0, 0.0, 1.0),
                square("AAA-E", "AAA", 1.0, 0.0, 1.0),
                square("ORPHAN", "ZZZ", 10.0, 10.0, 1.0),
            ],
        );
        let corpus = Arc::new(BoundaryCorpus::load(dir.path()).unwrap());
        let options = ResolverOptions {
            cache_capacity: NonZeroUsize::new(capacity).unwrap(),
            ..ResolverOptions::default()
        };
        RegionResolver::new(corpus, options)
    }

    fn ids(records: &[RegionRecord]) -> Vec<Option<&str>> {
        records.iter().map(|r| r.id()).collect()
    }

    #[test]
    fn test_containment_per_level() {
        let resolver = resolver(16);
        let coords = [[0.5, 0.5], [0.5, 1.5]];
        assert_eq!(
            ids(&resolver.resolve(&coords, AdminLevel::Subdivision1)),
            vec![Some("AAA-W"), Some("AAA-E")]
        );
        // No admin2 file: level 2 degrades to level 1 granularity
        assert_eq!(
            ids(&resolver.resolve(&coords, AdminLevel::Subdivision2)),
            vec![Some("AAA-W"), Some("AAA-E")]
        );
        assert_eq!(
            ids(&resolver.resolve(&coords, AdminLevel::Country)),
            vec![Some("AAA"), Some("AAA")]
        );
    }

    #[test]
    fn test_nan_is_null_at_every_level() {
        let resolver = resolver(16);
        let coords = [[f64::NAN, 0.5], [0.5, f64::NAN], [f64::INFINITY, 1.0]];
        for level in AdminLevel::all() {
            let out = resolver.resolve(&coords, *level);
            assert_eq!(out.len(), 3);
            assert!(out.iter().all(RegionRecord::is_null));
        }
        assert_eq!(resolver.cached(), 0);
    }

    #[test]
    fn test_distance_threshold() {
        let resolver = resolver(16);
        // 0.1 degrees south of AAA-W, then 0.5 degrees south
        let out = resolver.resolve(&[[-0.1, 0.5], [-0.5, 0.5]], AdminLevel::Subdivision1);
        assert_eq!(ids(&out), vec![Some("AAA-W"), None]);
    }

    #[test]
    fn test_subdivision_without_country_maps_to_null() {
        let resolver = resolver(16);
        let out = resolver.resolve(&[[10.5, 10.5]], AdminLevel::Subdivision1);
        assert_eq!(out[0].id(), Some("ORPHAN"));
        let out = resolver.resolve(&[[10.5, 10.5]], AdminLevel::Country);
        assert!(out[0].is_null());
    }

    #[test]
    fn test_subdivision_sharing_its_country_id_still_resolves() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "admin0.json", vec![square("BBB", "BBB", 0.0, 0.0, 1.0)]);
        write(dir.path(), "admin1.json", vec![square("BBB", "BBB", 0.0, 0.0, 1.0)]);
        let corpus = Arc::new(BoundaryCorpus::load(dir.path()).unwrap());
        let resolver = RegionResolver::new(corpus, ResolverOptions::default());

        let out = resolver.resolve(&[[0.5, 0.5]], AdminLevel::Subdivision1);
        assert_eq!(out[0].id(), Some("BBB"));
        assert_eq!(out[0].region().unwrap().level, AdminLevel::Subdivision1);
        let out = resolver.resolve(&[[0.5, 0.5]], AdminLevel::Country);
        assert_eq!(out[0].id(), Some("BBB"));
        assert_eq!(out[0].region().unwrap().level, AdminLevel::Country);
    }

    #[test]
    fn test_cache_is_bounded_and_transparent() {
        let resolver = resolver(2);
        let coords: Vec<[f64; 2]> = (0..10).map(|i| [0.05 + i as f64 * 0.09, 0.5]).collect();
        let first = resolver.resolve(&coords, AdminLevel::Subdivision1);
        assert!(resolver.cached() <= 2);
        let mut reversed = coords.clone();
        reversed.reverse();
        let mut second = resolver.resolve(&reversed, AdminLevel::Subdivision1);
        second.reverse();
        assert_eq!(first, second);
    }

    #[test]
    fn test_resolve_rows_validates_shape_and_level() {
        let resolver = resolver(16);
        assert!(matches!(
            resolver.resolve_rows(&[vec![0.5, 0.5], vec![1.0]], 1),
            Err(GeoError::InvalidCoordinate { index: 1, len: 1 })
        ));
        assert!(matches!(
            resolver.resolve_rows(&[vec![0.5, 0.5]], 3),
            Err(GeoError::InvalidLevel(3))
        ));
        let out = resolver.resolve_rows(&[vec![0.5, 0.5]], 0).unwrap();
        assert_eq!(out[0].id(), Some("AAA"));
        assert!(resolver.resolve_rows(&[], 2).unwrap().is_empty());
    }
}
