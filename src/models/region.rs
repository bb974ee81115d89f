//! Region records returned to callers.

use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

use super::AdminLevel;

/// Geographic point (lat/lon)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// True when both components are finite numbers
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite() && self.lon.is_finite()
    }
}

/// Lat/lon rectangle spanning a set of regions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingRect {
    pub min_lat: f64,
    pub min_lon: f64,
    pub max_lat: f64,
    pub max_lon: f64,
}

impl BoundingRect {
    pub fn from_point(point: GeoPoint) -> Self {
        Self {
            min_lat: point.lat,
            min_lon: point.lon,
            max_lat: point.lat,
            max_lon: point.lon,
        }
    }

    pub fn extend(&mut self, point: GeoPoint) {
        self.min_lat = self.min_lat.min(point.lat);
        self.min_lon = self.min_lon.min(point.lon);
        self.max_lat = self.max_lat.max(point.lat);
        self.max_lon = self.max_lon.max(point.lon);
    }
}

/// A mapped administrative region.
///
/// `properties` is the feature's property map as loaded from the corpus,
/// always carrying `_id`, `latitude` and `longitude`.
#[derive(Debug, Clone)]
pub struct Region {
    pub id: String,
    pub level: AdminLevel,
    /// ISO 3166-1 alpha-3 code of the owning country (`adm0_a3`)
    pub country_code: String,
    /// Representative point
    pub point: GeoPoint,
    pub properties: Map<String, Value>,
}

impl Region {
    /// String value of a property, if present and non-empty
    pub fn property_str(&self, key: &str) -> Option<&str> {
        match self.properties.get(key) {
            Some(Value::String(s)) if !s.trim().is_empty() => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.property_str("name")
    }
}

/// Result of a resolve or encode operation.
///
/// `Null` is a first-class result meaning "not mapped"; it serializes to an
/// empty object.
#[derive(Debug, Clone, Default)]
pub enum RegionRecord {
    #[default]
    Null,
    Region(Arc<Region>),
}

impl RegionRecord {
    pub fn is_null(&self) -> bool {
        matches!(self, RegionRecord::Null)
    }

    pub fn region(&self) -> Option<&Arc<Region>> {
        match self {
            RegionRecord::Region(region) => Some(region),
            RegionRecord::Null => None,
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.region().map(|r| r.id.as_str())
    }

    pub fn name(&self) -> Option<&str> {
        self.region().and_then(|r| r.name())
    }

    pub fn country_code(&self) -> Option<&str> {
        self.region().map(|r| r.country_code.as_str())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.region().and_then(|r| r.properties.get(key))
    }

    /// Representative point of the region
    pub fn point(&self) -> Option<GeoPoint> {
        self.region().map(|r| r.point)
    }
}

impl From<Arc<Region>> for RegionRecord {
    fn from(region: Arc<Region>) -> Self {
        RegionRecord::Region(region)
    }
}

impl PartialEq for RegionRecord {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (RegionRecord::Null, RegionRecord::Null) => true,
            (RegionRecord::Region(a), RegionRecord::Region(b)) => {
                Arc::ptr_eq(a, b) || (a.level == b.level && a.id == b.id)
            }
            _ => false,
        }
    }
}

impl Serialize for RegionRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            RegionRecord::Null => serializer.serialize_map(Some(0))?.end(),
            RegionRecord::Region(region) => {
                let mut map = serializer.serialize_map(Some(region.properties.len()))?;
                for (key, value) in &region.properties {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn region(id: &str) -> Arc<Region> {
        let properties = json!({"_id": id, "name": "Slovenia", "latitude": 46.1, "longitude": 14.8});
        Arc::new(Region {
            id: id.to_string(),
            level: AdminLevel::Country,
            country_code: "SVN".to_string(),
            point: GeoPoint::new(46.1, 14.8),
            properties: properties.as_object().cloned().unwrap_or_default(),
        })
    }

    #[test]
    fn test_null_serializes_to_empty_object() {
        let json = serde_json::to_string(&RegionRecord::Null).unwrap();
        assert_eq!(json, "{}");
    }

    #[test]
    fn test_region_serializes_properties() {
        let record = RegionRecord::from(region("SVN"));
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["_id"], "SVN");
        assert_eq!(value["latitude"], 46.1);
        assert_eq!(record.name(), Some("Slovenia"));
    }

    #[test]
    fn test_records_compare_by_id() {
        assert_eq!(RegionRecord::from(region("SVN")), RegionRecord::from(region("SVN")));
        assert_ne!(RegionRecord::from(region("SVN")), RegionRecord::Null);
        assert_ne!(RegionRecord::from(region("SVN")), RegionRecord::from(region("HRV")));
    }

    #[test]
    fn test_bounding_rect_extend() {
        let mut rect = BoundingRect::from_point(GeoPoint::new(42.0, 12.0));
        rect.extend(GeoPoint::new(62.0, 14.0));
        assert_eq!(rect.min_lat, 42.0);
        assert_eq!(rect.min_lon, 12.0);
        assert_eq!(rect.max_lat, 62.0);
        assert_eq!(rect.max_lon, 14.0);
    }

    #[test]
    fn test_blank_property_is_absent() {
        let mut region = (*region("SVN")).clone();
        region.properties.insert("fips".into(), json!("  "));
        region.properties.insert("hasc".into(), Value::Null);
        assert_eq!(region.property_str("fips"), None);
        assert_eq!(region.property_str("hasc"), None);
    }
}
