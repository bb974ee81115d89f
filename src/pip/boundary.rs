//! Admin boundary features parsed from the corpus.

use serde::Deserialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use thiserror::Error;

use crate::models::{AdminLevel, GeoPoint, Region};
use crate::pip::geometry::{BoundaryGeometry, GeometryError, RawGeometry};

/// Why a single feature was skipped during load
#[derive(Debug, Error)]
pub enum FeatureError {
    #[error("malformed feature: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid geometry: {0}")]
    Geometry(#[from] GeometryError),
    #[error("missing _id property")]
    MissingId,
    #[error("missing adm0_a3 country code")]
    MissingCountry,
    #[error("no representative point could be computed")]
    NoRepresentativePoint,
    #[error("duplicate _id {0}")]
    DuplicateId(String),
}

#[derive(Debug, Deserialize)]
struct RawFeature {
    geometry: RawGeometry,
    #[serde(default)]
    properties: Map<String, Value>,
}

/// A single admin boundary polygon with its region record
#[derive(Debug, Clone)]
pub struct AdminBoundary {
    pub region: Arc<Region>,
    pub geometry: BoundaryGeometry,
}

impl AdminBoundary {
    /// Parse one GeoJSON feature.
    ///
    /// `file_country` is the country code encoded in the file name, used when
    /// the feature itself carries no `adm0_a3`.
    pub fn from_feature(
        feature: Value,
        level: AdminLevel,
        file_country: Option<&str>,
    ) -> Result<Self, FeatureError> {
        let RawFeature {
            geometry,
            mut properties,
        } = serde_json::from_value(feature)?;
        let geometry = BoundaryGeometry::try_from(geometry)?;

        let id = match properties.get("_id") {
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => return Err(FeatureError::MissingId),
        };

        let country_code = match properties.get("adm0_a3") {
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            _ if level == AdminLevel::Country => return Err(FeatureError::MissingCountry),
            _ => file_country
                .map(str::to_string)
                .ok_or(FeatureError::MissingCountry)?,
        };

        let point = match stored_point(&properties) {
            Some(point) => point,
            None => {
                let point = geometry
                    .representative_point()
                    .ok_or(FeatureError::NoRepresentativePoint)?;
                properties.insert("latitude".to_string(), Value::from(point.lat));
                properties.insert("longitude".to_string(), Value::from(point.lon));
                point
            }
        };

        Ok(Self {
            region: Arc::new(Region {
                id,
                level,
                country_code,
                point,
                properties,
            }),
            geometry,
        })
    }

    pub fn id(&self) -> &str {
        &self.region.id
    }

    pub fn level(&self) -> AdminLevel {
        self.region.level
    }

    pub fn country_code(&self) -> &str {
        &self.region.country_code
    }
}

/// Representative point stored in the feature's properties, if valid
fn stored_point(properties: &Map<String, Value>) -> Option<GeoPoint> {
    let lat = properties.get("latitude")?.as_f64()?;
    let lon = properties.get("longitude")?.as_f64()?;
    let point = GeoPoint::new(lat, lon);
    point.is_valid().then_some(point)
}
