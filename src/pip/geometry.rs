//! Boundary geometry and the point operations the resolver needs.

use geo::{
    Area, Centroid, Closest, ClosestPoint, Contains, Coord, InteriorPoint, Intersects, LineString,
    MultiPolygon, Point, Polygon,
};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::models::GeoPoint;

/// Polygons covering more than this many square degrees contribute sampled
/// exterior vertices to the spatial index, not just their representative point.
const LARGE_POLYGON_AREA: f64 = 1.0;

/// Upper bound on sampled exterior vertices per large polygon
const MAX_SAMPLED_VERTICES: usize = 24;

#[derive(Debug, Error, PartialEq)]
pub enum GeometryError {
    #[error("position has {0} components, expected at least 2")]
    BadPosition(usize),
    #[error("non-finite coordinate")]
    NonFinite,
    #[error("ring has {0} positions, expected at least 4")]
    ShortRing(usize),
    #[error("polygon has no exterior ring")]
    NoExterior,
    #[error("multipolygon has no polygons")]
    Empty,
}

/// GeoJSON geometry as it appears in corpus files (lon/lat order)
#[derive(Debug, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum RawGeometry {
    Polygon(Vec<Vec<Vec<f64>>>),
    MultiPolygon(Vec<Vec<Vec<Vec<f64>>>>),
}

/// Geometry of a boundary: a single polygon or a list of them
#[derive(Debug, Clone)]
pub enum BoundaryGeometry {
    Polygon(Polygon<f64>),
    MultiPolygon(MultiPolygon<f64>),
}

impl TryFrom<RawGeometry> for BoundaryGeometry {
    type Error = GeometryError;

    fn try_from(raw: RawGeometry) -> Result<Self, Self::Error> {
        match raw {
            RawGeometry::Polygon(rings) => Ok(BoundaryGeometry::Polygon(build_polygon(rings)?)),
            RawGeometry::MultiPolygon(polygons) => {
                if polygons.is_empty() {
                    return Err(GeometryError::Empty);
                }
                let polygons = polygons
                    .into_iter()
                    .map(build_polygon)
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(BoundaryGeometry::MultiPolygon(MultiPolygon::new(polygons)))
            }
        }
    }
}

fn build_ring(positions: Vec<Vec<f64>>) -> Result<LineString<f64>, GeometryError> {
    if positions.len() < 4 {
        return Err(GeometryError::ShortRing(positions.len()));
    }
    let coords = positions
        .into_iter()
        .map(|pos| match pos.as_slice() {
            [x, y, ..] if x.is_finite() && y.is_finite() => Ok(Coord { x: *x, y: *y }),
            [_, _, ..] => Err(GeometryError::NonFinite),
            other => Err(GeometryError::BadPosition(other.len())),
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(LineString::new(coords))
}

fn build_polygon(rings: Vec<Vec<Vec<f64>>>) -> Result<Polygon<f64>, GeometryError> {
    let mut rings = rings.into_iter();
    let exterior = build_ring(rings.next().ok_or(GeometryError::NoExterior)?)?;
    let interiors = rings.map(build_ring).collect::<Result<Vec<_>, _>>()?;
    Ok(Polygon::new(exterior, interiors))
}

impl BoundaryGeometry {
    pub fn polygons(&self) -> &[Polygon<f64>] {
        match self {
            BoundaryGeometry::Polygon(polygon) => std::slice::from_ref(polygon),
            BoundaryGeometry::MultiPolygon(mp) => &mp.0,
        }
    }

    /// Strict containment; points on the boundary are not contained
    pub fn contains(&self, point: &Point<f64>) -> bool {
        match self {
            BoundaryGeometry::Polygon(polygon) => polygon.contains(point),
            BoundaryGeometry::MultiPolygon(mp) => mp.contains(point),
        }
    }

    /// Containment including the boundary
    pub fn covers(&self, point: &Point<f64>) -> bool {
        match self {
            BoundaryGeometry::Polygon(polygon) => polygon.intersects(point),
            BoundaryGeometry::MultiPolygon(mp) => mp.intersects(point),
        }
    }

    /// Planar distance in degrees from `point` to the geometry, 0 inside
    pub fn distance(&self, point: &Point<f64>) -> f64 {
        let closest = match self {
            BoundaryGeometry::Polygon(polygon) => polygon.closest_point(point),
            BoundaryGeometry::MultiPolygon(mp) => mp.closest_point(point),
        };
        match closest {
            Closest::Intersection(_) => 0.0,
            Closest::SinglePoint(p) => (p.x() - point.x()).hypot(p.y() - point.y()),
            Closest::Indeterminate => f64::INFINITY,
        }
    }

    pub fn unsigned_area(&self) -> f64 {
        match self {
            BoundaryGeometry::Polygon(polygon) => polygon.unsigned_area(),
            BoundaryGeometry::MultiPolygon(mp) => mp.unsigned_area(),
        }
    }

    fn interior_point(&self) -> Option<Point<f64>> {
        match self {
            BoundaryGeometry::Polygon(polygon) => polygon.interior_point(),
            BoundaryGeometry::MultiPolygon(mp) => mp.interior_point(),
        }
    }

    fn centroid(&self) -> Option<Point<f64>> {
        match self {
            BoundaryGeometry::Polygon(polygon) => polygon.centroid(),
            BoundaryGeometry::MultiPolygon(mp) => mp.centroid(),
        }
    }

    /// A point guaranteed to lie within or on the geometry.
    ///
    /// Tries the interior point first, then the centroid, and finally projects
    /// the centroid onto the exterior of the largest sub-polygon. Returns `None`
    /// only when the geometry has no usable coordinates at all.
    pub fn representative_point(&self) -> Option<GeoPoint> {
        self.representative_from(self.interior_point())
    }

    /// Fallback chain behind [`Self::representative_point`], starting from
    /// an interior point candidate that may be missing or off the geometry.
    fn representative_from(&self, interior: Option<Point<f64>>) -> Option<GeoPoint> {
        let point = match interior.filter(|p| self.covers(p)) {
            Some(p) => p,
            None => {
                debug!("interior point unavailable, falling back to centroid");
                let centroid = self.centroid()?;
                if self.covers(&centroid) {
                    centroid
                } else {
                    self.project_covered(&centroid)?
                }
            }
        };
        Some(GeoPoint::new(point.y(), point.x()))
    }

    /// Projection onto the largest exterior that the geometry covers.
    ///
    /// Rounding can leave a point projected onto a slanted edge just outside,
    /// in which case the nearest exterior vertex is used.
    fn project_covered(&self, point: &Point<f64>) -> Option<Point<f64>> {
        let projected = self.project_onto_largest(point)?;
        if self.covers(&projected) {
            return Some(projected);
        }
        debug!("projected point fell outside, using nearest vertex");
        self.largest()?.exterior().points().min_by(|a, b| {
            let da = (a.x() - point.x()).hypot(a.y() - point.y());
            let db = (b.x() - point.x()).hypot(b.y() - point.y());
            da.total_cmp(&db)
        })
    }

    fn largest(&self) -> Option<&Polygon<f64>> {
        self.polygons()
            .iter()
            .max_by(|a, b| a.unsigned_area().total_cmp(&b.unsigned_area()))
    }

    /// Nearest point on the exterior ring of the largest sub-polygon
    pub fn project_onto_largest(&self, point: &Point<f64>) -> Option<Point<f64>> {
        let largest = self.largest()?;
        match largest.exterior().closest_point(point) {
            Closest::Intersection(p) | Closest::SinglePoint(p) => Some(p),
            Closest::Indeterminate => largest.exterior().points().next(),
        }
    }

    /// Points this geometry contributes to the spatial index besides its
    /// representative point: evenly sampled exterior vertices of each large
    /// sub-polygon.
    pub fn index_points(&self) -> Vec<GeoPoint> {
        let mut points = Vec::new();
        for polygon in self.polygons() {
            if polygon.unsigned_area() < LARGE_POLYGON_AREA {
                continue;
            }
            let exterior = &polygon.exterior().0;
            // Closed rings repeat the first vertex at the end
            let vertices = &exterior[..exterior.len().saturating_sub(1)];
            let step = vertices.len().div_ceil(MAX_SAMPLED_VERTICES).max(1);
            points.extend(
                vertices
                    .iter()
                    .step_by(step)
                    .map(|c| GeoPoint::new(c.y, c.x)),
            );
        }
        points
    }
}
