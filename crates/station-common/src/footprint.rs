//! Planted-area geometry.
//!
//! Planted area arrives either as point samples (one point per grid cell of a
//! crop map) or as polygons. A set of selected records is kept as an
//! [`AreaFootprint`], which holds both kinds side by side instead of forcing
//! them into a single geometry type.

use geo::{MultiPoint, MultiPolygon, Point, Polygon};

/// Geometry of a single planted-area record.
#[derive(Debug, Clone, PartialEq)]
pub enum Footprint {
    Point(Point<f64>),
    Polygon(MultiPolygon<f64>),
}

impl Footprint {
    pub fn point(x: f64, y: f64) -> Self {
        Self::Point(Point::new(x, y))
    }

    pub fn polygon(polygon: Polygon<f64>) -> Self {
        Self::Polygon(MultiPolygon::new(vec![polygon]))
    }

    pub fn is_point(&self) -> bool {
        matches!(self, Self::Point(_))
    }
}

/// Combined geometry of a set of planted-area records.
///
/// `polygons` is expected to be dissolved (non-overlapping); whoever builds
/// an `AreaFootprint` from records is responsible for the union.
#[derive(Debug, Clone, PartialEq)]
pub struct AreaFootprint {
    pub points: MultiPoint<f64>,
    pub polygons: MultiPolygon<f64>,
}

impl AreaFootprint {
    pub fn empty() -> Self {
        Self {
            points: MultiPoint::new(Vec::new()),
            polygons: MultiPolygon::new(Vec::new()),
        }
    }

    pub fn new(points: MultiPoint<f64>, polygons: MultiPolygon<f64>) -> Self {
        Self { points, polygons }
    }

    pub fn is_empty(&self) -> bool {
        self.points.0.is_empty() && self.polygons.0.is_empty()
    }

    pub fn point_count(&self) -> usize {
        self.points.0.len()
    }

    pub fn polygon_count(&self) -> usize {
        self.polygons.0.len()
    }
}

impl Default for AreaFootprint {
    fn default() -> Self {
        Self::empty()
    }
}
