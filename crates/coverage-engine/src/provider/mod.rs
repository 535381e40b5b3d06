//! Geometry provider trait and implementations.

mod geo_provider;

pub use geo_provider::GeoProvider;

use geo::{MultiPolygon, Point};
use station_common::{AreaFootprint, Footprint, WeatherStation};

use crate::filter::{Filterable, Predicate};

/// Spatial primitives the coverage pipeline is written against.
///
/// Implementations must be shareable across worker threads: per-zone
/// catchments are built concurrently against one provider.
pub trait GeometryProvider: Send + Sync {
    /// Fixed-radius buffer around a single point.
    ///
    /// Usually a single polygon; a geodesic buffer crossing the antimeridian
    /// comes back as one polygon on each side.
    ///
    /// # Arguments
    /// * `point` - Buffer centre
    /// * `radius_m` - Radius in metres
    fn buffer(&self, point: Point<f64>, radius_m: f64) -> MultiPolygon<f64>;

    /// Clip `subject` to `mask`.
    fn clip(&self, subject: &MultiPolygon<f64>, mask: &MultiPolygon<f64>) -> MultiPolygon<f64>;

    /// Union of all parts. An empty slice yields an empty multipolygon.
    fn union(&self, parts: &[MultiPolygon<f64>]) -> MultiPolygon<f64>;

    /// Whether a point touches or lies inside a polygon.
    fn point_intersects(&self, point: &Point<f64>, polygon: &MultiPolygon<f64>) -> bool;

    /// Whether two polygons share any point.
    fn polygons_intersect(&self, a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> bool;

    /// Whether a single record footprint intersects a polygon.
    fn footprint_intersects(&self, footprint: &Footprint, polygon: &MultiPolygon<f64>) -> bool {
        match footprint {
            Footprint::Point(p) => self.point_intersects(p, polygon),
            Footprint::Polygon(mp) => self.polygons_intersect(mp, polygon),
        }
    }

    /// Whether any part of an area footprint intersects a polygon.
    fn area_intersects(&self, area: &AreaFootprint, polygon: &MultiPolygon<f64>) -> bool {
        area.points.0.iter().any(|p| self.point_intersects(p, polygon))
            || self.polygons_intersect(&area.polygons, polygon)
    }

    /// The part of an area footprint lying within a polygon.
    fn clip_area(&self, area: &AreaFootprint, polygon: &MultiPolygon<f64>) -> AreaFootprint {
        let points = area
            .points
            .0
            .iter()
            .filter(|p| self.point_intersects(p, polygon))
            .copied()
            .collect();
        let polygons = if area.polygons.0.is_empty() {
            MultiPolygon::new(Vec::new())
        } else {
            self.clip(&area.polygons, polygon)
        };
        AreaFootprint::new(points, polygons)
    }

    /// Combine record footprints into one area footprint, dissolving polygons.
    fn dissolve<'a, I>(&self, footprints: I) -> AreaFootprint
    where
        I: IntoIterator<Item = &'a Footprint>,
        Self: Sized,
    {
        let mut points = Vec::new();
        let mut polygons = Vec::new();
        for footprint in footprints {
            match footprint {
                Footprint::Point(p) => points.push(*p),
                Footprint::Polygon(mp) => polygons.push(mp.clone()),
            }
        }
        AreaFootprint::new(points.into(), self.union(&polygons))
    }

    /// Features matching an attribute predicate, in layer order.
    fn select<'a, T>(&self, layer: &'a [T], predicate: &Predicate) -> Vec<&'a T>
    where
        T: Filterable,
        Self: Sized,
    {
        layer.iter().filter(|f| f.matches(predicate)).collect()
    }

    /// Stations whose location intersects `mask`, in layer order.
    fn select_by_location<'a>(
        &self,
        stations: &'a [WeatherStation],
        mask: &MultiPolygon<f64>,
    ) -> Vec<&'a WeatherStation>
    where
        Self: Sized,
    {
        stations
            .iter()
            .filter(|s| self.point_intersects(&s.location, mask))
            .collect()
    }
}
