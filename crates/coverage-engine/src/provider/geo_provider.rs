//! [`GeometryProvider`] backed by the `geo` crate.
//!
//! Geodesic buffers are walked on the sphere and split at the antimeridian,
//! so a catchment near ±180° is returned as one piece on each side and clips
//! correctly against zone polygons in lon/lat. Buffers reaching a pole are
//! not handled.

use std::f64::consts::PI;

use geo::{
    BooleanOps, BoundingRect, Coord, HaversineDestination, Intersects, LineString, MultiPolygon,
    Point, Polygon, Rect, Translate,
};

use crate::config::{CoverageConfig, DistanceModel};
use crate::provider::GeometryProvider;

/// Geometry provider using `geo` boolean operations.
#[derive(Debug, Clone)]
pub struct GeoProvider {
    distance_model: DistanceModel,
    segments: usize,
}

impl GeoProvider {
    pub fn new(distance_model: DistanceModel, segments: usize) -> Self {
        Self {
            distance_model,
            segments: segments.max(8),
        }
    }

    pub fn from_config(config: &CoverageConfig) -> Self {
        Self::new(config.distance_model, config.buffer_segments)
    }

    pub fn distance_model(&self) -> DistanceModel {
        self.distance_model
    }

    /// Ring vertices, counter-clockwise, without the closing vertex.
    ///
    /// Geodesic longitudes stay continuous around the centre, so a ring near
    /// the antimeridian may run past ±180°.
    fn ring(&self, center: Point<f64>, radius_m: f64) -> Vec<Coord<f64>> {
        let n = self.segments;
        match self.distance_model {
            DistanceModel::Planar => (0..n)
                .map(|i| {
                    let angle = 2.0 * PI * i as f64 / n as f64;
                    Coord {
                        x: center.x() + radius_m * angle.cos(),
                        y: center.y() + radius_m * angle.sin(),
                    }
                })
                .collect(),
            // Bearings run clockwise from north; walk them backwards.
            DistanceModel::Geodesic => (0..n)
                .map(|i| {
                    let bearing = 360.0 - 360.0 * i as f64 / n as f64;
                    let mut coord = center.haversine_destination(bearing % 360.0, radius_m).0;
                    coord.x = unwrap_longitude(coord.x, center.x());
                    coord
                })
                .collect(),
        }
    }
}

impl Default for GeoProvider {
    fn default() -> Self {
        Self::from_config(&CoverageConfig::default())
    }
}

fn unwrap_longitude(lon: f64, reference: f64) -> f64 {
    if lon - reference > 180.0 {
        lon - 360.0
    } else if lon - reference < -180.0 {
        lon + 360.0
    } else {
        lon
    }
}

/// Cut a polygon whose longitudes run past ±180° into pieces within
/// [-180°, 180°].
fn split_antimeridian(polygon: Polygon<f64>) -> MultiPolygon<f64> {
    let crosses = polygon
        .bounding_rect()
        .map(|r| r.min().x < -180.0 || r.max().x > 180.0)
        .unwrap_or(false);
    let whole = MultiPolygon::new(vec![polygon]);
    if !crosses {
        return whole;
    }

    let mut pieces = Vec::new();
    for shift in [-360.0, 0.0, 360.0] {
        let window = Rect::new(
            Coord { x: -180.0 - shift, y: -90.0 },
            Coord { x: 180.0 - shift, y: 90.0 },
        );
        let part = whole.intersection(&MultiPolygon::new(vec![window.to_polygon()]));
        pieces.extend(part.translate(shift, 0.0).0);
    }
    MultiPolygon::new(pieces)
}

fn bbox_overlap(a: Option<Rect<f64>>, b: Option<Rect<f64>>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => {
            a.min().x <= b.max().x
                && a.max().x >= b.min().x
                && a.min().y <= b.max().y
                && a.max().y >= b.min().y
        }
        _ => false,
    }
}

impl GeometryProvider for GeoProvider {
    fn buffer(&self, point: Point<f64>, radius_m: f64) -> MultiPolygon<f64> {
        let mut ring = self.ring(point, radius_m);
        if let Some(first) = ring.first().copied() {
            ring.push(first);
        }
        let polygon = Polygon::new(LineString::new(ring), Vec::new());
        match self.distance_model {
            DistanceModel::Planar => MultiPolygon::new(vec![polygon]),
            DistanceModel::Geodesic => split_antimeridian(polygon),
        }
    }

    fn clip(&self, subject: &MultiPolygon<f64>, mask: &MultiPolygon<f64>) -> MultiPolygon<f64> {
        if subject.0.is_empty()
            || mask.0.is_empty()
            || !bbox_overlap(subject.bounding_rect(), mask.bounding_rect())
        {
            return MultiPolygon::new(Vec::new());
        }
        subject.intersection(mask)
    }

    fn union(&self, parts: &[MultiPolygon<f64>]) -> MultiPolygon<f64> {
        // Pairwise (cascaded) union keeps intermediate results small.
        let mut level: Vec<MultiPolygon<f64>> = parts
            .iter()
            .filter(|mp| !mp.0.is_empty())
            .cloned()
            .collect();

        if level.is_empty() {
            return MultiPolygon::new(Vec::new());
        }

        while level.len() > 1 {
            level = level
                .chunks(2)
                .map(|pair| match pair {
                    [a, b] => a.union(b),
                    [a] => a.clone(),
                    _ => unreachable!("chunks(2) yields one or two items"),
                })
                .collect();
        }

        level.pop().unwrap_or_else(|| MultiPolygon::new(Vec::new()))
    }

    fn point_intersects(&self, point: &Point<f64>, polygon: &MultiPolygon<f64>) -> bool {
        polygon.0.iter().any(|poly| point.intersects(poly))
    }

    fn polygons_intersect(&self, a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> bool {
        if !bbox_overlap(a.bounding_rect(), b.bounding_rect()) {
            return false;
        }
        a.0.iter()
            .any(|pa| b.0.iter().any(|pb| pa.intersects(pb)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use geo::{polygon, Area, HaversineDistance};

    fn square(min: f64, max: f64) -> MultiPolygon<f64> {
        MultiPolygon::new(vec![polygon![
            (x: min, y: min),
            (x: max, y: min),
            (x: max, y: max),
            (x: min, y: max),
        ]])
    }

    #[test]
    fn test_planar_buffer_area_close_to_circle() {
        let provider = GeoProvider::new(DistanceModel::Planar, 256);
        let buffer = provider.buffer(Point::new(0.0, 0.0), 1000.0);
        let expected = PI * 1000.0 * 1000.0;
        assert_relative_eq!(buffer.unsigned_area(), expected, max_relative = 0.001);
    }

    #[test]
    fn test_geodesic_buffer_vertices_at_radius() {
        let provider = GeoProvider::new(DistanceModel::Geodesic, 32);
        let center = Point::new(36.8, -1.3);
        let buffer = provider.buffer(center, 100_000.0);

        assert_eq!(buffer.0.len(), 1);
        assert_eq!(buffer.0[0].exterior().0.len(), 33);
        for coord in buffer.0[0].exterior().0.iter() {
            let d = center.haversine_distance(&Point::from(*coord));
            assert_relative_eq!(d, 100_000.0, max_relative = 1e-6);
        }
    }

    #[test]
    fn test_buffer_ring_is_counter_clockwise() {
        use geo::Winding;
        for model in [DistanceModel::Planar, DistanceModel::Geodesic] {
            let provider = GeoProvider::new(model, 16);
            let buffer = provider.buffer(Point::new(10.0, 10.0), 5_000.0);
            assert!(buffer.0[0].exterior().is_ccw(), "{:?} ring is not ccw", model);
        }
    }

    #[test]
    fn test_geodesic_buffer_split_at_antimeridian() {
        let provider = GeoProvider::new(DistanceModel::Geodesic, 64);
        let center = Point::new(179.5, -17.0);
        let buffer = provider.buffer(center, 100_000.0);

        assert_eq!(buffer.0.len(), 2);
        for coord in buffer.0.iter().flat_map(|p| p.exterior().coords()) {
            assert!((-180.0..=180.0).contains(&coord.x), "longitude {} out of range", coord.x);
        }
        assert!(provider.point_intersects(&Point::new(179.2, -17.0), &buffer));
        assert!(provider.point_intersects(&Point::new(-179.9, -17.0), &buffer));
        assert!(!provider.point_intersects(&Point::new(0.0, -17.0), &buffer));

        let mut ring = provider.ring(center, 100_000.0);
        ring.push(ring[0]);
        let whole = Polygon::new(LineString::new(ring), Vec::new());
        assert_relative_eq!(buffer.unsigned_area(), whole.unsigned_area(), max_relative = 1e-9);
    }

    #[test]
    fn test_split_buffer_clips_to_zone_across_antimeridian() {
        let provider = GeoProvider::new(DistanceModel::Geodesic, 64);
        let east_of_line = MultiPolygon::new(vec![polygon![
            (x: -180.0, y: -20.0),
            (x: -175.0, y: -20.0),
            (x: -175.0, y: -15.0),
            (x: -180.0, y: -15.0),
        ]]);
        let buffer = provider.buffer(Point::new(179.5, -17.0), 100_000.0);

        let clipped = provider.clip(&buffer, &east_of_line);
        assert!(!clipped.0.is_empty());
        assert!(clipped.unsigned_area() < buffer.unsigned_area());
    }

    #[test]
    fn test_union_of_disjoint_and_overlapping() {
        let provider = GeoProvider::new(DistanceModel::Planar, 16);
        let merged = provider.union(&[square(0.0, 2.0), square(1.0, 3.0), square(10.0, 11.0)]);
        assert_eq!(merged.0.len(), 2);
        assert_relative_eq!(merged.unsigned_area(), 4.0 + 4.0 - 1.0 + 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_union_of_nothing_is_empty() {
        let provider = GeoProvider::default();
        assert!(provider.union(&[]).0.is_empty());
        assert!(provider.union(&[MultiPolygon::new(vec![])]).0.is_empty());
    }

    #[test]
    fn test_clip_disjoint_is_empty() {
        let provider = GeoProvider::new(DistanceModel::Planar, 16);
        assert!(provider.clip(&square(0.0, 1.0), &square(5.0, 6.0)).0.is_empty());

        let clipped = provider.clip(&square(0.0, 2.0), &square(1.0, 3.0));
        assert_relative_eq!(clipped.unsigned_area(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_point_on_boundary_intersects() {
        let provider = GeoProvider::default();
        let zone = square(0.0, 1.0);
        assert!(provider.point_intersects(&Point::new(1.0, 0.5), &zone));
        assert!(provider.point_intersects(&Point::new(0.5, 0.5), &zone));
        assert!(!provider.point_intersects(&Point::new(1.5, 0.5), &zone));
    }
}
