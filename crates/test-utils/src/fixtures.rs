//! Common test fixtures for station coverage tests.
//!
//! Geometry here is planar, in metres, so tests can reason about distances
//! with plain Pythagoras. Run the engine with `DistanceModel::Planar`.

use geo::{polygon, MultiPolygon};
use serde_json::{json, Value};
use station_common::{
    AttributeValue, Attributes, BoundaryFeature, ClimateZonePolygon, Footprint, PlantedAreaRecord,
    WeatherStation, ZoneId,
};

/// Axis-aligned rectangle as a multipolygon.
pub fn rect(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> MultiPolygon<f64> {
    MultiPolygon::new(vec![polygon![
        (x: min_x, y: min_y),
        (x: max_x, y: min_y),
        (x: max_x, y: max_y),
        (x: min_x, y: max_y),
    ]])
}

/// The four-record scenario: A=40, B=30, C=20, D=10.
pub fn abcd_records() -> Vec<PlantedAreaRecord> {
    [("A", 40.0), ("B", 30.0), ("C", 20.0), ("D", 10.0)]
        .iter()
        .enumerate()
        .map(|(i, (id, v))| PlantedAreaRecord::new(*id, *v, Footprint::point(i as f64, 0.0)))
        .collect()
}

/// A small two-country study area.
///
/// ```text
///  y=200k ┌──────── Uganda ───────┬────────────── Kenya ──────────────┐
///         │                        │   zone 1        │   zone 2         │
///         │  r5 ws-uganda          │ r1  ws-border   │  ws-edge         │
///         │                        │  ws-west        │  r2 ws-east      │   ws-far
///         │                        │ r4              │         r3       │
///  y=0    └────────────────────────┴─────────────────┴──────────────────┘
///      x=-200k                   x=0             x=200k             x=400k
/// ```
///
/// Zone 1 spans both countries; zone 3 lies entirely east of Kenya.
pub mod study_area {
    use super::*;

    pub const COUNTRY_FIELD: &str = "admin";
    pub const COUNTRY: &str = "Kenya";
    pub const CROP_FIELD: &str = "maize";
    pub const ZONE_FIELD: &str = "GYGA_CZ";
    pub const RADIUS_KM: f64 = 100.0;

    /// Stations expected at 60 %: r1 + r2 are selected (40 + 30 > 60).
    pub const EXPECTED_AT_60: [&str; 3] = ["ws-border", "ws-east", "ws-west"];

    pub fn kenya() -> MultiPolygon<f64> {
        rect(0.0, 0.0, 400_000.0, 200_000.0)
    }

    pub fn uganda() -> MultiPolygon<f64> {
        rect(-200_000.0, 0.0, 0.0, 200_000.0)
    }

    fn named(name: &str) -> Attributes {
        let mut attributes = Attributes::new();
        attributes.insert(COUNTRY_FIELD.to_string(), AttributeValue::text(name));
        attributes
    }

    pub fn countries() -> Vec<BoundaryFeature> {
        vec![
            BoundaryFeature::new(named("Uganda"), uganda()),
            BoundaryFeature::new(named(COUNTRY), kenya()),
        ]
    }

    /// Unclipped climate-zone layer.
    pub fn zones() -> Vec<ClimateZonePolygon> {
        vec![
            ClimateZonePolygon::new(ZoneId(1), rect(-200_000.0, 0.0, 200_000.0, 200_000.0)),
            ClimateZonePolygon::new(ZoneId(2), rect(200_000.0, 0.0, 400_000.0, 200_000.0)),
            ClimateZonePolygon::new(ZoneId(3), rect(450_000.0, 0.0, 650_000.0, 200_000.0)),
        ]
    }

    /// Planted-area points, including one record in Uganda.
    pub fn planted_area() -> Vec<PlantedAreaRecord> {
        vec![
            PlantedAreaRecord::new("r1", 40.0, Footprint::point(150_000.0, 180_000.0)),
            PlantedAreaRecord::new("r2", 30.0, Footprint::point(300_000.0, 100_000.0)),
            PlantedAreaRecord::new("r3", 20.0, Footprint::point(350_000.0, 20_000.0)),
            PlantedAreaRecord::new("r4", 10.0, Footprint::point(50_000.0, 20_000.0)),
            PlantedAreaRecord::new("r5", 50.0, Footprint::point(-100_000.0, 100_000.0)),
        ]
    }

    /// Station layer.
    ///
    /// - `ws-west`: zone 1, 94 km from r1
    /// - `ws-east`: zone 2, on top of r2
    /// - `ws-border`: on the zone 1/2 boundary, 58 km from r1
    /// - `ws-edge`: zone 2, 60 km from r1 but r1 lies in zone 1
    /// - `ws-far`: outside every zone
    /// - `ws-uganda`: inside zone 1 but outside Kenya
    pub fn stations() -> Vec<WeatherStation> {
        vec![
            WeatherStation::new("ws-west", 100_000.0, 100_000.0),
            WeatherStation::new("ws-east", 300_000.0, 100_000.0),
            WeatherStation::new("ws-border", 200_000.0, 150_000.0),
            WeatherStation::new("ws-edge", 210_000.0, 180_000.0),
            WeatherStation::new("ws-far", 550_000.0, 100_000.0),
            WeatherStation::new("ws-uganda", -50_000.0, 100_000.0),
        ]
    }

    /// The country layer as a GeoJSON FeatureCollection.
    pub fn countries_geojson() -> Value {
        feature_collection(
            countries()
                .iter()
                .map(|c| {
                    let name = c
                        .attribute(COUNTRY_FIELD)
                        .map(|v| v.to_string())
                        .unwrap_or_default();
                    feature(json!({ "admin": name }), multipolygon_json(&c.geometry))
                })
                .collect(),
        )
    }

    /// The climate-zone layer as a GeoJSON FeatureCollection.
    pub fn zones_geojson() -> Value {
        feature_collection(
            zones()
                .iter()
                .map(|z| feature(json!({ "GYGA_CZ": z.zone.code() }), multipolygon_json(&z.geometry)))
                .collect(),
        )
    }

    /// The station layer as a GeoJSON FeatureCollection.
    pub fn stations_geojson() -> Value {
        feature_collection(
            stations()
                .iter()
                .map(|s| {
                    feature(
                        json!({ "station_id": s.id.0 }),
                        json!({ "type": "Point", "coordinates": [s.location.x(), s.location.y()] }),
                    )
                })
                .collect(),
        )
    }

    /// The planted area as an x/y row table.
    pub fn planted_area_table() -> Value {
        Value::Array(
            planted_area()
                .iter()
                .map(|r| match &r.footprint {
                    Footprint::Point(p) => json!({ "x": p.x(), "y": p.y(), "maize": r.crop_value, "cell": r.id.0 }),
                    Footprint::Polygon(_) => unreachable!("study area records are points"),
                })
                .collect(),
        )
    }
}

/// Wrap features into a GeoJSON FeatureCollection.
pub fn feature_collection(features: Vec<Value>) -> Value {
    json!({ "type": "FeatureCollection", "features": features })
}

/// A GeoJSON Feature.
pub fn feature(properties: Value, geometry: Value) -> Value {
    json!({ "type": "Feature", "properties": properties, "geometry": geometry })
}

/// GeoJSON MultiPolygon geometry.
pub fn multipolygon_json(mp: &MultiPolygon<f64>) -> Value {
    let polygons: Vec<Value> = mp
        .0
        .iter()
        .map(|polygon| {
            let mut rings = vec![polygon.exterior()];
            rings.extend(polygon.interiors().iter());
            let rings: Vec<Value> = rings
                .iter()
                .map(|ring| Value::Array(ring.0.iter().map(|c| json!([c.x, c.y])).collect()))
                .collect();
            Value::Array(rings)
        })
        .collect();
    json!({ "type": "MultiPolygon", "coordinates": polygons })
}
