//! GeoJSON layers and x/y row tables.
//!
//! Only the geometry types the workflow needs are modelled: Point,
//! MultiPoint, Polygon and MultiPolygon. Any other geometry type fails to
//! deserialize.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::{anyhow, bail, ensure, Context, Result};
use geo::{Coord, LineString, MultiPolygon, Point, Polygon};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use station_common::{
    AttributeValue, Attributes, BoundaryFeature, ClimateZonePolygon, Footprint,
    PlantedAreaRecord, RecordId, WeatherStation, ZoneId,
};
use tracing::{debug, warn};

/// A position: `[x, y]`, optionally followed by an elevation that is ignored.
pub type Position = Vec<f64>;

/// A GeoJSON FeatureCollection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeatureCollection {
    /// Type identifier (always "FeatureCollection").
    #[serde(rename = "type")]
    pub type_: String,

    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new() -> Self {
        Self {
            type_: "FeatureCollection".to_string(),
            features: Vec::new(),
        }
    }

    pub fn with_feature(mut self, feature: Feature) -> Self {
        self.features.push(feature);
        self
    }

    pub fn with_features(mut self, features: Vec<Feature>) -> Self {
        self.features.extend(features);
        self
    }

    fn check(&self) -> Result<()> {
        ensure!(
            self.type_ == "FeatureCollection",
            "Expected a GeoJSON FeatureCollection, found {}",
            self.type_
        );
        Ok(())
    }
}

impl Default for FeatureCollection {
    fn default() -> Self {
        Self::new()
    }
}

/// A GeoJSON Feature. Both properties and geometry may be null.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Feature {
    /// Type identifier (always "Feature").
    #[serde(rename = "type")]
    pub type_: String,

    #[serde(default)]
    pub properties: Option<Map<String, Value>>,

    #[serde(default)]
    pub geometry: Option<Geometry>,
}

impl Feature {
    pub fn new(geometry: Geometry) -> Self {
        Self {
            type_: "Feature".to_string(),
            properties: Some(Map::new()),
            geometry: Some(geometry),
        }
    }

    pub fn with_properties(mut self, properties: Map<String, Value>) -> Self {
        self.properties = Some(properties);
        self
    }

    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties
            .get_or_insert_with(Map::new)
            .insert(name.into(), value.into());
        self
    }

    /// The feature's properties as an attribute table.
    pub fn attributes(&self) -> Attributes {
        self.properties.as_ref().map(attributes).unwrap_or_default()
    }
}

/// GeoJSON geometry types read and written by the selector.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Geometry {
    Point {
        coordinates: Position,
    },

    MultiPoint {
        coordinates: Vec<Position>,
    },

    /// Linear rings; the first is the exterior, the rest are holes.
    Polygon {
        coordinates: Vec<Vec<Position>>,
    },

    MultiPolygon {
        coordinates: Vec<Vec<Vec<Position>>>,
    },
}

/// A geometry converted to `geo` types.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Point(Point<f64>),
    MultiPoint(Vec<Point<f64>>),
    Polygon(MultiPolygon<f64>),
}

// ============================================================================
// Geometry conversion
// ============================================================================

fn coord(position: &[f64]) -> Result<Coord<f64>> {
    match position {
        [x, y, ..] => Ok(Coord { x: *x, y: *y }),
        _ => bail!("Position needs at least two numbers"),
    }
}

fn ring(positions: &[Position]) -> Result<LineString<f64>> {
    ensure!(positions.len() >= 3, "Linear ring needs at least three positions");
    let coords = positions
        .iter()
        .map(|p| coord(p))
        .collect::<Result<Vec<_>>>()?;
    Ok(LineString::from(coords))
}

fn polygon(rings: &[Vec<Position>]) -> Result<Polygon<f64>> {
    let (exterior, interiors) = rings
        .split_first()
        .ok_or_else(|| anyhow!("Polygon must have an exterior ring"))?;
    let interiors = interiors
        .iter()
        .map(|r| ring(r))
        .collect::<Result<Vec<_>>>()?;
    Ok(Polygon::new(ring(exterior)?, interiors))
}

impl TryFrom<&Geometry> for Shape {
    type Error = anyhow::Error;

    fn try_from(geometry: &Geometry) -> Result<Self> {
        match geometry {
            Geometry::Point { coordinates } => Ok(Shape::Point(coord(coordinates)?.into())),
            Geometry::MultiPoint { coordinates } => Ok(Shape::MultiPoint(
                coordinates
                    .iter()
                    .map(|p| coord(p).map(Point::from))
                    .collect::<Result<Vec<_>>>()?,
            )),
            Geometry::Polygon { coordinates } => {
                Ok(Shape::Polygon(MultiPolygon::new(vec![polygon(coordinates)?])))
            }
            Geometry::MultiPolygon { coordinates } => Ok(Shape::Polygon(MultiPolygon::new(
                coordinates
                    .iter()
                    .map(|rings| polygon(rings))
                    .collect::<Result<Vec<_>>>()?,
            ))),
        }
    }
}

fn position(c: &Coord<f64>) -> Position {
    vec![c.x, c.y]
}

fn ring_positions(ring: &LineString<f64>) -> Vec<Position> {
    ring.coords().map(position).collect()
}

impl From<&Point<f64>> for Geometry {
    fn from(point: &Point<f64>) -> Self {
        Geometry::Point {
            coordinates: position(&point.0),
        }
    }
}

impl From<&MultiPolygon<f64>> for Geometry {
    fn from(mp: &MultiPolygon<f64>) -> Self {
        let coordinates: Vec<Vec<Vec<Position>>> = mp
            .0
            .iter()
            .map(|polygon| -> Vec<Vec<Position>> {
                std::iter::once(polygon.exterior())
                    .chain(polygon.interiors())
                    .map(ring_positions)
                    .collect()
            })
            .collect();
        Geometry::MultiPolygon { coordinates }
    }
}

impl From<&Footprint> for Geometry {
    fn from(footprint: &Footprint) -> Self {
        match footprint {
            Footprint::Point(p) => p.into(),
            Footprint::Polygon(mp) => mp.into(),
        }
    }
}

// ============================================================================
// Attributes
// ============================================================================

/// Convert a JSON object into an attribute table.
pub fn attributes(properties: &Map<String, Value>) -> Attributes {
    properties
        .iter()
        .map(|(k, v)| (k.clone(), AttributeValue::from(v)))
        .collect()
}

/// Convert an attribute table back into JSON properties.
pub fn properties(attributes: &Attributes) -> Map<String, Value> {
    attributes
        .iter()
        .map(|(k, v)| (k.clone(), Value::from(v)))
        .collect()
}

fn identity(attributes: &Attributes, field: Option<&str>, index: usize) -> Result<String> {
    match field {
        Some(field) => match attributes.get(field) {
            Some(AttributeValue::Null) | None => {
                bail!("Feature {} has no value for id field '{}'", index, field)
            }
            Some(value) => Ok(value.to_string()),
        },
        None => Ok(index.to_string()),
    }
}

fn shape(feature: &Feature, index: usize) -> Result<Option<Shape>> {
    feature
        .geometry
        .as_ref()
        .map(|g| Shape::try_from(g).with_context(|| format!("Feature {}", index)))
        .transpose()
}

fn polygon_geometry(feature: &Feature, index: usize) -> Result<Option<MultiPolygon<f64>>> {
    match shape(feature, index)? {
        None => Ok(None),
        Some(Shape::Polygon(mp)) => Ok(Some(mp)),
        Some(_) => bail!("Feature {} is not a polygon", index),
    }
}

// ============================================================================
// Layer readers
// ============================================================================

/// Read and deserialize a JSON layer from disk.
pub fn read_layer<T, P>(path: P) -> Result<T>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let bytes = fs::read(path).with_context(|| format!("Failed to read {:?}", path))?;
    serde_json::from_slice(&bytes).with_context(|| format!("Invalid layer in {:?}", path))
}

/// Read a boundary layer. Features without geometry are skipped.
pub fn read_boundaries(collection: &FeatureCollection) -> Result<Vec<BoundaryFeature>> {
    collection.check()?;
    let mut boundaries = Vec::new();
    for (index, feature) in collection.features.iter().enumerate() {
        if let Some(geometry) = polygon_geometry(feature, index)? {
            boundaries.push(BoundaryFeature::new(feature.attributes(), geometry));
        }
    }
    debug!(features = boundaries.len(), "Read boundary layer");
    Ok(boundaries)
}

fn zone_code(value: &AttributeValue) -> Option<ZoneId> {
    match value {
        AttributeValue::Number(n) if n.fract() == 0.0 => Some(ZoneId(*n as i64)),
        AttributeValue::Text(s) => ZoneId::parse(s),
        _ => None,
    }
}

/// Read a climate-zone layer, taking each polygon's code from `zone_field`.
///
/// Polygons without a usable code are skipped with a warning.
pub fn read_zones(collection: &FeatureCollection, zone_field: &str) -> Result<Vec<ClimateZonePolygon>> {
    collection.check()?;
    let mut zones = Vec::new();
    let mut skipped = 0usize;
    for (index, feature) in collection.features.iter().enumerate() {
        let Some(geometry) = polygon_geometry(feature, index)? else {
            skipped += 1;
            continue;
        };
        match feature.attributes().get(zone_field).and_then(zone_code) {
            Some(zone) => zones.push(ClimateZonePolygon::new(zone, geometry)),
            None => skipped += 1,
        }
    }
    if skipped > 0 {
        warn!(skipped, field = zone_field, "Skipped climate-zone polygons without a zone code");
    }
    debug!(polygons = zones.len(), "Read climate-zone layer");
    Ok(zones)
}

/// Read a station layer.
///
/// A MultiPoint feature yields one station per point, suffixed `-1`, `-2`, ...
/// Station ids must be unique across the layer.
pub fn read_stations(collection: &FeatureCollection, id_field: Option<&str>) -> Result<Vec<WeatherStation>> {
    collection.check()?;
    let mut stations = Vec::new();
    let mut seen = HashSet::new();
    for (index, feature) in collection.features.iter().enumerate() {
        let Some(shape) = shape(feature, index)? else {
            continue;
        };
        let id = identity(&feature.attributes(), id_field, index)?;
        let points: Vec<(String, Point<f64>)> = match shape {
            Shape::Point(p) => vec![(id, p)],
            Shape::MultiPoint(points) if points.len() == 1 => vec![(id, points[0])],
            Shape::MultiPoint(points) => points
                .into_iter()
                .enumerate()
                .map(|(k, p)| (format!("{}-{}", id, k + 1), p))
                .collect(),
            Shape::Polygon(_) => bail!("Station feature {} is not a point", index),
        };
        for (id, p) in points {
            ensure!(
                seen.insert(id.clone()),
                "Duplicate station id '{}' at feature {}",
                id,
                index
            );
            stations.push(WeatherStation::new(id, p.x(), p.y()).with_attributes(feature.attributes()));
        }
    }
    debug!(stations = stations.len(), "Read station layer");
    Ok(stations)
}

/// A planted-area layer: a FeatureCollection, or a table of rows with
/// numeric `x` and `y` columns, one point per row.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PlantedAreaLayer {
    Table(Vec<Map<String, Value>>),
    Features(FeatureCollection),
}

fn crop_value(attributes: &Attributes, crop_field: &str, id: &str) -> Result<f64> {
    attributes
        .get(crop_field)
        .and_then(AttributeValue::as_f64)
        .ok_or_else(|| anyhow!("Record {} has no numeric '{}' value", id, crop_field))
}

/// Read planted-area records for one crop column.
pub fn read_planted_area(
    layer: &PlantedAreaLayer,
    crop_field: &str,
    id_field: Option<&str>,
) -> Result<Vec<PlantedAreaRecord>> {
    let records = match layer {
        PlantedAreaLayer::Table(rows) => read_row_table(rows, crop_field, id_field)?,
        PlantedAreaLayer::Features(collection) => {
            read_planted_features(collection, crop_field, id_field)?
        }
    };
    debug!(records = records.len(), crop = crop_field, "Read planted area");
    Ok(records)
}

fn read_planted_features(
    collection: &FeatureCollection,
    crop_field: &str,
    id_field: Option<&str>,
) -> Result<Vec<PlantedAreaRecord>> {
    collection.check()?;
    let mut records = Vec::new();
    for (index, feature) in collection.features.iter().enumerate() {
        let Some(shape) = shape(feature, index)? else {
            continue;
        };
        let attributes = feature.attributes();
        let id = identity(&attributes, id_field, index)?;
        let value = crop_value(&attributes, crop_field, &id)?;
        let footprint = match shape {
            Shape::Point(p) => Footprint::Point(p),
            Shape::MultiPoint(points) if points.len() == 1 => Footprint::Point(points[0]),
            Shape::Polygon(mp) => Footprint::Polygon(mp),
            Shape::MultiPoint(_) => bail!("Planted-area feature {} is a multi-point", index),
        };
        records.push(PlantedAreaRecord::new(id, value, footprint).with_attributes(attributes));
    }
    Ok(records)
}

fn read_row_table(
    rows: &[Map<String, Value>],
    crop_field: &str,
    id_field: Option<&str>,
) -> Result<Vec<PlantedAreaRecord>> {
    rows.iter()
        .enumerate()
        .map(|(index, row)| -> Result<PlantedAreaRecord> {
            let mut columns = attributes(row);
            let id = match id_field {
                Some(_) => identity(&columns, id_field, index)?,
                None => RecordId::from(index).0,
            };
            let x = columns.remove("x").and_then(|v| v.as_f64());
            let y = columns.remove("y").and_then(|v| v.as_f64());
            let (Some(x), Some(y)) = (x, y) else {
                bail!("Row {} has no numeric x/y columns", index);
            };
            let value = crop_value(&columns, crop_field, &id)?;
            Ok(PlantedAreaRecord::new(id, value, Footprint::point(x, y)).with_attributes(columns))
        })
        .collect()
}
