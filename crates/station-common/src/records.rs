//! Input feature records.

use geo::{MultiPolygon, Point};

use crate::attribute::{AttributeValue, Attributes};
use crate::footprint::Footprint;
use crate::ids::{RecordId, StationId, ZoneId};

/// One planted-area sample: how much of the crop is planted at a location.
#[derive(Debug, Clone, PartialEq)]
pub struct PlantedAreaRecord {
    pub id: RecordId,
    /// Planted quantity (e.g. hectares) of the selected crop. Non-negative.
    pub crop_value: f64,
    pub footprint: Footprint,
    pub attributes: Attributes,
}

impl PlantedAreaRecord {
    pub fn new(id: impl Into<String>, crop_value: f64, footprint: Footprint) -> Self {
        Self {
            id: RecordId::new(id),
            crop_value,
            footprint,
            attributes: Attributes::new(),
        }
    }

    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }
}

/// A weather station location.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherStation {
    pub id: StationId,
    pub location: Point<f64>,
    pub attributes: Attributes,
}

impl WeatherStation {
    pub fn new(id: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            id: StationId::new(id),
            location: Point::new(x, y),
            attributes: Attributes::new(),
        }
    }

    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }
}

/// A climate-zone polygon. Several polygons may carry the same zone code.
#[derive(Debug, Clone, PartialEq)]
pub struct ClimateZonePolygon {
    pub zone: ZoneId,
    pub geometry: MultiPolygon<f64>,
}

impl ClimateZonePolygon {
    pub fn new(zone: ZoneId, geometry: MultiPolygon<f64>) -> Self {
        Self { zone, geometry }
    }
}

/// An administrative boundary feature, e.g. one country.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryFeature {
    pub attributes: Attributes,
    pub geometry: MultiPolygon<f64>,
}

impl BoundaryFeature {
    pub fn new(attributes: Attributes, geometry: MultiPolygon<f64>) -> Self {
        Self {
            attributes,
            geometry,
        }
    }

    pub fn attribute(&self, field: &str) -> Option<&AttributeValue> {
        self.attributes.get(field)
    }
}
