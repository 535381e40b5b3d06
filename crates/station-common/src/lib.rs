//! Common types shared by the station coverage crates.

pub mod attribute;
pub mod error;
pub mod footprint;
pub mod ids;
pub mod records;

pub use attribute::{AttributeValue, Attributes};
pub use error::{CoverageError, Result};
pub use footprint::{AreaFootprint, Footprint};
pub use ids::{RecordId, StationId, ZoneId};
pub use records::{BoundaryFeature, ClimateZonePolygon, PlantedAreaRecord, WeatherStation};
