//! Configuration for the coverage engine.

use serde::{Deserialize, Serialize};
use station_common::{CoverageError, Result};

/// Default catchment radius around each weather station.
pub const DEFAULT_BUFFER_RADIUS_KM: f64 = 100.0;

/// Configuration for a coverage run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoverageConfig {
    /// Share of the total crop value the selected records must exceed, in (0, 100].
    pub percentage: f64,

    /// Catchment radius around each station in kilometres.
    pub buffer_radius_km: f64,

    /// Number of segments used to approximate a buffer circle.
    pub buffer_segments: usize,

    /// How buffer distances relate to input coordinates.
    pub distance_model: DistanceModel,

    /// Build per-zone catchments on the rayon thread pool.
    pub parallel: bool,
}

impl Default for CoverageConfig {
    fn default() -> Self {
        Self {
            percentage: 80.0,
            buffer_radius_km: DEFAULT_BUFFER_RADIUS_KM,
            buffer_segments: 64,
            distance_model: DistanceModel::Geodesic,
            parallel: true,
        }
    }
}

impl CoverageConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("COVERAGE_PERCENTAGE") {
            if let Ok(percentage) = val.parse() {
                config.percentage = percentage;
            }
        }

        if let Ok(val) = std::env::var("BUFFER_RADIUS_KM") {
            if let Ok(radius) = val.parse() {
                config.buffer_radius_km = radius;
            }
        }

        if let Ok(val) = std::env::var("BUFFER_SEGMENTS") {
            if let Ok(segments) = val.parse() {
                config.buffer_segments = segments;
            }
        }

        if let Ok(val) = std::env::var("DISTANCE_MODEL") {
            config.distance_model = DistanceModel::from_str(&val);
        }

        if let Ok(val) = std::env::var("COVERAGE_PARALLEL") {
            config.parallel = val.to_lowercase() == "true" || val == "1";
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if !(self.percentage > 0.0 && self.percentage <= 100.0) {
            return Err(CoverageError::InvalidThreshold(self.percentage));
        }

        if !(self.buffer_radius_km > 0.0) || !self.buffer_radius_km.is_finite() {
            return Err(CoverageError::invalid_config(format!(
                "buffer_radius_km must be a positive number, got {}",
                self.buffer_radius_km
            )));
        }

        if self.buffer_segments < 8 {
            return Err(CoverageError::invalid_config(format!(
                "buffer_segments must be >= 8, got {}",
                self.buffer_segments
            )));
        }

        Ok(())
    }

    /// Buffer radius in metres.
    pub fn buffer_radius_m(&self) -> f64 {
        self.buffer_radius_km * 1000.0
    }
}

/// Interpretation of input coordinates when buffering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceModel {
    /// Longitude/latitude degrees (EPSG:4326); distances measured on the sphere.
    Geodesic,
    /// Projected coordinates in metres.
    Planar,
}

impl Default for DistanceModel {
    fn default() -> Self {
        Self::Geodesic
    }
}

impl DistanceModel {
    /// Parse from string (case-insensitive).
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "planar" | "projected" | "euclidean" => Self::Planar,
            _ => Self::Geodesic,
        }
    }

    /// Get the model name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Geodesic => "geodesic",
            Self::Planar => "planar",
        }
    }
}
