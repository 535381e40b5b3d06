//! Error types for station coverage computation.

use thiserror::Error;

use crate::ids::{RecordId, StationId};

/// Errors that abort a coverage run.
///
/// Conditions that are legitimate in real data (a zone without stations, an
/// empty climate-zone layer) are not errors; they produce empty results.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoverageError {
    /// The selection threshold can never be exceeded because no record
    /// carries a positive crop value.
    #[error("no planted area to cover: total crop value is {total}")]
    EmptyCoverage { total: f64 },

    /// Two planted-area records share one identity.
    #[error("duplicate planted-area record identity: {0}")]
    DuplicateIdentity(RecordId),

    /// Two weather stations share one identity.
    #[error("duplicate weather station identity: {0}")]
    DuplicateStation(StationId),

    /// Target percentage outside (0, 100].
    #[error("invalid target percentage {0}: must be in (0, 100]")]
    InvalidThreshold(f64),

    /// A crop value is negative or not a number.
    #[error("invalid crop value {value} for record {id}")]
    InvalidCropValue { id: RecordId, value: f64 },

    /// No boundary feature matched the requested country.
    #[error("no boundary feature with {field} = '{value}'")]
    CountryNotFound { field: String, value: String },

    /// Configuration error.
    #[error("configuration error: {0}")]
    InvalidConfig(String),

    /// The run was cancelled between zones.
    #[error("coverage run cancelled")]
    Cancelled,
}

impl CoverageError {
    /// Create an InvalidConfig error.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a CountryNotFound error.
    pub fn country_not_found(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::CountryNotFound {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Short machine-readable code, logged when a run fails.
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyCoverage { .. } => "EmptyCoverage",
            Self::DuplicateIdentity(_) => "DuplicateIdentity",
            Self::DuplicateStation(_) => "DuplicateStation",
            Self::InvalidThreshold(_) => "InvalidThreshold",
            Self::InvalidCropValue { .. } => "InvalidCropValue",
            Self::CountryNotFound { .. } => "CountryNotFound",
            Self::InvalidConfig(_) => "InvalidConfig",
            Self::Cancelled => "Cancelled",
        }
    }
}

/// Result type for coverage operations.
pub type Result<T> = std::result::Result<T, CoverageError>;
