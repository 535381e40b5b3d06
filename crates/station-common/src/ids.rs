//! Identity newtypes for records, stations and climate zones.

use serde::{Deserialize, Serialize};

/// Unique identifier for a planted-area record.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RecordId(pub String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<usize> for RecordId {
    fn from(index: usize) -> Self {
        Self(index.to_string())
    }
}

/// Unique identifier for a weather station.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StationId(pub String);

impl StationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for StationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Climate zone code, e.g. a GYGA climate zone such as `5003`.
///
/// Zone codes are integers, so they order numerically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ZoneId(pub i64);

impl ZoneId {
    pub fn new(code: i64) -> Self {
        Self(code)
    }

    pub fn code(&self) -> i64 {
        self.0
    }

    /// Parse a zone code from a string attribute, tolerating a `.0` suffix
    /// left behind by tools that store codes as doubles.
    pub fn parse(s: &str) -> Option<Self> {
        let trimmed = s.trim();
        let digits = trimmed.strip_suffix(".0").unwrap_or(trimmed);
        digits.parse().ok().map(Self)
    }
}

impl std::fmt::Display for ZoneId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zone_ids_order_numerically() {
        let mut zones = vec![ZoneId(10), ZoneId(9), ZoneId(5003)];
        zones.sort();
        assert_eq!(zones, vec![ZoneId(9), ZoneId(10), ZoneId(5003)]);
    }

    #[test]
    fn test_zone_id_parse() {
        assert_eq!(ZoneId::parse("5003"), Some(ZoneId(5003)));
        assert_eq!(ZoneId::parse(" 7003.0 "), Some(ZoneId(7003)));
        assert_eq!(ZoneId::parse("temperate"), None);
    }

    #[test]
    fn test_record_id_from_row_index() {
        assert_eq!(RecordId::from(17usize), RecordId::new("17"));
    }
}
