//! Typed feature predicates.
//!
//! Selections are expressed as [`Predicate`] values and evaluated against
//! features implementing [`Filterable`], so identity and zone matching never
//! goes through an interpolated query string.

use std::collections::BTreeSet;

use station_common::{
    AttributeValue, BoundaryFeature, ClimateZonePolygon, PlantedAreaRecord, RecordId,
    WeatherStation, ZoneId,
};

/// An attribute-level selection predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Climate-zone polygons with this zone code.
    ZoneEquals(ZoneId),
    /// Planted-area records whose identity is in the set.
    RecordIn(BTreeSet<RecordId>),
    /// Features whose attribute `field` equals `value`.
    AttributeEquals { field: String, value: AttributeValue },
    /// All of the inner predicates hold.
    And(Vec<Predicate>),
}

impl Predicate {
    pub fn zone(zone: ZoneId) -> Self {
        Self::ZoneEquals(zone)
    }

    pub fn records<I>(ids: I) -> Self
    where
        I: IntoIterator<Item = RecordId>,
    {
        Self::RecordIn(ids.into_iter().collect())
    }

    pub fn attribute_equals(field: impl Into<String>, value: AttributeValue) -> Self {
        Self::AttributeEquals {
            field: field.into(),
            value,
        }
    }
}

/// A feature that can be tested against a [`Predicate`].
///
/// Predicates that do not apply to a feature type never match it.
pub trait Filterable {
    fn attribute(&self, field: &str) -> Option<&AttributeValue>;

    fn matches(&self, predicate: &Predicate) -> bool {
        match predicate {
            Predicate::AttributeEquals { field, value } => self
                .attribute(field)
                .map(|actual| actual.matches(value))
                .unwrap_or(false),
            Predicate::And(inner) => inner.iter().all(|p| self.matches(p)),
            Predicate::ZoneEquals(_) | Predicate::RecordIn(_) => false,
        }
    }
}

impl Filterable for ClimateZonePolygon {
    fn attribute(&self, _field: &str) -> Option<&AttributeValue> {
        None
    }

    fn matches(&self, predicate: &Predicate) -> bool {
        match predicate {
            Predicate::ZoneEquals(zone) => self.zone == *zone,
            Predicate::And(inner) => inner.iter().all(|p| self.matches(p)),
            _ => false,
        }
    }
}

impl Filterable for PlantedAreaRecord {
    fn attribute(&self, field: &str) -> Option<&AttributeValue> {
        self.attributes.get(field)
    }

    fn matches(&self, predicate: &Predicate) -> bool {
        match predicate {
            Predicate::RecordIn(ids) => ids.contains(&self.id),
            Predicate::AttributeEquals { field, value } => self
                .attribute(field)
                .map(|actual| actual.matches(value))
                .unwrap_or(false),
            Predicate::And(inner) => inner.iter().all(|p| self.matches(p)),
            Predicate::ZoneEquals(_) => false,
        }
    }
}

impl Filterable for WeatherStation {
    fn attribute(&self, field: &str) -> Option<&AttributeValue> {
        self.attributes.get(field)
    }
}

impl Filterable for BoundaryFeature {
    fn attribute(&self, field: &str) -> Option<&AttributeValue> {
        self.attributes.get(field)
    }
}
