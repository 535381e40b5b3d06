//! Spatial restriction steps that surround the core pipeline: picking the
//! target country, keeping the planted area inside it, and clipping the
//! climate-zone layer to the country and the selected area.

use geo::MultiPolygon;
use station_common::{
    AttributeValue, BoundaryFeature, ClimateZonePolygon, CoverageError, PlantedAreaRecord, Result,
};
use tracing::{debug, info};

use crate::filter::Predicate;
use crate::pipeline::ZoneSource;
use crate::provider::GeometryProvider;
use crate::selector::SelectedAreaSet;

/// Boundary of the features whose `field` equals `value`, dissolved.
pub fn select_country<P: GeometryProvider>(
    features: &[BoundaryFeature],
    field: &str,
    value: &str,
    provider: &P,
) -> Result<MultiPolygon<f64>> {
    let predicate = Predicate::attribute_equals(field, AttributeValue::text(value));
    let parts: Vec<MultiPolygon<f64>> = provider
        .select(features, &predicate)
        .into_iter()
        .map(|f| f.geometry.clone())
        .collect();

    if parts.is_empty() {
        return Err(CoverageError::country_not_found(field, value));
    }

    info!(country = value, features = parts.len(), "Selected target country");
    Ok(provider.union(&parts))
}

/// Planted-area records intersecting the country boundary, in input order.
pub fn restrict_records<P: GeometryProvider>(
    records: Vec<PlantedAreaRecord>,
    country: &MultiPolygon<f64>,
    provider: &P,
) -> Vec<PlantedAreaRecord> {
    let before = records.len();
    let kept: Vec<PlantedAreaRecord> = records
        .into_iter()
        .filter(|r| provider.footprint_intersects(&r.footprint, country))
        .collect();
    info!(before, after = kept.len(), "Restricted planted area to country");
    kept
}

/// Zones intersecting the selected area, clipped to the country.
///
/// Polygons that vanish after clipping are dropped.
pub fn clip_zones<P: GeometryProvider>(
    zones: &[ClimateZonePolygon],
    country: &MultiPolygon<f64>,
    selected: &SelectedAreaSet,
    provider: &P,
) -> Vec<ClimateZonePolygon> {
    let clipped: Vec<ClimateZonePolygon> = zones
        .iter()
        .filter(|z| provider.area_intersects(&selected.footprint, &z.geometry))
        .filter_map(|z| {
            let geometry = provider.clip(&z.geometry, country);
            if geometry.0.is_empty() {
                None
            } else {
                Some(ClimateZonePolygon::new(z.zone, geometry))
            }
        })
        .collect();
    debug!(input = zones.len(), clipped = clipped.len(), "Clipped climate zones");
    clipped
}

/// [`ZoneSource`] that clips a raw climate-zone layer to a country.
pub struct CountryClip<'a, P: GeometryProvider> {
    pub zones: &'a [ClimateZonePolygon],
    pub country: &'a MultiPolygon<f64>,
    pub provider: &'a P,
}

impl<'a, P: GeometryProvider> ZoneSource for CountryClip<'a, P> {
    fn zones_for(&self, selected: &SelectedAreaSet) -> Result<Vec<ClimateZonePolygon>> {
        Ok(clip_zones(self.zones, self.country, selected, self.provider))
    }
}
