//! Zonal partitioning of the clipped climate-zone layer.

use std::collections::BTreeSet;

use station_common::{ClimateZonePolygon, ZoneId};
use tracing::{debug, warn};

/// Distinct zone codes present in the layer, ascending.
///
/// An empty layer yields an empty list; downstream stages then produce an
/// empty coverage result.
pub fn distinct_zones(layer: &[ClimateZonePolygon]) -> Vec<ZoneId> {
    let zones: BTreeSet<ZoneId> = layer.iter().map(|polygon| polygon.zone).collect();

    if zones.is_empty() {
        warn!("Climate-zone layer is empty; no catchments will be built");
    } else {
        debug!(polygons = layer.len(), zones = zones.len(), "Partitioned climate zones");
    }

    zones.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::MultiPolygon;

    fn polygon(code: i64) -> ClimateZonePolygon {
        ClimateZonePolygon::new(ZoneId(code), MultiPolygon::new(vec![]))
    }

    #[test]
    fn test_deduplicates_and_sorts() {
        let layer = vec![polygon(7003), polygon(5003), polygon(7003), polygon(10), polygon(5003)];
        assert_eq!(
            distinct_zones(&layer),
            vec![ZoneId(10), ZoneId(5003), ZoneId(7003)]
        );
    }

    #[test]
    fn test_empty_layer_gives_no_zones() {
        assert!(distinct_zones(&[]).is_empty());
    }
}
