//! Coverage merging: union the zone catchments and keep the stations whose
//! catchment reaches the selected planted area.

use std::collections::{BTreeMap, BTreeSet};

use geo::{MultiPolygon, Point};
use station_common::{AreaFootprint, StationId, ZoneId};
use tracing::info;

use crate::catchment::Catchment;
use crate::provider::GeometryProvider;
use crate::selector::SelectedAreaSet;

/// A station that covers part of the selected planted area.
#[derive(Debug, Clone, PartialEq)]
pub struct CoveredStation {
    pub station: StationId,
    pub location: Point<f64>,
    /// Zones in which the station's clipped catchment reaches the selected area.
    pub zones: Vec<ZoneId>,
    /// Union of those zone-clipped catchment pieces.
    pub catchment: MultiPolygon<f64>,
}

/// Final station selection.
#[derive(Debug, Clone, PartialEq)]
pub struct CoverageResult {
    /// Covering stations, ordered by identity.
    pub stations: Vec<CoveredStation>,
    /// Union of every zone catchment, before intersecting with the selected area.
    pub coverage: MultiPolygon<f64>,
    /// The part of the selected area covered by some catchment.
    pub covered_area: AreaFootprint,
}

impl CoverageResult {
    pub fn empty() -> Self {
        Self {
            stations: Vec::new(),
            coverage: MultiPolygon::new(Vec::new()),
            covered_area: AreaFootprint::empty(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn station_ids(&self) -> BTreeSet<StationId> {
        self.stations.iter().map(|s| s.station.clone()).collect()
    }
}

/// Merge zone catchments and intersect them with the selected area.
///
/// A station is kept iff one of its zone-clipped pieces intersects the
/// selected footprint; pieces that miss the selected area are dropped.
pub fn merge_coverage<P: GeometryProvider>(
    catchments: Vec<Catchment>,
    selected: &SelectedAreaSet,
    provider: &P,
) -> CoverageResult {
    let pieces: Vec<MultiPolygon<f64>> = catchments
        .iter()
        .flat_map(|c| c.stations.iter().map(|s| s.geometry.clone()))
        .collect();
    let coverage = provider.union(&pieces);
    let covered_area = provider.clip_area(&selected.footprint, &coverage);

    let mut surviving: BTreeMap<StationId, (Point<f64>, Vec<ZoneId>, Vec<MultiPolygon<f64>>)> =
        BTreeMap::new();
    for catchment in catchments {
        for piece in catchment.stations {
            if !provider.area_intersects(&selected.footprint, &piece.geometry) {
                continue;
            }
            let entry = surviving
                .entry(piece.station)
                .or_insert_with(|| (piece.location, Vec::new(), Vec::new()));
            entry.1.push(catchment.zone);
            entry.2.push(piece.geometry);
        }
    }

    let stations: Vec<CoveredStation> = surviving
        .into_iter()
        .map(|(station, (location, zones, parts))| CoveredStation {
            station,
            location,
            zones,
            catchment: provider.union(&parts),
        })
        .collect();

    info!(
        stations = stations.len(),
        covered_points = covered_area.point_count(),
        "Merged station coverage"
    );

    CoverageResult {
        stations,
        coverage,
        covered_area,
    }
}
