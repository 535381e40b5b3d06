//! Per-zone station catchments.
//!
//! For each climate zone the stations inside it are buffered and the buffers
//! clipped back to the zone, so a catchment never reaches into a neighbouring
//! climate regime. Each station's clipped buffer is kept separately, which
//! lets the merger report station identities; clipping per station and then
//! unioning gives the same geometry as clipping the unioned buffers.
//!
//! Zones only read the shared zone and station layers, so they are built
//! independently (on the rayon pool when enabled).

use std::collections::HashSet;

use geo::{MultiPolygon, Point};
use rayon::prelude::*;
use station_common::{
    ClimateZonePolygon, CoverageError, Result, StationId, WeatherStation, ZoneId,
};
use tracing::{debug, info};

use crate::cancel::CancellationToken;
use crate::filter::Predicate;
use crate::provider::GeometryProvider;

/// One station's buffer, clipped to one zone.
#[derive(Debug, Clone, PartialEq)]
pub struct StationCatchment {
    pub station: StationId,
    pub location: Point<f64>,
    pub geometry: MultiPolygon<f64>,
}

/// All station catchments of a single climate zone.
#[derive(Debug, Clone, PartialEq)]
pub struct Catchment {
    pub zone: ZoneId,
    pub stations: Vec<StationCatchment>,
}

impl Catchment {
    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    /// Union of the zone's station catchments.
    pub fn geometry<P: GeometryProvider>(&self, provider: &P) -> MultiPolygon<f64> {
        let parts: Vec<MultiPolygon<f64>> =
            self.stations.iter().map(|s| s.geometry.clone()).collect();
        provider.union(&parts)
    }
}

/// Reject weather stations that share an identity.
///
/// Catchment pieces are merged per station id, so two stations with one id
/// would silently collapse into one.
pub fn validate_stations(stations: &[WeatherStation]) -> Result<()> {
    let mut seen = HashSet::with_capacity(stations.len());
    for station in stations {
        if !seen.insert(&station.id) {
            return Err(CoverageError::DuplicateStation(station.id.clone()));
        }
    }
    Ok(())
}

/// Builds catchments against shared, read-only zone and station layers.
pub struct CatchmentBuilder<'a, P: GeometryProvider> {
    zones: &'a [ClimateZonePolygon],
    stations: &'a [WeatherStation],
    radius_m: f64,
    provider: &'a P,
}

impl<'a, P: GeometryProvider> CatchmentBuilder<'a, P> {
    pub fn new(
        zones: &'a [ClimateZonePolygon],
        stations: &'a [WeatherStation],
        radius_m: f64,
        provider: &'a P,
    ) -> Self {
        Self {
            zones,
            stations,
            radius_m,
            provider,
        }
    }

    /// Geometry of one zone: every polygon carrying its code, dissolved.
    pub fn zone_geometry(&self, zone: ZoneId) -> MultiPolygon<f64> {
        let parts: Vec<MultiPolygon<f64>> = self
            .provider
            .select(self.zones, &Predicate::zone(zone))
            .into_iter()
            .map(|polygon| polygon.geometry.clone())
            .collect();
        self.provider.union(&parts)
    }

    /// Build the catchment of one zone.
    ///
    /// A station on a boundary shared by two zones is selected by both.
    pub fn build(&self, zone: ZoneId) -> Catchment {
        let zone_geometry = self.zone_geometry(zone);
        let members = self.provider.select_by_location(self.stations, &zone_geometry);

        let stations: Vec<StationCatchment> = members
            .into_iter()
            .filter_map(|station| {
                let buffer = self.provider.buffer(station.location, self.radius_m);
                let geometry = self.provider.clip(&buffer, &zone_geometry);
                if geometry.0.is_empty() {
                    None
                } else {
                    Some(StationCatchment {
                        station: station.id.clone(),
                        location: station.location,
                        geometry,
                    })
                }
            })
            .collect();

        debug!(zone = %zone, stations = stations.len(), "Built zone catchment");

        Catchment { zone, stations }
    }

    /// Build catchments for every zone, in the order given.
    ///
    /// The token is checked before each zone; once it is set the run stops
    /// with [`CoverageError::Cancelled`] and finished catchments are dropped.
    pub fn build_all(
        &self,
        zones: &[ZoneId],
        parallel: bool,
        cancel: &CancellationToken,
    ) -> Result<Vec<Catchment>> {
        let build_one = |zone: &ZoneId| -> Result<Catchment> {
            if cancel.is_cancelled() {
                return Err(CoverageError::Cancelled);
            }
            Ok(self.build(*zone))
        };

        let catchments: Vec<Catchment> = if parallel {
            zones.par_iter().map(build_one).collect::<Result<_>>()?
        } else {
            zones.iter().map(build_one).collect::<Result<_>>()?
        };

        if cancel.is_cancelled() {
            return Err(CoverageError::Cancelled);
        }

        info!(
            zones = catchments.len(),
            station_catchments = catchments.iter().map(|c| c.stations.len()).sum::<usize>(),
            parallel,
            "Built zone catchments"
        );

        Ok(catchments)
    }
}
