//! Pipeline orchestrator: runs the coverage stages in order.
//!
//! ```text
//! records ──► select_area ──► SelectedAreaSet ─────────────────────┐
//!                                  │                               │
//!                                  ▼                               │
//!                      ZoneSource::zones_for (clip)                │
//!                                  │                               │
//!                                  ▼                               ▼
//!                          distinct_zones ──► CatchmentBuilder ──► merge_coverage
//!                                              (per zone, rayon)
//! ```
//!
//! Every stage hands an owned value to the next; intermediate buffers and
//! clips are dropped as soon as the following stage has consumed them.

use station_common::{ClimateZonePolygon, CoverageError, PlantedAreaRecord, Result, WeatherStation, ZoneId};
use tracing::{info, instrument, warn};

use crate::cancel::CancellationToken;
use crate::catchment::{validate_stations, CatchmentBuilder};
use crate::config::CoverageConfig;
use crate::merge::{merge_coverage, CoverageResult};
use crate::partition::distinct_zones;
use crate::provider::GeometryProvider;
use crate::selector::{select_area, SelectedAreaSet};

/// Supplies the climate-zone layer once the planted area has been selected.
///
/// The returned layer must already be clipped to the study area and limited
/// to zones intersecting `selected`.
pub trait ZoneSource {
    fn zones_for(&self, selected: &SelectedAreaSet) -> Result<Vec<ClimateZonePolygon>>;
}

impl<F> ZoneSource for F
where
    F: Fn(&SelectedAreaSet) -> Result<Vec<ClimateZonePolygon>>,
{
    fn zones_for(&self, selected: &SelectedAreaSet) -> Result<Vec<ClimateZonePolygon>> {
        self(selected)
    }
}

/// Everything a run produced.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub selected: SelectedAreaSet,
    /// The clipped climate-zone layer the catchments were built from.
    pub zones: Vec<ClimateZonePolygon>,
    /// Distinct zone codes, ascending.
    pub zone_ids: Vec<ZoneId>,
    pub coverage: CoverageResult,
}

/// The coverage pipeline.
pub struct CoveragePipeline<P: GeometryProvider> {
    config: CoverageConfig,
    provider: P,
    cancel: CancellationToken,
}

impl<P: GeometryProvider> CoveragePipeline<P> {
    /// Create a pipeline, validating the configuration.
    pub fn new(config: CoverageConfig, provider: P) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            provider,
            cancel: CancellationToken::new(),
        })
    }

    /// Use an externally held cancellation token.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn config(&self) -> &CoverageConfig {
        &self.config
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Run the full pipeline.
    ///
    /// `records` must already be restricted to the target country. Fails
    /// fast on invalid records and repeated station ids; an empty zone layer is not an error and
    /// yields an empty coverage result.
    #[instrument(skip_all, fields(records = records.len(), stations = stations.len()))]
    pub fn run<Z>(
        &self,
        records: &[PlantedAreaRecord],
        zone_source: &Z,
        stations: &[WeatherStation],
    ) -> Result<PipelineOutput>
    where
        Z: ZoneSource + ?Sized,
    {
        // 1. Area selection
        let selected = select_area(records, self.config.percentage, &self.provider)?;
        validate_stations(stations)?;
        self.check_cancelled()?;

        // 2. Zone restriction (clip)
        let zones = zone_source.zones_for(&selected)?;

        // 3. Zonal partitioning
        let zone_ids = distinct_zones(&zones);
        if zone_ids.is_empty() {
            warn!("No climate zones intersect the selected planted area");
            return Ok(PipelineOutput {
                selected,
                zones,
                zone_ids,
                coverage: CoverageResult::empty(),
            });
        }
        self.check_cancelled()?;

        // 4. Catchments
        let builder = CatchmentBuilder::new(
            &zones,
            stations,
            self.config.buffer_radius_m(),
            &self.provider,
        );
        let catchments = builder.build_all(&zone_ids, self.config.parallel, &self.cancel)?;

        // 5. Merge
        let coverage = merge_coverage(catchments, &selected, &self.provider);

        info!(
            selected_records = selected.len(),
            zones = zone_ids.len(),
            target_stations = coverage.len(),
            "Coverage run complete"
        );

        Ok(PipelineOutput {
            selected,
            zones,
            zone_ids,
            coverage,
        })
    }

    fn check_cancelled(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            Err(CoverageError::Cancelled)
        } else {
            Ok(())
        }
    }
}
