//! Target weather station selection for yield-gap analysis.
//!
//! Given planted-area samples for one crop in one country, a climate-zone
//! layer and a set of weather stations, this crate finds the stations whose
//! catchments cover the bulk of the planted area:
//!
//! - **Area selection**: the fewest largest records whose crop value exceeds
//!   a target share of the country total
//! - **Zonal partitioning**: the distinct climate zones touching that area
//! - **Catchments**: per zone, station buffers clipped to the zone polygon
//! - **Merging**: the union of all catchments, intersected with the selected
//!   area, and the stations that survive it
//!
//! # Example
//!
//! ```ignore
//! use coverage_engine::{CountryClip, CoverageConfig, CoveragePipeline, GeoProvider};
//!
//! let config = CoverageConfig { percentage: 80.0, ..Default::default() };
//! let pipeline = CoveragePipeline::new(config.clone(), GeoProvider::from_config(&config))?;
//!
//! let source = CountryClip { zones: &zones, country: &country, provider: pipeline.provider() };
//! let output = pipeline.run(&records, &source, &stations)?;
//!
//! for station in &output.coverage.stations {
//!     println!("{} covers zones {:?}", station.station, station.zones);
//! }
//! ```

pub mod cancel;
pub mod catchment;
pub mod config;
pub mod filter;
pub mod merge;
pub mod partition;
pub mod pipeline;
pub mod provider;
pub mod restrict;
pub mod selector;

// Re-export commonly used types at crate root
pub use cancel::CancellationToken;
pub use catchment::{validate_stations, Catchment, CatchmentBuilder, StationCatchment};
pub use config::{CoverageConfig, DistanceModel, DEFAULT_BUFFER_RADIUS_KM};
pub use filter::{Filterable, Predicate};
pub use merge::{merge_coverage, CoverageResult, CoveredStation};
pub use partition::distinct_zones;
pub use pipeline::{CoveragePipeline, PipelineOutput, ZoneSource};
pub use provider::{GeoProvider, GeometryProvider};
pub use restrict::{clip_zones, restrict_records, select_country, CountryClip};
pub use selector::{select_area, select_by_threshold, validate_records, SelectedAreaSet, ThresholdSelection};
pub use station_common::{CoverageError, Result};
