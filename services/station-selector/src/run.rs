//! One selection run: read the layers, run the coverage pipeline for the
//! configured country and crop, and write the outputs.

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use coverage_engine::{
    restrict_records, select_country, CancellationToken, CountryClip, CoverageError,
    CoveragePipeline, GeoProvider, GeometryProvider, PipelineOutput, Predicate,
};
use serde::{Deserialize, Serialize};
use station_common::{PlantedAreaRecord, StationId, WeatherStation};
use tracing::info;

use crate::config::SelectorConfig;
use crate::geojson::{
    properties, read_boundaries, read_layer, read_planted_area, read_stations, read_zones,
    Feature, FeatureCollection, Geometry, PlantedAreaLayer,
};
use crate::output::OutputSet;

/// Machine-readable record of a finished run, written next to the outputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub country: String,
    pub crop: String,
    pub percentage: f64,
    pub total: f64,
    pub threshold: f64,
    pub cumulative: f64,
    pub covered_percentage: f64,
    pub selected_records: usize,
    pub zones: Vec<i64>,
    pub stations: Vec<String>,
    /// Data layers in the summary file; every written file once returned.
    pub outputs: Vec<PathBuf>,
}

/// Names of the files a run writes.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputNames {
    pub boundaries: String,
    pub planted_area: String,
    pub climate_zones: String,
    pub stations: String,
    pub summary: String,
}

impl OutputNames {
    pub fn new(country: &str, crop: &str) -> Self {
        let country = file_stem(country);
        let stem = format!("{}_{}", country, file_stem(crop));
        Self {
            boundaries: format!("{}_Boundaries.geojson", country),
            planted_area: format!("{}_Planted_Area.geojson", stem),
            climate_zones: format!("{}_Area_Climate_Zones.geojson", stem),
            stations: format!("{}_Area_Weather_Stations_Buffered.geojson", stem),
            summary: format!("{}_summary.json", stem),
        }
    }
}

fn file_stem(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' { c } else { '_' })
        .collect()
}

/// Run the selection described by `config`.
///
/// Outputs are written only if every stage succeeds.
pub fn run(config: &SelectorConfig, cancel: CancellationToken) -> Result<RunSummary> {
    config.validate()?;
    let fields = &config.fields;

    let countries = read_boundaries(&read_layer(&config.inputs.countries)?)
        .context("Failed to read country boundaries")?;
    let zones = read_zones(&read_layer(&config.inputs.climate_zones)?, &fields.zone)
        .context("Failed to read climate zones")?;
    let planted: PlantedAreaLayer = read_layer(&config.inputs.planted_area)?;
    let records = read_planted_area(&planted, &fields.crop, fields.record_id.as_deref())
        .context("Failed to read planted area")?;
    let stations = read_stations(&read_layer(&config.inputs.stations)?, fields.station_id.as_deref())
        .context("Failed to read weather stations")?;

    info!(
        countries = countries.len(),
        zone_polygons = zones.len(),
        records = records.len(),
        stations = stations.len(),
        "Loaded input layers"
    );

    let provider = GeoProvider::from_config(&config.engine);
    let pipeline = CoveragePipeline::new(config.engine.clone(), provider)?.with_cancellation(cancel);
    let provider = pipeline.provider();

    let country = select_country(&countries, &fields.country, &config.country, provider)?;
    let records = restrict_records(records, &country, provider);
    let source = CountryClip {
        zones: &zones,
        country: &country,
        provider,
    };
    let output = pipeline.run(&records, &source, &stations)?;

    let names = OutputNames::new(&config.country, &fields.crop);
    let mut outputs = OutputSet::create(&config.output_dir)?;

    let boundary = Feature::new(Geometry::from(&country))
        .with_property(fields.country.clone(), config.country.clone());
    outputs.stage_json(&names.boundaries, &FeatureCollection::new().with_feature(boundary))?;
    outputs.stage_json(
        &names.planted_area,
        &planted_area_collection(&records, &output, provider),
    )?;
    outputs.stage_json(&names.climate_zones, &zones_collection(&output, &fields.zone))?;
    outputs.stage_json(
        &names.stations,
        &stations_collection(&output, &stations, config.engine.buffer_radius_km),
    )?;

    let mut summary = RunSummary {
        country: config.country.clone(),
        crop: fields.crop.clone(),
        percentage: output.selected.percentage,
        total: output.selected.total,
        threshold: output.selected.threshold,
        cumulative: output.selected.cumulative,
        covered_percentage: output.selected.covered_percentage(),
        selected_records: output.selected.len(),
        zones: output.zone_ids.iter().map(|z| z.code()).collect(),
        stations: output.coverage.stations.iter().map(|s| s.station.0.clone()).collect(),
        outputs: [
            &names.boundaries,
            &names.planted_area,
            &names.climate_zones,
            &names.stations,
        ]
        .iter()
        .map(|name| outputs.dir().join(name))
        .collect(),
    };
    outputs.stage_json(&names.summary, &summary)?;

    let written = outputs.commit()?;
    summary.outputs = written;

    info!(
        country = %summary.country,
        crop = %summary.crop,
        selected_records = summary.selected_records,
        zones = summary.zones.len(),
        stations = summary.stations.len(),
        "Station selection complete"
    );

    Ok(summary)
}

/// Machine-readable code for a failed run: the [`CoverageError`] code when a
/// coverage error caused it, `InputError` otherwise.
pub fn error_code(err: &anyhow::Error) -> &'static str {
    err.downcast_ref::<CoverageError>()
        .map(CoverageError::code)
        .unwrap_or("InputError")
}

fn planted_area_collection<P: GeometryProvider>(
    records: &[PlantedAreaRecord],
    output: &PipelineOutput,
    provider: &P,
) -> FeatureCollection {
    let predicate = Predicate::records(output.selected.ids.iter().cloned());
    let selected = provider.select(records, &predicate);
    let features = selected
        .into_iter()
        .map(|record| {
            Feature::new(Geometry::from(&record.footprint))
                .with_properties(properties(&record.attributes))
                .with_property("record_id", record.id.0.clone())
        })
        .collect();
    FeatureCollection::new().with_features(features)
}

fn zones_collection(output: &PipelineOutput, zone_field: &str) -> FeatureCollection {
    let features = output
        .zones
        .iter()
        .map(|zone| {
            Feature::new(Geometry::from(&zone.geometry)).with_property(zone_field, zone.zone.code())
        })
        .collect();
    FeatureCollection::new().with_features(features)
}

fn stations_collection(
    output: &PipelineOutput,
    stations: &[WeatherStation],
    radius_km: f64,
) -> FeatureCollection {
    let by_id: HashMap<&StationId, &WeatherStation> =
        stations.iter().map(|s| (&s.id, s)).collect();
    let features = output
        .coverage
        .stations
        .iter()
        .map(|covered| {
            let attributes = by_id
                .get(&covered.station)
                .map(|s| properties(&s.attributes))
                .unwrap_or_default();
            let zones: Vec<i64> = covered.zones.iter().map(|z| z.code()).collect();
            Feature::new(Geometry::from(&covered.catchment))
                .with_properties(attributes)
                .with_property("station_id", covered.station.0.clone())
                .with_property("x", covered.location.x())
                .with_property("y", covered.location.y())
                .with_property("zones", zones)
                .with_property("buffer_km", radius_km)
        })
        .collect();
    FeatureCollection::new().with_features(features)
}
