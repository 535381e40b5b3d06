//! End-to-end tests for the coverage pipeline on the planar study area.

use coverage_engine::{
    restrict_records, select_country, CancellationToken, CountryClip, CoverageConfig,
    CoverageError, CoveragePipeline, DistanceModel, GeoProvider, SelectedAreaSet,
};
use geo::Area;
use station_common::{ClimateZonePolygon, RecordId, Result, StationId, WeatherStation, ZoneId};
use test_utils::{
    assert_stations, lcg_values, polygon_records, rect, station_grid, study_area, zone_strips,
};

fn config(percentage: f64) -> CoverageConfig {
    CoverageConfig {
        percentage,
        buffer_radius_km: study_area::RADIUS_KM,
        buffer_segments: 64,
        distance_model: DistanceModel::Planar,
        parallel: true,
    }
}

fn pipeline(percentage: f64) -> CoveragePipeline<GeoProvider> {
    let config = config(percentage);
    let provider = GeoProvider::from_config(&config);
    CoveragePipeline::new(config, provider).unwrap()
}

fn run(percentage: f64) -> Result<coverage_engine::PipelineOutput> {
    let pipeline = pipeline(percentage);
    let provider = pipeline.provider();
    let country = select_country(
        &study_area::countries(),
        study_area::COUNTRY_FIELD,
        study_area::COUNTRY,
        provider,
    )?;
    let records = restrict_records(study_area::planted_area(), &country, provider);
    let zones = study_area::zones();
    let source = CountryClip {
        zones: &zones,
        country: &country,
        provider,
    };
    pipeline.run(&records, &source, &study_area::stations())
}

// ============================================================================
// Full workflow
// ============================================================================

#[test]
fn test_study_area_at_60_percent() {
    let output = run(60.0).unwrap();

    assert_eq!(output.selected.ids, vec![RecordId::new("r1"), RecordId::new("r2")]);
    assert_eq!(output.selected.total, 100.0);
    assert_eq!(output.zone_ids, vec![ZoneId(1), ZoneId(2)]);
    assert_stations!(output.coverage, study_area::EXPECTED_AT_60);
}

#[test]
fn test_record_outside_country_is_ignored() {
    let output = run(60.0).unwrap();
    assert!(!output.selected.ids.contains(&RecordId::new("r5")));
}

#[test]
fn test_station_outside_every_zone_never_selected() {
    for percentage in [10.0, 60.0, 100.0] {
        let ids = run(percentage).unwrap().coverage.station_ids();
        assert!(!ids.contains(&StationId::new("ws-far")));
        assert!(!ids.contains(&StationId::new("ws-uganda")));
    }
}

#[test]
fn test_zone_clipping_precedes_area_intersection() {
    // ws-edge's unclipped buffer reaches r1, but r1 lies in the neighbouring zone.
    let output = run(100.0).unwrap();
    assert!(!output.coverage.station_ids().contains(&StationId::new("ws-edge")));
}

#[test]
fn test_border_station_keeps_only_reaching_zone() {
    let output = run(60.0).unwrap();
    let border = output
        .coverage
        .stations
        .iter()
        .find(|s| s.station == StationId::new("ws-border"))
        .unwrap();
    assert_eq!(border.zones, vec![ZoneId(1)]);
}

#[test]
fn test_covered_area_is_subset_of_selection() {
    let output = run(60.0).unwrap();
    assert_eq!(output.coverage.covered_area.point_count(), 2);
}

#[test]
fn test_idempotent() {
    let first = run(60.0).unwrap();
    let second = run(60.0).unwrap();
    assert_eq!(first.coverage.station_ids(), second.coverage.station_ids());
    assert_eq!(first.coverage, second.coverage);
}

#[test]
fn test_sequential_and_parallel_agree() {
    let mut sequential = config(100.0);
    sequential.parallel = false;
    let provider = GeoProvider::from_config(&sequential);
    let country = study_area::kenya();
    let records = restrict_records(study_area::planted_area(), &country, &provider);
    let zones = study_area::zones();
    let source = CountryClip { zones: &zones, country: &country, provider: &provider };

    let a = CoveragePipeline::new(sequential, provider.clone())
        .unwrap()
        .run(&records, &source, &study_area::stations())
        .unwrap();
    let b = run(100.0).unwrap();
    assert_eq!(a.coverage, b.coverage);
}

// ============================================================================
// Polygon planted area
// ============================================================================

/// Four 100 km cells in two rows; the bottom row carries most of the crop.
///
/// ```text
///   300 km ┌──────────┬──────────┐
///          │          │ ws-drop  │
///   200 km ├──────────┼──────────┤
///          │ ws-reach │          │   cell-2 (10), cell-3 (5)
///   100 km ├──────────┼──────────┤
///          │          │ws-inside │   cell-0 (50), cell-1 (40)
///        0 └──────────┴──────────┘
///          0    zone 1   100  zone 2   200 km
/// ```
fn polygon_run(percentage: f64, stations: &[WeatherStation]) -> Result<coverage_engine::PipelineOutput> {
    let pipeline = pipeline(percentage);
    let provider = pipeline.provider();
    let country = rect(0.0, 0.0, 200_000.0, 300_000.0);
    let records = restrict_records(
        polygon_records(&[50.0, 40.0, 10.0, 5.0], 2, 100_000.0),
        &country,
        provider,
    );
    let zones = zone_strips(2, 100_000.0, 300_000.0);
    let source = CountryClip {
        zones: &zones,
        country: &country,
        provider,
    };
    pipeline.run(&records, &source, stations)
}

fn polygon_stations() -> Vec<WeatherStation> {
    vec![
        WeatherStation::new("ws-inside", 150_000.0, 50_000.0),
        WeatherStation::new("ws-reach", 50_000.0, 180_000.0),
        WeatherStation::new("ws-drop", 150_000.0, 250_000.0),
    ]
}

#[test]
fn test_polygon_records_select_bottom_row() {
    let output = polygon_run(50.0, &polygon_stations()).unwrap();

    assert_eq!(
        output.selected.ids,
        vec![RecordId::new("cell-0"), RecordId::new("cell-1")]
    );
    assert_eq!(output.selected.footprint.point_count(), 0);
    assert!((output.selected.footprint.polygons.unsigned_area() - 2.0e10).abs() < 1.0);
    assert_eq!(output.zone_ids, vec![ZoneId(1), ZoneId(2)]);
}

#[test]
fn test_polygon_catchment_overlap_keeps_station() {
    let output = polygon_run(50.0, &polygon_stations()).unwrap();

    // ws-reach sits on an unselected cell; its buffer reaches 20 km into cell-0.
    // ws-drop's buffer stops 50 km short of the selected row.
    assert_stations!(output.coverage, ["ws-inside", "ws-reach"]);
    let reach = output
        .coverage
        .stations
        .iter()
        .find(|s| s.station == StationId::new("ws-reach"))
        .unwrap();
    assert_eq!(reach.zones, vec![ZoneId(1)]);
}

#[test]
fn test_polygon_covered_area_is_clipped_selection() {
    let output = polygon_run(50.0, &polygon_stations()).unwrap();
    let covered = &output.coverage.covered_area;

    assert_eq!(covered.point_count(), 0);
    let area = covered.polygons.unsigned_area();
    // All of cell-1 plus the sliver of cell-0 reached by ws-reach.
    assert!(area > 1.0e10 && area < 2.0e10, "covered area {}", area);
}

#[test]
fn test_generated_polygon_grid_sequential_and_parallel_agree() {
    let records = polygon_records(&lcg_values(11, 24, 100.0), 6, 50_000.0);
    let zones = zone_strips(3, 100_000.0, 200_000.0);
    let stations = station_grid(25_000.0, 25_000.0, 6, 4, 50_000.0);
    let country = rect(0.0, 0.0, 300_000.0, 200_000.0);

    let run_with = |parallel: bool| {
        let mut config = config(70.0);
        config.parallel = parallel;
        let provider = GeoProvider::from_config(&config);
        let source = CountryClip {
            zones: &zones,
            country: &country,
            provider: &provider,
        };
        CoveragePipeline::new(config, provider.clone())
            .unwrap()
            .run(&records, &source, &stations)
            .unwrap()
    };

    let sequential = run_with(false);
    let parallel = run_with(true);
    assert_eq!(sequential.coverage, parallel.coverage);
    assert!(!sequential.coverage.is_empty());
    for station in &sequential.coverage.stations {
        assert!(station.zones.iter().all(|z| sequential.zone_ids.contains(z)));
    }
}

// ============================================================================
// Failure and empty cases
// ============================================================================

#[test]
fn test_empty_zone_layer_gives_empty_coverage() {
    let pipeline = pipeline(60.0);
    let no_zones = |_: &SelectedAreaSet| -> Result<Vec<ClimateZonePolygon>> { Ok(Vec::new()) };

    let output = pipeline
        .run(&study_area::planted_area(), &no_zones, &study_area::stations())
        .unwrap();
    assert!(output.zone_ids.is_empty());
    assert!(output.coverage.is_empty());
}

#[test]
fn test_all_zero_values_fails_before_zones_are_requested() {
    let pipeline = pipeline(60.0);
    let mut records = study_area::planted_area();
    for record in &mut records {
        record.crop_value = 0.0;
    }
    let unreachable = |_: &SelectedAreaSet| -> Result<Vec<ClimateZonePolygon>> {
        panic!("zone source must not be consulted")
    };

    let result = pipeline.run(&records, &unreachable, &study_area::stations());
    assert!(matches!(result, Err(CoverageError::EmptyCoverage { .. })));
}

#[test]
fn test_duplicate_identity_aborts_run() {
    let pipeline = pipeline(60.0);
    let mut records = study_area::planted_area();
    records[3].id = RecordId::new("r1");
    let zones = study_area::zones();
    let source = |_: &SelectedAreaSet| -> Result<Vec<ClimateZonePolygon>> { Ok(zones.clone()) };

    let result = pipeline.run(&records, &source, &study_area::stations());
    assert_eq!(result.unwrap_err(), CoverageError::DuplicateIdentity(RecordId::new("r1")));
}

#[test]
fn test_repeated_station_id_aborts_run() {
    let mut stations = polygon_stations();
    stations[2].id = StationId::new("ws-inside");

    let result = polygon_run(50.0, &stations);
    assert_eq!(
        result.unwrap_err(),
        CoverageError::DuplicateStation(StationId::new("ws-inside"))
    );
}

#[test]
fn test_invalid_percentage_rejected_at_construction() {
    let config = config(0.0);
    let provider = GeoProvider::from_config(&config);
    assert!(matches!(
        CoveragePipeline::new(config, provider),
        Err(CoverageError::InvalidThreshold(_))
    ));
}

#[test]
fn test_cancelled_pipeline_discards_results() {
    let token = CancellationToken::new();
    let pipeline = pipeline(60.0).with_cancellation(token.clone());
    token.cancel();

    let zones = study_area::zones();
    let source = |_: &SelectedAreaSet| -> Result<Vec<ClimateZonePolygon>> { Ok(zones.clone()) };

    let result = pipeline.run(&study_area::planted_area(), &source, &study_area::stations());
    assert_eq!(result.unwrap_err(), CoverageError::Cancelled);
}
