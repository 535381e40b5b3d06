//! Test data generators for synthetic planted-area, zone and station layers.
//!
//! These generators create predictable, verifiable patterns that can be used
//! across the test suite.

use geo::MultiPolygon;
use station_common::{ClimateZonePolygon, Footprint, PlantedAreaRecord, WeatherStation, ZoneId};

use crate::fixtures::rect;

/// Point records `r0..rN` with the given crop values, spaced 1 unit apart on the x axis.
///
/// # Example
///
/// ```
/// use test_utils::point_records;
///
/// let records = point_records(&[5.0, 3.0]);
/// assert_eq!(records[1].id.0, "r1");
/// assert_eq!(records[1].crop_value, 3.0);
/// ```
pub fn point_records(values: &[f64]) -> Vec<PlantedAreaRecord> {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| PlantedAreaRecord::new(format!("r{}", i), *v, Footprint::point(i as f64, 0.0)))
        .collect()
}

/// Deterministic pseudo-random crop values in `[0, max)`.
///
/// Uses a 64-bit linear congruential generator so fixtures are reproducible
/// without a random-number dependency.
pub fn lcg_values(seed: u64, count: usize, max: f64) -> Vec<f64> {
    let mut state = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
    (0..count)
        .map(|_| {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            let unit = (state >> 11) as f64 / (1u64 << 53) as f64;
            unit * max
        })
        .collect()
}

/// Vertical zone strips of equal width, codes `1..=count`, covering
/// `[0, count × width] × [0, height]`.
pub fn zone_strips(count: usize, width: f64, height: f64) -> Vec<ClimateZonePolygon> {
    (0..count)
        .map(|i| {
            let min_x = i as f64 * width;
            ClimateZonePolygon::new(ZoneId(i as i64 + 1), rect(min_x, 0.0, min_x + width, height))
        })
        .collect()
}

/// A regular station grid starting at `(origin_x, origin_y)`.
pub fn station_grid(
    origin_x: f64,
    origin_y: f64,
    cols: usize,
    rows: usize,
    spacing: f64,
) -> Vec<WeatherStation> {
    let mut stations = Vec::with_capacity(cols * rows);
    for row in 0..rows {
        for col in 0..cols {
            stations.push(WeatherStation::new(
                format!("ws-{}-{}", col, row),
                origin_x + col as f64 * spacing,
                origin_y + row as f64 * spacing,
            ));
        }
    }
    stations
}

/// Square polygon records of side `size` on a grid, values from `values`.
pub fn polygon_records(values: &[f64], cols: usize, size: f64) -> Vec<PlantedAreaRecord> {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| {
            let col = (i % cols.max(1)) as f64;
            let row = (i / cols.max(1)) as f64;
            let cell: MultiPolygon<f64> =
                rect(col * size, row * size, (col + 1.0) * size, (row + 1.0) * size);
            PlantedAreaRecord::new(format!("cell-{}", i), *v, Footprint::Polygon(cell))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lcg_values_deterministic_and_bounded() {
        let a = lcg_values(7, 100, 10.0);
        let b = lcg_values(7, 100, 10.0);
        assert_eq!(a, b);
        assert!(a.iter().all(|v| (0.0..10.0).contains(v)));
        assert_ne!(a, lcg_values(8, 100, 10.0));
    }

    #[test]
    fn test_zone_strips_codes() {
        let zones = zone_strips(3, 10.0, 5.0);
        let codes: Vec<i64> = zones.iter().map(|z| z.zone.code()).collect();
        assert_eq!(codes, vec![1, 2, 3]);
    }

    #[test]
    fn test_station_grid_size() {
        let stations = station_grid(0.0, 0.0, 4, 3, 10.0);
        assert_eq!(stations.len(), 12);
        assert_eq!(stations[5].id.0, "ws-1-1");
    }
}
