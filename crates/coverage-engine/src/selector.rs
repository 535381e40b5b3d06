//! Area selection: the fewest high-value planted-area records that together
//! exceed a target share of the total crop value.
//!
//! Records are taken largest-first (stable, so ties keep input order) until
//! the running sum strictly exceeds `percentage / 100 × total`. This is a
//! greedy heuristic that favours a few large contributors over many small
//! ones; it is not an exact minimum-subset solver.
//!
//! At 100 % the strict rule can only be met through rounding, so for that
//! percentage the stopping rule is inclusive (`sum >= total`). Records with a
//! zero crop value are never needed to reach it and are left out.

use std::collections::HashSet;

use station_common::{
    AreaFootprint, CoverageError, PlantedAreaRecord, RecordId, Result,
};
use tracing::{debug, info};

use crate::provider::GeometryProvider;

/// Result of threshold selection over record values, without geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdSelection {
    /// Indices into the input slice, in selection order.
    pub order: Vec<usize>,
    /// Sum of all crop values in scope.
    pub total: f64,
    /// `percentage / 100 × total`.
    pub threshold: f64,
    /// Sum of the selected crop values.
    pub cumulative: f64,
}

impl ThresholdSelection {
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Records chosen by the area selector, plus their combined geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedAreaSet {
    /// Selected record identities, largest crop value first.
    pub ids: Vec<RecordId>,
    /// Points and dissolved polygons of the selected records.
    pub footprint: AreaFootprint,
    pub percentage: f64,
    pub total: f64,
    pub threshold: f64,
    pub cumulative: f64,
}

impl SelectedAreaSet {
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Share of the total crop value actually covered, in percent.
    pub fn covered_percentage(&self) -> f64 {
        if self.total > 0.0 {
            self.cumulative / self.total * 100.0
        } else {
            0.0
        }
    }
}

/// Reject duplicate identities and negative or NaN crop values.
pub fn validate_records(records: &[PlantedAreaRecord]) -> Result<()> {
    let mut seen = HashSet::with_capacity(records.len());
    for record in records {
        if !seen.insert(&record.id) {
            return Err(CoverageError::DuplicateIdentity(record.id.clone()));
        }
    }

    for record in records {
        if record.crop_value.is_nan() || record.crop_value < 0.0 || record.crop_value.is_infinite() {
            return Err(CoverageError::InvalidCropValue {
                id: record.id.clone(),
                value: record.crop_value,
            });
        }
    }

    Ok(())
}

/// Choose records by descending crop value until the threshold is exceeded.
pub fn select_by_threshold(
    records: &[PlantedAreaRecord],
    percentage: f64,
) -> Result<ThresholdSelection> {
    if !(percentage > 0.0 && percentage <= 100.0) {
        return Err(CoverageError::InvalidThreshold(percentage));
    }
    validate_records(records)?;

    let mut sorted: Vec<usize> = (0..records.len()).collect();
    // Vec::sort_by is stable: equal values keep input order.
    sorted.sort_by(|&a, &b| records[b].crop_value.total_cmp(&records[a].crop_value));

    // Summing in selection order makes the full prefix equal `total` exactly.
    let total: f64 = sorted.iter().map(|&i| records[i].crop_value).sum();
    if total <= 0.0 {
        return Err(CoverageError::EmptyCoverage { total });
    }

    let threshold = percentage / 100.0 * total;
    let inclusive = percentage >= 100.0;

    let mut order = Vec::new();
    let mut cumulative = 0.0;
    for &i in &sorted {
        cumulative += records[i].crop_value;
        order.push(i);
        if cumulative > threshold || (inclusive && cumulative >= threshold) {
            break;
        }
    }

    debug!(
        total,
        threshold,
        cumulative,
        selected = order.len(),
        "Threshold selection finished"
    );

    Ok(ThresholdSelection {
        order,
        total,
        threshold,
        cumulative,
    })
}

/// Run threshold selection and build the selected area's footprint.
pub fn select_area<P: GeometryProvider>(
    records: &[PlantedAreaRecord],
    percentage: f64,
    provider: &P,
) -> Result<SelectedAreaSet> {
    let selection = select_by_threshold(records, percentage)?;

    let ids = selection
        .order
        .iter()
        .map(|&i| records[i].id.clone())
        .collect();
    let footprint = provider.dissolve(selection.order.iter().map(|&i| &records[i].footprint));

    info!(
        records = records.len(),
        selected = selection.len(),
        percentage,
        threshold = selection.threshold,
        "Selected planted area"
    );

    Ok(SelectedAreaSet {
        ids,
        footprint,
        percentage,
        total: selection.total,
        threshold: selection.threshold,
        cumulative: selection.cumulative,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::GeoProvider;
    use station_common::Footprint;

    fn records(values: &[(&str, f64)]) -> Vec<PlantedAreaRecord> {
        values
            .iter()
            .enumerate()
            .map(|(i, (id, v))| PlantedAreaRecord::new(*id, *v, Footprint::point(i as f64, 0.0)))
            .collect()
    }

    fn ids(records: &[PlantedAreaRecord], selection: &ThresholdSelection) -> Vec<String> {
        selection
            .order
            .iter()
            .map(|&i| records[i].id.0.clone())
            .collect()
    }

    #[test]
    fn test_stops_once_threshold_exceeded() {
        let recs = records(&[("A", 40.0), ("B", 30.0), ("C", 20.0), ("D", 10.0)]);
        let selection = select_by_threshold(&recs, 60.0).unwrap();
        assert_eq!(ids(&recs, &selection), vec!["A", "B"]);
        assert_eq!(selection.threshold, 60.0);
        assert_eq!(selection.cumulative, 70.0);
    }

    #[test]
    fn test_sum_equal_to_threshold_keeps_going() {
        let recs = records(&[("A", 50.0), ("B", 30.0), ("C", 20.0)]);
        let selection = select_by_threshold(&recs, 50.0).unwrap();
        assert_eq!(ids(&recs, &selection), vec!["A", "B"]);
    }

    #[test]
    fn test_unsorted_input_is_sorted_descending() {
        let recs = records(&[("small", 1.0), ("big", 90.0), ("mid", 9.0)]);
        let selection = select_by_threshold(&recs, 50.0).unwrap();
        assert_eq!(ids(&recs, &selection), vec!["big"]);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let recs = records(&[("first", 10.0), ("second", 10.0), ("third", 10.0)]);
        let selection = select_by_threshold(&recs, 50.0).unwrap();
        assert_eq!(ids(&recs, &selection), vec!["first", "second"]);
    }

    #[test]
    fn test_hundred_percent_takes_all_positive_records() {
        let recs = records(&[("A", 0.1), ("B", 0.2), ("Z", 0.0), ("C", 0.7)]);
        let selection = select_by_threshold(&recs, 100.0).unwrap();
        assert_eq!(ids(&recs, &selection), vec!["C", "B", "A"]);
        assert_eq!(selection.cumulative, selection.total);
    }

    #[test]
    fn test_all_zero_values_is_empty_coverage() {
        let recs = records(&[("A", 0.0), ("B", 0.0)]);
        assert_eq!(
            select_by_threshold(&recs, 50.0),
            Err(CoverageError::EmptyCoverage { total: 0.0 })
        );
    }

    #[test]
    fn test_no_records_is_empty_coverage() {
        assert!(matches!(
            select_by_threshold(&[], 50.0),
            Err(CoverageError::EmptyCoverage { .. })
        ));
    }

    #[test]
    fn test_single_positive_record_among_zeros() {
        let recs = records(&[("A", 0.0), ("B", 5.0), ("C", 0.0)]);
        let selection = select_by_threshold(&recs, 10.0).unwrap();
        assert_eq!(ids(&recs, &selection), vec!["B"]);
    }

    #[test]
    fn test_duplicate_identity_fails_before_selection() {
        // Percentage is valid and values are fine; only the identity clash is wrong.
        let recs = records(&[("17", 5.0), ("3", 2.0), ("17", 1.0)]);
        assert_eq!(
            select_by_threshold(&recs, 50.0),
            Err(CoverageError::DuplicateIdentity(RecordId::new("17")))
        );
    }

    #[test]
    fn test_invalid_percentage() {
        let recs = records(&[("A", 1.0)]);
        assert_eq!(select_by_threshold(&recs, 0.0), Err(CoverageError::InvalidThreshold(0.0)));
        assert_eq!(select_by_threshold(&recs, 101.0), Err(CoverageError::InvalidThreshold(101.0)));
        assert!(select_by_threshold(&recs, -5.0).is_err());
    }

    #[test]
    fn test_negative_crop_value_rejected() {
        let recs = records(&[("A", 1.0), ("B", -2.0)]);
        assert!(matches!(
            select_by_threshold(&recs, 50.0),
            Err(CoverageError::InvalidCropValue { .. })
        ));
    }

    #[test]
    fn test_select_area_builds_footprint() {
        let recs = records(&[("A", 40.0), ("B", 30.0), ("C", 20.0), ("D", 10.0)]);
        let selected = select_area(&recs, 60.0, &GeoProvider::default()).unwrap();
        assert_eq!(selected.ids, vec![RecordId::new("A"), RecordId::new("B")]);
        assert_eq!(selected.footprint.point_count(), 2);
        assert_eq!(selected.covered_percentage(), 70.0);
    }
}
