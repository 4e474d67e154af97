//! # Connection strengths
//!
//! The functional urban fingerprint proper: for every tile outside a
//! reference area, the fraction of that tile's usual visitors who also
//! usually visit the area.
//!
//! The accumulation is keyed by `(tile, area index)` in an in-memory map,
//! which is acceptable for this sequential implementation because the result
//! fits in memory; a streaming/oblivious port would replace it with a
//! sorted-merge accumulation keyed the same way as state ingestion.
//!
//! Disclosure control is woven in here rather than applied as a separate
//! pass: an entry is published only when its numerator reaches the SDC
//! threshold and its strength is numerically distinguishable from zero.

use std::collections::BTreeMap;

use crate::constants::{ReferenceAreaIndex, CONNECTION_STRENGTH_EPS};
use crate::footprints::{ConnectionStrengths, QuantisedFootprint, ReferenceArea, TileCoord};
use crate::parameters::AnalysisParams;

/// Accumulate numerator/denominator per (tile, area) pair, weighting each
/// row by `row_weight`, then apply SDC and drop zero strengths.
fn accumulate_strengths(
    rows: &[QuantisedFootprint],
    ref_areas: &[ReferenceArea],
    params: &AnalysisParams,
    row_weight: impl Fn(&QuantisedFootprint) -> f64,
) -> ConnectionStrengths {
    let mut operands: BTreeMap<(TileCoord, ReferenceAreaIndex), (f64, f64)> = BTreeMap::new();

    for row in rows {
        let weight = row_weight(row);
        for area in ref_areas {
            // A tile inside the area has no connection strength to it.
            if area.contains(row.tile) {
                continue;
            }

            let visits_area = if row.ref_areas.contains(&area.index) {
                weight
            } else {
                0.0
            };
            let entry = operands.entry((row.tile, area.index)).or_insert((0.0, 0.0));
            entry.0 += visits_area;
            entry.1 += weight;
        }
    }

    operands
        .into_iter()
        .filter_map(|(key, (numerator, denominator))| {
            let strength = numerator / denominator;
            (numerator >= params.sdc_threshold && strength > CONNECTION_STRENGTH_EPS)
                .then_some((key, strength))
        })
        .collect()
}

/// Connection strength of every outside tile to every reference area: among
/// users who usually visit the tile, the fraction whose footprint also
/// touches the area. Requires
/// [`add_reference_areas`](crate::aggregation::add_reference_areas) to have
/// tagged the rows.
pub fn connection_strength(
    rows: &[QuantisedFootprint],
    ref_areas: &[ReferenceArea],
    params: &AnalysisParams,
) -> ConnectionStrengths {
    accumulate_strengths(rows, ref_areas, params, |_| 1.0)
}

/// Calibrated variant of [`connection_strength`]: both the numerator and the
/// denominator weight each visitor by their per-user calibration weight.
pub fn connection_strength_calibrated(
    rows: &[QuantisedFootprint],
    ref_areas: &[ReferenceArea],
    params: &AnalysisParams,
) -> ConnectionStrengths {
    accumulate_strengths(rows, ref_areas, params, |row| row.weight)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation::add_reference_areas;
    use crate::aggregation::tests::qf;
    use approx::assert_relative_eq;

    fn area(index: usize, tiles: &[(i64, i64)]) -> ReferenceArea {
        ReferenceArea::new(index, tiles.iter().map(|&(e, n)| TileCoord::new(e, n)))
    }

    #[test]
    fn strength_counts_fraction_of_visitors_touching_the_area() {
        // u1 visits the area and tile t, u2 visits only tile t.
        let mut rows = vec![
            qf("u1", 0, 0, [1, 0, 0, 0], 0),
            qf("u1", 5, 5, [1, 0, 0, 0], 1),
            qf("u2", 5, 5, [1, 0, 0, 0], 0),
        ];
        let areas = vec![area(0, &[(0, 0)])];
        add_reference_areas(&mut rows, &areas);

        let strengths =
            connection_strength(&rows, &areas, &AnalysisParams::default());
        assert_relative_eq!(strengths[&(TileCoord::new(5, 5), 0)], 0.5);
        // Tiles inside the area never get an entry.
        assert!(!strengths.contains_key(&(TileCoord::new(0, 0), 0)));
    }

    #[test]
    fn zero_strength_entries_are_omitted() {
        let mut rows = vec![qf("u2", 5, 5, [1, 0, 0, 0], 0)];
        let areas = vec![area(0, &[(0, 0)])];
        add_reference_areas(&mut rows, &areas);

        let strengths =
            connection_strength(&rows, &areas, &AnalysisParams::default());
        assert!(strengths.is_empty());
    }

    #[test]
    fn numerator_below_sdc_threshold_is_suppressed() {
        let mut rows = vec![
            qf("u1", 0, 0, [1, 0, 0, 0], 0),
            qf("u1", 5, 5, [1, 0, 0, 0], 1),
        ];
        let areas = vec![area(0, &[(0, 0)])];
        add_reference_areas(&mut rows, &areas);

        let strict = AnalysisParams::builder().sdc_threshold(2.0).build();
        assert!(connection_strength(&rows, &areas, &strict).is_empty());

        // Numerator equal to the threshold survives (≥, not >).
        let lenient = AnalysisParams::builder().sdc_threshold(1.0).build();
        let strengths = connection_strength(&rows, &areas, &lenient);
        assert_relative_eq!(strengths[&(TileCoord::new(5, 5), 0)], 1.0);
    }

    #[test]
    fn calibrated_strength_weights_both_sides() {
        let mut rows = vec![
            qf("u1", 0, 0, [1, 0, 0, 0], 0),
            qf("u1", 5, 5, [1, 0, 0, 0], 1),
            qf("u2", 5, 5, [1, 0, 0, 0], 0),
        ];
        let areas = vec![area(0, &[(0, 0)])];
        add_reference_areas(&mut rows, &areas);
        rows[0].weight = 3.0;
        rows[1].weight = 3.0;

        let strengths =
            connection_strength_calibrated(&rows, &areas, &AnalysisParams::default());
        // numerator 3, denominator 3 + 1.
        assert_relative_eq!(strengths[&(TileCoord::new(5, 5), 0)], 0.75);
    }
}
