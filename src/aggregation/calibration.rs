//! # Calibration weights
//!
//! Reconciles the observed top-anchor distribution with independent census
//! population figures, producing one multiplicative weight per user.
//!
//! For a tile with resident count ℓ and anchor count a, the weight is the
//! ratio ℓ/a clamped into [1/5, 10]; tiles where both counts stay below 10
//! keep weight 1.0 so small samples do not get amplified. A user takes the
//! weight of their anchor (rank-0) tile, and the same weight applies to all
//! of the user's rows.

use tracing::{info, warn};

use crate::constants::{CALIBRATION_SMALL_COUNT, CALIBRATION_WEIGHT_MAX, CALIBRATION_WEIGHT_MIN};
use crate::footprints::{QuantisedFootprint, Residents, TileCoord, TopAnchorDistribution};

/// Observed and census-adjusted user totals, reported as a calibration
/// sanity check.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CalibrationSummary {
    /// Sum of raw anchor counts over all anchor tiles.
    pub observed: f64,
    /// Sum of weight × anchor count over all anchor tiles.
    pub adjusted: f64,
}

/// Weight of one anchor tile given its resident and anchor counts.
fn tile_weight(resident_count: f64, anchor_count: f64) -> f64 {
    let ratio = resident_count / anchor_count;
    if resident_count.max(anchor_count) < CALIBRATION_SMALL_COUNT {
        1.0
    } else if ratio <= CALIBRATION_WEIGHT_MIN {
        CALIBRATION_WEIGHT_MIN
    } else if ratio >= CALIBRATION_WEIGHT_MAX {
        CALIBRATION_WEIGHT_MAX
    } else {
        ratio
    }
}

/// Assign each user the calibration weight of their anchor tile.
///
/// Weights are computed per anchor tile from the top-anchor distribution and
/// the residents table, then propagated to every row of each user (rows of a
/// user are contiguous and in rank order, so the first row of a group is the
/// anchor). A tile with an anchor count of zero never enters the
/// distribution, so the ratio is always well defined.
///
/// An anchor tile missing from the residents table falls back to weight 1.0;
/// a `warn` event records the tile since reference census data is expected
/// to cover every inhabited tile.
///
/// Arguments
/// -----------------
/// * `rows`: quantised rows grouped by user in rank order.
/// * `top_anchor_dist`: per-tile anchor counts from
///   [`calculate_top_anchor_dist`](crate::aggregation::calculate_top_anchor_dist).
/// * `residents`: census population per tile.
///
/// Return
/// ----------
/// * A [`CalibrationSummary`] with the observed and adjusted user totals.
pub fn add_calibration_weights(
    rows: &mut [QuantisedFootprint],
    top_anchor_dist: &TopAnchorDistribution,
    residents: &Residents,
) -> CalibrationSummary {
    let weight_of = |tile: TileCoord, anchor_count: u64| -> f64 {
        match residents.get(&tile) {
            Some(resident_count) => tile_weight(*resident_count, anchor_count as f64),
            None => {
                warn!(
                    easting = tile.easting,
                    northing = tile.northing,
                    "anchor tile has no residents entry, calibration weight falls back to 1"
                );
                1.0
            }
        }
    };

    let mut summary = CalibrationSummary::default();
    for (tile, count) in top_anchor_dist {
        summary.observed += *count as f64;
        summary.adjusted += weight_of(*tile, *count) * *count as f64;
    }
    info!(
        observed = summary.observed,
        adjusted = summary.adjusted,
        "calibration user totals"
    );

    // Propagate each user's anchor weight to the whole group.
    let mut start = 0;
    while start < rows.len() {
        let mut end = start + 1;
        while end < rows.len() && rows[end].user == rows[start].user {
            end += 1;
        }

        let anchor_tile = rows[start].tile;
        let anchor_count = top_anchor_dist.get(&anchor_tile).copied().unwrap_or(0);
        let weight = if anchor_count == 0 {
            // Structurally unreachable: the first row of every group is a
            // rank-0 row and therefore counted in the distribution.
            1.0
        } else {
            weight_of(anchor_tile, anchor_count)
        };

        for row in &mut rows[start..end] {
            row.weight = weight;
        }
        start = end;
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation::calculate_top_anchor_dist;
    use crate::aggregation::tests::qf;
    use approx::assert_relative_eq;
    use std::collections::BTreeMap;

    #[test]
    fn weight_clamps_match_policy() {
        // max(ℓ, a) < 10: ratio irrelevant.
        assert_eq!(tile_weight(2.0, 1.0), 1.0);
        // ratio 0.1 ≤ 1/5 clamps low.
        assert_eq!(tile_weight(100.0, 1000.0), 0.2);
        // ratio 100 ≥ 10 clamps high.
        assert_eq!(tile_weight(1000.0, 10.0), 10.0);
        // 1/5 < ratio < 10 passes through.
        assert_eq!(tile_weight(30.0, 10.0), 3.0);
    }

    #[test]
    fn users_inherit_their_anchor_tile_weight() {
        let mut rows = vec![
            qf("u1", 0, 0, [1, 0, 0, 0], 0),
            qf("u1", 7, 7, [1, 0, 0, 0], 1),
            qf("u2", 7, 7, [1, 0, 0, 0], 0),
        ];
        // Ten users anchored at (0,0) would be needed to leave the small-count
        // branch, so seed the distribution directly.
        let mut dist = calculate_top_anchor_dist(&rows);
        dist.insert(crate::footprints::TileCoord::new(0, 0), 10);

        let mut residents: Residents = BTreeMap::new();
        residents.insert(crate::footprints::TileCoord::new(0, 0), 30.0);
        residents.insert(crate::footprints::TileCoord::new(7, 7), 5.0);

        let summary = add_calibration_weights(&mut rows, &dist, &residents);

        assert_relative_eq!(rows[0].weight, 3.0);
        assert_relative_eq!(rows[1].weight, 3.0);
        assert_relative_eq!(rows[2].weight, 1.0);
        assert_relative_eq!(summary.observed, 11.0);
        assert_relative_eq!(summary.adjusted, 10.0 * 3.0 + 1.0);
    }

    #[test]
    fn missing_residents_entry_falls_back_to_unit_weight() {
        let mut rows = vec![qf("u1", 3, 3, [1, 0, 0, 0], 0)];
        let dist = calculate_top_anchor_dist(&rows);
        let residents: Residents = BTreeMap::new();

        let summary = add_calibration_weights(&mut rows, &dist, &residents);
        assert_relative_eq!(rows[0].weight, 1.0);
        assert_relative_eq!(summary.observed, 1.0);
        assert_relative_eq!(summary.adjusted, 1.0);
    }
}
