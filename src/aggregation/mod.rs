//! # Aggregation engine
//!
//! Reducers over the quantised footprint state producing the published
//! artifacts:
//!
//! - [`add_reference_areas`] — tag every user with the reference areas their
//!   quantised tiles intersect.
//! - [`sum_footprints`] / [`sum_footprints_calibrated`] — per-tile visitor
//!   totals (D), optionally scaled by the per-user calibration weight.
//! - [`calculate_top_anchor_dist`] — per-tile count of users anchored there
//!   (P).
//! - [`calibration`] — per-user calibration weights against census counts.
//! - [`connection`] — (calibrated) connection strengths to reference areas.
//!
//! The reducers are mutually independent given the same quantised input:
//! each produces an owned output from a read-only view, so they may be
//! fanned out without synchronization. Tile-grouped reducers sort a view of
//! the rows by tile and fold contiguous runs, keeping the linear-scan access
//! pattern of the ingestion stage.

pub mod calibration;
pub mod connection;

use itertools::Itertools;

use crate::constants::PERIOD_VALUE_COUNT;
use crate::footprints::{QuantisedFootprint, ReferenceArea, TopAnchorDistribution, TotalFootprint};

/// Tag each user's rows with the reference areas their footprint touches.
///
/// For every user, the set of area indices whose tile set intersects the
/// user's quantised tile set is computed once and stored identically on all
/// of that user's rows. Rows of one user are contiguous in the quantised
/// state, so this is a single forward scan.
pub fn add_reference_areas(rows: &mut [QuantisedFootprint], ref_areas: &[ReferenceArea]) {
    let mut start = 0;
    while start < rows.len() {
        let mut end = start + 1;
        while end < rows.len() && rows[end].user == rows[start].user {
            end += 1;
        }

        let group = &mut rows[start..end];
        let user_ref_areas: Vec<usize> = ref_areas
            .iter()
            .filter(|area| group.iter().any(|row| area.contains(row.tile)))
            .map(|area| area.index)
            .collect();

        for row in group.iter_mut() {
            row.ref_areas = user_ref_areas.clone();
        }

        start = end;
    }
}

/// Sum rows grouped by tile, scaling each row's indicators by `row_weight`.
fn sum_by_tile(
    rows: &[QuantisedFootprint],
    row_weight: impl Fn(&QuantisedFootprint) -> f64,
) -> Vec<TotalFootprint> {
    let mut by_tile: Vec<&QuantisedFootprint> = rows.iter().collect();
    by_tile.sort_by_key(|row| row.tile);

    let mut totals: Vec<TotalFootprint> = Vec::new();
    for row in by_tile {
        let weight = row_weight(row);
        match totals.last_mut() {
            Some(total) if total.tile == row.tile => {
                for i in 0..PERIOD_VALUE_COUNT {
                    total.totals[i] += f64::from(row.indicators[i]) * weight;
                }
            }
            _ => {
                let mut values = [0.0; PERIOD_VALUE_COUNT];
                for i in 0..PERIOD_VALUE_COUNT {
                    values[i] = f64::from(row.indicators[i]) * weight;
                }
                totals.push(TotalFootprint {
                    tile: row.tile,
                    totals: values,
                });
            }
        }
    }
    totals
}

/// Total footprint over all users (D): per tile, the sum of the binary
/// indicators of every visiting user. One row per tile with at least one
/// visitor, ordered by tile.
pub fn sum_footprints(rows: &[QuantisedFootprint]) -> Vec<TotalFootprint> {
    sum_by_tile(rows, |_| 1.0)
}

/// Calibrated total footprint: as [`sum_footprints`], with each user's
/// contribution scaled by their per-user calibration weight. Run
/// [`calibration::add_calibration_weights`] first.
pub fn sum_footprints_calibrated(rows: &[QuantisedFootprint]) -> Vec<TotalFootprint> {
    sum_by_tile(rows, |row| row.weight)
}

/// Count, per tile, the users whose anchor (rank-0) tile it is. Users with
/// no surviving quantised tile contribute nowhere, so the counts sum to at
/// most the total user count.
pub fn calculate_top_anchor_dist(rows: &[QuantisedFootprint]) -> TopAnchorDistribution {
    rows.iter()
        .filter(|row| row.rank == Some(0))
        .map(|row| row.tile)
        .counts()
        .into_iter()
        .map(|(tile, count)| (tile, count as u64))
        .collect()
}
