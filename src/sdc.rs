//! # Statistical disclosure control
//!
//! Threshold-based suppression preventing publication of statistics derived
//! from too few individuals. Applied to every artifact before it is written;
//! the policy cannot be bypassed below the operator-set threshold.
//!
//! Suppression differs per artifact: total-footprint values below the
//! threshold are **zeroed in place** (the tile row remains, so the grid
//! stays complete), while top-anchor entries below it are **dropped
//! entirely**. Connection-strength suppression lives with the accumulation
//! in [`aggregation::connection`](crate::aggregation::connection).

use crate::footprints::{TopAnchorDistribution, TotalFootprint};
use crate::parameters::AnalysisParams;

/// Suppressed total footprint (D'): any per-tile, per-sub-period value below
/// the SDC threshold becomes exactly 0; values at or above it pass
/// unchanged.
pub fn total_footprint_sdc(
    totals: Vec<TotalFootprint>,
    params: &AnalysisParams,
) -> Vec<TotalFootprint> {
    totals
        .into_iter()
        .map(|mut row| {
            for value in &mut row.totals {
                if *value < params.sdc_threshold {
                    *value = 0.0;
                }
            }
            row
        })
        .collect()
}

/// Suppressed top-anchor distribution (P'): entries with a count below the
/// SDC threshold are removed; a count equal to the threshold survives.
pub fn sdc_filter_top_anchor_dist(
    top_anchor_dist: TopAnchorDistribution,
    params: &AnalysisParams,
) -> TopAnchorDistribution {
    top_anchor_dist
        .into_iter()
        .filter(|(_, count)| (*count as f64) >= params.sdc_threshold)
        .collect()
}
