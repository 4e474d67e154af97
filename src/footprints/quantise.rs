//! # Quantisation and anchor ranking
//!
//! Converts the accumulated numeric footprint state into binary per-sub-period
//! presence indicators and ranks each user's surviving tiles, the rank-0 tile
//! being the user's anchor.
//!
//! ## Overview
//! -----------------
//! For every state row, the whole-period value is tested against the day
//! quantisation threshold ψ: below it the row is **dropped entirely** — a
//! user below the day threshold at a tile leaves no trace of that tile.
//! For a surviving row, sub-period i is marked present when
//! `values[i] / values[0] ≥ φ`.
//!
//! Surviving rows are grouped per user (the state is sorted, so groups are
//! contiguous) and sorted descending by the key
//! `(whole-period value, max of sub-period values, sub-period-1 value,
//! random)`. The random component draws from an injected RNG so exact ties
//! resolve as a uniformly random permutation, avoiding systematic bias
//! toward any tile ordering; tests pin the generator for determinism.
//!
//! A user with no surviving rows is **highly nomadic**: they contribute no
//! quantised rows and are only counted.

use itertools::Itertools;
use rand::Rng;
use tracing::info;

use crate::constants::{PeriodValues, PERIOD_VALUE_COUNT, WHOLE_PERIOD};
use crate::footprints::{Footprint, QuantisedFootprint};
use crate::parameters::AnalysisParams;

/// Result of quantising the accumulated footprint state.
#[derive(Debug, Clone, PartialEq)]
pub struct QuantisedState {
    /// Quantised rows, grouped by user and ordered by rank within each
    /// group. Later reducers rely on the first row of a group being the
    /// user's anchor.
    pub rows: Vec<QuantisedFootprint>,
    /// Number of users whose every tile fell below the day threshold.
    pub highly_nomadic: u64,
}

/// Descending anchor order: whole-period value, then the maximum sub-period
/// value, then the first sub-period value, then the random tie-break. The
/// deterministic secondary keys come before the random component; their
/// order decides which tile becomes the anchor among near-ties.
fn anchor_sort_key(values: &PeriodValues, rng: &mut impl Rng) -> (f64, f64, f64, u64) {
    let sub_period_max = values[1..PERIOD_VALUE_COUNT]
        .iter()
        .copied()
        .fold(f64::NEG_INFINITY, f64::max);
    (values[WHOLE_PERIOD], sub_period_max, values[1], rng.gen())
}

/// Quantise the accumulated footprint state and rank each user's tiles.
///
/// Consumes the state by value: after all periods are ingested the state is
/// read exactly once and the quantised collection is an independently owned
/// structure.
///
/// Arguments
/// -----------------
/// * `state`: accumulated footprints, sorted by `(user, tile)`, key-unique.
/// * `params`: quantisation thresholds; never read from ambient state.
/// * `rng`: source of the random tie-break component; inject a seeded
///   generator for reproducible anchor choices.
///
/// Return
/// ----------
/// * A [`QuantisedState`] with ranked rows grouped per user and the
///   highly-nomadic user count.
pub fn quantise_footprints(
    state: Vec<Footprint>,
    params: &AnalysisParams,
    rng: &mut impl Rng,
) -> QuantisedState {
    let mut rows = Vec::with_capacity(state.len());
    let mut highly_nomadic = 0u64;

    for (_, group) in &state.into_iter().chunk_by(|row| row.user.clone()) {
        // Keep the original values next to each quantised row: the anchor
        // ordering sorts on the unquantised values.
        let mut survivors: Vec<((f64, f64, f64, u64), QuantisedFootprint)> = Vec::new();

        for footprint in group {
            if footprint.values[WHOLE_PERIOD] < params.day_quantisation_threshold {
                continue;
            }

            let mut indicators = [0u8; PERIOD_VALUE_COUNT];
            indicators[WHOLE_PERIOD] = 1;
            // A zero whole-period value only survives the day test when the
            // operator sets ψ to 0; such a row gets no sub-period presence
            // instead of dividing by zero.
            if footprint.values[WHOLE_PERIOD] > 0.0 {
                for i in 1..PERIOD_VALUE_COUNT {
                    let share = footprint.values[i] / footprint.values[WHOLE_PERIOD];
                    indicators[i] = u8::from(share >= params.sub_period_quantisation_threshold);
                }
            }

            survivors.push((
                anchor_sort_key(&footprint.values, rng),
                QuantisedFootprint {
                    user: footprint.user,
                    tile: footprint.tile,
                    indicators,
                    ref_areas: Vec::new(),
                    weight: 1.0,
                    rank: None,
                },
            ));
        }

        if survivors.is_empty() {
            highly_nomadic += 1;
            continue;
        }

        survivors.sort_by(|(a, _), (b, _)| {
            b.0.total_cmp(&a.0)
                .then(b.1.total_cmp(&a.1))
                .then(b.2.total_cmp(&a.2))
                .then(b.3.cmp(&a.3))
        });

        rows.extend(
            survivors
                .into_iter()
                .enumerate()
                .map(|(rank, (_, mut row))| {
                    row.rank = Some(rank);
                    row
                }),
        );
    }

    info!(highly_nomadic, "quantised footprint state");

    QuantisedState {
        rows,
        highly_nomadic,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::footprints::TileCoord;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn fp(user: &str, e: i64, n: i64, values: [f64; 4]) -> Footprint {
        Footprint::new(user, TileCoord::new(e, n), values)
    }

    fn quantise(state: Vec<Footprint>) -> QuantisedState {
        let mut rng = StdRng::seed_from_u64(42);
        quantise_footprints(state, &AnalysisParams::default(), &mut rng)
    }

    #[test]
    fn day_threshold_boundary_is_inclusive() {
        let at_threshold = quantise(vec![fp("u1", 0, 0, [0.3, 0.0, 0.0, 0.0])]);
        assert_eq!(at_threshold.rows.len(), 1);
        assert_eq!(at_threshold.rows[0].indicators, [1, 0, 0, 0]);

        let below = quantise(vec![fp("u1", 0, 0, [f64::from_bits(0.3f64.to_bits() - 1), 0.0, 0.0, 0.0])]);
        assert!(below.rows.is_empty());
        assert_eq!(below.highly_nomadic, 1);
    }

    #[test]
    fn sub_period_indicators_use_share_of_whole_period() {
        let state = quantise(vec![fp("u1", 0, 0, [2.0, 1.0, 0.9, 0.0])]);
        // 1.0/2.0 = 0.5 meets φ, 0.9/2.0 does not.
        assert_eq!(state.rows[0].indicators, [1, 1, 0, 0]);
    }

    #[test]
    fn ranks_are_contiguous_and_anchor_has_greatest_value() {
        let state = quantise(vec![
            fp("u1", 0, 0, [1.0, 0.5, 0.5, 0.0]),
            fp("u1", 0, 1, [3.0, 1.0, 1.0, 1.0]),
            fp("u1", 1, 0, [2.0, 2.0, 0.0, 0.0]),
        ]);

        let ranks: Vec<usize> = state.rows.iter().map(|r| r.rank.unwrap()).collect();
        assert_eq!(ranks, vec![0, 1, 2]);
        assert_eq!(state.rows[0].tile, TileCoord::new(0, 1));
    }

    #[test]
    fn exact_ties_break_on_max_sub_period_then_first_sub_period() {
        let state = quantise(vec![
            fp("u1", 0, 0, [1.0, 0.2, 0.6, 0.0]),
            fp("u1", 0, 1, [1.0, 0.7, 0.0, 0.0]),
        ]);
        // Equal whole-period values; (0,1) wins on the larger sub-period max.
        assert_eq!(state.rows[0].tile, TileCoord::new(0, 1));
        assert_eq!(state.rows[0].rank, Some(0));
    }

    #[test]
    fn fully_tied_rows_get_valid_ranks_for_any_seed() {
        for seed in 0..8 {
            let mut rng = StdRng::seed_from_u64(seed);
            let state = quantise_footprints(
                vec![
                    fp("u1", 0, 0, [1.0, 1.0, 0.0, 0.0]),
                    fp("u1", 0, 1, [1.0, 1.0, 0.0, 0.0]),
                ],
                &AnalysisParams::default(),
                &mut rng,
            );
            let mut ranks: Vec<usize> = state.rows.iter().map(|r| r.rank.unwrap()).collect();
            ranks.sort_unstable();
            assert_eq!(ranks, vec![0, 1]);
        }
    }

    #[test]
    fn zero_day_threshold_keeps_zero_value_rows_finite() {
        // With ψ = 0 a row whose whole-period value is 0 but which carries a
        // positive sub-period value survives cleaning and the day test; its
        // sub-period shares must not divide by zero.
        let params = AnalysisParams::builder()
            .day_quantisation_threshold(0.0)
            .build();
        let mut rng = StdRng::seed_from_u64(3);
        let state = quantise_footprints(
            vec![fp("u1", 0, 0, [0.0, 0.5, 0.0, 0.0])],
            &params,
            &mut rng,
        );

        assert_eq!(state.rows.len(), 1);
        assert_eq!(state.rows[0].indicators, [1, 0, 0, 0]);
        assert_eq!(state.rows[0].rank, Some(0));
    }

    #[test]
    fn highly_nomadic_users_leave_no_rows() {
        let state = quantise(vec![
            fp("u1", 0, 0, [0.1, 0.0, 0.0, 0.1]),
            fp("u1", 0, 1, [0.2, 0.1, 0.0, 0.0]),
            fp("u2", 0, 0, [1.0, 1.0, 0.0, 0.0]),
        ]);
        assert_eq!(state.highly_nomadic, 1);
        assert_eq!(state.rows.len(), 1);
        assert_eq!(state.rows[0].user, "u2");
    }

    #[test]
    fn groups_stay_contiguous_with_anchor_first() {
        let state = quantise(vec![
            fp("u1", 5, 5, [1.0, 1.0, 0.0, 0.0]),
            fp("u2", 0, 0, [1.0, 0.0, 1.0, 0.0]),
            fp("u2", 0, 1, [2.0, 0.0, 0.0, 1.0]),
        ]);
        let users: Vec<&str> = state.rows.iter().map(|r| r.user.as_str()).collect();
        assert_eq!(users, vec!["u1", "u2", "u2"]);
        assert_eq!(state.rows[1].rank, Some(0));
        assert_eq!(state.rows[1].tile, TileCoord::new(0, 1));
    }
}
