//! # State ingestion
//!
//! Merges one period's footprint updates into the accumulated cross-period
//! state.
//!
//! ## Overview
//! -----------------
//! Ingestion runs in two steps:
//! 1. [`clean_and_deduplicate`] — drop invalid and non-informative rows,
//!    sort by `(user, tile)` and collapse duplicate keys by taking the
//!    per-sub-period **maximum** (duplicates are repeated measurements of
//!    the same truth, not independent contributions).
//! 2. [`ingest_period`] — a linear two-pointer merge of the cleaned updates
//!    into the sorted state. Matching keys sum their values component-wise,
//!    update-only keys are inserted, state-only keys are carried forward.
//!
//! ## Access pattern
//! -----------------
//! Both steps are single forward scans over sorted sequences. The production
//! target of this algorithm is a secure-computation substrate where indexed
//! random access leaks information, so no hash lookups appear in this hot
//! path even though an ordinary implementation would find them convenient.

use itertools::Itertools;

use crate::constants::PERIOD_VALUE_COUNT;
use crate::footprints::Footprint;

/// Remove invalid rows and merge rows sharing a `(user, tile)` key.
///
/// A row is invalid when any of its four values is negative; a row is
/// non-informative when all four values are exactly zero. Both are silently
/// dropped — data-quality exclusions, not errors. The survivors are sorted
/// by `(user, tile)` and equal-key runs are collapsed by taking the maximum
/// value per sub-period.
///
/// Running this on already-cleaned input returns it unchanged.
///
/// Arguments
/// -----------------
/// * `updates`: raw update rows of one period, in any order.
///
/// Return
/// ----------
/// * Sorted, key-unique rows with all values ≥ 0 and at least one value > 0.
pub fn clean_and_deduplicate(updates: Vec<Footprint>) -> Vec<Footprint> {
    let mut cleaned: Vec<Footprint> = updates
        .into_iter()
        .filter(|row| {
            row.values.iter().all(|v| *v >= 0.0) && row.values.iter().any(|v| *v > 0.0)
        })
        .collect();

    cleaned.sort_by(|a, b| a.key().cmp(&b.key()));

    cleaned
        .into_iter()
        .coalesce(|a, mut b| {
            if a.key() == b.key() {
                for i in 0..PERIOD_VALUE_COUNT {
                    b.values[i] = a.values[i].max(b.values[i]);
                }
                Ok(b)
            } else {
                Err((a, b))
            }
        })
        .collect()
}

/// Merge one period's updates into the accumulated footprint state.
///
/// The state is sorted by `(user, tile)` with unique keys; it is initially
/// empty and this function keeps both invariants. Updates are cleaned and
/// deduplicated first, then joined with the state by a two-pointer merge:
/// a key present in both sums the two rows' values component-wise, a key
/// present only in the updates is inserted, a key present only in the state
/// is carried forward unchanged.
///
/// Arguments
/// -----------------
/// * `state`: the accumulated footprint state, sorted and key-unique.
/// * `updates`: observations of exactly one period; may contain duplicate or
///   invalid rows.
///
/// Return
/// ----------
/// * The merged state, sorted and key-unique.
pub fn ingest_period(state: Vec<Footprint>, updates: Vec<Footprint>) -> Vec<Footprint> {
    let updates = clean_and_deduplicate(updates);

    let mut joined = Vec::with_capacity(state.len() + updates.len());
    let mut state_iter = state.into_iter().peekable();

    for update in updates {
        // Carry forward state rows with keys below this update.
        while let Some(row) = state_iter.next_if(|row| row.key() < update.key()) {
            joined.push(row);
        }

        if let Some(mut row) = state_iter.next_if(|row| row.key() == update.key()) {
            for i in 0..PERIOD_VALUE_COUNT {
                row.values[i] += update.values[i];
            }
            joined.push(row);
        } else {
            joined.push(update);
        }
    }

    // State rows with keys greater than the last update.
    joined.extend(state_iter);
    joined
}
