//! # Footprint record model
//!
//! Entities flowing through the fingerprint pipeline and the derived table
//! types shared by the aggregation reducers.
//!
//! ## Overview
//! -----------------
//! - [`TileCoord`] — grid cell identified by integer (easting, northing);
//!   totally ordered, used as map key everywhere sorting/grouping occurs.
//! - [`Footprint`] — one row of the accumulated per-user state: user, tile
//!   and four non-negative presence values (whole period + three
//!   sub-periods). At most one row per (user, tile) exists in the state.
//! - [`QuantisedFootprint`] — the binary derivative of a [`Footprint`],
//!   enriched by the aggregation stage with reference-area tags, the per-user
//!   calibration weight and the anchor rank.
//! - [`TotalFootprint`] — per-tile sums over all users.
//! - [`ReferenceArea`] — an indexed set of tiles against which connection
//!   strengths are measured.
//!
//! ## Ownership
//! -----------------
//! Each stage produces a fresh, independently owned collection: ingestion
//! owns the accumulated `Vec<Footprint>`, quantisation consumes it by value,
//! and every later artifact is a reduction with no back-references into
//! earlier stages.

pub mod ingest;
pub mod quantise;

use std::collections::{BTreeMap, BTreeSet};

use crate::constants::{PeriodIndicators, PeriodValues, ReferenceAreaIndex, UserId};

/// A cell of the fixed spatial grid, identified by integer easting/northing
/// indices. The derived `Ord` (easting first, then northing) is the tile
/// order used by every sort and merge in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TileCoord {
    pub easting: i64,
    pub northing: i64,
}

impl TileCoord {
    pub fn new(easting: i64, northing: i64) -> Self {
        TileCoord { easting, northing }
    }
}

/// One row of the accumulated footprint state (S in the methodology
/// document) or of a single period's update batch (H).
///
/// Invariants inside the accumulated state: rows are sorted by
/// `(user, tile)`, keys are unique and every value is ≥ 0. Both are
/// established by [`ingest::clean_and_deduplicate`] and preserved by
/// [`ingest::ingest_period`].
#[derive(Debug, Clone, PartialEq)]
pub struct Footprint {
    pub user: UserId,
    pub tile: TileCoord,
    /// Presence values; index 0 is the whole-period total, 1..=3 the
    /// sub-periods.
    pub values: PeriodValues,
}

impl Footprint {
    pub fn new(user: impl Into<UserId>, tile: TileCoord, values: PeriodValues) -> Self {
        Footprint {
            user: user.into(),
            tile,
            values,
        }
    }

    /// Merge/sort key of the row.
    pub fn key(&self) -> (&UserId, TileCoord) {
        (&self.user, self.tile)
    }
}

/// One row of the quantised footprint table (Y in the methodology document).
///
/// Created by [`quantise::quantise_footprints`]; `ref_areas` and `weight`
/// are filled by the aggregation stage. Rows of one user are contiguous and
/// ordered by `rank`; the rank-0 row is the user's anchor tile.
#[derive(Debug, Clone, PartialEq)]
pub struct QuantisedFootprint {
    pub user: UserId,
    pub tile: TileCoord,
    /// 0/1 per sub-period, indicating whether the tile belongs to the user's
    /// usual environment in that sub-period. Index 0 is always 1 for a row
    /// that exists at all.
    pub indicators: PeriodIndicators,
    /// Indices of reference areas sharing at least one tile with this user's
    /// quantised footprint (δ_r in the methodology document). Identical on
    /// every row of one user.
    pub ref_areas: Vec<ReferenceAreaIndex>,
    /// Per-user calibration weight, derived from the user's anchor tile.
    pub weight: f64,
    /// Position of this tile in the user's anchor ordering (L in the
    /// methodology document), 0-based; `None` until ranking has run.
    pub rank: Option<usize>,
}

/// One row of the total footprint report (D), before or after calibration.
#[derive(Debug, Clone, PartialEq)]
pub struct TotalFootprint {
    pub tile: TileCoord,
    pub totals: PeriodValues,
}

/// An indexed set of tiles against which connection strengths of outside
/// tiles are measured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceArea {
    pub index: ReferenceAreaIndex,
    pub tiles: BTreeSet<TileCoord>,
}

impl ReferenceArea {
    pub fn new(index: ReferenceAreaIndex, tiles: impl IntoIterator<Item = TileCoord>) -> Self {
        ReferenceArea {
            index,
            tiles: tiles.into_iter().collect(),
        }
    }

    pub fn contains(&self, tile: TileCoord) -> bool {
        self.tiles.contains(&tile)
    }
}

/// Top anchor distribution (P): tile → number of users whose anchor it is.
pub type TopAnchorDistribution = BTreeMap<TileCoord, u64>;

/// Census resident counts (ℓ): tile → absolute population. External,
/// read-only reference data.
pub type Residents = BTreeMap<TileCoord, f64>;

/// Functional urban fingerprint (C): (tile, reference-area index) →
/// connection strength in (0, 1]. Defined only for tiles outside the area.
pub type ConnectionStrengths = BTreeMap<(TileCoord, ReferenceAreaIndex), f64>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tile_order_is_easting_then_northing() {
        let mut tiles = vec![
            TileCoord::new(2, 0),
            TileCoord::new(1, 9),
            TileCoord::new(1, 3),
        ];
        tiles.sort();
        assert_eq!(
            tiles,
            vec![
                TileCoord::new(1, 3),
                TileCoord::new(1, 9),
                TileCoord::new(2, 0),
            ]
        );
    }

    #[test]
    fn footprint_key_orders_by_user_first() {
        let a = Footprint::new("a", TileCoord::new(9, 9), [1.0; 4]);
        let b = Footprint::new("b", TileCoord::new(0, 0), [1.0; 4]);
        assert!(a.key() < b.key());
    }
}
