//! # Constants and type definitions for urbanfp
//!
//! This module centralizes the **algorithm parameter defaults**, the
//! **sub-period layout** and the **common type aliases** used throughout the
//! `urbanfp` library.
//!
//! ## Overview
//!
//! - Default quantisation and disclosure-control thresholds
//! - Sub-period indexing conventions (index 0 = whole period)
//! - Core type aliases used across the crate
//!
//! These definitions are used by all main modules, including ingestion,
//! quantisation, aggregation and the report writers.

// -------------------------------------------------------------------------------------------------
// Algorithm parameters (defaults)
// -------------------------------------------------------------------------------------------------

/// Default whole-period quantisation threshold (ψ in the methodology document).
///
/// A user/tile row whose whole-period presence value is below this threshold
/// leaves no trace in the quantised footprint.
pub const DEFAULT_DAY_QUANTISATION_THRESHOLD: f64 = 0.3;

/// Default sub-period quantisation threshold (φ in the methodology document).
///
/// Within a surviving row, a sub-period is marked present when its share of
/// the whole-period value reaches this threshold.
pub const DEFAULT_SUB_PERIOD_QUANTISATION_THRESHOLD: f64 = 0.5;

/// Default statistical-disclosure-control threshold (ξ in the methodology
/// document). Published counts below it are suppressed.
pub const DEFAULT_SDC_THRESHOLD: f64 = 1.0;

/// Connection strengths numerically indistinguishable from zero are never
/// published, independently of the SDC threshold.
pub const CONNECTION_STRENGTH_EPS: f64 = 1e-20;

/// When both the resident count and the anchor count of a tile are below this
/// bound, the calibration weight stays at 1.0.
pub const CALIBRATION_SMALL_COUNT: f64 = 10.0;

/// Lower clamp of the calibration weight.
pub const CALIBRATION_WEIGHT_MIN: f64 = 1.0 / 5.0;

/// Upper clamp of the calibration weight.
pub const CALIBRATION_WEIGHT_MAX: f64 = 10.0;

// -------------------------------------------------------------------------------------------------
// Sub-period layout
// -------------------------------------------------------------------------------------------------

/// Number of value slots per footprint row: the whole-period total plus three
/// sub-periods.
pub const PERIOD_VALUE_COUNT: usize = 4;

/// Index of the whole-period total inside a [`PeriodValues`] array.
pub const WHOLE_PERIOD: usize = 0;

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Presence values of one footprint row, indexed by sub-period.
/// Index [`WHOLE_PERIOD`] is the whole-period total, 1..=3 the sub-periods.
pub type PeriodValues = [f64; PERIOD_VALUE_COUNT];

/// Binary presence indicators of one quantised row, same indexing as
/// [`PeriodValues`].
pub type PeriodIndicators = [u8; PERIOD_VALUE_COUNT];

/// Opaque pseudonym token identifying one user. The pipeline never parses it;
/// only equality and lexicographic ordering are used.
pub type UserId = String;

/// Index of a reference area. The loaded set of areas always carries indices
/// exactly `0..k`.
pub type ReferenceAreaIndex = usize;
