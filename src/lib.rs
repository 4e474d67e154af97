//! # urbanfp: functional urban fingerprints from pseudonymised mobility data
//!
//! Privacy-preserving population-mobility statistics over a spatial grid:
//! per-tile visitor totals, the distribution of users' anchor tiles, census
//! calibration weights and connection strengths of tiles to reference areas,
//! each published only after statistical disclosure control.
//!
//! ## Pipeline
//! -----------------
//! 1. [`footprints::ingest`] — merge each period's observations into the
//!    accumulated per-user state (linear two-pointer merge over sorted
//!    sequences; the access pattern is compatible with an oblivious
//!    execution substrate where random access leaks information).
//! 2. [`footprints::quantise`] — binary presence indicators and per-user
//!    anchor ranking with an injectable random tie-break.
//! 3. [`aggregation`] — independent reducers over the quantised state.
//! 4. [`sdc`] — threshold suppression applied to every published artifact.
//!
//! [`analysis::run_full_analysis`] wires all stages file-to-file; the
//! `urbanfp` binary exposes it on the command line.

pub mod aggregation;
pub mod analysis;
pub mod constants;
pub mod footprints;
pub mod parameters;
pub mod sdc;
pub mod tables;
pub mod urbanfp_errors;

pub use analysis::{run_full_analysis, Analysis, AnalysisStatistics};
pub use footprints::{Footprint, QuantisedFootprint, ReferenceArea, TileCoord, TotalFootprint};
pub use parameters::AnalysisParams;
pub use urbanfp_errors::UrbanFpError;
