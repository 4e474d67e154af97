//! # Analysis façade
//!
//! Wires the pipeline stages together the way an operator runs them:
//! ingestion of every period's update file into one evolving state, a single
//! quantisation pass, the aggregation reducers, disclosure control and the
//! report writers.
//!
//! ## Overview
//! -----------------
//! [`Analysis`] owns the accumulated footprint state across the whole
//! multi-period run; it is the state's only writer and nothing reads the
//! state until ingestion of all periods is complete, when
//! [`Analysis::quantise`] consumes it. [`run_full_analysis`] is the
//! file-to-file entry point: it discovers `day-*-updates.csv` files under
//! the input directory (sorted by name for a deterministic period order),
//! runs every stage, writes the five reports and returns the run's
//! [`AnalysisStatistics`].
//!
//! ## Reports written
//! -----------------
//! * `total-footprint.csv` and `calibrated-total-footprint.csv`
//! * `top-anchor-distribution.csv`
//! * `functional-urban-fingerprint.csv` and
//!   `calibrated-functional-urban-fingerprint.csv`

use camino::{Utf8Path, Utf8PathBuf};
use rand::Rng;
use tracing::info;

use crate::aggregation::calibration::add_calibration_weights;
use crate::aggregation::connection::{connection_strength, connection_strength_calibrated};
use crate::aggregation::{
    add_reference_areas, calculate_top_anchor_dist, sum_footprints, sum_footprints_calibrated,
};
use crate::footprints::ingest::ingest_period;
use crate::footprints::quantise::{quantise_footprints, QuantisedState};
use crate::footprints::Footprint;
use crate::parameters::AnalysisParams;
use crate::sdc::{sdc_filter_top_anchor_dist, total_footprint_sdc};
use crate::tables::report::{
    write_connection_strength_report, write_top_anchor_report, write_total_footprint_report,
};
use crate::tables::{read_reference_areas, read_residents, read_updates};
use crate::urbanfp_errors::UrbanFpError;

const UPDATE_FILE_PREFIX: &str = "day-";
const UPDATE_FILE_SUFFIX: &str = "-updates.csv";
const RESIDENTS_FILE: &str = "residents.csv";
const REFERENCE_AREAS_FILE: &str = "reference-areas.csv";

const TOTAL_FOOTPRINT_REPORT: &str = "total-footprint.csv";
const CALIBRATED_TOTAL_FOOTPRINT_REPORT: &str = "calibrated-total-footprint.csv";
const TOP_ANCHOR_REPORT: &str = "top-anchor-distribution.csv";
const FUF_REPORT: &str = "functional-urban-fingerprint.csv";
const CALIBRATED_FUF_REPORT: &str = "calibrated-functional-urban-fingerprint.csv";

/// Summary counters of one full analysis run.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AnalysisStatistics {
    /// Users whose every tile fell below the day quantisation threshold.
    pub highly_nomadic_users: u64,
    /// Sum of raw anchor counts over all anchor tiles.
    pub observed_total_users: f64,
    /// Sum of weight × anchor count over all anchor tiles.
    pub adjusted_total_users: f64,
}

/// The accumulated footprint state and the thresholds steering the run.
///
/// The state starts empty; each call to [`ingest_period`](Analysis::ingest_period)
/// merges one period's updates into it.
#[derive(Debug, Clone, Default)]
pub struct Analysis {
    params: AnalysisParams,
    state: Vec<Footprint>,
}

impl Analysis {
    pub fn new(params: AnalysisParams) -> Self {
        Analysis {
            params,
            state: Vec::new(),
        }
    }

    pub fn params(&self) -> &AnalysisParams {
        &self.params
    }

    /// Merge one period's updates into the accumulated state. Periods must
    /// be ingested one at a time; the updates may be dirty (duplicate or
    /// invalid rows) and in any order.
    pub fn ingest_period(&mut self, updates: Vec<Footprint>) {
        let state = std::mem::take(&mut self.state);
        self.state = ingest_period(state, updates);
    }

    /// Number of `(user, tile)` rows currently in the state.
    pub fn state_len(&self) -> usize {
        self.state.len()
    }

    /// Quantise and rank the accumulated state, consuming the analysis.
    /// Call once, after every period has been ingested.
    pub fn quantise(self, rng: &mut impl Rng) -> QuantisedState {
        quantise_footprints(self.state, &self.params, rng)
    }
}

/// Update files under `input_dir` matching `day-*-updates.csv`, sorted by
/// file name so the period order is deterministic.
fn update_files(input_dir: &Utf8Path) -> Result<Vec<Utf8PathBuf>, UrbanFpError> {
    let mut files = Vec::new();
    for entry in input_dir.read_dir_utf8()? {
        let entry = entry?;
        let name = entry.file_name();
        if name.starts_with(UPDATE_FILE_PREFIX) && name.ends_with(UPDATE_FILE_SUFFIX) {
            files.push(entry.path().to_owned());
        }
    }
    if files.is_empty() {
        return Err(UrbanFpError::NoUpdateFiles(input_dir.to_owned()));
    }
    files.sort();
    Ok(files)
}

/// Run the complete footprint analysis from input files to report files.
///
/// Arguments
/// -----------------
/// * `input_dir`: directory holding `day-*-updates.csv`, `residents.csv`
///   and `reference-areas.csv`.
/// * `reports_dir`: directory the five reports are written to; created if
///   missing.
/// * `params`: thresholds; never read from ambient state.
/// * `rng`: source of the ranking tie-break; inject a seeded generator for
///   a reproducible anchor choice among exactly tied tiles.
///
/// Return
/// ----------
/// * The run's [`AnalysisStatistics`], or the first fatal input error.
pub fn run_full_analysis(
    input_dir: &Utf8Path,
    reports_dir: &Utf8Path,
    params: AnalysisParams,
    rng: &mut impl Rng,
) -> Result<AnalysisStatistics, UrbanFpError> {
    // Load the reference inputs up front: a malformed file must abort the
    // run before any aggregation begins.
    let ref_areas = read_reference_areas(&input_dir.join(REFERENCE_AREAS_FILE))?;
    let residents = read_residents(&input_dir.join(RESIDENTS_FILE))?;

    let mut analysis = Analysis::new(params);
    for file in update_files(input_dir)? {
        let updates = read_updates(&file)?;
        info!(file = %file, rows = updates.len(), "ingesting period updates");
        analysis.ingest_period(updates);
    }
    info!(state_rows = analysis.state_len(), "ingestion complete");

    let quantised = analysis.quantise(rng);
    let mut rows = quantised.rows;

    add_reference_areas(&mut rows, &ref_areas);
    let top_anchor_dist = calculate_top_anchor_dist(&rows);
    let calibration = add_calibration_weights(&mut rows, &top_anchor_dist, &residents);

    std::fs::create_dir_all(reports_dir)?;

    let total = total_footprint_sdc(sum_footprints(&rows), &params);
    write_total_footprint_report(&reports_dir.join(TOTAL_FOOTPRINT_REPORT), &total)?;

    let top_anchor_published = sdc_filter_top_anchor_dist(top_anchor_dist, &params);
    write_top_anchor_report(&reports_dir.join(TOP_ANCHOR_REPORT), &top_anchor_published)?;

    let strengths = connection_strength(&rows, &ref_areas, &params);
    write_connection_strength_report(&reports_dir.join(FUF_REPORT), &strengths)?;

    let calibrated_total = total_footprint_sdc(sum_footprints_calibrated(&rows), &params);
    write_total_footprint_report(
        &reports_dir.join(CALIBRATED_TOTAL_FOOTPRINT_REPORT),
        &calibrated_total,
    )?;

    let calibrated_strengths = connection_strength_calibrated(&rows, &ref_areas, &params);
    write_connection_strength_report(
        &reports_dir.join(CALIBRATED_FUF_REPORT),
        &calibrated_strengths,
    )?;

    Ok(AnalysisStatistics {
        highly_nomadic_users: quantised.highly_nomadic,
        observed_total_users: calibration.observed,
        adjusted_total_users: calibration.adjusted,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::footprints::TileCoord;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn analysis_accumulates_state_across_periods() {
        let mut analysis = Analysis::new(AnalysisParams::default());
        analysis.ingest_period(vec![Footprint::new(
            "u1",
            TileCoord::new(0, 0),
            [1.0, 0.5, 0.5, 0.0],
        )]);
        analysis.ingest_period(vec![Footprint::new(
            "u1",
            TileCoord::new(0, 0),
            [1.0, 0.0, 0.5, 0.5],
        )]);
        assert_eq!(analysis.state_len(), 1);

        let mut rng = StdRng::seed_from_u64(7);
        let quantised = analysis.quantise(&mut rng);
        assert_eq!(quantised.rows.len(), 1);
        assert_eq!(quantised.rows[0].indicators, [1, 0, 1, 0]);
    }
}
