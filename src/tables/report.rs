//! # Report writers
//!
//! CSV serialisation of the published artifacts. Every report goes through
//! the SDC filters before it reaches these writers; the writers themselves
//! are format-only.
//!
//! The header row is written unconditionally: a fully suppressed artifact
//! still publishes a header-only file that honours the column contract.

use camino::Utf8Path;
use serde::Serialize;

use crate::footprints::{ConnectionStrengths, TopAnchorDistribution, TotalFootprint};
use crate::urbanfp_errors::UrbanFpError;

/// Open a report writer and emit the header row, even when no records
/// follow. `csv::Writer::serialize` would only write the header alongside
/// the first record, leaving empty reports without their column line.
fn header_first_writer(
    path: &Utf8Path,
    header: &[&str],
) -> Result<csv::Writer<std::fs::File>, UrbanFpError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;
    writer.write_record(header)?;
    Ok(writer)
}

#[derive(Debug, Serialize)]
struct TotalFootprintRecord {
    tile_e: i64,
    tile_n: i64,
    value_0: f64,
    value_1: f64,
    value_2: f64,
    value_3: f64,
}

#[derive(Debug, Serialize)]
struct TopAnchorRecord {
    tile_e: i64,
    tile_n: i64,
    value: u64,
}

#[derive(Debug, Serialize)]
struct ConnectionStrengthRecord {
    reference_area: usize,
    tile_e: i64,
    tile_n: i64,
    strength: f64,
}

/// Write a total-footprint report (raw or calibrated D'):
/// `tile_e, tile_n, value_0..value_3`.
pub fn write_total_footprint_report(
    path: &Utf8Path,
    totals: &[TotalFootprint],
) -> Result<(), UrbanFpError> {
    let mut writer = header_first_writer(
        path,
        &["tile_e", "tile_n", "value_0", "value_1", "value_2", "value_3"],
    )?;
    for row in totals {
        writer.serialize(TotalFootprintRecord {
            tile_e: row.tile.easting,
            tile_n: row.tile.northing,
            value_0: row.totals[0],
            value_1: row.totals[1],
            value_2: row.totals[2],
            value_3: row.totals[3],
        })?;
    }
    writer.flush()?;
    Ok(())
}

/// Write the top-anchor distribution report (P'): `tile_e, tile_n, value`.
pub fn write_top_anchor_report(
    path: &Utf8Path,
    top_anchor_dist: &TopAnchorDistribution,
) -> Result<(), UrbanFpError> {
    let mut writer = header_first_writer(path, &["tile_e", "tile_n", "value"])?;
    for (tile, count) in top_anchor_dist {
        writer.serialize(TopAnchorRecord {
            tile_e: tile.easting,
            tile_n: tile.northing,
            value: *count,
        })?;
    }
    writer.flush()?;
    Ok(())
}

/// Write a functional-urban-fingerprint report (raw or calibrated):
/// `reference_area, tile_e, tile_n, strength`.
pub fn write_connection_strength_report(
    path: &Utf8Path,
    strengths: &ConnectionStrengths,
) -> Result<(), UrbanFpError> {
    let mut writer =
        header_first_writer(path, &["reference_area", "tile_e", "tile_n", "strength"])?;
    for ((tile, area_index), strength) in strengths {
        writer.serialize(ConnectionStrengthRecord {
            reference_area: *area_index,
            tile_e: tile.easting,
            tile_n: tile.northing,
            strength: *strength,
        })?;
    }
    writer.flush()?;
    Ok(())
}
