//! # Input table readers
//!
//! CSV readers for the three inputs the pipeline consumes:
//!
//! | file | columns |
//! |------|---------|
//! | per-period updates | `id, tile_e, tile_n, value_0, value_1, value_2, value_3` |
//! | residents | `tile_e, tile_n, value` |
//! | reference areas | `id, tile_e, tile_n` |
//!
//! All files carry a header row. Format problems — wrong field count,
//! non-numeric fields, non-sequential reference-area indices — are fatal
//! [`UrbanFpError`]s reported before any aggregation begins; no partial
//! output is ever produced from a malformed input. Data-quality exclusions
//! (negative or all-zero update rows) are *not* handled here; the ingestion
//! stage drops them silently.

pub mod report;

use std::str::FromStr;

use camino::Utf8Path;

use crate::constants::{PeriodValues, PERIOD_VALUE_COUNT};
use crate::footprints::{Footprint, ReferenceArea, Residents, TileCoord};
use crate::urbanfp_errors::UrbanFpError;

const UPDATE_FIELD_COUNT: usize = 3 + PERIOD_VALUE_COUNT;
const RESIDENTS_FIELD_COUNT: usize = 3;
const REFERENCE_AREA_FIELD_COUNT: usize = 3;

fn parse_field<T: FromStr>(
    record: &csv::StringRecord,
    index: usize,
    file: &Utf8Path,
    record_number: u64,
) -> Result<T, UrbanFpError> {
    let raw = record.get(index).unwrap_or_default();
    raw.parse()
        .map_err(|_| UrbanFpError::InvalidNumericField {
            file: file.to_owned(),
            record: record_number,
            field: raw.to_string(),
        })
}

fn check_field_count(
    record: &csv::StringRecord,
    expected: usize,
    file: &Utf8Path,
    record_number: u64,
) -> Result<(), UrbanFpError> {
    if record.len() != expected {
        return Err(UrbanFpError::InvalidFieldCount {
            file: file.to_owned(),
            record: record_number,
            expected,
        });
    }
    Ok(())
}

/// Read the footprint updates of one period.
///
/// Rows are returned as parsed, in file order; cleaning, deduplication and
/// sorting happen in [`ingest_period`](crate::footprints::ingest::ingest_period).
pub fn read_updates(path: &Utf8Path) -> Result<Vec<Footprint>, UrbanFpError> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut updates = Vec::new();

    for (number, record) in reader.records().enumerate() {
        let record = record?;
        let number = number as u64 + 1;
        check_field_count(&record, UPDATE_FIELD_COUNT, path, number)?;

        let tile = TileCoord::new(
            parse_field(&record, 1, path, number)?,
            parse_field(&record, 2, path, number)?,
        );
        let mut values: PeriodValues = [0.0; PERIOD_VALUE_COUNT];
        for (i, value) in values.iter_mut().enumerate() {
            *value = parse_field(&record, 3 + i, path, number)?;
        }

        updates.push(Footprint::new(
            record.get(0).unwrap_or_default(),
            tile,
            values,
        ));
    }

    Ok(updates)
}

/// Read the census resident counts per tile.
pub fn read_residents(path: &Utf8Path) -> Result<Residents, UrbanFpError> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut residents = Residents::new();

    for (number, record) in reader.records().enumerate() {
        let record = record?;
        let number = number as u64 + 1;
        check_field_count(&record, RESIDENTS_FIELD_COUNT, path, number)?;

        let tile = TileCoord::new(
            parse_field(&record, 0, path, number)?,
            parse_field(&record, 1, path, number)?,
        );
        residents.insert(tile, parse_field(&record, 2, path, number)?);
    }

    Ok(residents)
}

/// Read the reference-area definitions.
///
/// Rows are grouped by the `id` column, which must be non-decreasing and
/// gap-free starting at 0; any violation is a fatal
/// [`UrbanFpError::NonSequentialReferenceAreas`].
pub fn read_reference_areas(path: &Utf8Path) -> Result<Vec<ReferenceArea>, UrbanFpError> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut areas: Vec<ReferenceArea> = Vec::new();

    for (number, record) in reader.records().enumerate() {
        let record = record?;
        let number = number as u64 + 1;
        check_field_count(&record, REFERENCE_AREA_FIELD_COUNT, path, number)?;

        let id: i64 = parse_field(&record, 0, path, number)?;
        let tile = TileCoord::new(
            parse_field(&record, 1, path, number)?,
            parse_field(&record, 2, path, number)?,
        );

        let expected_next = areas.len() as i64;
        if id == expected_next {
            areas.push(ReferenceArea::new(id as usize, [tile]));
        } else if id == expected_next - 1 {
            if let Some(area) = areas.last_mut() {
                area.tiles.insert(tile);
            }
        } else {
            return Err(UrbanFpError::NonSequentialReferenceAreas {
                file: path.to_owned(),
                found: id,
            });
        }
    }

    if areas.is_empty() {
        return Err(UrbanFpError::EmptyReferenceAreas(path.to_owned()));
    }

    Ok(areas)
}
