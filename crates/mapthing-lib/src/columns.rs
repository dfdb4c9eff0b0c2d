//! Coordinate column detection and record building for delimited text
//!
//! Headers are matched case-insensitively against the usual coordinate names: `x`, `lon`,
//! `long`, `longitude` and `easting` for the horizontal axis, `y`, `lat`, `latitude` and
//! `northing` for the vertical one. Segment files number their endpoints, e.g. `x1`/`y1`
//! and `lat2`/`lon2`.

use crate::{
    AttributeValue, Attributes, CollectionKind, DataError, FeatureRecord, Geometry, Result,
};
use geo::{Coord, LineString, Point};
use regex::Regex;
use std::io::Read;

const X_NAMES: &str = "x|lon|long|longitude|easting";
const Y_NAMES: &str = "y|lat|latitude|northing";

/// Column indices of a point file
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PointColumns {
    pub x: usize,
    pub y: usize,
}

/// Column indices of a segment file, one coordinate pair per endpoint
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SegmentColumns {
    pub x1: usize,
    pub y1: usize,
    pub x2: usize,
    pub y2: usize,
}

fn name_pattern(names: &str, suffix: &str) -> Option<Regex> {
    Regex::new(&format!("(?i)^(?:{names}){suffix}$")).ok()
}

/// First column matching each pattern, each column claimed at most once
fn claim_columns<const N: usize>(headers: &[&str], patterns: &[Regex; N]) -> [Option<usize>; N] {
    let mut found = [None; N];
    for (index, header) in headers.iter().enumerate() {
        let header = header.trim();
        if let Some(slot) = patterns
            .iter()
            .zip(found.iter())
            .position(|(pattern, found)| found.is_none() && pattern.is_match(header))
        {
            found[slot] = Some(index);
        }
    }
    found
}

/// Find the x and y columns of a point file; a trailing `1` is accepted
pub fn detect_point_columns(headers: &[&str]) -> Option<PointColumns> {
    let patterns = [name_pattern(X_NAMES, "1?")?, name_pattern(Y_NAMES, "1?")?];
    match claim_columns(headers, &patterns) {
        [Some(x), Some(y)] => Some(PointColumns { x, y }),
        _ => None,
    }
}

/// Find the numbered endpoint columns of a segment file
pub fn detect_segment_columns(headers: &[&str]) -> Option<SegmentColumns> {
    let patterns = [
        name_pattern(X_NAMES, "1")?,
        name_pattern(Y_NAMES, "1")?,
        name_pattern(X_NAMES, "2")?,
        name_pattern(Y_NAMES, "2")?,
    ];
    match claim_columns(headers, &patterns) {
        [Some(x1), Some(y1), Some(x2), Some(y2)] => Some(SegmentColumns { x1, y1, x2, y2 }),
        _ => None,
    }
}

fn parse_coord(row: &[&str], x: usize, y: usize) -> Option<Coord<f64>> {
    Some(Coord {
        x: row.get(x)?.trim().parse().ok()?,
        y: row.get(y)?.trim().parse().ok()?,
    })
}

/// Build point or two-vertex line records from tokenized rows
///
/// Every column, coordinates included, becomes an attribute named after its header, with
/// the cell's type inferred. Rows whose coordinates do not parse are skipped.
///
/// # Errors
/// Returns [`DataError::MissingColumns`] if the headers have no usable coordinate columns,
/// or if polygons are requested.
pub fn records_from_rows<R, C, S>(
    headers: &[&str],
    rows: R,
    kind: CollectionKind,
) -> Result<Vec<FeatureRecord>>
where
    R: IntoIterator<Item = C>,
    C: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    enum Layout {
        Point(PointColumns),
        Segment(SegmentColumns),
    }

    let layout = match kind {
        CollectionKind::Points => detect_point_columns(headers).map(Layout::Point),
        CollectionKind::Lines => detect_segment_columns(headers).map(Layout::Segment),
        CollectionKind::Polygons => {
            return Err(DataError::MissingColumns(
                "polygons cannot be read from coordinate columns".to_string(),
            ));
        }
    }
    .ok_or_else(|| DataError::MissingColumns(headers.join(", ")))?;

    let mut records = Vec::new();
    for (index, row) in rows.into_iter().enumerate() {
        let cells: Vec<S> = row.into_iter().collect();
        let row: Vec<&str> = cells.iter().map(AsRef::as_ref).collect();
        if row.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }

        let geometry = match &layout {
            Layout::Point(c) => parse_coord(&row, c.x, c.y).map(|p| Geometry::Point(Point(p))),
            Layout::Segment(c) => parse_coord(&row, c.x1, c.y1)
                .zip(parse_coord(&row, c.x2, c.y2))
                .map(|(from, to)| Geometry::LineString(LineString::new(vec![from, to]))),
        };
        let Some(geometry) = geometry else {
            tracing::warn!("Skipping row {index}: unable to parse coordinates from {row:?}");
            continue;
        };

        let attributes: Attributes = headers
            .iter()
            .zip(&row)
            .map(|(header, cell)| (header.trim().to_string(), AttributeValue::infer(cell)))
            .collect();
        records.push(FeatureRecord::with_attributes(geometry, attributes));
    }

    tracing::debug!("Built {} {kind:?} records from text rows", records.len());
    Ok(records)
}

/// Read a delimited text file whose first line holds the column names
///
/// Cells may be quoted, so a quoted cell can hold the delimiter. Blank lines are ignored
/// and rows may have fewer or more cells than the header.
///
/// # Errors
/// Returns [`DataError::Csv`] if the text cannot be read, and
/// [`DataError::MissingColumns`] as [`records_from_rows`] does.
pub fn read_delimited<R: Read>(
    reader: R,
    delimiter: u8,
    kind: CollectionKind,
) -> Result<Vec<FeatureRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    if headers.is_empty() {
        return Err(DataError::MissingColumns("empty input".to_string()));
    }
    let headers: Vec<&str> = headers.iter().collect();
    let rows = reader.records().collect::<std::result::Result<Vec<_>, _>>()?;

    records_from_rows(&headers, &rows, kind)
}
