//! CSV point tables
//!
//! A `PointTable` keeps every CSV cell as text so the table can be shown
//! back verbatim; coordinates are only parsed when features are built.

use crate::error::{Error, Result};
use crate::vector::{AttributeValue, Feature, FeatureCollection};
use geo_types::Point;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// Cells treated as missing values, matching the usual CSV NA markers.
const NA_MARKERS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND",
    "1.#QNAN", "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Whether a CSV cell denotes a missing value
pub fn is_na(cell: &str) -> bool {
    NA_MARKERS.contains(&cell.trim())
}

/// A parsed CSV file: header names plus rows of raw cells.
#[derive(Debug, Clone, PartialEq)]
pub struct PointTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

/// Parse a CSV with a header row from any reader.
///
/// Rows with fewer fields than the header are padded with empty (missing)
/// cells; rows with more fields are rejected as malformed.
pub fn read_point_table<R: Read>(reader: R) -> Result<PointTable> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader.headers()?.iter().map(str::to_string).collect();
    if headers.is_empty() {
        return Err(Error::Other("CSV file has no columns".to_string()));
    }

    let mut rows = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        let row: Vec<String> = record
            .iter()
            .map(str::to_string)
            .chain(std::iter::repeat(String::new()))
            .take(headers.len().max(record.len()))
            .collect();
        rows.push(row);
    }

    debug!("parsed {} rows x {} columns", rows.len(), headers.len());
    PointTable::new(headers, rows)
}

/// Parse a CSV file from disk
pub fn read_point_table_path<P: AsRef<Path>>(path: P) -> Result<PointTable> {
    let file = std::fs::File::open(path.as_ref())?;
    read_point_table(std::io::BufReader::new(file))
}

impl PointTable {
    /// Build a table directly from headers and rows
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self> {
        if let Some((i, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, r)| r.len() != headers.len())
        {
            return Err(Error::MalformedRow {
                row: i,
                fields: row.len(),
                expected: headers.len(),
            });
        }
        Ok(Self { headers, rows })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Number of data rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_ok()
    }

    /// Position of a column, or `MissingColumn`
    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| Error::MissingColumn(name.to_string()))
    }

    /// All cells of one column, in row order
    pub fn column(&self, name: &str) -> Result<Vec<&str>> {
        let idx = self.column_index(name)?;
        Ok(self.rows.iter().map(|r| r[idx].as_str()).collect())
    }

    /// A new table holding only `columns`, in the given order
    pub fn select<S: AsRef<str>>(&self, columns: &[S]) -> Result<PointTable> {
        let indices = columns
            .iter()
            .map(|c| self.column_index(c.as_ref()))
            .collect::<Result<Vec<_>>>()?;

        Ok(PointTable {
            headers: indices.iter().map(|&i| self.headers[i].clone()).collect(),
            rows: self
                .rows
                .iter()
                .map(|r| indices.iter().map(|&i| r[i].clone()).collect())
                .collect(),
        })
    }

    /// Convert rows to point features.
    ///
    /// Rows whose latitude or longitude is missing (an NA marker or NaN)
    /// are dropped. Each feature keeps its original row index and all of
    /// its cells as properties. A coordinate that is neither missing nor
    /// a number is an error.
    pub fn to_features(&self, lat_column: &str, lon_column: &str) -> Result<FeatureCollection> {
        let lat_idx = self.column_index(lat_column)?;
        let lon_idx = self.column_index(lon_column)?;

        let mut features = FeatureCollection::new();
        for (index, row) in self.rows.iter().enumerate() {
            let lat = parse_coordinate(&row[lat_idx], lat_column, index)?;
            let lon = parse_coordinate(&row[lon_idx], lon_column, index)?;
            let (Some(lat), Some(lon)) = (lat, lon) else {
                continue;
            };

            let mut feature = Feature::new(index, Point::new(lon, lat));
            for (name, cell) in self.headers.iter().zip(row) {
                feature.set_property(name.clone(), AttributeValue::from_cell(cell));
            }
            features.push(feature);
        }

        let dropped = self.len() - features.len();
        if dropped > 0 {
            info!("Dropped {} row(s) without coordinates", dropped);
        }
        Ok(features)
    }
}

fn parse_coordinate(cell: &str, column: &str, row: usize) -> Result<Option<f64>> {
    if is_na(cell) {
        return Ok(None);
    }
    let value: f64 = cell.trim().parse().map_err(|_| Error::InvalidParameter {
        name: "coordinate",
        value: cell.to_string(),
        reason: format!("column '{}' row {} is not a number", column, row),
    })?;
    if value.is_nan() {
        return Ok(None);
    }
    if !value.is_finite() {
        return Err(Error::InvalidParameter {
            name: "coordinate",
            value: cell.to_string(),
            reason: format!("column '{}' row {} is not finite", column, row),
        });
    }
    Ok(Some(value))
}
