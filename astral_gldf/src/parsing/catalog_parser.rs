//! HYG star catalog CSV parsing.
//!
//! Reads the HYG v4.x CSV layout. Only the columns listed on [`HygRow`] are
//! used; everything else in the file is ignored. Right ascension is stored
//! in hours and converted to degrees here.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use flate2::read::GzDecoder;
use log::{debug, warn};
use serde::Deserialize;

use crate::core::domain::CelestialObject;
use crate::error::{ErrorContext, FixtureError, FixtureResult};

/// Degrees per hour of right ascension.
pub const DEGREES_PER_HOUR: f64 = 15.0;

/// The catalog columns this crate reads.
///
/// Numeric fields are kept as text so that one bad value drops the row
/// instead of failing the whole read.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HygRow {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub hip: Option<String>,
    #[serde(default)]
    pub proper: Option<String>,
    #[serde(default)]
    pub ra: Option<String>,
    #[serde(default)]
    pub dec: Option<String>,
    #[serde(default)]
    pub mag: Option<String>,
    #[serde(default)]
    pub ci: Option<String>,
    #[serde(default)]
    pub spect: Option<String>,
}

/// Objects kept from one catalog read.
#[derive(Debug, Clone, Default)]
pub struct CatalogParseOutcome {
    pub objects: Vec<CelestialObject>,
    /// Malformed rows that were dropped
    pub skipped: usize,
    /// Well-formed rows fainter than the magnitude ceiling
    pub above_limit: usize,
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn required_f64(field: &Option<String>, column: &str) -> Result<f64, String> {
    let raw = non_empty(field).ok_or_else(|| format!("missing {}", column))?;
    let value: f64 = raw
        .parse()
        .map_err(|_| format!("non-numeric {}: {}", column, raw))?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(format!("non-finite {}: {}", column, raw))
    }
}

/// Display name: proper name, else `HIP <hip>`, else `HYG <id>`.
///
/// # Examples
///
/// ```
/// use astral_gldf::parsing::catalog_parser::display_name;
///
/// assert_eq!(display_name(Some("Vega"), Some(91262), "91024"), "Vega");
/// assert_eq!(display_name(None, Some(11767), "11734"), "HIP 11767");
/// assert_eq!(display_name(Some(""), None, "42"), "HYG 42");
/// ```
pub fn display_name(proper: Option<&str>, hip: Option<u32>, id: &str) -> String {
    match (proper.filter(|p| !p.is_empty()), hip) {
        (Some(proper), _) => proper.to_string(),
        (None, Some(hip)) => format!("HIP {}", hip),
        (None, None) => format!("HYG {}", id),
    }
}

/// Converts one row, or explains why it is malformed.
pub fn row_to_object(row: &HygRow) -> Result<CelestialObject, String> {
    let magnitude = required_f64(&row.mag, "mag")?;
    let ra_hours = required_f64(&row.ra, "ra")?;
    let dec_deg = required_f64(&row.dec, "dec")?;

    let hip = match non_empty(&row.hip) {
        Some(raw) => Some(
            raw.parse::<u32>()
                .map_err(|_| format!("invalid hip: {}", raw))?,
        ),
        None => None,
    };
    let color_index = match non_empty(&row.ci) {
        Some(raw) => Some(
            raw.parse::<f64>()
                .map_err(|_| format!("invalid ci: {}", raw))?,
        ),
        None => None,
    };
    let id = non_empty(&row.id).unwrap_or("?");

    let mut object = CelestialObject::new(
        display_name(non_empty(&row.proper), hip, id),
        ra_hours * DEGREES_PER_HOUR,
        dec_deg,
        magnitude,
        non_empty(&row.spect).unwrap_or(""),
    );
    if let Some(hip) = hip {
        object = object.with_catalog_id(hip);
    }
    if let Some(ci) = color_index.filter(|ci| ci.is_finite()) {
        object = object.with_color_index(ci);
    }

    if !object.has_valid_position() {
        return Err(format!(
            "position out of range: ra={:.4} dec={:.4}",
            object.ra_deg, object.dec_deg
        ));
    }
    Ok(object)
}

/// Parses catalog CSV from any reader, keeping objects with
/// `magnitude <= magnitude_limit`.
///
/// Malformed rows are logged and skipped. Only I/O failures abort the read.
pub fn parse_catalog<R: Read>(
    reader: R,
    magnitude_limit: f64,
) -> FixtureResult<CatalogParseOutcome> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let columns = csv_reader
        .headers()
        .map_err(|e| {
            FixtureError::catalog_read(
                e.to_string(),
                ErrorContext::new("parse_catalog").with_details("header row"),
            )
        })?
        .len();
    debug!("Catalog header has {} columns", columns);

    let mut outcome = CatalogParseOutcome::default();

    for (index, record) in csv_reader.deserialize::<HygRow>().enumerate() {
        // Header is line 1
        let line = index + 2;
        let row = match record {
            Ok(row) => row,
            Err(e) if e.is_io_error() => {
                return Err(FixtureError::catalog_read(
                    e.to_string(),
                    ErrorContext::new("parse_catalog").with_details(format!("line {}", line)),
                ));
            }
            Err(e) => {
                warn!("Skipping catalog line {}: {}", line, e);
                outcome.skipped += 1;
                continue;
            }
        };

        match row_to_object(&row) {
            Ok(object) if object.magnitude <= magnitude_limit => outcome.objects.push(object),
            Ok(_) => outcome.above_limit += 1,
            Err(reason) => {
                warn!("Skipping catalog line {}: {}", line, reason);
                outcome.skipped += 1;
            }
        }
    }

    debug!(
        "Parsed catalog: {} kept, {} above limit, {} skipped",
        outcome.objects.len(),
        outcome.above_limit,
        outcome.skipped
    );
    Ok(outcome)
}

fn open(path: &Path) -> FixtureResult<File> {
    File::open(path).map_err(|e| {
        FixtureError::catalog_read(
            e.to_string(),
            ErrorContext::new("open_catalog").with_path(path),
        )
    })
}

fn with_path(err: FixtureError, path: &Path) -> FixtureError {
    match err {
        FixtureError::CatalogRead { message, context } => FixtureError::CatalogRead {
            message,
            context: context.with_path(path),
        },
        other => other,
    }
}

/// Parses a plain CSV catalog file.
pub fn parse_catalog_csv(path: &Path, magnitude_limit: f64) -> FixtureResult<CatalogParseOutcome> {
    let file = open(path)?;
    parse_catalog(BufReader::new(file), magnitude_limit).map_err(|e| with_path(e, path))
}

/// Parses a gzip-compressed CSV catalog file.
pub fn parse_catalog_csv_gz(
    path: &Path,
    magnitude_limit: f64,
) -> FixtureResult<CatalogParseOutcome> {
    let file = open(path)?;
    parse_catalog(GzDecoder::new(BufReader::new(file)), magnitude_limit)
        .map_err(|e| with_path(e, path))
}
