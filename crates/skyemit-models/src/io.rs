//! Readers for template maps and emissivity tables.
//!
//! Maps are JSON documents:
//!
//! ```json
//! { "unit": "uK_RJ", "values": [1.0, 2.0, ...] }
//! { "unit": "uK_RJ", "fields": [[...I...], [...Q...], [...U...]] }
//! ```
//!
//! Emissivity tables are comma separated `(frequency, emissivity)` rows;
//! lines starting with `#` are comments.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use skyemit_core::errors::{ErrorInfo, SkyError};
use skyemit_core::serde::from_json_slice;
use skyemit_core::{npix_for_nside, PixelMap, Unit};
use tracing::debug;

use crate::interp::EmissivityCurve;

fn io_error(code: &str, path: &Path, err: impl ToString) -> SkyError {
    SkyError::Io(ErrorInfo::new(code, err.to_string()).with_context("path", path.display()))
}

#[derive(Debug, Deserialize)]
struct MapDocument {
    #[serde(default)]
    unit: Option<Unit>,
    #[serde(default)]
    values: Option<Vec<f64>>,
    #[serde(default)]
    fields: Option<Vec<Vec<f64>>>,
}

/// Reads the single map stored in `path` (field 0 of a multi-field document).
pub fn read_map(path: &Path, nside: usize, unit: Option<Unit>) -> Result<PixelMap, SkyError> {
    read_map_field(path, nside, unit, 0)
}

/// Reads field `field` of the map document at `path`.
///
/// The map must have `12 · nside²` pixels. When `unit` is given the values are
/// converted to it; a document without a unit is taken to be in `unit`. A
/// document without a unit read with `unit = None` is an error.
pub fn read_map_field(
    path: &Path,
    nside: usize,
    unit: Option<Unit>,
    field: usize,
) -> Result<PixelMap, SkyError> {
    let (stored, values) = read_values(path, nside, field)?;
    let map = match (stored, unit) {
        (Some(stored), Some(target)) => PixelMap::new(values, stored).into_unit(target)?,
        (Some(stored), None) => PixelMap::new(values, stored),
        (None, Some(target)) => PixelMap::new(values, target),
        (None, None) => {
            return Err(SkyError::UnitMismatch(
                ErrorInfo::new("missing-map-unit", "map has no unit and none was supplied")
                    .with_context("path", path.display()),
            ))
        }
    };
    debug!(path = %path.display(), nside, field, unit = %map.unit(), "read map");
    Ok(map)
}

/// Reads the single map stored in `path` in the unit it declares, or in
/// `fallback` when it declares none. No conversion is applied.
pub fn read_map_declared(
    path: &Path,
    nside: usize,
    fallback: Unit,
) -> Result<PixelMap, SkyError> {
    let (stored, values) = read_values(path, nside, 0)?;
    let map = PixelMap::new(values, stored.unwrap_or(fallback));
    debug!(path = %path.display(), nside, unit = %map.unit(), "read map");
    Ok(map)
}

fn read_values(
    path: &Path,
    nside: usize,
    field: usize,
) -> Result<(Option<Unit>, Vec<f64>), SkyError> {
    let npix = npix_for_nside(nside)?;
    let bytes = fs::read(path).map_err(|err| io_error("map-read", path, err))?;
    let document: MapDocument = from_json_slice(&bytes)?;

    let values = match (document.values, document.fields) {
        (Some(values), _) if field == 0 => values,
        (_, Some(mut fields)) if field < fields.len() => fields.swap_remove(field),
        _ => {
            return Err(SkyError::Io(
                ErrorInfo::new("missing-map-field", "map document has no such field")
                    .with_context("path", path.display())
                    .with_context("field", field),
            ))
        }
    };
    if values.len() != npix {
        return Err(SkyError::ShapeMismatch(
            ErrorInfo::new("map-npix", "map length does not match nside")
                .with_context("path", path.display())
                .with_context("nside", nside)
                .with_context("expected", npix)
                .with_context("found", values.len()),
        ));
    }
    Ok((document.unit, values))
}

/// Reads an emissivity table of `(frequency, emissivity)` rows.
pub fn read_table(path: &Path) -> Result<EmissivityCurve, SkyError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .comment(Some(b'#'))
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|err| io_error("table-open", path, err))?;

    let mut points = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record.map_err(|err| io_error("table-read", path, err))?;
        if record.len() != 2 {
            return Err(SkyError::Serde(
                ErrorInfo::new("table-columns", "emissivity rows need exactly two columns")
                    .with_context("path", path.display())
                    .with_context("row", row)
                    .with_context("columns", record.len()),
            ));
        }
        let parse = |column: usize| -> Result<f64, SkyError> {
            record[column].parse::<f64>().map_err(|err| {
                SkyError::Serde(
                    ErrorInfo::new("table-value", err.to_string())
                        .with_context("path", path.display())
                        .with_context("row", row)
                        .with_context("column", column),
                )
            })
        };
        points.push((parse(0)?, parse(1)?));
    }
    debug!(path = %path.display(), rows = points.len(), "read emissivity table");
    EmissivityCurve::new(&points)
}
