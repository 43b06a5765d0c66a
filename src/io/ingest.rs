//! Measurement CSV ingest.
//!
//! Files carry a two-row header: channel names on the first row, unit symbols
//! on the second. Every following row holds one reading per channel:
//!
//! ```text
//! current1,current2,current3,angle
//! мкА,мкА,мкА,°
//! 1.52,1.49,1.50,0
//! ```
//!
//! Design goals:
//! - **Strict header** (unknown units and duplicate channels are fatal)
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - **No reduction logic here**: the result is a plain `MeasurementTable`

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;

use crate::domain::{MeasurementSeries, MeasurementTable, same_channel};
use crate::error::ReduceError;
use crate::quantity::UnitRegistry;

/// A row-level error encountered during ingest.
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    /// 1-based line number in the file.
    pub line: usize,
    pub message: String,
}

/// Ingest output: the table plus what was skipped on the way.
#[derive(Debug, Clone)]
pub struct IngestedTable {
    pub table: MeasurementTable,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
    pub rows_used: usize,
}

/// Load a measurement file from disk.
pub fn load_measurements(path: &Path, registry: &UnitRegistry) -> Result<IngestedTable, ReduceError> {
    let file = File::open(path)
        .map_err(|e| ReduceError::Input(format!("failed to open '{}': {e}", path.display())))?;
    let ingested = read_measurements(file, path, registry)?;

    for err in &ingested.row_errors {
        log::warn!("{}:{}: skipped row: {}", path.display(), err.line, err.message);
    }
    log::info!(
        "loaded {} ({} channel(s), {}/{} rows)",
        path.display(),
        ingested.table.channels().len(),
        ingested.rows_used,
        ingested.rows_read
    );
    Ok(ingested)
}

/// Parse measurements from any reader; `source` is used for messages only.
pub fn read_measurements(
    reader: impl Read,
    source: &Path,
    registry: &UnitRegistry,
) -> Result<IngestedTable, ReduceError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut records = reader.records();

    let header_err = |what: &str| ReduceError::Input(format!("{}: missing {what} header row", source.display()));
    let names = records
        .next()
        .ok_or_else(|| header_err("channel name"))?
        .map_err(|e| csv_error(source, e))?;
    let units = records
        .next()
        .ok_or_else(|| header_err("unit"))?
        .map_err(|e| csv_error(source, e))?;

    let names = channel_names(&names, source)?;
    let units = names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let symbol = units.get(i).unwrap_or("");
            registry.parse(symbol).map_err(|e| match e {
                ReduceError::UnknownUnit(s) => {
                    ReduceError::UnknownUnit(format!("{s} (channel `{name}` in {})", source.display()))
                }
                other => other,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut columns: Vec<Vec<f64>> = vec![Vec::new(); names.len()];
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in records.enumerate() {
        // two header rows, 1-based
        let fallback_line = idx + 3;
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                rows_read += 1;
                row_errors.push(RowError {
                    line: fallback_line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };
        if record.iter().all(str::is_empty) {
            continue;
        }
        rows_read += 1;
        let line = record
            .position()
            .map_or(fallback_line, |p| p.line() as usize);

        match parse_row(&record, &names) {
            Ok(values) => {
                for (col, v) in columns.iter_mut().zip(values) {
                    col.push(v);
                }
            }
            Err(message) => row_errors.push(RowError { line, message }),
        }
    }

    let rows_used = columns.first().map_or(0, Vec::len);
    let channels = names
        .into_iter()
        .zip(units)
        .zip(columns)
        .map(|((name, unit), values)| MeasurementSeries::new(name, unit, values))
        .collect();

    Ok(IngestedTable {
        table: MeasurementTable::new(source.to_path_buf(), channels),
        row_errors,
        rows_read,
        rows_used,
    })
}

fn channel_names(record: &StringRecord, source: &Path) -> Result<Vec<String>, ReduceError> {
    let mut names: Vec<String> = Vec::with_capacity(record.len());
    for (i, raw) in record.iter().enumerate() {
        // Spreadsheet exports may prefix the first cell with a BOM.
        let name = raw.trim_start_matches('\u{feff}').trim();
        if name.is_empty() {
            return Err(ReduceError::Input(format!(
                "{}: column {} has no channel name",
                source.display(),
                i + 1
            )));
        }
        if names.iter().any(|n| same_channel(n, name)) {
            return Err(ReduceError::Input(format!(
                "{}: duplicate channel `{name}`",
                source.display()
            )));
        }
        names.push(name.to_string());
    }
    if names.is_empty() {
        return Err(ReduceError::Input(format!("{}: no channels", source.display())));
    }
    Ok(names)
}

fn parse_row(record: &StringRecord, names: &[String]) -> Result<Vec<f64>, String> {
    if record.len() != names.len() {
        return Err(format!("expected {} field(s), found {}", names.len(), record.len()));
    }
    record
        .iter()
        .zip(names)
        .map(|(field, name)| {
            let v: f64 = field
                .parse()
                .map_err(|_| format!("`{name}`: cannot parse '{field}' as a number"))?;
            if v.is_finite() {
                Ok(v)
            } else {
                Err(format!("`{name}`: non-finite value '{field}'"))
            }
        })
        .collect()
}

fn csv_error(source: &Path, e: csv::Error) -> ReduceError {
    ReduceError::Input(format!("{}: CSV parse error: {e}", source.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quantity::Dimension;
    use std::io::Write;

    fn read(text: &str) -> Result<IngestedTable, ReduceError> {
        read_measurements(text.as_bytes(), Path::new("test.csv"), &UnitRegistry::new())
    }

    #[test]
    fn reads_two_row_header() {
        let data = read("Voltage\nV\n1.20\n1.22\n1.18\n1.21\n").unwrap();
        assert_eq!(data.rows_used, 4);
        let v = data.table.get("voltage").unwrap();
        assert_eq!(v.unit().dimension(), Dimension::VOLTAGE);
        assert_eq!(v.values(), &[1.20, 1.22, 1.18, 1.21]);
    }

    #[test]
    fn resolves_russian_units() {
        let data = read("\u{feff}current1,angle,distance\nмкА,°,см\n1.5,60,10\n").unwrap();
        let current = data.table.get("current1").unwrap();
        assert_eq!(current.unit().dimension(), Dimension::CURRENT);
        assert!((current.unit().scale() - 1e-6).abs() < 1e-18);
        assert!(data.table.get("angle").unwrap().unit().dimension().is_dimensionless());
        assert!((data.table.get("distance").unwrap().unit().scale() - 1e-2).abs() < 1e-15);
    }

    #[test]
    fn bad_rows_are_skipped_and_reported() {
        let data = read("a,b\nV,V\n1,2\nx,3\n4\n\n5,6\n").unwrap();
        assert_eq!(data.rows_read, 4);
        assert_eq!(data.rows_used, 2);
        assert_eq!(data.table.get("b").unwrap().values(), &[2.0, 6.0]);
        let lines: Vec<_> = data.row_errors.iter().map(|e| e.line).collect();
        assert_eq!(lines, vec![4, 5]);
    }

    #[test]
    fn unknown_unit_is_fatal() {
        let err = read("a\nparsec\n1\n").unwrap_err();
        assert!(matches!(err, ReduceError::UnknownUnit(_)));
    }

    #[test]
    fn missing_unit_row_is_fatal() {
        let err = read("a\n").unwrap_err();
        assert!(matches!(err, ReduceError::Input(_)));
    }

    #[test]
    fn duplicate_channels_are_rejected() {
        let err = read("a,A\nV,V\n1,2\n").unwrap_err();
        assert!(matches!(err, ReduceError::Input(_)));
    }

    #[test]
    fn cyrillic_duplicates_are_rejected() {
        let err = read("Ток,ток\nмкА,мкА\n1,2\n").unwrap_err();
        assert!(matches!(err, ReduceError::Input(ref m) if m.contains("duplicate channel")), "{err}");
    }

    #[test]
    fn loads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("435nm.csv");
        let mut f = File::create(&path).unwrap();
        writeln!(f, "Voltage\nВ\n1.2\n1.3").unwrap();

        let data = load_measurements(&path, &UnitRegistry::new()).unwrap();
        assert_eq!(data.table.source, path);
        assert_eq!(data.table.get("Voltage").unwrap().len(), 2);

        let missing = load_measurements(&dir.path().join("nope.csv"), &UnitRegistry::new());
        assert!(matches!(missing, Err(ReduceError::Input(_))));
    }
}
