//! JSON export of computed results.
//!
//! The export wraps a result payload with run metadata so that downstream tools
//! can tell which experiment and which build produced it.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::ReduceError;

/// Envelope written by `write_results_json`.
#[derive(Debug, Clone, Serialize)]
pub struct ResultsFile<'a, T: Serialize> {
    pub tool: &'static str,
    pub version: &'static str,
    pub experiment: &'a str,
    pub generated_at: DateTime<Utc>,
    pub results: &'a T,
}

impl<'a, T: Serialize> ResultsFile<'a, T> {
    pub fn new(experiment: &'a str, results: &'a T) -> Self {
        Self {
            tool: "photo",
            version: env!("CARGO_PKG_VERSION"),
            experiment,
            generated_at: Utc::now(),
            results,
        }
    }
}

/// Write `results` as pretty-printed JSON to `path`.
pub fn write_results_json<T: Serialize>(path: &Path, experiment: &str, results: &T) -> Result<(), ReduceError> {
    let file = File::create(path)
        .map_err(|e| ReduceError::Input(format!("failed to create JSON export '{}': {e}", path.display())))?;

    serde_json::to_writer_pretty(BufWriter::new(file), &ResultsFile::new(experiment, results))
        .map_err(|e| ReduceError::Input(format!("failed to write JSON export '{}': {e}", path.display())))?;

    log::info!("wrote {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LinearResponse, PolynomialFit};

    #[test]
    fn writes_envelope_and_payload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("angle.json");
        let response = LinearResponse {
            points: vec![(1.0, 2.0), (0.5, 1.0)],
            fit: PolynomialFit {
                degree: 1,
                coefficients: vec![2.0, 0.0],
                sse: 0.0,
                n: 2,
            },
        };

        write_results_json(&path, "internal/angle", &response).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["tool"], "photo");
        assert_eq!(value["experiment"], "internal/angle");
        assert_eq!(value["results"]["fit"]["coefficients"][0], 2.0);
        assert_eq!(value["results"]["points"][1][0], 0.5);
    }

    #[test]
    fn unwritable_path_is_an_input_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.json");
        let err = write_results_json(&path, "external", &1.0).unwrap_err();
        assert!(matches!(err, ReduceError::Input(_)));
    }
}
