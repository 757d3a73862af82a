use std::path::PathBuf;

use thiserror::Error;

/// Failures of the per-type correction pipeline.
///
/// Every variant is fatal for the correlator type it was raised on; other types keep going.
#[derive(Debug, Error)]
pub enum CorrError {
    #[error("shape mismatch for {label}: {detail}")]
    ShapeMismatch { label: String, detail: String },

    #[error("source-time lookup failed for absolute config {absolute}: {detail}")]
    Lookup { absolute: i64, detail: String },

    #[error("cannot classify correlator type '{label}': {detail}")]
    Classification { label: String, detail: String },

    #[error("{label}: magnitude changed at {} cell(s), first at {}", .cells.len(), first_cell(.cells))]
    ConsistencyViolation {
        label: String,
        cells: Vec<(usize, usize)>,
    },

    #[error("{label}: config {config} crosses the temporal boundary more than once (s = {first} and s = {back})")]
    MultipleCrossings {
        label: String,
        config: usize,
        first: usize,
        back: usize,
    },

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}:{line}: {detail}", .path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        detail: String,
    },
}

fn first_cell(cells: &[(usize, usize)]) -> String {
    match cells.first() {
        Some((tsep, config)) => format!("(tsep {tsep}, config {config})"),
        None => "-".to_string(),
    }
}

impl CorrError {
    pub fn shape(label: &str, detail: impl Into<String>) -> Self {
        CorrError::ShapeMismatch {
            label: label.to_string(),
            detail: detail.into(),
        }
    }

    pub fn lookup(absolute: i64, detail: impl Into<String>) -> Self {
        CorrError::Lookup {
            absolute,
            detail: detail.into(),
        }
    }
}
