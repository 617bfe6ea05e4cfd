use crate::core::models::pae::{PaeMatrix, PaeShapeError};
use serde_json::Value;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PaeError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("No PAE matrix found (expected 'pae' or 'predicted_aligned_error')")]
    MissingMatrix,
    #[error("PAE entry at row {row}, column {col} is not a number")]
    NonNumeric { row: usize, col: usize },
    #[error("PAE row {row} is not an array")]
    RowNotArray { row: usize },
    #[error(transparent)]
    Shape(#[from] PaeShapeError),
}

const PAE_KEY: &str = "pae";
const PREDICTED_KEY: &str = "predicted_aligned_error";

/// Parses a PAE matrix from any of the JSON layouts written by common predictors.
///
/// Accepted layouts, tried in order:
/// `{"pae": [[..]]}`, `{"predicted_aligned_error": [[..]]}`,
/// `{"predicted_aligned_error": {"pae" | "predicted_aligned_error": [[..]]}}` and
/// `[{"predicted_aligned_error": ..}, ..]` (AlphaFold DB).
pub fn parse_pae_json(text: &str) -> Result<PaeMatrix, PaeError> {
    let value: Value = serde_json::from_str(text)?;
    let rows = locate_matrix(&value).ok_or(PaeError::MissingMatrix)?;
    matrix_from_rows(rows)
}

pub fn read_pae_path<P: AsRef<Path>>(path: P) -> Result<PaeMatrix, PaeError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| PaeError::Io {
        path: path.to_string_lossy().to_string(),
        source: e,
    })?;
    parse_pae_json(&text)
}

fn locate_matrix(value: &Value) -> Option<&Vec<Value>> {
    match value {
        Value::Object(map) => {
            if let Some(Value::Array(rows)) = map.get(PAE_KEY) {
                return Some(rows);
            }
            match map.get(PREDICTED_KEY)? {
                Value::Array(rows) => Some(rows),
                Value::Object(nested) => match (nested.get(PAE_KEY), nested.get(PREDICTED_KEY)) {
                    (Some(Value::Array(rows)), _) | (_, Some(Value::Array(rows))) => Some(rows),
                    _ => None,
                },
                _ => None,
            }
        }
        Value::Array(items) => {
            let first = items.first()?;
            match first {
                Value::Object(map) if map.contains_key(PREDICTED_KEY) => locate_matrix(first),
                _ => None,
            }
        }
        _ => None,
    }
}

fn matrix_from_rows(rows: &[Value]) -> Result<PaeMatrix, PaeError> {
    let parsed = rows
        .iter()
        .enumerate()
        .map(|(row, value)| {
            let Value::Array(cells) = value else {
                return Err(PaeError::RowNotArray { row });
            };
            cells
                .iter()
                .enumerate()
                .map(|(col, cell)| cell.as_f64().ok_or(PaeError::NonNumeric { row, col }))
                .collect::<Result<Vec<f64>, _>>()
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(PaeMatrix::from_rows(parsed)?)
}
