pub mod assembly;
pub mod load;
pub mod orient;

use crate::error::{CliError, Result};
use molframe::core::io::parse_structure;
use molframe::core::models::structure::ParsedStructure;
use nalgebra::{Matrix3, Vector3};
use std::path::Path;

pub(crate) fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| CliError::FileParsing {
        path: path.to_path_buf(),
        source: e.into(),
    })
}

pub(crate) fn read_structure(path: &Path) -> Result<ParsedStructure> {
    let text = read_text(path)?;
    parse_structure(&text).map_err(|e| CliError::FileParsing {
        path: path.to_path_buf(),
        source: e.into(),
    })
}

/// Object name for an input: the file stem, or the whole path when it has none.
pub(crate) fn object_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

pub(crate) fn format_matrix(m: &Matrix3<f64>) -> String {
    m.row_iter()
        .map(|row| format!("[{:>9.5} {:>9.5} {:>9.5}]", row[0], row[1], row[2]))
        .collect::<Vec<_>>()
        .join(" ")
}

pub(crate) fn format_vector(v: &Vector3<f64>) -> String {
    format!("({:.3}, {:.3}, {:.3})", v.x, v.y, v.z)
}
