//! Readers for coordinate files and predicted-error matrices.
//!
//! PDB and mmCIF readers implement [`traits::StructureFile`]; [`parse_structure`] picks
//! the reader by sniffing the text. The CIF tokenizer in [`cif`] is also used by the
//! assembly builder, which reads operator tables from the same document.

pub mod cif;
pub mod error;
pub mod mmcif;
pub mod pae;
pub mod pdb;
pub mod traits;

pub use error::ParseError;

use crate::core::models::structure::{ParsedStructure, StructureFormat};
use mmcif::MmcifFile;
use pdb::PdbFile;
use std::path::Path;
use traits::StructureFile;

/// Guesses the format of structure text.
///
/// Text with a `data_` block header or any `_atom_site.` tag is mmCIF; everything else
/// is treated as legacy PDB.
pub fn detect_format(text: &str) -> StructureFormat {
    let is_cif = text.contains("_atom_site.")
        || text
            .lines()
            .any(|line| line.trim_start().starts_with("data_"));
    if is_cif {
        StructureFormat::MmCif
    } else {
        StructureFormat::Pdb
    }
}

/// Parses structure text in either supported format.
pub fn parse_structure(text: &str) -> Result<ParsedStructure, ParseError> {
    match detect_format(text) {
        StructureFormat::MmCif => MmcifFile::parse_str(text),
        StructureFormat::Pdb => PdbFile::parse_str(text),
    }
}

pub fn read_structure_path<P: AsRef<Path>>(path: P) -> Result<ParsedStructure, ParseError> {
    let text = std::fs::read_to_string(path)?;
    parse_structure(&text)
}
