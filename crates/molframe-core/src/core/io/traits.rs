use super::error::ParseError;
use crate::core::models::structure::ParsedStructure;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

/// Defines the interface for reading coordinate file formats.
///
/// Implementors only need to parse complete text; buffered and path-based reading are
/// provided on top of it.
pub trait StructureFile {
    /// Parses a structure from the full text of a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is syntactically invalid for the format or yields no
    /// atoms.
    fn parse_str(text: &str) -> Result<ParsedStructure, ParseError>;

    /// Reads a structure from a buffered reader.
    ///
    /// # Errors
    ///
    /// Returns an error if reading fails or the content cannot be parsed.
    fn read_from(reader: &mut impl BufRead) -> Result<ParsedStructure, ParseError> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        Self::parse_str(&text)
    }

    /// Reads a structure from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or parsing fails.
    fn read_from_path<P: AsRef<Path>>(path: P) -> Result<ParsedStructure, ParseError> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::read_from(&mut reader)
    }
}
