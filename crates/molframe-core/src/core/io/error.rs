use super::cif::CifError;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("CIF syntax error: {0}")]
    Cif(#[from] CifError),
    #[error("Required column '_atom_site.{0}' is missing")]
    MissingColumn(&'static str),
    #[error("No atoms found in any model")]
    NoAtoms,
}
