//! # Core Module
//!
//! Stateless building blocks of the geometry engine.
//!
//! - **Molecular Representation** ([`models`]) - Atoms, parsed structures, residues and frames
//! - **File I/O** ([`io`]) - PDB and mmCIF readers, the CIF tokenizer and PAE JSON reader
//! - **Residue Knowledge** ([`topology`]) - Residue-name dictionaries used for classification
//! - **Symmetry** ([`symmetry`]) - Operator expressions and biological-assembly expansion
//! - **Geometry** ([`geometry`]) - Kabsch superposition, best-view orientation and rotation helpers
//! - **Utilities** ([`utils`]) - Atom-name helpers and small geometric reductions

pub mod geometry;
pub mod io;
pub mod models;
pub mod symmetry;
pub mod topology;
pub mod utils;
