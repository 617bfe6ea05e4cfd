use super::atom::Atom;
use crate::core::io::cif::CifDocument;
use std::fmt;

/// The text format a structure was parsed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StructureFormat {
    Pdb,
    MmCif,
}

impl fmt::Display for StructureFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StructureFormat::Pdb => "PDB",
            StructureFormat::MmCif => "mmCIF",
        })
    }
}

/// One model (NMR conformer, trajectory snapshot) of a parsed structure.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    /// Model number as written in the file (1 for implicit single models).
    pub number: i64,
    pub atoms: Vec<Atom>,
}

impl Model {
    pub fn new(number: i64) -> Self {
        Self {
            number,
            atoms: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }
}

/// Records kept alongside the atoms so biological assemblies can be rebuilt later.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SymmetryRecords {
    /// Raw `REMARK 350` lines of a PDB file.
    Remark350(Vec<String>),
    /// The full CIF document; assembly categories are looked up on demand.
    Cif(CifDocument),
    #[default]
    None,
}

/// The result of parsing a structure file: models in file order plus symmetry records.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedStructure {
    pub format: StructureFormat,
    /// Entry identifier (`data_` block name or PDB `HEADER` id), if present.
    pub id: Option<String>,
    pub models: Vec<Model>,
    pub symmetry: SymmetryRecords,
}

impl ParsedStructure {
    pub fn atom_count(&self) -> usize {
        self.models.iter().map(|m| m.atoms.len()).sum()
    }

    pub fn first_model(&self) -> Option<&Model> {
        self.models.first()
    }
}
