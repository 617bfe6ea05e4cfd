use super::atom::{Atom, RecordKind};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Classification of a residue for rendering purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResidueClass {
    Protein,
    Rna,
    Dna,
    Ligand,
}

impl ResidueClass {
    pub fn position_type(self) -> PositionType {
        match self {
            ResidueClass::Protein => PositionType::Protein,
            ResidueClass::Rna => PositionType::Rna,
            ResidueClass::Dna => PositionType::Dna,
            ResidueClass::Ligand => PositionType::Ligand,
        }
    }

    pub fn is_polymer(self) -> bool {
        !matches!(self, ResidueClass::Ligand)
    }
}

/// Per-position type tag carried by a frame (`P`, `R`, `D`, `L` on the wire).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PositionType {
    #[serde(rename = "P")]
    Protein,
    #[serde(rename = "R")]
    Rna,
    #[serde(rename = "D")]
    Dna,
    #[serde(rename = "L")]
    Ligand,
}

impl PositionType {
    pub fn code(self) -> char {
        match self {
            PositionType::Protein => 'P',
            PositionType::Rna => 'R',
            PositionType::Dna => 'D',
            PositionType::Ligand => 'L',
        }
    }

    pub fn is_ligand(self) -> bool {
        self == PositionType::Ligand
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid position type: '{0}' (expected one of P, R, D, L)")]
pub struct ParsePositionTypeError(pub String);

impl FromStr for PositionType {
    type Err = ParsePositionTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "P" | "p" => Ok(PositionType::Protein),
            "R" | "r" => Ok(PositionType::Rna),
            "D" | "d" => Ok(PositionType::Dna),
            "L" | "l" => Ok(PositionType::Ligand),
            other => Err(ParsePositionTypeError(other.to_string())),
        }
    }
}

impl fmt::Display for PositionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Identity of a residue within one model: (chain, sequence number, residue name).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResidueKey {
    pub chain_id: String,
    pub res_seq: isize,
    pub res_name: String,
}

impl ResidueKey {
    pub fn of(atom: &Atom) -> Self {
        Self {
            chain_id: atom.chain_id.clone(),
            res_seq: atom.res_seq,
            res_name: atom.res_name.clone(),
        }
    }
}

/// A residue assembled from consecutive atoms sharing a [`ResidueKey`].
///
/// Only the first alternate location of each atom name is kept, so name lookups are
/// unambiguous.
#[derive(Debug, Clone, PartialEq)]
pub struct Residue {
    pub key: ResidueKey,
    /// Record kind of the residue's first atom.
    pub record: RecordKind,
    atoms: Vec<Atom>,
    atom_name_map: HashMap<String, usize>,
}

impl Residue {
    pub fn new(key: ResidueKey, record: RecordKind) -> Self {
        Self {
            key,
            record,
            atoms: Vec::new(),
            atom_name_map: HashMap::new(),
        }
    }

    /// Adds an atom; returns `false` if an atom with the same name is already present.
    pub fn add_atom(&mut self, atom: Atom) -> bool {
        if self.atom_name_map.contains_key(&atom.name) {
            return false;
        }
        self.atom_name_map.insert(atom.name.clone(), self.atoms.len());
        self.atoms.push(atom);
        true
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    pub fn atom(&self, name: &str) -> Option<&Atom> {
        self.atom_name_map.get(name).map(|&idx| &self.atoms[idx])
    }

    pub fn has_atom(&self, name: &str) -> bool {
        self.atom_name_map.contains_key(name)
    }

    pub fn name(&self) -> &str {
        &self.key.res_name
    }

    pub fn chain_id(&self) -> &str {
        &self.key.chain_id
    }
}
