use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The coordinate record an atom was read from.
///
/// Polymer residues are normally written as `ATOM` records while ligands, waters and
/// most modified residues use `HETATM`. The distinction feeds into residue
/// classification when a residue name alone is ambiguous.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RecordKind {
    /// Standard polymer atom record.
    #[default]
    Atom,
    /// Hetero atom record (ligands, waters, modified residues).
    Hetatm,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid record kind: '{0}'")]
pub struct ParseRecordKindError(pub String);

impl FromStr for RecordKind {
    type Err = ParseRecordKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ATOM" => Ok(RecordKind::Atom),
            "HETATM" => Ok(RecordKind::Hetatm),
            other => Err(ParseRecordKindError(other.to_string())),
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RecordKind::Atom => "ATOM",
            RecordKind::Hetatm => "HETATM",
        })
    }
}

/// A single atom as read from a coordinate file.
///
/// Atoms are kept flat: residues and frames are derived views built by the engine.
/// Identifiers are stored as strings because symmetry expansion relabels chains
/// (`"A"` becomes `"A|2"`) and mmCIF chain ids may be longer than one character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Atom {
    /// Record type the atom came from.
    pub record: RecordKind,
    /// Atom name (e.g. "CA", "C4'").
    pub name: String,
    /// Alternate location indicator, if any.
    pub alt_loc: Option<char>,
    /// Residue name (e.g. "ALA", "DG", "ATP").
    pub res_name: String,
    /// Author chain identifier used for display and grouping.
    pub chain_id: String,
    /// Structural asym identifier used to select atoms for symmetry operators.
    ///
    /// For mmCIF input this is `label_asym_id`; for PDB input it equals `chain_id`.
    pub asym_id: String,
    /// Residue sequence number.
    pub res_seq: isize,
    /// Insertion code, if any.
    pub ins_code: Option<char>,
    /// Cartesian coordinates in Angstroms.
    pub position: Point3<f64>,
    /// B-factor column; carries pLDDT for predicted models.
    pub b_factor: f64,
    /// Element symbol, upper-case (e.g. "C", "FE").
    pub element: String,
}

impl Atom {
    /// Creates an atom with default bookkeeping fields.
    ///
    /// The asym id defaults to the chain id and the element is derived from the atom name.
    pub fn new(
        name: &str,
        res_name: &str,
        chain_id: &str,
        res_seq: isize,
        position: Point3<f64>,
    ) -> Self {
        Self {
            record: RecordKind::Atom,
            name: name.to_string(),
            alt_loc: None,
            res_name: res_name.to_string(),
            chain_id: chain_id.to_string(),
            asym_id: chain_id.to_string(),
            res_seq,
            ins_code: None,
            position,
            b_factor: 0.0,
            element: element_from_atom_name(name),
        }
    }

    pub fn with_record(mut self, record: RecordKind) -> Self {
        self.record = record;
        self
    }

    pub fn with_b_factor(mut self, b_factor: f64) -> Self {
        self.b_factor = b_factor;
        self
    }

    pub fn with_element(mut self, element: &str) -> Self {
        self.element = element.trim().to_ascii_uppercase();
        self
    }

    pub fn is_hetero(&self) -> bool {
        self.record == RecordKind::Hetatm
    }

    /// Returns `true` for hydrogen and deuterium atoms.
    pub fn is_hydrogen(&self) -> bool {
        match self.element.as_str() {
            "H" | "D" => true,
            "" => !crate::core::utils::identifiers::is_heavy_atom(&self.name),
            _ => false,
        }
    }
}

/// Guesses an element symbol from an atom name when the element column is empty.
///
/// Leading digits are skipped (PDB v2 hydrogen names such as "1HB") and the first
/// alphabetic character is taken as the symbol.
pub fn element_from_atom_name(name: &str) -> String {
    name.trim()
        .chars()
        .find(|c| c.is_ascii_alphabetic())
        .map(|c| c.to_ascii_uppercase().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_atom_has_expected_default_fields() {
        let atom = Atom::new("CA", "ALA", "A", 10, Point3::new(1.0, 2.0, 3.0));

        assert_eq!(atom.record, RecordKind::Atom);
        assert_eq!(atom.name, "CA");
        assert_eq!(atom.res_name, "ALA");
        assert_eq!(atom.chain_id, "A");
        assert_eq!(atom.asym_id, "A");
        assert_eq!(atom.res_seq, 10);
        assert_eq!(atom.alt_loc, None);
        assert_eq!(atom.b_factor, 0.0);
        assert_eq!(atom.element, "C");
    }

    #[test]
    fn builder_methods_override_fields() {
        let atom = Atom::new("FE", "HEM", "B", 1, Point3::origin())
            .with_record(RecordKind::Hetatm)
            .with_b_factor(42.5)
            .with_element(" fe");

        assert!(atom.is_hetero());
        assert_eq!(atom.b_factor, 42.5);
        assert_eq!(atom.element, "FE");
    }

    #[test]
    fn is_hydrogen_uses_element_then_name() {
        let h = Atom::new("HA", "ALA", "A", 1, Point3::origin()).with_element("H");
        assert!(h.is_hydrogen());

        let d = Atom::new("D1", "ALA", "A", 1, Point3::origin()).with_element("D");
        assert!(d.is_hydrogen());

        let mut unknown = Atom::new("1HB", "ALA", "A", 1, Point3::origin());
        unknown.element.clear();
        assert!(unknown.is_hydrogen());

        let hg = Atom::new("HG", "HG", "A", 1, Point3::origin()).with_element("HG");
        assert!(!hg.is_hydrogen());
    }

    #[test]
    fn element_from_atom_name_skips_leading_digits() {
        assert_eq!(element_from_atom_name("1HB"), "H");
        assert_eq!(element_from_atom_name(" CA "), "C");
        assert_eq!(element_from_atom_name("o5'"), "O");
        assert_eq!(element_from_atom_name("123"), "");
    }

    #[test]
    fn record_kind_parses_and_displays() {
        assert_eq!("ATOM".parse::<RecordKind>(), Ok(RecordKind::Atom));
        assert_eq!("hetatm ".parse::<RecordKind>(), Ok(RecordKind::Hetatm));
        assert!("TER".parse::<RecordKind>().is_err());
        assert_eq!(RecordKind::Hetatm.to_string(), "HETATM");
    }
}
