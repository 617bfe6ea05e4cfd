use phf::{Set, phf_set};

pub static PEPTIDE_BACKBONE_ATOM_NAMES: Set<&'static str> = phf_set! {
    "N", "CA", "C",
};

/// Sugar carbon used to represent a nucleotide. `C4*` is the pre-remediation spelling.
static NUCLEOTIDE_REPRESENTATIVE_NAMES: Set<&'static str> = phf_set! {
    "C4'", "C4*",
};

pub const PROTEIN_REPRESENTATIVE_ATOM: &str = "CA";

pub fn is_peptide_backbone_atom(atom_name: &str) -> bool {
    PEPTIDE_BACKBONE_ATOM_NAMES.contains(atom_name.trim())
}

pub fn is_nucleotide_representative(atom_name: &str) -> bool {
    NUCLEOTIDE_REPRESENTATIVE_NAMES.contains(atom_name.trim())
}

/// Name-based fallback for element-less atoms: hydrogen and deuterium names start with
/// `H` or `D` once any leading digits ("1HB", "2HG1") are skipped.
pub fn is_heavy_atom(atom_name: &str) -> bool {
    let first_char = atom_name
        .trim()
        .chars()
        .find(|c| !c.is_ascii_digit())
        .map(|c| c.to_ascii_uppercase());
    !matches!(first_char, Some('H') | Some('D'))
}
