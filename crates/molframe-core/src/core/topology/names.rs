use crate::core::models::residue::ResidueClass;
use phf::{Map, Set, phf_map, phf_set};

static WATER_NAMES: Set<&'static str> = phf_set! {
    "HOH", "WAT", "DOD", "H2O",
};

static AMINO_ACID_NAMES: Set<&'static str> = phf_set! {
    "ALA", "ARG", "ASN", "ASP", "CYS", "GLN", "GLU", "GLY", "HIS", "ILE",
    "LEU", "LYS", "MET", "PHE", "PRO", "SER", "THR", "TRP", "TYR", "VAL",
    "SEC", "PYL",
};

/// Common modified amino acids and the canonical residue each derives from.
static MODIFIED_AMINO_ACIDS: Map<&'static str, &'static str> = phf_map! {
    "MSE" => "MET", "FME" => "MET",
    "SEP" => "SER",
    "TPO" => "THR",
    "PTR" => "TYR", "TYS" => "TYR",
    "HYP" => "PRO",
    "MLY" => "LYS", "M3L" => "LYS", "ALY" => "LYS", "KCX" => "LYS", "LLP" => "LYS", "MLZ" => "LYS",
    "CSO" => "CYS", "CME" => "CYS", "CSD" => "CYS", "OCS" => "CYS", "CSS" => "CYS", "CAS" => "CYS",
    "PCA" => "GLU", "CGU" => "GLU",
    "NLE" => "LEU",
    "HIC" => "HIS", "NEP" => "HIS",
    "AGM" => "ARG",
    "DAL" => "ALA", "AIB" => "ALA",
};

static RNA_NAMES: Set<&'static str> = phf_set! {
    "A", "C", "G", "U", "I", "N",
    "RA", "RC", "RG", "RU",
    "PSU", "5MU", "1MA", "2MG", "M2G", "7MG", "OMC", "OMG", "OMU", "H2U", "5MC", "4SU",
    "A2M", "1MG", "YG", "6MA",
};

static DNA_NAMES: Set<&'static str> = phf_set! {
    "DA", "DC", "DG", "DT", "DI", "DU", "T",
    "5CM", "8OG", "5BU", "BRU", "CBR", "DN",
};

pub fn is_water(residue_name: &str) -> bool {
    WATER_NAMES.contains(residue_name.trim())
}

pub fn is_standard_amino_acid(residue_name: &str) -> bool {
    AMINO_ACID_NAMES.contains(residue_name.trim())
}

pub fn modified_amino_acid_parent(residue_name: &str) -> Option<&'static str> {
    MODIFIED_AMINO_ACIDS.get(residue_name.trim()).copied()
}

pub fn is_known_nucleotide(residue_name: &str) -> bool {
    let name = residue_name.trim();
    RNA_NAMES.contains(name) || DNA_NAMES.contains(name)
}

/// Decides RNA vs DNA for a residue already known to be a nucleotide.
///
/// Listed RNA names or an `R` prefix give RNA, listed DNA names or a `D` prefix give DNA,
/// and anything else defaults to RNA.
pub fn nucleotide_class(residue_name: &str) -> ResidueClass {
    let name = residue_name.trim();
    if RNA_NAMES.contains(name) || name.starts_with('R') {
        ResidueClass::Rna
    } else if DNA_NAMES.contains(name) || name.starts_with('D') {
        ResidueClass::Dna
    } else {
        ResidueClass::Rna
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn water_names_are_recognised() {
        for name in ["HOH", "WAT", "DOD", "H2O", " HOH "] {
            assert!(is_water(name), "{name}");
        }
        assert!(!is_water("HOX"));
    }

    #[test]
    fn standard_amino_acids_include_sec_and_pyl() {
        assert!(is_standard_amino_acid("ALA"));
        assert!(is_standard_amino_acid("SEC"));
        assert!(is_standard_amino_acid("PYL"));
        assert!(!is_standard_amino_acid("MSE"));
        assert!(!is_standard_amino_acid("ala"));
    }

    #[test]
    fn modified_residues_resolve_to_parent() {
        assert_eq!(modified_amino_acid_parent("MSE"), Some("MET"));
        assert_eq!(modified_amino_acid_parent("SEP"), Some("SER"));
        assert_eq!(modified_amino_acid_parent("ATP"), None);
    }

    #[test]
    fn nucleotide_class_follows_name_rules() {
        assert_eq!(nucleotide_class("A"), ResidueClass::Rna);
        assert_eq!(nucleotide_class("RU"), ResidueClass::Rna);
        assert_eq!(nucleotide_class("PSU"), ResidueClass::Rna);
        assert_eq!(nucleotide_class("DG"), ResidueClass::Dna);
        assert_eq!(nucleotide_class("T"), ResidueClass::Dna);
        assert_eq!(nucleotide_class("5CM"), ResidueClass::Dna);
        assert_eq!(nucleotide_class("DXX"), ResidueClass::Dna);
        assert_eq!(nucleotide_class("XYZ"), ResidueClass::Rna);
    }

    #[test]
    fn known_nucleotides_span_both_tables() {
        assert!(is_known_nucleotide("U"));
        assert!(is_known_nucleotide("DT"));
        assert!(!is_known_nucleotide("ALA"));
    }
}
