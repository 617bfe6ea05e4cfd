use super::names;
use crate::core::models::residue::ResidueClass;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NucleotideKind {
    Rna,
    Dna,
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
struct DictionaryFile {
    #[serde(default)]
    modified: HashMap<String, String>,
    #[serde(default)]
    nucleotides: HashMap<String, NucleotideKind>,
}

/// Residue-name knowledge used by the classifier.
///
/// The built-in tables always apply; a dictionary loaded from TOML adds modified amino
/// acids (`[modified] XYZ = "LYS"`) and nucleotides (`[nucleotides] ABC = "rna"`) on top.
#[derive(Debug, Clone, Default)]
pub struct ResidueDictionary {
    modified: HashMap<String, String>,
    nucleotides: HashMap<String, NucleotideKind>,
}

impl ResidueDictionary {
    pub fn builtin() -> Self {
        Self::default()
    }

    pub fn load(path: &Path) -> Result<Self, DictionaryLoadError> {
        let content = std::fs::read_to_string(path).map_err(|e| DictionaryLoadError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        Self::from_toml_str(&content).map_err(|e| match e {
            DictionaryLoadError::Toml { source, .. } => DictionaryLoadError::Toml {
                path: path.to_string_lossy().to_string(),
                source,
            },
            other => other,
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, DictionaryLoadError> {
        let file: DictionaryFile =
            toml::from_str(content).map_err(|e| DictionaryLoadError::Toml {
                path: "<inline>".to_string(),
                source: e,
            })?;

        for (name, parent) in &file.modified {
            if !names::is_standard_amino_acid(parent) {
                return Err(DictionaryLoadError::UnknownParent {
                    residue: name.clone(),
                    parent: parent.clone(),
                });
            }
        }

        Ok(Self {
            modified: file.modified,
            nucleotides: file.nucleotides,
        })
    }

    /// Canonical amino acid a residue name stands for, if it is one.
    pub fn amino_acid_parent<'a>(&'a self, residue_name: &'a str) -> Option<&'a str> {
        let name = residue_name.trim();
        if names::is_standard_amino_acid(name) {
            return Some(name);
        }
        names::modified_amino_acid_parent(name)
            .or_else(|| self.modified.get(name).map(String::as_str))
    }

    pub fn is_standard_amino_acid(&self, residue_name: &str) -> bool {
        names::is_standard_amino_acid(residue_name)
    }

    /// RNA or DNA class for nucleotide residue names; `None` otherwise.
    pub fn nucleotide_class(&self, residue_name: &str) -> Option<ResidueClass> {
        let name = residue_name.trim();
        if let Some(kind) = self.nucleotides.get(name) {
            return Some(match kind {
                NucleotideKind::Rna => ResidueClass::Rna,
                NucleotideKind::Dna => ResidueClass::Dna,
            });
        }
        names::is_known_nucleotide(name).then(|| names::nucleotide_class(name))
    }

    pub fn is_water(&self, residue_name: &str) -> bool {
        names::is_water(residue_name)
    }
}

#[derive(Debug, Error)]
pub enum DictionaryLoadError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
    #[error("Modified residue '{residue}' maps to unknown amino acid '{parent}'")]
    UnknownParent { residue: String, parent: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const DICTIONARY: &str = r#"
[modified]
XLY = "LYS"

[nucleotides]
ZNA = "dna"
"#;

    #[test]
    fn builtin_dictionary_resolves_standard_and_modified_names() {
        let dict = ResidueDictionary::builtin();
        assert_eq!(dict.amino_acid_parent("GLY"), Some("GLY"));
        assert_eq!(dict.amino_acid_parent("MSE"), Some("MET"));
        assert_eq!(dict.amino_acid_parent("ATP"), None);
        assert_eq!(dict.nucleotide_class("DA"), Some(ResidueClass::Dna));
        assert_eq!(dict.nucleotide_class("ATP"), None);
        assert!(dict.is_water("HOH"));
    }

    #[test]
    fn load_adds_user_entries() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(DICTIONARY.as_bytes()).unwrap();

        let dict = ResidueDictionary::load(file.path()).unwrap();
        assert_eq!(dict.amino_acid_parent("XLY"), Some("LYS"));
        assert_eq!(dict.nucleotide_class("ZNA"), Some(ResidueClass::Dna));
        assert_eq!(dict.amino_acid_parent("MSE"), Some("MET"));
    }

    #[test]
    fn load_reports_io_and_toml_errors_with_path() {
        let missing = ResidueDictionary::load(Path::new("/nonexistent/dict.toml"));
        assert!(matches!(missing, Err(DictionaryLoadError::Io { .. })));

        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"[unexpected]\nA = 1\n").unwrap();
        match ResidueDictionary::load(file.path()) {
            Err(DictionaryLoadError::Toml { path, .. }) => {
                assert_eq!(path, file.path().to_string_lossy())
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_parent_residue() {
        let result = ResidueDictionary::from_toml_str("[modified]\nXLY = \"FOO\"\n");
        assert!(matches!(
            result,
            Err(DictionaryLoadError::UnknownParent { .. })
        ));
    }
}
