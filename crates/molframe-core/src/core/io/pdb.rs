use super::error::ParseError;
use super::traits::StructureFile;
use crate::core::models::atom::{Atom, RecordKind, element_from_atom_name};
use crate::core::models::structure::{Model, ParsedStructure, StructureFormat, SymmetryRecords};
use nalgebra::Point3;
use tracing::{debug, warn};

fn slice_and_trim(line: &str, start: usize, end: usize) -> &str {
    line.get(start..end.min(line.len())).unwrap_or("").trim()
}

fn column_char(line: &str, index: usize) -> Option<char> {
    line.get(index..index + 1)
        .and_then(|s| s.chars().next())
        .filter(|c| !c.is_whitespace())
}

fn parse_coordinate(line: &str, start: usize, end: usize) -> Option<f64> {
    slice_and_trim(line, start, end)
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// Reader for legacy fixed-column PDB files.
pub struct PdbFile;

impl PdbFile {
    fn parse_atom_line(line: &str, line_num: usize) -> Option<Atom> {
        let record: RecordKind = slice_and_trim(line, 0, 6).parse().ok()?;
        let name = slice_and_trim(line, 12, 16);
        let res_name = slice_and_trim(line, 17, 20);
        let chain_id = slice_and_trim(line, 21, 22);

        let Ok(res_seq) = slice_and_trim(line, 22, 26).parse::<isize>() else {
            warn!(
                line = line_num,
                "Dropping atom '{}' with unreadable residue number", name
            );
            return None;
        };

        let (Some(x), Some(y), Some(z)) = (
            parse_coordinate(line, 30, 38),
            parse_coordinate(line, 38, 46),
            parse_coordinate(line, 46, 54),
        ) else {
            warn!(
                line = line_num,
                "Dropping atom '{}' with missing or non-finite coordinates", name
            );
            return None;
        };

        let b_factor = match slice_and_trim(line, 60, 66).parse::<f64>() {
            Ok(v) if v.is_finite() => v,
            Ok(v) => {
                warn!(line = line_num, "Atom '{}' has B-factor {}; using 0", name, v);
                0.0
            }
            Err(_) => 0.0,
        };
        let element = match slice_and_trim(line, 76, 78) {
            "" => element_from_atom_name(name),
            e => e.to_ascii_uppercase(),
        };

        Some(Atom {
            record,
            name: name.to_string(),
            alt_loc: column_char(line, 16),
            res_name: res_name.to_string(),
            chain_id: chain_id.to_string(),
            asym_id: chain_id.to_string(),
            res_seq,
            ins_code: column_char(line, 26),
            position: Point3::new(x, y, z),
            b_factor,
            element,
        })
    }
}

impl StructureFile for PdbFile {
    fn parse_str(text: &str) -> Result<ParsedStructure, ParseError> {
        let mut models: Vec<Model> = Vec::new();
        let mut current: Option<Model> = None;
        let mut remark_350 = Vec::new();
        let mut id = None;

        for (idx, line) in text.lines().enumerate() {
            let line_num = idx + 1;
            let record_type = slice_and_trim(line, 0, 6);

            match record_type {
                "ATOM" | "HETATM" => {
                    if let Some(atom) = Self::parse_atom_line(line, line_num) {
                        let next_number = models.len() as i64 + 1;
                        current
                            .get_or_insert_with(|| Model::new(next_number))
                            .atoms
                            .push(atom);
                    }
                }
                "MODEL" => {
                    if let Some(model) = current.take() {
                        models.push(model);
                    }
                    let number = slice_and_trim(line, 6, 80)
                        .parse::<i64>()
                        .unwrap_or(models.len() as i64 + 1);
                    current = Some(Model::new(number));
                }
                "ENDMDL" => {
                    if let Some(model) = current.take() {
                        models.push(model);
                    }
                }
                "HEADER" => {
                    let code = slice_and_trim(line, 62, 66);
                    if !code.is_empty() {
                        id = Some(code.to_string());
                    }
                }
                "REMARK" if slice_and_trim(line, 6, 10) == "350" => {
                    remark_350.push(line.to_string());
                }
                _ => {}
            }
        }
        if let Some(model) = current.take() {
            models.push(model);
        }

        let before = models.len();
        models.retain(|m| !m.is_empty());
        if models.len() != before {
            debug!("Discarded {} empty model(s)", before - models.len());
        }
        if models.is_empty() {
            return Err(ParseError::NoAtoms);
        }

        let symmetry = if remark_350.is_empty() {
            SymmetryRecords::None
        } else {
            SymmetryRecords::Remark350(remark_350)
        };

        Ok(ParsedStructure {
            format: StructureFormat::Pdb,
            id,
            models,
            symmetry,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const TWO_RESIDUES: &str = "\
HEADER    HYDROLASE                               01-JAN-00   1ABC
ATOM      1  N   ALA A   1      11.104   6.134  -6.504  1.00 80.00           N
ATOM      2  CA  ALA A   1      11.639   6.071  -5.147  1.00 85.50           C
ATOM      3  CA  GLY A   2A     12.000   7.000  -4.000  1.00 90.00
HETATM    4 FE   HEM A 101       1.000   2.000   3.000  1.00 20.00          FE
END
";

    #[test]
    fn parses_fixed_columns() {
        let structure = PdbFile::parse_str(TWO_RESIDUES).unwrap();
        assert_eq!(structure.format, StructureFormat::Pdb);
        assert_eq!(structure.id.as_deref(), Some("1ABC"));
        assert_eq!(structure.models.len(), 1);

        let atoms = &structure.models[0].atoms;
        assert_eq!(atoms.len(), 4);
        assert_eq!(atoms[1].name, "CA");
        assert_eq!(atoms[1].res_name, "ALA");
        assert_eq!(atoms[1].chain_id, "A");
        assert_eq!(atoms[1].res_seq, 1);
        assert_eq!(atoms[1].position, Point3::new(11.639, 6.071, -5.147));
        assert_eq!(atoms[1].b_factor, 85.5);
        assert_eq!(atoms[1].element, "C");

        assert_eq!(atoms[2].ins_code, Some('A'));
        assert_eq!(atoms[2].element, "C");

        assert_eq!(atoms[3].record, RecordKind::Hetatm);
        assert_eq!(atoms[3].name, "FE");
        assert_eq!(atoms[3].element, "FE");
        assert_eq!(atoms[3].res_seq, 101);
    }

    #[test]
    fn splits_models_and_discards_empty_ones() {
        let text = "\
MODEL        1
ATOM      1  CA  ALA A   1       0.000   0.000   0.000  1.00  0.00           C
ENDMDL
MODEL        2
ENDMDL
MODEL        3
ATOM      1  CA  ALA A   1       1.000   0.000   0.000  1.00  0.00           C
ENDMDL
";
        let structure = PdbFile::parse_str(text).unwrap();
        let numbers: Vec<i64> = structure.models.iter().map(|m| m.number).collect();
        assert_eq!(numbers, vec![1, 3]);
        assert_eq!(structure.models[1].atoms[0].position.x, 1.0);
    }

    #[test]
    fn drops_atoms_with_bad_coordinates() {
        let text = "\
ATOM      1  CA  ALA A   1         nan   0.000   0.000  1.00  0.00           C
ATOM      2  CA  ALA A   2       abcde   0.000   0.000  1.00  0.00           C
ATOM      3  CA  ALA A   3       1.000   2.000   3.000
";
        let structure = PdbFile::parse_str(text).unwrap();
        let atoms = &structure.models[0].atoms;
        assert_eq!(atoms.len(), 1);
        assert_eq!(atoms[0].res_seq, 3);
        assert_eq!(atoms[0].b_factor, 0.0);
    }

    #[test]
    fn non_finite_b_factors_default_to_zero() {
        let text = "\
ATOM      1  CA  ALA A   1       0.000   0.000   0.000  1.00   nan           C
ATOM      2  CA  ALA A   2       1.000   0.000   0.000  1.00   inf           C
ATOM      3  CA  ALA A   3       2.000   0.000   0.000  1.00  -inf           C
ATOM      4  CA  ALA A   4       3.000   0.000   0.000  1.00 42.00           C
";
        let structure = PdbFile::parse_str(text).unwrap();
        let b: Vec<f64> = structure.models[0].atoms.iter().map(|a| a.b_factor).collect();
        assert_eq!(b, vec![0.0, 0.0, 0.0, 42.0]);
    }

    #[test]
    fn keeps_remark_350_records() {
        let text = "\
REMARK 350 BIOMOLECULE: 1
REMARK 350 APPLY THE FOLLOWING TO CHAINS: A
REMARK 465 MISSING RESIDUES
ATOM      1  CA  ALA A   1       0.000   0.000   0.000  1.00  0.00           C
";
        let structure = PdbFile::parse_str(text).unwrap();
        match structure.symmetry {
            SymmetryRecords::Remark350(lines) => assert_eq!(lines.len(), 2),
            other => panic!("unexpected symmetry records: {other:?}"),
        }
    }

    #[test]
    fn reports_no_atoms() {
        assert!(matches!(
            PdbFile::parse_str("HEADER    EMPTY\nEND\n"),
            Err(ParseError::NoAtoms)
        ));
    }

    #[test]
    fn reads_from_buffered_reader_and_path() {
        let mut cursor = Cursor::new(TWO_RESIDUES.as_bytes());
        let structure = PdbFile::read_from(&mut cursor).unwrap();
        assert_eq!(structure.atom_count(), 4);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.pdb");
        std::fs::write(&path, TWO_RESIDUES).unwrap();
        assert_eq!(PdbFile::read_from_path(&path).unwrap().atom_count(), 4);

        assert!(matches!(
            PdbFile::read_from_path(dir.path().join("missing.pdb")),
            Err(ParseError::Io(_))
        ));
    }
}
