use super::cif::{CifDocument, CifRow};
use super::error::ParseError;
use super::traits::StructureFile;
use crate::core::models::atom::{Atom, RecordKind, element_from_atom_name};
use crate::core::models::structure::{Model, ParsedStructure, StructureFormat, SymmetryRecords};
use nalgebra::Point3;
use std::collections::HashMap;
use tracing::warn;

const ATOM_SITE: &str = "atom_site";
const COORDINATE_COLUMNS: [&str; 3] = ["Cartn_x", "Cartn_y", "Cartn_z"];
const ASSEMBLY_CATEGORIES: [&str; 2] = ["pdbx_struct_assembly_gen", "pdbx_struct_oper_list"];

/// Reader for mmCIF/PDBx files.
pub struct MmcifFile;

impl MmcifFile {
    /// Extracts models from an already parsed CIF document.
    pub fn from_document(doc: CifDocument) -> Result<ParsedStructure, ParseError> {
        let Some(table) = doc.table(ATOM_SITE) else {
            return Err(ParseError::NoAtoms);
        };
        for column in COORDINATE_COLUMNS {
            if !table.has_column(column) {
                return Err(ParseError::MissingColumn(column));
            }
        }

        let mut models: Vec<Model> = Vec::new();
        let mut model_index: HashMap<i64, usize> = HashMap::new();

        for row in table.rows() {
            let Some(atom) = atom_from_row(&row) else {
                continue;
            };
            let number = row
                .get("pdbx_pdb_model_num")
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(1);
            let idx = *model_index.entry(number).or_insert_with(|| {
                models.push(Model::new(number));
                models.len() - 1
            });
            models[idx].atoms.push(atom);
        }

        if models.iter().all(Model::is_empty) {
            return Err(ParseError::NoAtoms);
        }

        let id = doc.name().map(str::to_string);
        let symmetry = if ASSEMBLY_CATEGORIES
            .iter()
            .any(|category| doc.table(category).is_some())
        {
            SymmetryRecords::Cif(doc)
        } else {
            SymmetryRecords::None
        };

        Ok(ParsedStructure {
            format: StructureFormat::MmCif,
            id,
            models,
            symmetry,
        })
    }
}

impl StructureFile for MmcifFile {
    fn parse_str(text: &str) -> Result<ParsedStructure, ParseError> {
        let doc = CifDocument::parse(text)?;
        Self::from_document(doc)
    }
}

fn parse_coordinate(row: &CifRow<'_>, column: &str) -> Option<f64> {
    row.get(column)?.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn first_char(value: Option<&str>) -> Option<char> {
    value.and_then(|v| v.chars().next())
}

fn atom_from_row(row: &CifRow<'_>) -> Option<Atom> {
    let name = row.first_of(&["auth_atom_id", "label_atom_id"]).unwrap_or("");
    let (Some(x), Some(y), Some(z)) = (
        parse_coordinate(row, "cartn_x"),
        parse_coordinate(row, "cartn_y"),
        parse_coordinate(row, "cartn_z"),
    ) else {
        warn!(
            row = row.index(),
            "Dropping atom '{}' with missing or non-finite coordinates", name
        );
        return None;
    };

    let record = row
        .get("group_pdb")
        .and_then(|v| v.parse::<RecordKind>().ok())
        .unwrap_or_default();
    let chain_id = row
        .first_of(&["auth_asym_id", "label_asym_id"])
        .unwrap_or("")
        .to_string();
    let asym_id = row
        .get("label_asym_id")
        .map(str::to_string)
        .unwrap_or_else(|| chain_id.clone());
    let res_seq = row
        .first_of(&["auth_seq_id", "label_seq_id"])
        .and_then(|v| v.parse::<isize>().ok())
        .unwrap_or(0);
    let b_factor = match row.get("b_iso_or_equiv").map(str::parse::<f64>) {
        Some(Ok(v)) if v.is_finite() => v,
        Some(Ok(v)) => {
            warn!(row = row.index(), "Atom '{}' has B-factor {}; using 0", name, v);
            0.0
        }
        _ => 0.0,
    };
    let element = match row.get("type_symbol") {
        Some(symbol) => symbol.to_ascii_uppercase(),
        None => element_from_atom_name(name),
    };

    Some(Atom {
        record,
        name: name.to_string(),
        alt_loc: first_char(row.get("label_alt_id")),
        res_name: row
            .first_of(&["auth_comp_id", "label_comp_id"])
            .unwrap_or("")
            .to_string(),
        chain_id,
        asym_id,
        res_seq,
        ins_code: first_char(row.get("pdbx_pdb_ins_code")),
        position: Point3::new(x, y, z),
        b_factor,
        element,
    })
}
