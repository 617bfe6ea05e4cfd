use super::expression::expand_expression;
use super::operation::{SymmetryOperation, apply_operations, compose_sequence, dedupe_operations};
use crate::core::io::cif::{CifDocument, CifRow};
use crate::core::models::structure::{Model, ParsedStructure, SymmetryRecords};
use nalgebra::{Matrix3, Vector3};
use std::collections::HashMap;
use tracing::{debug, warn};

pub const DEFAULT_ASSEMBLY_ID: &str = "1";

const ASSEMBLY_GEN: &str = "pdbx_struct_assembly_gen";
const OPER_LIST: &str = "pdbx_struct_oper_list";

/// A biological assembly built from the first model of a structure.
#[derive(Debug, Clone, PartialEq)]
pub struct Assembly {
    pub operations: Vec<SymmetryOperation>,
    pub model: Model,
}

/// Builds the expanded, deduplicated operator list for one assembly.
///
/// Missing or unusable operator data yields an empty list; callers then keep the
/// asymmetric unit.
pub fn build_operations(records: &SymmetryRecords, assembly_id: &str) -> Vec<SymmetryOperation> {
    let operations = match records {
        SymmetryRecords::Cif(doc) => operations_from_cif(doc, assembly_id),
        SymmetryRecords::Remark350(lines) => operations_from_remark_350(lines, assembly_id),
        SymmetryRecords::None => Vec::new(),
    };
    dedupe_operations(operations)
}

/// Applies an assembly's operators to the first model.
///
/// Returns `None` when the structure carries no usable operators.
pub fn build_assembly(structure: &ParsedStructure, assembly_id: &str) -> Option<Assembly> {
    let first = structure.first_model()?;
    let operations = build_operations(&structure.symmetry, assembly_id);
    if operations.is_empty() {
        return None;
    }
    let model = Model {
        number: first.number,
        atoms: apply_operations(&first.atoms, &operations),
    };
    debug!(
        "Assembly expanded {} atoms into {} with {} operation(s)",
        first.atoms.len(),
        model.atoms.len(),
        operations.len()
    );
    Some(Assembly { operations, model })
}

fn parse_finite(row: &CifRow<'_>, column: &str) -> Option<f64> {
    row.get(column)?.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn oper_from_row(row: &CifRow<'_>) -> Option<SymmetryOperation> {
    let id = row.get("id")?;
    let mut rotation = Matrix3::zeros();
    let mut translation = Vector3::zeros();
    for i in 0..3 {
        for j in 0..3 {
            rotation[(i, j)] = parse_finite(row, &format!("matrix[{}][{}]", i + 1, j + 1))?;
        }
        translation[i] = parse_finite(row, &format!("vector[{}]", i + 1))?;
    }
    Some(SymmetryOperation::new(id, rotation, translation))
}

fn operations_from_cif(doc: &CifDocument, assembly_id: &str) -> Vec<SymmetryOperation> {
    let (Some(gen_table), Some(oper_table)) = (doc.table(ASSEMBLY_GEN), doc.table(OPER_LIST))
    else {
        return Vec::new();
    };

    let mut operators: HashMap<&str, SymmetryOperation> = HashMap::new();
    for row in oper_table.rows() {
        match (row.get("id"), oper_from_row(&row)) {
            (Some(id), Some(op)) => {
                operators.insert(id, op);
            }
            (id, _) => warn!(
                "Dropping operator '{}' with missing or non-finite entries",
                id.unwrap_or("?")
            ),
        }
    }

    let target = if gen_table
        .rows()
        .any(|row| row.get("assembly_id") == Some(assembly_id))
    {
        assembly_id
    } else {
        match gen_table.rows().find_map(|row| row.get("assembly_id")) {
            Some(first) => {
                debug!(
                    "Assembly '{}' not found; using assembly '{}'",
                    assembly_id, first
                );
                first
            }
            None => return Vec::new(),
        }
    };

    let mut operations = Vec::new();
    for row in gen_table
        .rows()
        .filter(|row| row.get("assembly_id") == Some(target))
    {
        let Some(expression) = row.get("oper_expression") else {
            continue;
        };
        let sequences = match expand_expression(expression) {
            Ok(sequences) => sequences,
            Err(e) => {
                warn!("Skipping operator expression '{}': {}", expression, e);
                continue;
            }
        };
        let chains: Vec<&str> = row
            .get("asym_id_list")
            .map(|list| {
                list.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        for sequence in sequences {
            let resolved: Option<Vec<&SymmetryOperation>> = sequence
                .iter()
                .map(|id| operators.get(id.as_str()))
                .collect();
            let Some(resolved) = resolved else {
                warn!(
                    "Skipping operator sequence '{}' naming an unknown operator",
                    sequence.join("x")
                );
                continue;
            };
            if let Some(op) = compose_sequence(resolved) {
                operations.push(op.with_chains(chains.iter().copied()));
            }
        }
    }
    operations
}

#[derive(Debug)]
struct PendingOperator {
    id: String,
    chains: Vec<String>,
    rows: [Option<[f64; 4]>; 3],
}

impl PendingOperator {
    fn finish(self) -> Option<SymmetryOperation> {
        let [Some(r0), Some(r1), Some(r2)] = self.rows else {
            warn!("Dropping BIOMT operator {} with missing rows", self.id);
            return None;
        };
        let rotation = Matrix3::new(
            r0[0], r0[1], r0[2], r1[0], r1[1], r1[2], r2[0], r2[1], r2[2],
        );
        let translation = Vector3::new(r0[3], r1[3], r2[3]);
        Some(SymmetryOperation::new(&self.id, rotation, translation).with_chains(self.chains))
    }
}

fn remark_body(line: &str) -> &str {
    line.get(10..).unwrap_or("").trim()
}

fn parse_chain_list(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| c == ',' || c.is_whitespace())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn biomolecule_id(body: &str) -> Option<&str> {
    body.strip_prefix("BIOMOLECULE:")
        .and_then(|rest| rest.split_whitespace().next())
}

fn parse_biomt_row(body: &str) -> Option<(usize, String, Option<[f64; 4]>)> {
    let mut parts = body.split_whitespace();
    let row = match parts.next()? {
        "BIOMT1" => 0,
        "BIOMT2" => 1,
        "BIOMT3" => 2,
        _ => return None,
    };
    let id = parts.next()?.to_string();
    let values: Vec<f64> = parts.take(4).filter_map(|v| v.parse::<f64>().ok()).collect();
    let values = <[f64; 4]>::try_from(values)
        .ok()
        .filter(|v| v.iter().all(|x| x.is_finite()));
    Some((row, id, values))
}

fn operations_from_remark_350(lines: &[String], assembly_id: &str) -> Vec<SymmetryOperation> {
    let ids: Vec<&str> = lines
        .iter()
        .filter_map(|l| biomolecule_id(remark_body(l)))
        .collect();
    let target = if ids.contains(&assembly_id) {
        assembly_id
    } else if let Some(&first) = ids.first() {
        debug!(
            "Biomolecule '{}' not found; using biomolecule '{}'",
            assembly_id, first
        );
        first
    } else {
        return Vec::new();
    };

    let mut pending: Vec<PendingOperator> = Vec::new();
    let mut index: HashMap<(usize, String), usize> = HashMap::new();
    let mut chains: Vec<String> = Vec::new();
    let mut group = 0usize;
    let mut last_was_biomt = false;
    let mut in_target = false;

    for line in lines {
        let body = remark_body(line);
        if let Some(id) = biomolecule_id(body) {
            in_target = id == target;
            chains.clear();
            last_was_biomt = false;
            continue;
        }
        if !in_target {
            continue;
        }

        if let Some(list) = body.strip_prefix("APPLY THE FOLLOWING TO CHAINS:") {
            if last_was_biomt || group == 0 {
                group += 1;
                chains.clear();
            }
            chains.extend(parse_chain_list(list));
            last_was_biomt = false;
        } else if let Some(list) = body.strip_prefix("AND CHAINS:") {
            chains.extend(parse_chain_list(list));
        } else if let Some((row, id, values)) = parse_biomt_row(body) {
            last_was_biomt = true;
            let slot = *index.entry((group, id.clone())).or_insert_with(|| {
                pending.push(PendingOperator {
                    id,
                    chains: chains.clone(),
                    rows: [None; 3],
                });
                pending.len() - 1
            });
            match values {
                Some(values) => pending[slot].rows[row] = Some(values),
                None => warn!(
                    "Non-finite or short BIOMT{} row for operator {}",
                    row + 1,
                    pending[slot].id
                ),
            }
        }
    }

    pending
        .into_iter()
        .filter_map(PendingOperator::finish)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::parse_structure;
    use nalgebra::Point3;

    const TOLERANCE: f64 = 1e-9;

    fn oper_list(ops: &[(&str, [f64; 12])]) -> String {
        let mut text = String::from(
            "loop_\n_pdbx_struct_oper_list.id\n_pdbx_struct_oper_list.type\n",
        );
        for i in 1..=3 {
            for j in 1..=3 {
                text.push_str(&format!("_pdbx_struct_oper_list.matrix[{i}][{j}]\n"));
            }
            text.push_str(&format!("_pdbx_struct_oper_list.vector[{i}]\n"));
        }
        for (id, m) in ops {
            let values: Vec<String> = m.iter().map(|v| v.to_string()).collect();
            text.push_str(&format!("{id} 'point symmetry operation' {}\n", values.join(" ")));
        }
        text
    }

    // Row-major 3x4 [R | t].
    const IDENTITY: [f64; 12] = [1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0];
    const ROT_Z_180: [f64; 12] = [-1.0, 0.0, 0.0, 0.0, 0.0, -1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0];
    const SHIFT_X: [f64; 12] = [1.0, 0.0, 0.0, 10.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0];

    fn doc_with(gen_rows: &str, ops: &[(&str, [f64; 12])]) -> CifDocument {
        let text = format!(
            "data_T\nloop_\n_pdbx_struct_assembly_gen.assembly_id\n_pdbx_struct_assembly_gen.oper_expression\n_pdbx_struct_assembly_gen.asym_id_list\n{gen_rows}#\n{}",
            oper_list(ops)
        );
        CifDocument::parse(&text).unwrap()
    }

    #[test]
    fn cif_range_expression_builds_one_operation_per_id() {
        let doc = doc_with(
            "1 '1-3' A,B\n",
            &[("1", IDENTITY), ("2", ROT_Z_180), ("3", SHIFT_X)],
        );
        let ops = build_operations(&SymmetryRecords::Cif(doc), "1");
        let ids: Vec<&str> = ops.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
        assert!(ops.iter().all(|o| o.chains.len() == 2));
    }

    #[test]
    fn cif_composition_yields_product_and_dedupes() {
        let doc = doc_with(
            "1 '(1,2)x(1-2)' A\n",
            &[("1", IDENTITY), ("2", ROT_Z_180)],
        );
        let expanded = operations_from_cif(&doc, "1");
        assert_eq!(expanded.len(), 4);
        assert_eq!(expanded[1].id, "1x2");

        // 1x1 and 2x2 are both the identity; 1x2 and 2x1 are both the 180° turn.
        let ops = build_operations(&SymmetryRecords::Cif(doc), "1");
        assert_eq!(ops.len(), 2);
        assert!(ops[0].is_identity());
    }

    #[test]
    fn cif_falls_back_to_first_assembly_and_skips_unknown_operators() {
        let doc = doc_with("7 '1,9' A\n", &[("1", IDENTITY)]);
        let ops = build_operations(&SymmetryRecords::Cif(doc), "1");
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].id, "1");
    }

    #[test]
    fn cif_single_row_operator_list_is_recognised() {
        let text = "\
data_T
_pdbx_struct_assembly_gen.assembly_id 1
_pdbx_struct_assembly_gen.oper_expression 1
_pdbx_struct_assembly_gen.asym_id_list A,B
_pdbx_struct_oper_list.id 1
_pdbx_struct_oper_list.matrix[1][1] 1.0
_pdbx_struct_oper_list.matrix[1][2] 0.0
_pdbx_struct_oper_list.matrix[1][3] 0.0
_pdbx_struct_oper_list.vector[1] 0.0
_pdbx_struct_oper_list.matrix[2][1] 0.0
_pdbx_struct_oper_list.matrix[2][2] 1.0
_pdbx_struct_oper_list.matrix[2][3] 0.0
_pdbx_struct_oper_list.vector[2] 0.0
_pdbx_struct_oper_list.matrix[3][1] 0.0
_pdbx_struct_oper_list.matrix[3][2] 0.0
_pdbx_struct_oper_list.matrix[3][3] 1.0
_pdbx_struct_oper_list.vector[3] 0.0
";
        let doc = CifDocument::parse(text).unwrap();
        let ops = build_operations(&SymmetryRecords::Cif(doc), "1");
        assert_eq!(ops.len(), 1);
        assert!(ops[0].is_identity());
    }

    #[test]
    fn cif_drops_non_finite_operator_rows() {
        let mut bad = SHIFT_X;
        bad[3] = f64::NAN;
        let doc = doc_with("1 '1,2' A\n", &[("1", IDENTITY), ("2", bad)]);
        let ops = build_operations(&SymmetryRecords::Cif(doc), "1");
        assert_eq!(ops.len(), 1);
    }

    #[test]
    fn cif_malformed_expression_skips_row() {
        let doc = doc_with("1 '(1,2' A\n1 2 B\n", &[("1", IDENTITY), ("2", SHIFT_X)]);
        let ops = build_operations(&SymmetryRecords::Cif(doc), "1");
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].id, "2");
    }

    const REMARK_350: &str = "\
REMARK 350 BIOMOLECULE: 1
REMARK 350 AUTHOR DETERMINED BIOLOGICAL UNIT: DIMERIC
REMARK 350 APPLY THE FOLLOWING TO CHAINS: A, B
REMARK 350   BIOMT1   1  1.000000  0.000000  0.000000        0.00000
REMARK 350   BIOMT2   1  0.000000  1.000000  0.000000        0.00000
REMARK 350   BIOMT3   1  0.000000  0.000000  1.000000        0.00000
REMARK 350   BIOMT1   2 -1.000000  0.000000  0.000000       20.00000
REMARK 350   BIOMT2   2  0.000000 -1.000000  0.000000        0.00000
REMARK 350   BIOMT3   2  0.000000  0.000000  1.000000        0.00000
REMARK 350 APPLY THE FOLLOWING TO CHAINS: C
REMARK 350                    AND CHAINS: D
REMARK 350   BIOMT1   1  1.000000  0.000000  0.000000        5.00000
REMARK 350   BIOMT2   1  0.000000  1.000000  0.000000        0.00000
REMARK 350   BIOMT3   1  0.000000  0.000000  1.000000        0.00000
REMARK 350 BIOMOLECULE: 2
REMARK 350 APPLY THE FOLLOWING TO CHAINS: A
REMARK 350   BIOMT1   1  1.000000  0.000000  0.000000        0.00000
REMARK 350   BIOMT2   1  0.000000  1.000000  0.000000        0.00000
REMARK 350   BIOMT3   1  0.000000  0.000000  1.000000        0.00000
";

    fn remark_lines(text: &str) -> Vec<String> {
        text.lines().map(str::to_string).collect()
    }

    #[test]
    fn remark_350_groups_operators_by_chain_list() {
        let ops = build_operations(&SymmetryRecords::Remark350(remark_lines(REMARK_350)), "1");
        assert_eq!(ops.len(), 3);

        assert!(ops[0].is_identity());
        assert_eq!(ops[0].chains.len(), 2);
        assert!(ops[0].applies_to("A") && ops[0].applies_to("B"));

        let p = ops[1].apply(&Point3::new(1.0, 2.0, 3.0));
        assert!((p - Point3::new(19.0, -2.0, 3.0)).norm() < TOLERANCE);

        assert_eq!(ops[2].translation.x, 5.0);
        assert!(ops[2].applies_to("C") && ops[2].applies_to("D"));
        assert!(!ops[2].applies_to("A"));
    }

    #[test]
    fn remark_350_selects_requested_biomolecule_and_falls_back() {
        let lines = remark_lines(REMARK_350);
        let second = build_operations(&SymmetryRecords::Remark350(lines.clone()), "2");
        assert_eq!(second.len(), 1);
        assert!(second[0].applies_to("A") && !second[0].applies_to("B"));

        let fallback = build_operations(&SymmetryRecords::Remark350(lines), "9");
        assert_eq!(fallback.len(), 3);
    }

    #[test]
    fn remark_350_drops_incomplete_or_non_finite_operators() {
        let text = "\
REMARK 350 BIOMOLECULE: 1
REMARK 350 APPLY THE FOLLOWING TO CHAINS: A
REMARK 350   BIOMT1   1  1.000000  0.000000  0.000000        0.00000
REMARK 350   BIOMT2   1  0.000000  1.000000  0.000000        0.00000
REMARK 350   BIOMT1   2  1.000000  0.000000  0.000000        1.00000
REMARK 350   BIOMT2   2  0.000000       nan  0.000000        0.00000
REMARK 350   BIOMT3   2  0.000000  0.000000  1.000000        0.00000
";
        assert!(build_operations(&SymmetryRecords::Remark350(remark_lines(text)), "1").is_empty());
    }

    #[test]
    fn build_assembly_expands_first_model_only() {
        let pdb = format!(
            "{REMARK_350}\
MODEL        1
ATOM      1  CA  ALA A   1       1.000   0.000   0.000  1.00 90.00           C
ATOM      2  CA  ALA B   1       0.000   1.000   0.000  1.00 90.00           C
ATOM      3  CA  ALA C   1       0.000   0.000   1.000  1.00 90.00           C
ENDMDL
MODEL        2
ATOM      1  CA  ALA A   1       9.000   9.000   9.000  1.00 90.00           C
ENDMDL
"
        );
        let structure = parse_structure(&pdb).unwrap();
        let assembly = build_assembly(&structure, "1").unwrap();
        assert_eq!(assembly.operations.len(), 3);

        let chains: Vec<&str> = assembly
            .model
            .atoms
            .iter()
            .map(|a| a.chain_id.as_str())
            .collect();
        assert_eq!(chains, vec!["A", "B", "A|2", "B|2", "C|1"]);
        assert_eq!(assembly.model.atoms[4].position, Point3::new(5.0, 0.0, 1.0));
    }

    #[test]
    fn build_assembly_without_operators_is_none() {
        let pdb = "ATOM      1  CA  ALA A   1       1.000   0.000   0.000  1.00 90.00           C\n";
        let structure = parse_structure(pdb).unwrap();
        assert!(build_assembly(&structure, DEFAULT_ASSEMBLY_ID).is_none());
    }
}
