use super::{format_matrix, format_vector, read_structure};
use crate::cli::AssemblyArgs;
use crate::error::Result;
use molframe::core::symmetry::{SymmetryOperation, build_assembly, build_operations};
use tracing::info;

pub fn run(args: AssemblyArgs) -> Result<()> {
    info!("Loading input structure from {:?}", &args.file);
    let structure = read_structure(&args.file)?;

    let operations = build_operations(&structure.symmetry, &args.id);
    if operations.is_empty() {
        println!(
            "No symmetry operators found for assembly '{}'; the asymmetric unit is used as-is.",
            args.id
        );
        return Ok(());
    }

    println!(
        "Assembly '{}': {} operation(s)",
        args.id,
        operations.len()
    );
    for operation in &operations {
        println!("{}", describe(operation));
    }

    if let Some(assembly) = build_assembly(&structure, &args.id) {
        let input = structure.first_model().map_or(0, |m| m.atoms.len());
        println!(
            "Expanded {} atom(s) of the first model into {}.",
            input,
            assembly.model.atoms.len()
        );
    }
    Ok(())
}

fn describe(operation: &SymmetryOperation) -> String {
    let chains = if operation.chains.is_empty() {
        "all chains".to_string()
    } else {
        operation
            .chains
            .iter()
            .cloned()
            .collect::<Vec<_>>()
            .join(",")
    };
    let marker = if operation.is_identity() { " (identity)" } else { "" };
    format!(
        "  {}{} -> {}\n    R = {}\n    t = {}",
        operation.id,
        marker,
        chains,
        format_matrix(&operation.rotation),
        format_vector(&operation.translation)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{Matrix3, Vector3};
    use std::path::PathBuf;

    const DIMER: &str = "\
REMARK 350 BIOMOLECULE: 1
REMARK 350 APPLY THE FOLLOWING TO CHAINS: A
REMARK 350   BIOMT1   1  1.000000  0.000000  0.000000        0.00000
REMARK 350   BIOMT2   1  0.000000  1.000000  0.000000        0.00000
REMARK 350   BIOMT3   1  0.000000  0.000000  1.000000        0.00000
REMARK 350   BIOMT1   2 -1.000000  0.000000  0.000000       10.00000
REMARK 350   BIOMT2   2  0.000000 -1.000000  0.000000        0.00000
REMARK 350   BIOMT3   2  0.000000  0.000000  1.000000        0.00000
ATOM      1  CA  ALA A   1       1.000   2.000   3.000  1.00 50.00           C
END
";

    fn write(dir: &tempfile::TempDir, text: &str) -> PathBuf {
        let path = dir.path().join("input.pdb");
        std::fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn prints_operations_for_remark_350() {
        let dir = tempfile::tempdir().unwrap();
        let file = write(&dir, DIMER);
        run(AssemblyArgs {
            file,
            id: "1".to_string(),
        })
        .unwrap();
    }

    #[test]
    fn unknown_id_uses_the_first_biomolecule() {
        let dir = tempfile::tempdir().unwrap();
        let file = write(&dir, DIMER);
        let structure = read_structure(&file).unwrap();
        assert_eq!(build_operations(&structure.symmetry, "7").len(), 2);
        run(AssemblyArgs {
            file,
            id: "7".to_string(),
        })
        .unwrap();
    }

    #[test]
    fn structures_without_operators_are_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = write(
            &dir,
            "ATOM      1  CA  ALA A   1       1.000   2.000   3.000  1.00 50.00           C\n",
        );
        run(AssemblyArgs {
            file,
            id: "1".to_string(),
        })
        .unwrap();
    }

    #[test]
    fn description_names_chains_and_identity() {
        let identity = SymmetryOperation::identity("1").with_chains(["A", "B"]);
        let text = describe(&identity);
        assert!(text.starts_with("  1 (identity) -> A,B"));

        let flip = SymmetryOperation::new(
            "2",
            Matrix3::from_diagonal(&Vector3::new(-1.0, -1.0, 1.0)),
            Vector3::new(10.0, 0.0, 0.0),
        );
        let text = describe(&flip);
        assert!(text.starts_with("  2 -> all chains"));
        assert!(text.contains("t = (10.000, 0.000, 0.000)"));
    }
}
