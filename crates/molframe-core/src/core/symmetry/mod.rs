//! Biological-assembly reconstruction.
//!
//! Operator tables (mmCIF `_pdbx_struct_oper_list` / `_pdbx_struct_assembly_gen`, or PDB
//! `REMARK 350 BIOMT` records) are turned into a deduplicated list of
//! [`operation::SymmetryOperation`]s and applied to the first model.

pub mod builder;
pub mod expression;
pub mod operation;

pub use builder::{Assembly, DEFAULT_ASSEMBLY_ID, build_assembly, build_operations};
pub use expression::{ExpressionError, expand_expression};
pub use operation::SymmetryOperation;
