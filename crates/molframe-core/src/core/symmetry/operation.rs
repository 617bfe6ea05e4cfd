use crate::core::models::atom::Atom;
use nalgebra::{Matrix3, Point3, Vector3};
use std::collections::{BTreeSet, HashMap};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

const IDENTITY_TOLERANCE: f64 = 1e-6;
const DEDUP_SCALE: f64 = 1e6;

/// A rigid transform `x' = R·x + t` applied to a set of chains.
#[derive(Debug, Clone, PartialEq)]
pub struct SymmetryOperation {
    /// Operator id; composite operators join their factor ids with `x`.
    pub id: String,
    pub rotation: Matrix3<f64>,
    pub translation: Vector3<f64>,
    /// Asym ids the operator applies to. Empty means every chain.
    pub chains: BTreeSet<String>,
}

impl SymmetryOperation {
    pub fn new(id: &str, rotation: Matrix3<f64>, translation: Vector3<f64>) -> Self {
        Self {
            id: id.to_string(),
            rotation,
            translation,
            chains: BTreeSet::new(),
        }
    }

    pub fn identity(id: &str) -> Self {
        Self::new(id, Matrix3::identity(), Vector3::zeros())
    }

    pub fn with_chains<I, S>(mut self, chains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.chains = chains.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_identity(&self) -> bool {
        (self.rotation - Matrix3::identity()).abs().max() < IDENTITY_TOLERANCE
            && self.translation.abs().max() < IDENTITY_TOLERANCE
    }

    /// `self ∘ other`: the result applies `other` first, then `self`.
    pub fn compose(&self, other: &SymmetryOperation) -> SymmetryOperation {
        SymmetryOperation {
            id: format!("{}x{}", self.id, other.id),
            rotation: self.rotation * other.rotation,
            translation: self.rotation * other.translation + self.translation,
            chains: self.chains.clone(),
        }
    }

    pub fn apply(&self, point: &Point3<f64>) -> Point3<f64> {
        Point3::from(self.rotation * point.coords + self.translation)
    }

    pub fn applies_to(&self, asym_id: &str) -> bool {
        self.chains.is_empty() || self.chains.contains(asym_id)
    }

    fn dedup_key(&self) -> [i64; 12] {
        let mut key = [0i64; 12];
        let values = self.rotation.iter().chain(self.translation.iter());
        for (slot, value) in key.iter_mut().zip(values) {
            *slot = (value * DEDUP_SCALE).round() as i64;
        }
        key
    }
}

/// Composes a sequence of operators left to right (`acc = acc ∘ T`).
///
/// The rightmost operator is therefore applied to coordinates first. Returns `None` for
/// an empty sequence.
pub fn compose_sequence<'a, I>(operators: I) -> Option<SymmetryOperation>
where
    I: IntoIterator<Item = &'a SymmetryOperation>,
{
    let mut iter = operators.into_iter();
    let first = iter.next()?.clone();
    Some(iter.fold(first, |acc, op| acc.compose(op)))
}

/// Removes operations whose transforms agree to six decimal places.
///
/// The first occurrence keeps its position and id; chain sets of merged duplicates are
/// unioned, and an empty set (all chains) absorbs any other.
pub fn dedupe_operations(operations: Vec<SymmetryOperation>) -> Vec<SymmetryOperation> {
    let mut seen: HashMap<[i64; 12], usize> = HashMap::new();
    let mut unique: Vec<SymmetryOperation> = Vec::with_capacity(operations.len());

    for op in operations {
        match seen.get(&op.dedup_key()) {
            Some(&idx) => {
                let kept = &mut unique[idx];
                if kept.chains.is_empty() || op.chains.is_empty() {
                    kept.chains.clear();
                } else {
                    kept.chains.extend(op.chains);
                }
            }
            None => {
                seen.insert(op.dedup_key(), unique.len());
                unique.push(op);
            }
        }
    }
    unique
}

fn transform_atoms(atoms: &[Atom], op: &SymmetryOperation) -> Vec<Atom> {
    let identity = op.is_identity();
    atoms
        .iter()
        .filter(|atom| op.applies_to(&atom.asym_id))
        .map(|atom| {
            let mut copy = atom.clone();
            copy.position = op.apply(&atom.position);
            if !identity {
                copy.chain_id = format!("{}|{}", atom.chain_id, op.id);
                copy.asym_id = format!("{}|{}", atom.asym_id, op.id);
            }
            copy
        })
        .collect()
}

/// Applies every operation to the atoms it selects, concatenating results in operation
/// order.
///
/// Copies made by non-identity operators get chain ids of the form `A|2`.
pub fn apply_operations(atoms: &[Atom], operations: &[SymmetryOperation]) -> Vec<Atom> {
    #[cfg(feature = "parallel")]
    let per_op: Vec<Vec<Atom>> = operations
        .par_iter()
        .map(|op| transform_atoms(atoms, op))
        .collect();

    #[cfg(not(feature = "parallel"))]
    let per_op: Vec<Vec<Atom>> = operations
        .iter()
        .map(|op| transform_atoms(atoms, op))
        .collect();

    per_op.into_iter().flatten().collect()
}
