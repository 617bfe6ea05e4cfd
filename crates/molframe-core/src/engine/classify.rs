use crate::core::models::atom::{Atom, RecordKind};
use crate::core::models::residue::{Residue, ResidueClass, ResidueKey};
use crate::core::topology::ResidueDictionary;
use crate::core::utils::identifiers::PEPTIDE_BACKBONE_ATOM_NAMES;
use std::collections::HashMap;

/// Groups atoms into residues in first-appearance order.
///
/// Water is skipped, and only the first alternate location of each atom name is kept.
pub fn group_residues(atoms: &[Atom], dictionary: &ResidueDictionary) -> Vec<Residue> {
    let mut residues: Vec<Residue> = Vec::new();
    let mut index: HashMap<ResidueKey, usize> = HashMap::new();

    for atom in atoms {
        if dictionary.is_water(&atom.res_name) {
            continue;
        }
        let key = ResidueKey::of(atom);
        let slot = *index.entry(key.clone()).or_insert_with(|| {
            residues.push(Residue::new(key, atom.record));
            residues.len() - 1
        });
        residues[slot].add_atom(atom.clone());
    }
    residues
}

/// Decides whether each residue is protein, RNA, DNA or ligand.
pub struct ResidueClassifier<'a> {
    dictionary: &'a ResidueDictionary,
    connectivity_check: bool,
    peptide_bond_cutoff: f64,
}

impl<'a> ResidueClassifier<'a> {
    pub fn new(
        dictionary: &'a ResidueDictionary,
        connectivity_check: bool,
        peptide_bond_cutoff: f64,
    ) -> Self {
        Self {
            dictionary,
            connectivity_check,
            peptide_bond_cutoff,
        }
    }

    /// Classifies `residues`, which must be in chain order so neighbours can be checked.
    pub fn classify(&self, residues: &[Residue]) -> Vec<ResidueClass> {
        (0..residues.len())
            .map(|i| self.classify_at(residues, i))
            .collect()
    }

    fn classify_at(&self, residues: &[Residue], i: usize) -> ResidueClass {
        let residue = &residues[i];
        let name = residue.name();

        if self.dictionary.is_standard_amino_acid(name) {
            return ResidueClass::Protein;
        }
        if self.dictionary.amino_acid_parent(name).is_some() {
            let as_polymer = residue.record == RecordKind::Atom || self.is_connected(residues, i);
            return if as_polymer {
                ResidueClass::Protein
            } else {
                ResidueClass::Ligand
            };
        }
        if let Some(class) = self.dictionary.nucleotide_class(name) {
            return class;
        }
        if residue.record == RecordKind::Atom
            && PEPTIDE_BACKBONE_ATOM_NAMES.iter().all(|n| residue.has_atom(n))
            && self.is_connected(residues, i)
        {
            return ResidueClass::Protein;
        }
        ResidueClass::Ligand
    }

    /// Peptide-bonded to the previous or next residue of the same chain.
    ///
    /// Always `true` when the check is disabled.
    fn is_connected(&self, residues: &[Residue], i: usize) -> bool {
        if !self.connectivity_check {
            return true;
        }
        let current = &residues[i];
        let previous = i
            .checked_sub(1)
            .and_then(|p| residues.get(p))
            .filter(|r| r.chain_id() == current.chain_id());
        let next = residues
            .get(i + 1)
            .filter(|r| r.chain_id() == current.chain_id());

        previous.is_some_and(|prev| self.peptide_bonded(prev, current))
            || next.is_some_and(|next| self.peptide_bonded(current, next))
    }

    fn peptide_bonded(&self, first: &Residue, second: &Residue) -> bool {
        match (first.atom("C"), second.atom("N")) {
            (Some(c), Some(n)) => (c.position - n.position).norm() <= self.peptide_bond_cutoff,
            _ => false,
        }
    }
}
