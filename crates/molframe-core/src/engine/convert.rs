use super::classify::{ResidueClassifier, group_residues};
use super::config::LoadConfig;
use crate::core::models::atom::Atom;
use crate::core::models::frame::{Frame, Position};
use crate::core::models::pae::{PaeMatrix, PaeShapeError};
use crate::core::models::residue::{Residue, ResidueClass};
use crate::core::utils::identifiers::{PROTEIN_REPRESENTATIVE_ATOM, is_nucleotide_representative};
use tracing::{debug, warn};

/// What happened to the PAE matrix offered alongside a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaeOutcome {
    Absent,
    Attached,
    /// The matrix could not be re-indexed or its final dimension did not match the
    /// frame; it was discarded.
    Dropped { positions: usize, pae_size: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    pub frame: Frame,
    pub pae: PaeOutcome,
}

/// Re-indexes a PAE matrix after ligand positions are removed from a frame.
///
/// `ligand_mask` covers the unfiltered positions. A matrix of the same size loses the
/// masked rows and columns. A smaller matrix is taken to exclude ligands already when no
/// ligand falls inside its index range, and otherwise loses the masked rows within that
/// range. A larger matrix is first cut down to the unfiltered position count.
pub fn filter_ligand_pae(
    pae: &PaeMatrix,
    ligand_mask: &[bool],
) -> Result<PaeMatrix, PaeShapeError> {
    let total = ligand_mask.len();
    let size = pae.size();
    if size == total {
        pae.drop_masked(ligand_mask)
    } else if size < total {
        let covered = &ligand_mask[..size];
        if covered.contains(&true) {
            pae.drop_masked(covered)
        } else {
            Ok(pae.clone())
        }
    } else {
        pae.truncate(total).drop_masked(ligand_mask)
    }
}

/// Turns the atoms of one model into a [`Frame`] according to a [`LoadConfig`].
pub struct FrameConverter<'a> {
    config: &'a LoadConfig,
}

impl<'a> FrameConverter<'a> {
    pub fn new(config: &'a LoadConfig) -> Self {
        Self { config }
    }

    /// Residues of the selected chains, grouped and with water removed.
    pub fn residues(&self, atoms: &[Atom]) -> Vec<Residue> {
        let mut residues = group_residues(atoms, &self.config.dictionary);
        if let Some(chains) = &self.config.chains {
            residues.retain(|r| chains.iter().any(|c| c == r.chain_id()));
        }
        residues
    }

    /// Every position of the model, ligands included.
    pub fn positions(&self, atoms: &[Atom]) -> Frame {
        let residues = self.residues(atoms);
        let classifier = ResidueClassifier::new(
            &self.config.dictionary,
            self.config.connectivity_check,
            self.config.peptide_bond_cutoff,
        );
        let classes = classifier.classify(&residues);

        let positions = residues
            .iter()
            .zip(classes)
            .flat_map(|(residue, class)| residue_positions(residue, class));
        Frame::from_positions(positions)
    }

    /// Converts one model, applying the ligand policy to both positions and PAE.
    pub fn convert(&self, atoms: &[Atom], pae: Option<PaeMatrix>) -> Conversion {
        let unfiltered = self.positions(atoms);

        let (mut frame, pae) = if self.config.load_ligands {
            (unfiltered, pae.map(Ok))
        } else {
            let mask = unfiltered.ligand_mask();
            let kept: Vec<usize> = (0..mask.len()).filter(|&i| !mask[i]).collect();
            let filtered_pae = pae.map(|m| {
                filter_ligand_pae(&m, &mask).map_err(|e| {
                    warn!("Could not re-index PAE without ligands: {}", e);
                    m.size()
                })
            });
            debug!(
                "Dropped {} ligand position(s) of {}",
                mask.len() - kept.len(),
                mask.len()
            );
            (unfiltered.select(&kept), filtered_pae)
        };

        let outcome = attach_pae(&mut frame, pae);
        Conversion {
            frame,
            pae: outcome,
        }
    }
}

/// Attaches a PAE matrix to a finished frame. `Err` carries the size of a matrix that
/// could not be re-indexed.
fn attach_pae(frame: &mut Frame, pae: Option<Result<PaeMatrix, usize>>) -> PaeOutcome {
    let matrix = match pae {
        None => return PaeOutcome::Absent,
        Some(Err(pae_size)) => {
            return PaeOutcome::Dropped {
                positions: frame.len(),
                pae_size,
            };
        }
        Some(Ok(matrix)) => matrix,
    };
    let pae_size = matrix.size();
    match frame.set_pae(Some(matrix)) {
        Ok(()) => PaeOutcome::Attached,
        Err(_) => {
            warn!(
                "PAE dimension {} does not match {} position(s); PAE dropped",
                pae_size,
                frame.len()
            );
            PaeOutcome::Dropped {
                positions: frame.len(),
                pae_size,
            }
        }
    }
}

fn position_from(atom: &Atom, class: ResidueClass) -> Position {
    Position {
        coord: atom.position,
        chain: atom.chain_id.clone(),
        position_type: class.position_type(),
        confidence: atom.b_factor,
        name: atom.res_name.clone(),
        residue_number: atom.res_seq,
    }
}

fn residue_positions(residue: &Residue, class: ResidueClass) -> Vec<Position> {
    match class {
        ResidueClass::Protein => residue
            .atom(PROTEIN_REPRESENTATIVE_ATOM)
            .map(|a| position_from(a, class))
            .into_iter()
            .collect(),
        ResidueClass::Rna | ResidueClass::Dna => residue
            .atoms()
            .iter()
            .find(|a| is_nucleotide_representative(&a.name))
            .map(|a| position_from(a, class))
            .into_iter()
            .collect(),
        ResidueClass::Ligand => residue
            .atoms()
            .iter()
            .filter(|a| !a.is_hydrogen())
            .map(|a| position_from(a, class))
            .collect(),
    }
}
