use super::pae::PaeMatrix;
use super::residue::PositionType;
use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FrameError {
    #[error("Frame field '{field}' has {actual} entries, expected {expected}")]
    LengthMismatch {
        field: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("PAE matrix has dimension {actual}, but the frame has {expected} positions")]
    PaeDimension { expected: usize, actual: usize },
}

/// One rendered sample: a residue's representative atom or a single ligand heavy atom.
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub coord: Point3<f64>,
    pub chain: String,
    pub position_type: PositionType,
    pub confidence: f64,
    pub name: String,
    pub residue_number: isize,
}

/// Unvalidated frame columns, used to build a [`Frame`] and as its wire form.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FrameParts {
    pub coords: Vec<Point3<f64>>,
    pub chains: Vec<String>,
    pub position_types: Vec<PositionType>,
    pub confidences: Vec<f64>,
    pub position_names: Vec<String>,
    pub residue_numbers: Vec<isize>,
    #[serde(default)]
    pub pae: Option<PaeMatrix>,
}

/// A single snapshot of an object in the viewer's canonical layout.
///
/// All per-position columns have the same length, and an attached PAE matrix has exactly
/// that dimension. Every constructor and mutator checks this, so a `Frame` value is always
/// consistent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "FrameParts")]
pub struct Frame {
    coords: Vec<Point3<f64>>,
    chains: Vec<String>,
    position_types: Vec<PositionType>,
    confidences: Vec<f64>,
    position_names: Vec<String>,
    residue_numbers: Vec<isize>,
    pae: Option<PaeMatrix>,
}

impl TryFrom<FrameParts> for Frame {
    type Error = FrameError;

    fn try_from(parts: FrameParts) -> Result<Self, Self::Error> {
        let expected = parts.coords.len();
        let check = |field: &'static str, actual: usize| {
            if actual == expected {
                Ok(())
            } else {
                Err(FrameError::LengthMismatch {
                    field,
                    expected,
                    actual,
                })
            }
        };
        check("chains", parts.chains.len())?;
        check("position_types", parts.position_types.len())?;
        check("confidences", parts.confidences.len())?;
        check("position_names", parts.position_names.len())?;
        check("residue_numbers", parts.residue_numbers.len())?;

        let mut frame = Frame {
            coords: parts.coords,
            chains: parts.chains,
            position_types: parts.position_types,
            confidences: parts.confidences,
            position_names: parts.position_names,
            residue_numbers: parts.residue_numbers,
            pae: None,
        };
        frame.set_pae(parts.pae)?;
        Ok(frame)
    }
}

impl Frame {
    pub fn from_parts(parts: FrameParts) -> Result<Self, FrameError> {
        Self::try_from(parts)
    }

    /// Builds a frame without PAE; position lists are consistent by construction.
    pub fn from_positions(positions: impl IntoIterator<Item = Position>) -> Self {
        let mut frame = Frame {
            coords: Vec::new(),
            chains: Vec::new(),
            position_types: Vec::new(),
            confidences: Vec::new(),
            position_names: Vec::new(),
            residue_numbers: Vec::new(),
            pae: None,
        };
        for p in positions {
            frame.coords.push(p.coord);
            frame.chains.push(p.chain);
            frame.position_types.push(p.position_type);
            frame.confidences.push(p.confidence);
            frame.position_names.push(p.name);
            frame.residue_numbers.push(p.residue_number);
        }
        frame
    }

    pub fn len(&self) -> usize {
        self.coords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    pub fn coords(&self) -> &[Point3<f64>] {
        &self.coords
    }

    pub fn chains(&self) -> &[String] {
        &self.chains
    }

    pub fn position_types(&self) -> &[PositionType] {
        &self.position_types
    }

    pub fn confidences(&self) -> &[f64] {
        &self.confidences
    }

    pub fn position_names(&self) -> &[String] {
        &self.position_names
    }

    pub fn residue_numbers(&self) -> &[isize] {
        &self.residue_numbers
    }

    pub fn pae(&self) -> Option<&PaeMatrix> {
        self.pae.as_ref()
    }

    pub fn position(&self, index: usize) -> Option<Position> {
        Some(Position {
            coord: *self.coords.get(index)?,
            chain: self.chains[index].clone(),
            position_type: self.position_types[index],
            confidence: self.confidences[index],
            name: self.position_names[index].clone(),
            residue_number: self.residue_numbers[index],
        })
    }

    /// Attaches (or clears) the PAE matrix, rejecting a dimension mismatch.
    pub fn set_pae(&mut self, pae: Option<PaeMatrix>) -> Result<(), FrameError> {
        if let Some(matrix) = &pae {
            if matrix.size() != self.len() {
                return Err(FrameError::PaeDimension {
                    expected: self.len(),
                    actual: matrix.size(),
                });
            }
        }
        self.pae = pae;
        Ok(())
    }

    pub fn take_pae(&mut self) -> Option<PaeMatrix> {
        self.pae.take()
    }

    /// Replaces all coordinates (e.g. after superposition), keeping every other column.
    pub fn set_coords(&mut self, coords: Vec<Point3<f64>>) -> Result<(), FrameError> {
        if coords.len() != self.len() {
            return Err(FrameError::LengthMismatch {
                field: "coords",
                expected: self.len(),
                actual: coords.len(),
            });
        }
        self.coords = coords;
        Ok(())
    }

    /// `true` for each ligand position.
    pub fn ligand_mask(&self) -> Vec<bool> {
        self.position_types.iter().map(|t| t.is_ligand()).collect()
    }

    /// Returns a new frame with only the given positions, in the given order.
    ///
    /// The PAE matrix is not carried over; callers re-index it explicitly.
    pub fn select(&self, indices: &[usize]) -> Frame {
        Frame::from_positions(indices.iter().filter_map(|&i| self.position(i)))
    }

    /// Indices of polymer positions, optionally restricted to one chain.
    pub fn polymer_indices(&self, chain: Option<&str>) -> Vec<usize> {
        self.position_types
            .iter()
            .zip(&self.chains)
            .enumerate()
            .filter(|(_, (t, c))| !t.is_ligand() && chain.is_none_or(|want| c.as_str() == want))
            .map(|(i, _)| i)
            .collect()
    }

    /// Indices of positions whose chain is in `chains`.
    pub fn chain_indices(&self, chains: &[String]) -> Vec<usize> {
        self.chains
            .iter()
            .enumerate()
            .filter(|(_, c)| chains.contains(c))
            .map(|(i, _)| i)
            .collect()
    }

    pub fn coords_at(&self, indices: &[usize]) -> Vec<Point3<f64>> {
        indices.iter().filter_map(|&i| self.coords.get(i).copied()).collect()
    }
}
