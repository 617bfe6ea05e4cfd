use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Scale used when packing PAE values into bytes for the viewer payload.
const BYTE_SCALE: f64 = 8.0;

#[derive(Debug, Error, PartialEq)]
pub enum PaeShapeError {
    #[error("PAE matrix is not square: row {row} has {len} values, expected {expected}")]
    NotSquare {
        row: usize,
        len: usize,
        expected: usize,
    },
    #[error("PAE value buffer has {actual} entries, expected {expected} for size {size}")]
    BufferSize {
        size: usize,
        expected: usize,
        actual: usize,
    },
    #[error("PAE selection index {index} is out of range for size {size}")]
    IndexOutOfRange { index: usize, size: usize },
}

/// A square Predicted Aligned Error matrix stored row-major.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPae")]
pub struct PaeMatrix {
    size: usize,
    values: Vec<f64>,
}

#[derive(Deserialize)]
struct RawPae {
    size: usize,
    values: Vec<f64>,
}

impl TryFrom<RawPae> for PaeMatrix {
    type Error = PaeShapeError;

    fn try_from(raw: RawPae) -> Result<Self, Self::Error> {
        PaeMatrix::new(raw.size, raw.values)
    }
}

impl PaeMatrix {
    pub fn new(size: usize, values: Vec<f64>) -> Result<Self, PaeShapeError> {
        if values.len() != size * size {
            return Err(PaeShapeError::BufferSize {
                size,
                expected: size * size,
                actual: values.len(),
            });
        }
        Ok(Self { size, values })
    }

    /// Builds a matrix from nested rows, rejecting ragged or non-square input.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, PaeShapeError> {
        let size = rows.len();
        let mut values = Vec::with_capacity(size * size);
        for (row, data) in rows.into_iter().enumerate() {
            if data.len() != size {
                return Err(PaeShapeError::NotSquare {
                    row,
                    len: data.len(),
                    expected: size,
                });
            }
            values.extend(data);
        }
        Ok(Self { size, values })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row < self.size && col < self.size {
            Some(self.values[row * self.size + col])
        } else {
            None
        }
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.values.chunks(self.size.max(1)).take(self.size)
    }

    /// Keeps the given rows and columns, in the order given.
    pub fn select(&self, indices: &[usize]) -> Result<Self, PaeShapeError> {
        if let Some(&index) = indices.iter().find(|&&i| i >= self.size) {
            return Err(PaeShapeError::IndexOutOfRange {
                index,
                size: self.size,
            });
        }
        let size = indices.len();
        let mut values = Vec::with_capacity(size * size);
        for &row in indices {
            let base = row * self.size;
            values.extend(indices.iter().map(|&col| self.values[base + col]));
        }
        Ok(Self { size, values })
    }

    /// Keeps rows and columns whose mask entry is `false`.
    ///
    /// The mask must cover the whole matrix.
    pub fn drop_masked(&self, mask: &[bool]) -> Result<Self, PaeShapeError> {
        if mask.len() != self.size {
            return Err(PaeShapeError::BufferSize {
                size: self.size,
                expected: self.size,
                actual: mask.len(),
            });
        }
        let keep: Vec<usize> = mask
            .iter()
            .enumerate()
            .filter(|&(_, &masked)| !masked)
            .map(|(i, _)| i)
            .collect();
        self.select(&keep)
    }

    /// Returns the leading `n × n` block (or a clone when `n >= size`).
    pub fn truncate(&self, n: usize) -> Self {
        if n >= self.size {
            return self.clone();
        }
        let keep: Vec<usize> = (0..n).collect();
        let mut values = Vec::with_capacity(n * n);
        for &row in &keep {
            let base = row * self.size;
            values.extend_from_slice(&self.values[base..base + n]);
        }
        Self { size: n, values }
    }

    /// Packs values as `clamp(round(v * 8), 0, 255)`, the compact encoding sent to the viewer.
    pub fn to_scaled_bytes(&self) -> Vec<u8> {
        self.values
            .iter()
            .map(|v| {
                let scaled = (v * BYTE_SCALE).round();
                if scaled.is_nan() {
                    0
                } else {
                    scaled.clamp(0.0, 255.0) as u8
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn indexed(n: usize) -> PaeMatrix {
        // value encodes (row, col) as row * 10 + col
        let rows = (0..n)
            .map(|r| (0..n).map(|c| (r * 10 + c) as f64).collect())
            .collect();
        PaeMatrix::from_rows(rows).unwrap()
    }

    #[test]
    fn from_rows_rejects_ragged_input() {
        let err = PaeMatrix::from_rows(vec![vec![0.0, 1.0], vec![2.0]]).unwrap_err();
        assert_eq!(
            err,
            PaeShapeError::NotSquare {
                row: 1,
                len: 1,
                expected: 2
            }
        );
    }

    #[test]
    fn new_validates_buffer_length() {
        assert!(PaeMatrix::new(2, vec![0.0; 4]).is_ok());
        assert!(matches!(
            PaeMatrix::new(2, vec![0.0; 3]),
            Err(PaeShapeError::BufferSize { .. })
        ));
    }

    #[test]
    fn drop_masked_keeps_surviving_pairs_in_order() {
        let pae = indexed(4);
        let filtered = pae.drop_masked(&[false, true, false, false]).unwrap();

        assert_eq!(filtered.size(), 3);
        assert_eq!(filtered.get(0, 0), Some(0.0));
        assert_eq!(filtered.get(0, 1), Some(2.0));
        assert_eq!(filtered.get(1, 2), Some(23.0));
        assert_eq!(filtered.get(2, 0), Some(30.0));
    }

    #[test]
    fn select_rejects_out_of_range_indices() {
        let pae = indexed(2);
        assert_eq!(
            pae.select(&[0, 2]).unwrap_err(),
            PaeShapeError::IndexOutOfRange { index: 2, size: 2 }
        );
    }

    #[test]
    fn truncate_returns_leading_block() {
        let pae = indexed(4);
        let truncated = pae.truncate(2);
        assert_eq!(truncated.size(), 2);
        assert_eq!(truncated.values(), &[0.0, 1.0, 10.0, 11.0]);
        assert_eq!(pae.truncate(10), pae);
    }

    #[test]
    fn rows_iterates_each_row() {
        let pae = indexed(3);
        let rows: Vec<&[f64]> = pae.rows().collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[2], &[20.0, 21.0, 22.0]);
    }

    #[test]
    fn scaled_bytes_round_and_clamp() {
        let pae = PaeMatrix::new(2, vec![0.06, 1.0, 31.9, 40.0]).unwrap();
        assert_eq!(pae.to_scaled_bytes(), vec![0, 8, 255, 255]);

        let negative = PaeMatrix::new(1, vec![-3.0]).unwrap();
        assert_eq!(negative.to_scaled_bytes(), vec![0]);
    }
}
