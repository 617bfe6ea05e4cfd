//! Rigid superposition of paired point sets (Kabsch algorithm).
//!
//! The fit is computed on a subset of the mobile coordinates and then applied to the
//! full mobile set, which is how trajectory frames are brought onto their first frame.

use super::rotation::sorted_svd;
use crate::core::utils::geometry::{calculate_rmsd, centroid};
use nalgebra::{Matrix3, Point3, Vector3};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AlignError {
    #[error("Subset sizes differ: {mobile} mobile vs {target} target points")]
    LengthMismatch { mobile: usize, target: usize },
    #[error("Cannot superpose empty point sets")]
    Empty,
    #[error("Singular value decomposition failed")]
    SvdFailed,
}

/// Optimal rigid transform `x' = R·x + t` mapping the mobile subset onto the target.
#[derive(Debug, Clone, PartialEq)]
pub struct Superposition {
    pub rotation: Matrix3<f64>,
    pub translation: Vector3<f64>,
    /// RMSD between the transformed mobile subset and the target subset.
    pub rmsd: f64,
}

impl Superposition {
    pub fn apply(&self, point: &Point3<f64>) -> Point3<f64> {
        Point3::from(self.rotation * point.coords + self.translation)
    }

    pub fn apply_all(&self, points: &[Point3<f64>]) -> Vec<Point3<f64>> {
        points.iter().map(|p| self.apply(p)).collect()
    }
}

/// Computes the least-squares proper rotation and translation taking `mobile` onto
/// `target`, pairing points by index.
pub fn superpose(
    mobile: &[Point3<f64>],
    target: &[Point3<f64>],
) -> Result<Superposition, AlignError> {
    if mobile.len() != target.len() {
        return Err(AlignError::LengthMismatch {
            mobile: mobile.len(),
            target: target.len(),
        });
    }
    let (Some(mobile_center), Some(target_center)) = (centroid(mobile), centroid(target)) else {
        return Err(AlignError::Empty);
    };

    // H = Σ aᵢ·bᵢᵀ over centered pairs.
    let h = mobile
        .iter()
        .zip(target)
        .fold(Matrix3::zeros(), |acc, (a, b)| {
            acc + (a - mobile_center) * (b - target_center).transpose()
        });

    let (u, _, v) = sorted_svd(&h).ok_or(AlignError::SvdFailed)?;
    let d = (u * v.transpose()).determinant().signum();
    let correction = Matrix3::from_diagonal(&Vector3::new(1.0, 1.0, d));

    // Row-vector rotation a·R with R = U·D·Vᵀ, expressed for column vectors as Rᵀ.
    let rotation = (u * correction * v.transpose()).transpose();
    let translation = target_center.coords - rotation * mobile_center.coords;

    let mut superposition = Superposition {
        rotation,
        translation,
        rmsd: 0.0,
    };
    let fitted = superposition.apply_all(mobile);
    superposition.rmsd = calculate_rmsd(&fitted, target).unwrap_or(0.0);
    Ok(superposition)
}

/// Superposes `full` using the transform fitted from `mobile_subset` onto `target_subset`.
///
/// `mobile_subset` is normally a selection of `full` (e.g. Cα positions of one chain);
/// every point of `full` receives the same rigid transform.
pub fn align_a_to_b(
    full: &[Point3<f64>],
    mobile_subset: &[Point3<f64>],
    target_subset: &[Point3<f64>],
) -> Result<(Vec<Point3<f64>>, Superposition), AlignError> {
    let superposition = superpose(mobile_subset, target_subset)?;
    Ok((superposition.apply_all(full), superposition))
}
