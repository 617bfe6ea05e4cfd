//! Continuity-preserving "best view" rotation.
//!
//! Rotations here use the row-vector view convention `view = (x - center) · R`, so the
//! third column of `R` is the depth axis. The solver puts the cloud's minimum-variance
//! principal axis there and, among the admissible in-plane spins and axis signs, returns
//! the rotation nearest to the current camera.

use super::rotation::{geodesic_angle, rotation_z, sorted_svd};
use crate::core::utils::geometry::{centroid, covariance, max_distance_from};
use nalgebra::{Matrix2, Matrix3, Point3};
use thiserror::Error;

const SIGN_PATTERNS: [(f64, f64); 4] = [(1.0, 1.0), (1.0, -1.0), (-1.0, 1.0), (-1.0, -1.0)];
const DEGENERATE_BLOCK: f64 = 1e-12;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum OrientationError {
    #[error("Cannot orient an empty coordinate set")]
    EmptyCoordinates,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateKind {
    /// `V · Qz`: spin about the cloud's own depth axis.
    PostYaw,
    /// `Qz · V`: spin applied in world space before the principal basis.
    PreYaw,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewCandidate {
    pub rotation: Matrix3<f64>,
    pub angle: f64,
    pub kind: CandidateKind,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BestView {
    pub rotation: Matrix3<f64>,
    pub center: Point3<f64>,
    /// Largest distance of any point from `center`.
    pub extent: f64,
    /// Geodesic angle between the current camera and `rotation`, in radians.
    pub angle: f64,
}

/// Principal axes of the centered cloud as columns, by decreasing variance, det = +1.
///
/// Falls back to the identity when the decomposition fails.
pub fn principal_axes(points: &[Point3<f64>], center: &Point3<f64>) -> Matrix3<f64> {
    let cov = covariance(points, center);
    let mut v = match sorted_svd(&cov) {
        Some((_, _, v)) => v,
        None => return Matrix3::identity(),
    };
    if v.determinant() < 0.0 {
        v.column_mut(2).neg_mut();
    }
    v
}

/// Rotation angle of the in-plane rotation closest to the 2×2 block `b`.
///
/// This is the rotation factor of the block's polar decomposition, which maximises
/// `trace(Qᵀ·b)`. A vanishing block leaves the plane unrotated.
fn polar_angle(b: &Matrix2<f64>) -> f64 {
    let (sin, cos) = (b[(1, 0)] - b[(0, 1)], b[(0, 0)] + b[(1, 1)]);
    if sin.abs() < DEGENERATE_BLOCK && cos.abs() < DEGENERATE_BLOCK {
        0.0
    } else {
        sin.atan2(cos)
    }
}

fn leading_block(m: &Matrix3<f64>) -> Matrix2<f64> {
    m.fixed_view::<2, 2>(0, 0).into_owned()
}

/// Enumerates the eight candidate view rotations for a principal basis, scored against
/// `current`. Enumeration order is sign pattern first, post-yaw before pre-yaw.
pub fn candidates_for_basis(basis: &Matrix3<f64>, current: &Matrix3<f64>) -> Vec<ViewCandidate> {
    let mut out = Vec::with_capacity(SIGN_PATTERNS.len() * 2);
    for (s1, s2) in SIGN_PATTERNS {
        let mut v = *basis;
        v.column_mut(0).scale_mut(s1);
        v.column_mut(1).scale_mut(s2);
        v.column_mut(2).scale_mut(s1 * s2);

        let post = v * rotation_z(polar_angle(&leading_block(&(v.transpose() * current))));
        let pre = rotation_z(polar_angle(&leading_block(&(current * v.transpose())))) * v;

        for (rotation, kind) in [(post, CandidateKind::PostYaw), (pre, CandidateKind::PreYaw)] {
            out.push(ViewCandidate {
                angle: geodesic_angle(current, &rotation),
                rotation,
                kind,
            });
        }
    }
    out
}

/// Scores every candidate view for `points` against `current`.
pub fn view_candidates(
    points: &[Point3<f64>],
    current: &Matrix3<f64>,
) -> Result<Vec<ViewCandidate>, OrientationError> {
    let center = centroid(points).ok_or(OrientationError::EmptyCoordinates)?;
    Ok(candidates_for_basis(&principal_axes(points, &center), current))
}

/// Solves for the best view of `points` given the current camera rotation.
///
/// The first minimum-angle candidate wins, so ties resolve deterministically.
pub fn best_view(
    points: &[Point3<f64>],
    current: &Matrix3<f64>,
) -> Result<BestView, OrientationError> {
    let center = centroid(points).ok_or(OrientationError::EmptyCoordinates)?;
    let candidates = candidates_for_basis(&principal_axes(points, &center), current);

    let best = candidates
        .into_iter()
        .reduce(|best, next| if next.angle < best.angle { next } else { best })
        .ok_or(OrientationError::EmptyCoordinates)?;

    Ok(BestView {
        rotation: best.rotation,
        center,
        extent: max_distance_from(points, &center),
        angle: best.angle,
    })
}
