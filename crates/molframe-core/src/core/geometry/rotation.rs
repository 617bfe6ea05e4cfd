use nalgebra::{Matrix3, Vector3};

/// Singular value decomposition of a 3×3 matrix with singular values in decreasing order.
///
/// Returns `(U, S, V)` with `M = U · diag(S) · Vᵀ`, or `None` if the decomposition did
/// not produce both singular-vector matrices.
pub fn sorted_svd(m: &Matrix3<f64>) -> Option<(Matrix3<f64>, Vector3<f64>, Matrix3<f64>)> {
    let svd = m.svd(true, true);
    let (u, v_t) = (svd.u?, svd.v_t?);
    let s = svd.singular_values;
    if s.iter().any(|x| !x.is_finite()) {
        return None;
    }

    let mut order = [0usize, 1, 2];
    order.sort_by(|&a, &b| s[b].total_cmp(&s[a]));

    let v = v_t.transpose();
    let mut u_sorted = Matrix3::zeros();
    let mut v_sorted = Matrix3::zeros();
    let mut s_sorted = Vector3::zeros();
    for (dst, &src) in order.iter().enumerate() {
        u_sorted.set_column(dst, &u.column(src));
        v_sorted.set_column(dst, &v.column(src));
        s_sorted[dst] = s[src];
    }
    Some((u_sorted, s_sorted, v_sorted))
}

/// Angle of the relative rotation `aᵀ·b`, in radians within `[0, π]`.
pub fn geodesic_angle(a: &Matrix3<f64>, b: &Matrix3<f64>) -> f64 {
    let cos = ((a.transpose() * b).trace() - 1.0) / 2.0;
    cos.clamp(-1.0, 1.0).acos()
}

/// In-plane rotation about the z axis.
pub fn rotation_z(theta: f64) -> Matrix3<f64> {
    let (s, c) = theta.sin_cos();
    Matrix3::new(c, -s, 0.0, s, c, 0.0, 0.0, 0.0, 1.0)
}

/// Re-orthonormalizes a near-rotation by Gram-Schmidt on its columns.
///
/// Column 0 is normalized, column 1 loses its projection on column 0 and is normalized,
/// and column 2 is their cross product, so the result is always right-handed. Degenerate
/// input falls back to the identity.
pub fn orthonormalize(m: &Matrix3<f64>) -> Matrix3<f64> {
    let c0: Vector3<f64> = m.column(0).into_owned();
    let c1: Vector3<f64> = m.column(1).into_owned();

    let Some(x) = c0.try_normalize(f64::EPSILON) else {
        return Matrix3::identity();
    };
    let Some(y) = (c1 - x * x.dot(&c1)).try_normalize(f64::EPSILON) else {
        return Matrix3::identity();
    };
    let z = x.cross(&y);
    Matrix3::from_columns(&[x, y, z])
}

pub fn is_proper_rotation(m: &Matrix3<f64>, tolerance: f64) -> bool {
    let orthogonality = (m.transpose() * m - Matrix3::identity()).abs().max();
    orthogonality < tolerance && (m.determinant() - 1.0).abs() < tolerance
}
