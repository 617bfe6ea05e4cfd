use nalgebra::{Matrix3, Point3, Vector3};

/// Arithmetic mean of a point set; `None` when empty.
pub fn centroid(points: &[Point3<f64>]) -> Option<Point3<f64>> {
    if points.is_empty() {
        return None;
    }
    let sum = points
        .iter()
        .fold(Vector3::zeros(), |acc, p| acc + p.coords);
    Some(Point3::from(sum / points.len() as f64))
}

pub fn calculate_rmsd(coords1: &[Point3<f64>], coords2: &[Point3<f64>]) -> Option<f64> {
    if coords1.len() != coords2.len() || coords1.is_empty() {
        return None;
    }
    let n = coords1.len() as f64;
    let squared_dist_sum: f64 = coords1
        .iter()
        .zip(coords2.iter())
        .map(|(p1, p2)| (p1 - p2).norm_squared())
        .sum();
    Some((squared_dist_sum / n).sqrt())
}

/// Largest distance from `center` to any point (0 for an empty set).
pub fn max_distance_from(points: &[Point3<f64>], center: &Point3<f64>) -> f64 {
    points
        .iter()
        .map(|p| (p - center).norm())
        .fold(0.0, f64::max)
}

/// Population covariance of `points` about `center`.
pub fn covariance(points: &[Point3<f64>], center: &Point3<f64>) -> Matrix3<f64> {
    if points.is_empty() {
        return Matrix3::zeros();
    }
    let sum = points.iter().fold(Matrix3::zeros(), |acc, p| {
        let d = p - center;
        acc + d * d.transpose()
    });
    sum / points.len() as f64
}
