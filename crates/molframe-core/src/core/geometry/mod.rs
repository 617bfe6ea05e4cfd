//! Pure rigid-body geometry: superposition, best-view orientation and rotation helpers.

pub mod kabsch;
pub mod orientation;
pub mod rotation;

pub use kabsch::{AlignError, Superposition, align_a_to_b, superpose};
pub use orientation::{BestView, OrientationError, best_view};
