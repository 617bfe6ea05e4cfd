pub mod geometry;
pub mod identifiers;
