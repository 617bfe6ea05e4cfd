//! # Core Models Module
//!
//! Data structures shared by every layer of the engine.
//!
//! ## Key Components
//!
//! - [`atom`] - A single atom as read from a coordinate file
//! - [`structure`] - Parsed structures: ordered models plus retained symmetry records
//! - [`residue`] - Residue grouping, residue classes and per-position type tags
//! - [`frame`] - The canonical per-position frame consumed by the viewer
//! - [`pae`] - Square Predicted Aligned Error matrices
//! - [`ids`] - Slotmap keys for session objects
//!
//! Atoms and structures are plain values produced by the parsers. Frames are derived from
//! them by the engine and are the only representation handed to a renderer.

pub mod atom;
pub mod frame;
pub mod ids;
pub mod pae;
pub mod residue;
pub mod structure;
