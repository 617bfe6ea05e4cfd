//! # molframe Core Library
//!
//! The structural-geometry engine behind a browser-based macromolecular viewer. It turns
//! PDB/mmCIF text into canonical per-residue frames with confidence overlays, rebuilds
//! biological assemblies from symmetry operators, superposes trajectory frames and solves
//! for a continuity-preserving "best view" camera rotation.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer architecture:
//!
//! - **[`core`]: The Foundation.** Stateless data models (`Atom`, `Frame`, `PaeMatrix`),
//!   file parsers, residue-name dictionaries and pure geometry (symmetry expansion, Kabsch
//!   superposition, the orientation solver).
//!
//! - **[`engine`]: The Logic Core.** Configuration, errors, progress reporting, residue
//!   classification and frame conversion, plus the stateful pieces: the camera, the
//!   animation state machine and the [`engine::session::Session`] context object that owns
//!   loaded objects.
//!
//! - **[`workflows`]: The Public API.** High-level entry points that load structures into a
//!   session and issue orientation requests.

pub mod core;
pub mod engine;
pub mod workflows;
