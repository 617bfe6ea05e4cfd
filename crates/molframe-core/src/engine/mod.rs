//! # Engine Module
//!
//! The stateful half of the library: it turns parsed atoms into frames and keeps track of
//! what a viewer has loaded and where its camera points.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Load options, animation timing and their builders
//! - **Classification** ([`classify`]) - Residue grouping and protein/nucleic/ligand decisions
//! - **Conversion** ([`convert`]) - Frames from classified residues, with ligand-aware PAE re-indexing
//! - **Camera** ([`camera`], [`animation`]) - Camera state and the eased transition state machine
//! - **Session** ([`session`]) - Loaded objects, the camera and the animator in one context object
//! - **Progress Monitoring** ([`progress`]) - Workflow stages and per-frame alignment events for front ends
//! - **Error Handling** ([`error`]) - The engine error type wrapping every lower-level failure

pub mod animation;
pub mod camera;
pub mod classify;
pub mod config;
pub mod convert;
pub mod error;
pub mod progress;
pub mod session;
