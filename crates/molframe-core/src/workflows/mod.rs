//! # Workflows Module
//!
//! Top-level entry points for front ends. Each workflow takes a
//! [`Session`](crate::engine::session::Session), runs the core and engine steps in order
//! and reports what it did.
//!
//! - **Load Workflow** ([`load`]) - Parse structure text, optionally expand the biological
//!   assembly, convert every model to a frame, superpose trajectory frames and frame the
//!   camera on a new object.
//! - **Orient Workflow** ([`orient`]) - Solve for the best view of a frame and start the
//!   camera animation towards it.

pub mod load;
pub mod orient;
