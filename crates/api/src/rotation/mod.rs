//! Rotation services: grid provisioning, auto-fill and week materialization.
//!
//! These sit between the HTTP handlers and the pure planners in
//! `galley_core`: they load rows, hand them to the planner, and persist the
//! result.

pub mod auto_fill;
pub mod grid;
pub mod location;
pub mod materializer;
