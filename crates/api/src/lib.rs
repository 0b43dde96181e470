//! Galley API server library.
//!
//! Exposes config, state, error handling, routes and services so that the
//! binary and the integration tests build the same application.

pub mod background;
pub mod config;
pub mod error;
pub mod handlers;
pub mod query;
pub mod response;
pub mod rotation;
pub mod router;
pub mod routes;
pub mod rule_validator;
pub mod state;
