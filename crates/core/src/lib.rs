//! Domain logic for the menu rotation engine and pairing optimizer.
//!
//! Everything in this crate is pure: no database, no HTTP, no async. The
//! `db` and `api` crates feed it rows and persist what it decides.

pub mod auto_fill;
pub mod calendar;
pub mod error;
pub mod exploration;
pub mod grid;
pub mod materialize;
pub mod pairing;
pub mod rotation;
pub mod rules;
pub mod scoring;
pub mod types;
