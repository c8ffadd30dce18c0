//! Shared helpers for the unit and integration tests of the crate.
pub mod common;
