//! CLI command implementations.

pub mod pending;
pub mod run;
pub mod tick;
