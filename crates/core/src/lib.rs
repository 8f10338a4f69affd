//! bmc-bench-core
//!
//! Core library for running bounded-model-checking experiments: it drives one
//! verification backend over a directory of benchmark programs and normalizes
//! the heterogeneous verifier logs into a single comparable report.
//!
//! All substantive logic lives here so the CLI stays a thin frontend and every
//! piece can be tested without the external verifiers installed.

pub mod model;
pub mod backends;
pub mod config;
pub mod harness;
pub mod services;
pub mod analysis;
pub mod report;
pub mod db;

/// Returns the library version as encoded at compile time.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
