//! Test module for determinism and integration tests.
//!
//! - **Determinism tests**: same seed, same script, identical rounds
//! - **Integration tests**: multi-round scenarios through the full engine
//! - **Helper functions**: party factories and submission shorthands

mod determinism;
mod helpers;

pub use helpers::*;
