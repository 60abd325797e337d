//! Symptom Triage math utilities.

pub mod math;

pub use math::stable::*;
pub use math::simplex::*;
pub use math::dirichlet;
