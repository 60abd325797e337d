//! Core math modules.

pub mod stable;
pub mod simplex;
pub mod dirichlet;
