//! Solver main module.
//!
//! This module contains the user facing types of the crate: the
//! [`SparseMatrix`] problem container, the [`SparseSolver`] solve entry
//! points, the [`SolverSettings`] configuration and the factorization
//! [`backends`].

// internal module structure
pub mod backends;
mod error_types;
#[cfg(feature = "serde")]
mod json;
mod settings;
mod solver;
mod sparse_matrix;

//export flattened
pub use error_types::*;
#[cfg(feature = "serde")]
pub use json::*;
pub use settings::*;
pub use solver::*;
pub use sparse_matrix::*;
