#![allow(non_snake_case)]
//! Algebra module.
//!
//! Scalar traits, vector math on slices and compressed sparse column
//! matrices with their matrix-vector products.

mod floats;
pub use floats::*;
mod error_types;
pub use error_types::*;
mod math_traits;
pub use math_traits::*;
mod matrix_types;
pub use matrix_types::*;
mod matrix_traits;
pub(crate) use matrix_traits::*;
mod csc;
pub use csc::*;

// trait implementations on the view and slice types
mod adjoint;
mod symmetric;
mod vecmath;
