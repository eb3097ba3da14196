#![allow(non_snake_case)]

mod core;
pub use self::core::*;

// trait implementations only; nothing to re-export
mod matrix_math;
