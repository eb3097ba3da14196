use crate::algebra::{CscMatrix, FloatT};
use crate::solver::{SolverError, SolverSettings};

mod faer_backend;
pub use faer_backend::*;

/// Factory interface for sparse direct factorizations.
///
/// Each method analyzes and factors a compressed-column matrix once,
/// returning a handle that can solve repeatedly against that single
/// factorization.  Symmetric factorization expects the upper triangle
/// only.
pub trait FactorizationBackend<T: FloatT> {
    type SymmetricFactor: Factorization<T>;
    type GeneralFactor: Factorization<T>;
    type LeastSquaresFactor: Factorization<T>;

    fn factor_symmetric(
        mat: &CscMatrix<T>,
        settings: &SolverSettings<T>,
    ) -> Result<Self::SymmetricFactor, SolverError>;

    fn factor_general(
        mat: &CscMatrix<T>,
        settings: &SolverSettings<T>,
    ) -> Result<Self::GeneralFactor, SolverError>;

    fn factor_least_squares(
        mat: &CscMatrix<T>,
        settings: &SolverSettings<T>,
    ) -> Result<Self::LeastSquaresFactor, SolverError>;
}

/// A completed factorization that can be applied to right-hand sides.
///
/// The right-hand side length is the row count of the factored matrix
/// and the solution length is its column count.  Solves may mutate
/// internal workspace, hence `&mut self`.
pub trait Factorization<T: FloatT> {
    fn solve(&mut self, b: &[T]) -> Result<Vec<T>, SolverError>;
}
