use thiserror::Error;

/// Error type returned by [`SparseMatrix`](crate::solver::SparseMatrix)
/// assembly utilities and by the [`SparseSolver`](crate::solver::SparseSolver)
/// entry points.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverError {
    /// Matrix or right-hand side dimensions are zero or inconsistent.
    #[error("Matrix or right-hand side dimensions are incompatible")]
    InvalidShape,
    /// Coefficient access outside the stated matrix dimensions.
    #[error("Coefficient index is outside the matrix dimensions")]
    IndexOutOfRange,
    /// Numerical factorization could not be completed or produced
    /// a non-finite solution.
    #[error("Matrix could not be factored")]
    FactorizationFailure,
}
