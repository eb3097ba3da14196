#![allow(non_snake_case)]

use crate::algebra::*;
use crate::solver::backends::{FaerBackend, Factorization, FactorizationBackend};
use crate::solver::{SettingsError, SolverError, SolverSettings, SparseMatrix};
use log::{debug, log_enabled, trace, Level};
use std::iter::zip;
use std::marker::PhantomData;

// Problem class selected by the solve entry point.  Factorization
// dispatch switches on this tag.
#[derive(Debug, Clone, Copy)]
enum ProblemClass {
    Symmetric,
    General,
    LeastSquares,
}

/// Sparse direct solver for symmetric, general square and overdetermined
/// least-squares systems.
///
/// The solver holds only immutable configuration: every solve call
/// validates shapes, factors the matrix once, applies the factorization
/// to each right-hand side, and releases all backend resources before
/// returning.  Batch entry points reuse a single factorization across
/// the whole batch.
///
/// Example:
/// ```
/// use spsolve::solver::{SparseMatrix, SparseSolver};
///
/// let mut A = SparseMatrix::<f64>::new(2, 2, true).unwrap();
/// A.set_coef(0, 0, 2.0).unwrap();
/// A.set_coef(1, 1, 3.0).unwrap();
///
/// let solver = SparseSolver::<f64>::default();
/// let x = solver.solve_symmetric(&A, &[2.0, 6.0]).unwrap();
///
/// assert!((x[0] - 1.0).abs() < 1e-12);
/// assert!((x[1] - 2.0).abs() < 1e-12);
/// ```
pub struct SparseSolver<T = f64, B = FaerBackend>
where
    T: FloatT,
{
    settings: SolverSettings<T>,
    backend: PhantomData<B>,
}

impl<T, B> Default for SparseSolver<T, B>
where
    T: FloatT,
    B: FactorizationBackend<T>,
{
    fn default() -> Self {
        Self {
            settings: SolverSettings::default(),
            backend: PhantomData,
        }
    }
}

impl<T, B> SparseSolver<T, B>
where
    T: FloatT,
    B: FactorizationBackend<T>,
{
    /// Creates a solver with the given settings, validating them first.
    pub fn new(settings: SolverSettings<T>) -> Result<Self, SettingsError> {
        settings.validate()?;
        Ok(Self {
            settings,
            backend: PhantomData,
        })
    }

    /// The solver configuration.
    pub fn settings(&self) -> &SolverSettings<T> {
        &self.settings
    }

    /// Solves `A x = b` for a symmetric `A`.
    ///
    /// The matrix must have been constructed as symmetric and `b` must
    /// have length `A.nrows()`, otherwise [`SolverError::InvalidShape`]
    /// is returned.  Returns [`SolverError::FactorizationFailure`] when
    /// the matrix cannot be factored, e.g. for singular or badly
    /// indefinite systems.
    pub fn solve_symmetric(&self, mat: &SparseMatrix<T>, b: &[T]) -> Result<Vec<T>, SolverError> {
        self.solve_single(mat, b, ProblemClass::Symmetric)
    }

    /// Solves `A x = b_i` for a symmetric `A` and a batch of right-hand
    /// sides, reusing one factorization for the whole batch.
    ///
    /// Solutions are returned in the order of the inputs.  An empty
    /// batch is valid and produces an empty result after the shape
    /// checks have run.
    pub fn solve_symmetric_batch(
        &self,
        mat: &SparseMatrix<T>,
        b: &[Vec<T>],
    ) -> Result<Vec<Vec<T>>, SolverError> {
        self.solve_batch(mat, b, ProblemClass::Symmetric)
    }

    /// Solves `A x = b` for a square, non-symmetric `A`.
    ///
    /// The matrix must be square and constructed as non-symmetric.
    /// Fails with [`SolverError::FactorizationFailure`] when `A` is
    /// numerically singular.
    pub fn solve_non_symmetric(
        &self,
        mat: &SparseMatrix<T>,
        b: &[T],
    ) -> Result<Vec<T>, SolverError> {
        self.solve_single(mat, b, ProblemClass::General)
    }

    /// Solves `A x = b_i` for a square, non-symmetric `A` and a batch of
    /// right-hand sides, reusing one factorization for the whole batch.
    pub fn solve_non_symmetric_batch(
        &self,
        mat: &SparseMatrix<T>,
        b: &[Vec<T>],
    ) -> Result<Vec<Vec<T>>, SolverError> {
        self.solve_batch(mat, b, ProblemClass::General)
    }

    /// Finds `x` minimizing `||A x - b||_2` for an overdetermined `A`.
    ///
    /// The matrix must be non-symmetric with strictly more rows than
    /// columns and `b` must have length `A.nrows()`; the solution has
    /// length `A.ncols()`.  Fails with
    /// [`SolverError::FactorizationFailure`] when the factorization
    /// breaks down or produces non-finite values.
    pub fn solve_linear_least_square(
        &self,
        mat: &SparseMatrix<T>,
        b: &[T],
    ) -> Result<Vec<T>, SolverError> {
        self.solve_single(mat, b, ProblemClass::LeastSquares)
    }

    /// Least-squares solve against a batch of right-hand sides, reusing
    /// one factorization for the whole batch.
    pub fn solve_linear_least_square_batch(
        &self,
        mat: &SparseMatrix<T>,
        b: &[Vec<T>],
    ) -> Result<Vec<Vec<T>>, SolverError> {
        self.solve_batch(mat, b, ProblemClass::LeastSquares)
    }

    // single RHS entry points run as a one element batch so that both
    // forms share validation and factorization
    fn solve_single(
        &self,
        mat: &SparseMatrix<T>,
        b: &[T],
        class: ProblemClass,
    ) -> Result<Vec<T>, SolverError> {
        let mut solutions = self.solve_batch(mat, &[b], class)?;
        Ok(solutions.pop().unwrap())
    }

    fn solve_batch<S>(
        &self,
        mat: &SparseMatrix<T>,
        rhs: &[S],
        class: ProblemClass,
    ) -> Result<Vec<Vec<T>>, SolverError>
    where
        S: AsRef<[T]>,
    {
        self.check_class(mat, class)?;

        for b in rhs {
            if b.as_ref().len() != mat.nrows() {
                return Err(SolverError::InvalidShape);
            }
        }

        if rhs.is_empty() {
            return Ok(Vec::new());
        }

        debug!(
            "{:?} solve: {} x {} matrix, {} rhs",
            class,
            mat.nrows(),
            mat.ncols(),
            rhs.len()
        );

        let A = mat.to_csc(self.settings.input_sparse_dropzeros);
        trace!(
            "csc conversion: {} x {}, nnz = {}",
            A.nrows(),
            A.ncols(),
            A.nnz()
        );

        let solutions = match class {
            ProblemClass::Symmetric => {
                let mut factor = B::factor_symmetric(&A, &self.settings)?;
                apply_factorization(&mut factor, rhs)?
            }
            ProblemClass::General => {
                let mut factor = B::factor_general(&A, &self.settings)?;
                apply_factorization(&mut factor, rhs)?
            }
            ProblemClass::LeastSquares => {
                let mut factor = B::factor_least_squares(&A, &self.settings)?;
                apply_factorization(&mut factor, rhs)?
            }
        };

        if log_enabled!(Level::Debug) {
            for (x, b) in zip(&solutions, rhs) {
                let r = residual_inf_norm(&A, class, x, b.as_ref());
                debug!("solve residual: ||Ax - b||_inf = {:.3e}", r);
            }
        }

        Ok(solutions)
    }

    fn check_class(&self, mat: &SparseMatrix<T>, class: ProblemClass) -> Result<(), SolverError> {
        let ok = match class {
            ProblemClass::Symmetric => mat.is_symmetric(),
            ProblemClass::General => !mat.is_symmetric() && mat.nrows() == mat.ncols(),
            ProblemClass::LeastSquares => !mat.is_symmetric() && mat.nrows() > mat.ncols(),
        };
        if ok {
            Ok(())
        } else {
            Err(SolverError::InvalidShape)
        }
    }
}

fn apply_factorization<T, F, S>(factor: &mut F, rhs: &[S]) -> Result<Vec<Vec<T>>, SolverError>
where
    T: FloatT,
    F: Factorization<T>,
    S: AsRef<[T]>,
{
    let mut solutions = Vec::with_capacity(rhs.len());
    for b in rhs {
        solutions.push(factor.solve(b.as_ref())?);
    }
    Ok(solutions)
}

fn residual_inf_norm<T: FloatT>(A: &CscMatrix<T>, class: ProblemClass, x: &[T], b: &[T]) -> T {
    let mut r = b.to_vec();
    match class {
        ProblemClass::Symmetric => A.sym().symv(&mut r, x, T::one(), -T::one()),
        ProblemClass::General | ProblemClass::LeastSquares => {
            A.gemv(&mut r, x, T::one(), -T::one())
        }
    }
    r.norm_inf()
}

// ---------------------------------------------------------------------
// tests
// ---------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // stub backend returning twice the rhs, truncated to the solution
    // length, so orchestration can be checked without numerics
    struct DoublingBackend;

    struct DoublingFactor {
        n: usize,
    }

    impl Factorization<f64> for DoublingFactor {
        fn solve(&mut self, b: &[f64]) -> Result<Vec<f64>, SolverError> {
            Ok(b.iter().take(self.n).map(|v| 2.0 * v).collect())
        }
    }

    impl FactorizationBackend<f64> for DoublingBackend {
        type SymmetricFactor = DoublingFactor;
        type GeneralFactor = DoublingFactor;
        type LeastSquaresFactor = DoublingFactor;

        fn factor_symmetric(
            mat: &CscMatrix<f64>,
            _settings: &SolverSettings<f64>,
        ) -> Result<DoublingFactor, SolverError> {
            Ok(DoublingFactor { n: mat.ncols() })
        }

        fn factor_general(
            mat: &CscMatrix<f64>,
            _settings: &SolverSettings<f64>,
        ) -> Result<DoublingFactor, SolverError> {
            Ok(DoublingFactor { n: mat.ncols() })
        }

        fn factor_least_squares(
            mat: &CscMatrix<f64>,
            _settings: &SolverSettings<f64>,
        ) -> Result<DoublingFactor, SolverError> {
            Ok(DoublingFactor { n: mat.ncols() })
        }
    }

    // stub backend that refuses every factorization
    struct FailingBackend;

    impl FactorizationBackend<f64> for FailingBackend {
        type SymmetricFactor = DoublingFactor;
        type GeneralFactor = DoublingFactor;
        type LeastSquaresFactor = DoublingFactor;

        fn factor_symmetric(
            _mat: &CscMatrix<f64>,
            _settings: &SolverSettings<f64>,
        ) -> Result<DoublingFactor, SolverError> {
            Err(SolverError::FactorizationFailure)
        }

        fn factor_general(
            _mat: &CscMatrix<f64>,
            _settings: &SolverSettings<f64>,
        ) -> Result<DoublingFactor, SolverError> {
            Err(SolverError::FactorizationFailure)
        }

        fn factor_least_squares(
            _mat: &CscMatrix<f64>,
            _settings: &SolverSettings<f64>,
        ) -> Result<DoublingFactor, SolverError> {
            Err(SolverError::FactorizationFailure)
        }
    }

    fn symmetric_2x2() -> SparseMatrix<f64> {
        let mut A = SparseMatrix::new(2, 2, true).unwrap();
        A.set_coef(0, 0, 1.0).unwrap();
        A.set_coef(1, 1, 1.0).unwrap();
        A
    }

    fn general_2x2() -> SparseMatrix<f64> {
        let mut A = SparseMatrix::new(2, 2, false).unwrap();
        A.set_coef(0, 0, 1.0).unwrap();
        A.set_coef(1, 1, 1.0).unwrap();
        A
    }

    fn tall_3x2() -> SparseMatrix<f64> {
        let mut A = SparseMatrix::new(3, 2, false).unwrap();
        A.set_coef(0, 0, 1.0).unwrap();
        A.set_coef(1, 1, 1.0).unwrap();
        A.set_coef(2, 0, 1.0).unwrap();
        A
    }

    #[test]
    fn test_class_validation_runs_before_factorization() {
        // a backend that always fails distinguishes InvalidShape
        // (validation rejected the call) from FactorizationFailure
        // (the backend was reached)
        let solver = SparseSolver::<f64, FailingBackend>::default();

        // class mismatches
        assert_eq!(
            solver.solve_symmetric(&general_2x2(), &[1.0, 2.0]),
            Err(SolverError::InvalidShape)
        );
        assert_eq!(
            solver.solve_non_symmetric(&symmetric_2x2(), &[1.0, 2.0]),
            Err(SolverError::InvalidShape)
        );
        assert_eq!(
            solver.solve_non_symmetric(&tall_3x2(), &[1.0, 2.0, 3.0]),
            Err(SolverError::InvalidShape)
        );

        // least squares requires strictly more rows than columns
        assert_eq!(
            solver.solve_linear_least_square(&general_2x2(), &[1.0, 2.0]),
            Err(SolverError::InvalidShape)
        );

        // valid shapes reach the backend
        assert_eq!(
            solver.solve_symmetric(&symmetric_2x2(), &[1.0, 2.0]),
            Err(SolverError::FactorizationFailure)
        );
        assert_eq!(
            solver.solve_linear_least_square(&tall_3x2(), &[1.0, 2.0, 3.0]),
            Err(SolverError::FactorizationFailure)
        );
    }

    #[test]
    fn test_rhs_length_validation_runs_before_factorization() {
        let solver = SparseSolver::<f64, FailingBackend>::default();

        assert_eq!(
            solver.solve_symmetric(&symmetric_2x2(), &[1.0, 2.0, 3.0]),
            Err(SolverError::InvalidShape)
        );

        // a single bad length anywhere in a batch rejects the whole call
        let batch = vec![vec![1.0, 2.0], vec![1.0], vec![3.0, 4.0]];
        assert_eq!(
            solver.solve_symmetric_batch(&symmetric_2x2(), &batch),
            Err(SolverError::InvalidShape)
        );

        // least squares takes rhs of length nrows
        assert_eq!(
            solver.solve_linear_least_square(&tall_3x2(), &[1.0, 2.0]),
            Err(SolverError::InvalidShape)
        );
    }

    #[test]
    fn test_batch_order_and_single_delegation() {
        let solver = SparseSolver::<f64, DoublingBackend>::default();
        let A = symmetric_2x2();

        let batch = vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]];
        let solutions = solver.solve_symmetric_batch(&A, &batch).unwrap();
        assert_eq!(
            solutions,
            vec![vec![2.0, 4.0], vec![6.0, 8.0], vec![10.0, 12.0]]
        );

        // the single entry point is the one element batch
        let x = solver.solve_symmetric(&A, &[1.0, 2.0]).unwrap();
        assert_eq!(x, solutions[0]);
    }

    #[test]
    fn test_empty_batch_is_valid() {
        // an always-failing backend proves factorization is skipped
        let solver = SparseSolver::<f64, FailingBackend>::default();

        let empty: Vec<Vec<f64>> = Vec::new();
        assert_eq!(
            solver.solve_symmetric_batch(&symmetric_2x2(), &empty),
            Ok(Vec::new())
        );
        assert_eq!(
            solver.solve_non_symmetric_batch(&general_2x2(), &empty),
            Ok(Vec::new())
        );
        assert_eq!(
            solver.solve_linear_least_square_batch(&tall_3x2(), &empty),
            Ok(Vec::new())
        );

        // but shape checks still run
        assert_eq!(
            solver.solve_symmetric_batch(&general_2x2(), &empty),
            Err(SolverError::InvalidShape)
        );
    }

    #[test]
    fn test_least_squares_solution_length() {
        let solver = SparseSolver::<f64, DoublingBackend>::default();
        let A = tall_3x2();

        let x = solver.solve_linear_least_square(&A, &[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(x, vec![2.0, 4.0]);
    }

    #[test]
    fn test_settings_validated_on_construction() {
        let bad = SolverSettings::<f64> {
            dynamic_regularization_eps: -1.0,
            ..SolverSettings::default()
        };
        assert!(SparseSolver::<f64, DoublingBackend>::new(bad).is_err());

        let solver =
            SparseSolver::<f64, DoublingBackend>::new(SolverSettings::default()).unwrap();
        assert_eq!(solver.settings().max_threads, 0);
    }
}
