#![allow(non_snake_case)]

use faer::dyn_stack::{MemBuffer, MemStack, StackReq};
use faer::linalg::solvers::{Solve, SolveLstsqCore};
use faer::prelude::*;
use faer::sparse::linalg::solvers::{Lu, Qr, SymbolicLu, SymbolicQr};
use faer::{
    linalg::cholesky::ldlt::factor::{LdltParams, LdltRegularization},
    sparse::{
        linalg::{
            amd::Control,
            cholesky::{
                factorize_symbolic_cholesky, CholeskySymbolicParams, LdltRef, SymbolicCholesky,
                SymmetricOrdering,
            },
            SupernodalThreshold,
        },
        SparseColMatRef, SymbolicSparseColMatRef,
    },
    Conj, MatMut, Par, Side, Spec,
};
use log::debug;

use super::{Factorization, FactorizationBackend};
use crate::algebra::*;
use crate::solver::{SolverError, SolverSettings};

/// Sparse direct backend built on the `faer` linear algebra library.
///
/// Symmetric systems are factored with a sparse LDL^T, general square
/// systems with a sparse LU, and least-squares systems with a sparse QR.
pub struct FaerBackend;

impl<T> FactorizationBackend<T> for FaerBackend
where
    T: FloatT,
{
    type SymmetricFactor = FaerLdltFactor<T>;
    type GeneralFactor = FaerLuFactor<T>;
    type LeastSquaresFactor = FaerQrFactor<T>;

    fn factor_symmetric(
        mat: &CscMatrix<T>,
        settings: &SolverSettings<T>,
    ) -> Result<Self::SymmetricFactor, SolverError> {
        FaerLdltFactor::new(mat, settings)
    }

    fn factor_general(
        mat: &CscMatrix<T>,
        settings: &SolverSettings<T>,
    ) -> Result<Self::GeneralFactor, SolverError> {
        FaerLuFactor::new(mat, settings)
    }

    fn factor_least_squares(
        mat: &CscMatrix<T>,
        settings: &SolverSettings<T>,
    ) -> Result<Self::LeastSquaresFactor, SolverError> {
        FaerQrFactor::new(mat, settings)
    }
}

// Par::rayon(0) here is equivalent to rayon::current_num_threads()
fn parallelism_from_settings(max_threads: u32) -> Par {
    match max_threads {
        0 => Par::rayon(0),
        1 => Par::Seq,
        _ => Par::rayon(max_threads as usize),
    }
}

/// LDL^T factorization of a symmetric matrix held as its upper triangle.
pub struct FaerLdltFactor<T: FloatT> {
    n: usize,

    // symbolic + numeric cholesky data
    symbolic_cholesky: SymbolicCholesky<usize>,
    ld_vals: Vec<T>,

    // workspace for faer factor/solve calls
    work: MemBuffer,

    parallelism: Par,
}

impl<T> FaerLdltFactor<T>
where
    T: FloatT,
{
    fn new(A: &CscMatrix<T>, settings: &SolverSettings<T>) -> Result<Self, SolverError> {
        debug_assert!(A.is_square());
        debug_assert!(A.is_triu());

        let n = A.n;
        let parallelism = parallelism_from_settings(settings.max_threads);

        debug!(
            "ldlt factor: n = {}, nnz = {}, threads = {}",
            n,
            A.nnz(),
            faer::utils::thread::parallelism_degree(parallelism)
        );

        // the amd_params are only used by faer when the ordering
        // is SymmetricOrdering::Amd
        let ordering = if settings.fill_reducing_ordering {
            SymmetricOrdering::Amd
        } else {
            SymmetricOrdering::Identity
        };

        let amd_params = Control {
            ..Default::default()
        };

        let supernodal_flop_ratio_threshold = SupernodalThreshold::AUTO;
        let cholesky_params = CholeskySymbolicParams {
            supernodal_flop_ratio_threshold,
            amd_params,
            ..Default::default()
        };

        let symbA = SymbolicSparseColMatRef::new_checked(n, n, &A.colptr, None, &A.rowval);

        let symbolic_cholesky =
            factorize_symbolic_cholesky(symbA, Side::Upper, ordering, cholesky_params)
                .map_err(|_| SolverError::FactorizationFailure)?;

        let mut ld_vals = vec![T::zero(); symbolic_cholesky.len_val()];

        let ldlt_params: Spec<LdltParams, T> = Default::default();

        // Required workspace for faer factor and solve
        let req_factor =
            symbolic_cholesky.factorize_numeric_ldlt_scratch::<T>(parallelism, ldlt_params);
        let req_solve = symbolic_cholesky.solve_in_place_scratch::<T>(1, parallelism); // 1 is the number of RHS
        let req = StackReq::any_of(&[req_factor, req_solve]);
        let mut work = MemBuffer::new(req);

        // all-positive pivot signs.  NB: regularization is driven by the
        // signs option, so None disables it entirely
        let signs = vec![1_i8; n];
        let regularizer = LdltRegularization {
            dynamic_regularization_signs: if settings.dynamic_regularization_enable {
                Some(&signs)
            } else {
                None
            },
            dynamic_regularization_delta: settings.dynamic_regularization_delta,
            dynamic_regularization_epsilon: settings.dynamic_regularization_eps,
        };

        symbolic_cholesky
            .factorize_numeric_ldlt(
                ld_vals.as_mut_slice(),
                SparseColMatRef::new(symbA, A.nzval.as_slice()),
                Side::Upper,
                regularizer,
                parallelism,
                MemStack::new(&mut work),
                ldlt_params,
            )
            .map_err(|_| SolverError::FactorizationFailure)?;

        Ok(Self {
            n,
            symbolic_cholesky,
            ld_vals,
            work,
            parallelism,
        })
    }
}

impl<T> Factorization<T> for FaerLdltFactor<T>
where
    T: FloatT,
{
    fn solve(&mut self, b: &[T]) -> Result<Vec<T>, SolverError> {
        // NB: faer solves in place
        let mut x = b.to_vec();
        let rhs = MatMut::from_column_major_slice_mut(&mut x, self.n, 1);
        let ldlt = LdltRef::new(&self.symbolic_cholesky, self.ld_vals.as_slice());

        ldlt.solve_in_place_with_conj(
            Conj::No,
            rhs,
            self.parallelism,
            MemStack::new(&mut self.work),
        );

        if !x.is_finite() {
            return Err(SolverError::FactorizationFailure);
        }
        Ok(x)
    }
}

/// Sparse LU factorization of a square general matrix.
pub struct FaerLuFactor<T: FloatT> {
    n: usize,
    lu: Lu<usize, T>,
}

impl<T> FaerLuFactor<T>
where
    T: FloatT,
{
    fn new(A: &CscMatrix<T>, _settings: &SolverSettings<T>) -> Result<Self, SolverError> {
        debug_assert!(A.is_square());

        debug!("lu factor: n = {}, nnz = {}", A.n, A.nnz());

        let symbA = SymbolicSparseColMatRef::new_checked(A.m, A.n, &A.colptr, None, &A.rowval);
        let matA = SparseColMatRef::new(symbA, A.nzval.as_slice());

        let symbolic = SymbolicLu::try_new(symbA).map_err(|_| SolverError::FactorizationFailure)?;
        let lu = Lu::try_new_with_symbolic(symbolic, matA)
            .map_err(|_| SolverError::FactorizationFailure)?;

        Ok(Self { n: A.n, lu })
    }
}

impl<T> Factorization<T> for FaerLuFactor<T>
where
    T: FloatT,
{
    fn solve(&mut self, b: &[T]) -> Result<Vec<T>, SolverError> {
        let rhs = Mat::<T>::from_fn(b.len(), 1, |i, _| b[i]);
        let x = self.lu.solve(rhs);

        let out: Vec<T> = (0..self.n).map(|i| x[(i, 0)]).collect();
        if !out.is_finite() {
            return Err(SolverError::FactorizationFailure);
        }
        Ok(out)
    }
}

/// Sparse QR factorization for least-squares solves.
pub struct FaerQrFactor<T: FloatT> {
    n: usize,
    qr: Qr<usize, T>,
}

impl<T> FaerQrFactor<T>
where
    T: FloatT,
{
    fn new(A: &CscMatrix<T>, _settings: &SolverSettings<T>) -> Result<Self, SolverError> {
        debug!("qr factor: {} x {}, nnz = {}", A.m, A.n, A.nnz());

        let symbA = SymbolicSparseColMatRef::new_checked(A.m, A.n, &A.colptr, None, &A.rowval);
        let matA = SparseColMatRef::new(symbA, A.nzval.as_slice());

        let symbolic = SymbolicQr::try_new(symbA).map_err(|_| SolverError::FactorizationFailure)?;
        let qr = Qr::try_new_with_symbolic(symbolic, matA)
            .map_err(|_| SolverError::FactorizationFailure)?;

        Ok(Self { n: A.n, qr })
    }
}

impl<T> Factorization<T> for FaerQrFactor<T>
where
    T: FloatT,
{
    fn solve(&mut self, b: &[T]) -> Result<Vec<T>, SolverError> {
        // NB: faer solves in place, leaving the least squares solution
        // in the leading n rows of the m-row rhs
        let mut x = b.to_vec();
        let rhs = MatMut::from_column_major_slice_mut(&mut x, b.len(), 1);
        self.qr.solve_lstsq_in_place_with_conj(Conj::No, rhs);

        x.truncate(self.n);
        if !x.is_finite() {
            return Err(SolverError::FactorizationFailure);
        }
        Ok(x)
    }
}

// ---------------------------------------------------------------------
// tests
// ---------------------------------------------------------------------

#[test]
fn test_ldlt_factor_solve() {
    // upper triangle of
    // A = [4  1  0]
    //     [1  3  1]
    //     [0  1  2]
    let A = CscMatrix {
        m: 3,
        n: 3,
        colptr: vec![0, 1, 3, 5],
        rowval: vec![0, 0, 1, 1, 2],
        nzval: vec![4.0, 1.0, 3.0, 1.0, 2.0],
    };
    let b = vec![6.0, 10.0, 8.0];
    let xsol = vec![1.0, 2.0, 3.0];

    for fill_reducing_ordering in [true, false] {
        let settings = crate::solver::SolverSettingsBuilder::<f64>::default()
            .fill_reducing_ordering(fill_reducing_ordering)
            .build()
            .unwrap();

        let mut factor = FaerLdltFactor::new(&A, &settings).unwrap();
        let x = factor.solve(&b).unwrap();
        assert!(x.norm_inf_diff(&xsol) < 1e-12);

        // factor once, solve repeatedly
        let x2 = factor.solve(&b).unwrap();
        assert!(x2.norm_inf_diff(&xsol) < 1e-12);
    }
}

#[test]
fn test_ldlt_regularization() {
    // singular symmetric matrix, upper triangle of all ones
    let A = CscMatrix {
        m: 2,
        n: 2,
        colptr: vec![0, 1, 3],
        rowval: vec![0, 0, 1],
        nzval: vec![1.0, 1.0, 1.0],
    };
    let b = vec![1.0, 1.0];

    // fails without regularization, whether at the factor or solve step
    let settings = crate::solver::SolverSettings::<f64>::default();
    let result = FaerLdltFactor::new(&A, &settings).and_then(|mut f| f.solve(&b));
    assert!(result.is_err());

    // succeeds with dynamic regularization of the zero pivot
    let settings = crate::solver::SolverSettingsBuilder::<f64>::default()
        .dynamic_regularization_enable(true)
        .build()
        .unwrap();
    let mut factor = FaerLdltFactor::new(&A, &settings).unwrap();
    let x = factor.solve(&b).unwrap();
    assert!(x.is_finite());
}

#[test]
fn test_lu_factor_solve() {
    // A = [2  1  0]
    //     [0  3  1]
    //     [1  0  2]
    let A = CscMatrix {
        m: 3,
        n: 3,
        colptr: vec![0, 2, 4, 6],
        rowval: vec![0, 2, 0, 1, 1, 2],
        nzval: vec![2.0, 1.0, 1.0, 3.0, 1.0, 2.0],
    };
    let b = vec![4.0, 9.0, 7.0];
    let xsol = vec![1.0, 2.0, 3.0];

    let settings = crate::solver::SolverSettings::<f64>::default();
    let mut factor = FaerLuFactor::new(&A, &settings).unwrap();
    let x = factor.solve(&b).unwrap();
    assert!(x.norm_inf_diff(&xsol) < 1e-12);
}

#[test]
fn test_lu_singular() {
    // rank one matrix
    let A = CscMatrix {
        m: 2,
        n: 2,
        colptr: vec![0, 2, 4],
        rowval: vec![0, 1, 0, 1],
        nzval: vec![1.0, 2.0, 2.0, 4.0],
    };
    let b = vec![1.0, 2.0];

    let settings = crate::solver::SolverSettings::<f64>::default();
    let result = FaerLuFactor::new(&A, &settings).and_then(|mut f| f.solve(&b));
    assert!(result.is_err());
}

#[test]
fn test_qr_least_squares() {
    // consistent overdetermined system
    // A = [1  0]
    //     [0  1]
    //     [1  1]
    let A = CscMatrix {
        m: 3,
        n: 2,
        colptr: vec![0, 2, 4],
        rowval: vec![0, 2, 1, 2],
        nzval: vec![1.0, 1.0, 1.0, 1.0],
    };
    let b = vec![1.0, 2.0, 3.0];
    let xsol = vec![1.0, 2.0];

    let settings = crate::solver::SolverSettings::<f64>::default();
    let mut factor = FaerQrFactor::new(&A, &settings).unwrap();
    let x = factor.solve(&b).unwrap();
    assert_eq!(x.len(), 2);
    assert!(x.norm_inf_diff(&xsol) < 1e-10);

    // inconsistent system picks the least squares minimizer
    let A = CscMatrix {
        m: 2,
        n: 1,
        colptr: vec![0, 2],
        rowval: vec![0, 1],
        nzval: vec![1.0, 1.0],
    };
    let b = vec![0.0, 2.0];

    let mut factor = FaerQrFactor::new(&A, &settings).unwrap();
    let x = factor.solve(&b).unwrap();
    assert!((x[0] - 1.0).abs() < 1e-10);
}
