//! __spsolve__ is a sparse direct linear solver library.  Systems are
//! assembled coefficient by coefficient into a
//! [`SparseMatrix`](crate::solver::SparseMatrix) and solved through a
//! [`SparseSolver`](crate::solver::SparseSolver), which supports three
//! problem classes:
//!
//! * __Symmetric__: $Ax = b$ with $A = A^\top$, via sparse $LDL^\top$
//!   factorization.
//! * __General__: $Ax = b$ for square non-symmetric $A$, via sparse LU.
//! * __Least squares__: $\min_x \\|Ax - b\\|_2$ for an overdetermined
//!   $A$, via sparse QR.
//!
//! Every solve accepts a single right-hand side or a batch; a batch is
//! solved against one factorization, amortizing the factorization cost
//! across all right-hand sides.
//!
//! # Example
//!
//! ```
//! use spsolve::solver::{SparseMatrix, SparseSolver};
//!
//! // assemble the symmetric matrix
//! //     [10   0  -2]
//! // A = [ 0   3   0]
//! //     [-2   0   4]
//! let mut A = SparseMatrix::<f64>::new(3, 3, true).unwrap();
//! A.set_coef(0, 0, 10.0).unwrap();
//! A.set_coef(1, 1, 3.0).unwrap();
//! A.set_coef(2, 0, -2.0).unwrap();
//! A.set_coef(2, 2, 4.0).unwrap();
//!
//! let solver = SparseSolver::<f64>::default();
//!
//! // one right-hand side ...
//! let b = vec![6.0, 3.0, 10.0];
//! let x = solver.solve_symmetric(&A, &b).unwrap();
//!
//! // ... or many against a single factorization
//! let batch = vec![b.clone(), b.iter().map(|v| 2.0 * v).collect()];
//! let xs = solver.solve_symmetric_batch(&A, &batch).unwrap();
//! assert!(xs[0].iter().zip(&x).all(|(a, b)| (a - b).abs() < 1e-12));
//! ```
//!
//! # License
//!
//! Licensed under Apache License, Version 2.0.

pub mod algebra;
pub mod solver;
