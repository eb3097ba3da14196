#![allow(non_snake_case)]

use spsolve::algebra::*;
use spsolve::solver::*;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn basic_least_squares_data() -> (SparseMatrix<f64>, Vec<f64>, Vec<f64>) {
    // M = [10  0  0  0  0  0]
    //     [ 0 10 -3 -1  0  0]
    //     [ 0  0 15  0  0  0]
    //     [-2  0  0 10 -1  0]
    //     [-1  0  0 -5  1 -3]
    //     [-1 -2  0  0  0  6]
    //     [ 0  0  1  0  0 -1]
    //     [ 2  0  0  0  4  0]
    let mut M = SparseMatrix::new(8, 6, false).unwrap();
    M.set_coef(0, 0, 10.).unwrap();
    M.set_coef(1, 1, 10.).unwrap();
    M.set_coef(1, 2, -3.).unwrap();
    M.set_coef(1, 3, -1.).unwrap();
    M.set_coef(2, 2, 15.).unwrap();
    M.set_coef(3, 0, -2.).unwrap();
    M.set_coef(3, 3, 10.).unwrap();
    M.set_coef(3, 4, -1.).unwrap();
    M.set_coef(4, 0, -1.).unwrap();
    M.set_coef(4, 3, -5.).unwrap();
    M.set_coef(4, 4, 1.).unwrap();
    M.set_coef(4, 5, -3.).unwrap();
    M.set_coef(5, 0, -1.).unwrap();
    M.set_coef(5, 1, -2.).unwrap();
    M.set_coef(5, 5, 6.).unwrap();
    M.set_coef(6, 2, 1.).unwrap();
    M.set_coef(6, 5, -1.).unwrap();
    M.set_coef(7, 0, 2.).unwrap();
    M.set_coef(7, 4, 4.).unwrap();

    // b = M * [1 2 3 4 5 6]', so the residual minimum is zero
    let b = vec![10., 7., 45., 33., -34., 31., -3., 22.];
    let refsol = vec![1., 2., 3., 4., 5., 6.];

    (M, b, refsol)
}

#[test]
fn test_basic_least_squares() {
    init_logging();
    let (M, b, refsol) = basic_least_squares_data();

    let solver = SparseSolver::<f64>::default();
    let x = solver.solve_linear_least_square(&M, &b).unwrap();

    // solution has the column dimension, not the row dimension
    assert_eq!(x.len(), 6);
    assert!(x.dist(&refsol) <= 1e-8);
}

#[test]
fn test_basic_least_squares_batch() {
    init_logging();
    let (M, b, refsol) = basic_least_squares_data();

    let c: Vec<f64> = b.iter().map(|v| 2. * v).collect();
    let mut refsol2 = refsol.clone();
    refsol2.scale(2.);

    let solver = SparseSolver::<f64>::default();
    let solutions = solver.solve_linear_least_square_batch(&M, &[b, c]).unwrap();

    assert_eq!(solutions.len(), 2);
    assert!(solutions[0].dist(&refsol) <= 1e-8);
    assert!(solutions[1].dist(&refsol2) <= 1e-8);
}

#[test]
fn test_basic_least_squares_single_matches_batch() {
    let (M, b, _) = basic_least_squares_data();

    let solver = SparseSolver::<f64>::default();
    let x = solver.solve_linear_least_square(&M, &b).unwrap();
    let solutions = solver.solve_linear_least_square_batch(&M, &[b]).unwrap();

    assert!(x.norm_inf_diff(&solutions[0]) <= 1e-10);
}

#[test]
fn test_least_squares_inconsistent_rhs() {
    init_logging();

    // a single column of ones: the minimizer of ||Mx - b|| is the mean
    // of b, with a nonzero residual left over
    let mut M = SparseMatrix::new(3, 1, false).unwrap();
    M.set_coef(0, 0, 1.).unwrap();
    M.set_coef(1, 0, 1.).unwrap();
    M.set_coef(2, 0, 1.).unwrap();
    let b = vec![0., 1., 2.];

    let solver = SparseSolver::<f64>::default();
    let x = solver.solve_linear_least_square(&M, &b).unwrap();

    assert_eq!(x.len(), 1);
    assert!((x[0] - 1.).abs() <= 1e-10);
}
