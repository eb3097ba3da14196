#![allow(non_snake_case)]

use spsolve::algebra::*;
use spsolve::solver::*;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn basic_symmetric_data() -> (SparseMatrix<f64>, Vec<f64>, Vec<f64>) {
    // M = [10  0  0 -2 -1 -1]
    //     [ 0 10  0  0 -2  0]
    //     [ 0  0 15  0  0  0]
    //     [-2  0  0 10 -1  0]
    //     [-1 -2  0 -1  1  0]
    //     [-1  0  0  0  0  6]
    let mut M = SparseMatrix::new(6, 6, true).unwrap();
    M.set_coef(0, 0, 10.).unwrap();
    M.set_coef(1, 1, 10.).unwrap();
    M.set_coef(2, 2, 15.).unwrap();
    M.set_coef(3, 3, 10.).unwrap();
    M.set_coef(4, 4, 1.).unwrap();
    M.set_coef(5, 5, 6.).unwrap();

    // couplings given in the lower triangle; storage mirrors them
    M.set_coef(3, 0, -2.).unwrap();
    M.set_coef(4, 0, -1.).unwrap();
    M.set_coef(5, 0, -1.).unwrap();
    M.set_coef(4, 1, -2.).unwrap();
    M.set_coef(4, 3, -1.).unwrap();

    let b = vec![-9., 10., 45., 33., -4., 35.];
    let refsol = vec![1., 2., 3., 4., 5., 6.];

    (M, b, refsol)
}

#[test]
fn test_basic_symmetric() {
    init_logging();
    let (M, b, refsol) = basic_symmetric_data();

    let solver = SparseSolver::<f64>::default();
    let x = solver.solve_symmetric(&M, &b).unwrap();

    assert_eq!(x.len(), 6);
    assert!(x.dist(&refsol) <= 1e-8);
}

#[test]
fn test_basic_symmetric_batch() {
    init_logging();
    let (M, b, refsol) = basic_symmetric_data();

    // doubling the rhs must double the solution
    let c: Vec<f64> = b.iter().map(|v| 2. * v).collect();
    let mut refsol2 = refsol.clone();
    refsol2.scale(2.);

    let solver = SparseSolver::<f64>::default();
    let solutions = solver.solve_symmetric_batch(&M, &[b, c]).unwrap();

    assert_eq!(solutions.len(), 2);
    assert!(solutions[0].dist(&refsol) <= 1e-8);
    assert!(solutions[1].dist(&refsol2) <= 1e-8);
}

#[test]
fn test_basic_symmetric_single_matches_batch() {
    let (M, b, _) = basic_symmetric_data();

    let solver = SparseSolver::<f64>::default();
    let x = solver.solve_symmetric(&M, &b).unwrap();
    let solutions = solver.solve_symmetric_batch(&M, &[b]).unwrap();

    assert!(x.norm_inf_diff(&solutions[0]) <= 1e-10);
}

#[test]
fn test_basic_symmetric_empty_batch() {
    let (M, _, _) = basic_symmetric_data();

    let solver = SparseSolver::<f64>::default();
    let solutions = solver.solve_symmetric_batch(&M, &[]).unwrap();

    assert!(solutions.is_empty());
}

#[test]
fn test_basic_symmetric_no_amd() {
    init_logging();
    let (M, b, refsol) = basic_symmetric_data();

    let settings = SolverSettingsBuilder::<f64>::default()
        .fill_reducing_ordering(false)
        .build()
        .unwrap();

    let solver = SparseSolver::<f64>::new(settings).unwrap();
    let x = solver.solve_symmetric(&M, &b).unwrap();

    assert!(x.dist(&refsol) <= 1e-8);
}

#[test]
fn test_basic_symmetric_single_thread() {
    let (M, b, refsol) = basic_symmetric_data();

    let settings = SolverSettingsBuilder::<f64>::default()
        .max_threads(1)
        .build()
        .unwrap();

    let solver = SparseSolver::<f64>::new(settings).unwrap();
    let x = solver.solve_symmetric(&M, &b).unwrap();

    assert!(x.dist(&refsol) <= 1e-8);
}

#[test]
fn test_symmetric_singular() {
    init_logging();

    // rank one, so elimination hits a zero pivot
    let mut M = SparseMatrix::new(2, 2, true).unwrap();
    M.set_coef(0, 0, 1.).unwrap();
    M.set_coef(0, 1, 1.).unwrap();
    M.set_coef(1, 1, 1.).unwrap();
    let b = vec![2., 2.];

    let solver = SparseSolver::<f64>::default();
    assert_eq!(
        solver.solve_symmetric(&M, &b),
        Err(SolverError::FactorizationFailure)
    );

    // dynamic regularization perturbs the zero pivot enough to factor
    let settings = SolverSettingsBuilder::<f64>::default()
        .dynamic_regularization_enable(true)
        .build()
        .unwrap();

    let solver = SparseSolver::<f64>::new(settings).unwrap();
    let x = solver.solve_symmetric(&M, &b).unwrap();
    assert!(x.is_finite());
}
