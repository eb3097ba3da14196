use crate::algebra::{CscMatrix, FloatT};
use crate::solver::SolverError;
use std::collections::BTreeMap;

/// Sparse coefficient container in which linear systems are assembled
/// entry by entry before being handed to the
/// [`SparseSolver`](crate::solver::SparseSolver).
///
/// A matrix is created with fixed dimensions and a fixed symmetry class.
/// Coefficients default to zero and may be written in any order; writing
/// the same position twice overwrites the previous value.
///
/// For a symmetric matrix only one triangle is stored internally, and
/// the positions `(i,j)` and `(j,i)` refer to the same coefficient for
/// both reads and writes.
///
/// Example:
/// ```
/// use spsolve::solver::SparseMatrix;
///
/// let mut A = SparseMatrix::<f64>::new(2, 2, true).unwrap();
/// A.set_coef(0, 0, 4.0).unwrap();
/// A.set_coef(1, 0, 1.0).unwrap();
/// A.set_coef(1, 1, 3.0).unwrap();
///
/// assert_eq!(A.get_coef(0, 1).unwrap(), 1.0);
/// assert_eq!(A.nnz(), 3);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SparseMatrix<T = f64> {
    m: usize,
    n: usize,
    symmetric: bool,
    // keyed (col,row) so that sorted map order is compressed column order
    coeffs: BTreeMap<(usize, usize), T>,
}

impl<T: FloatT> SparseMatrix<T> {
    /// Creates an all-zero `rows` x `cols` matrix.
    ///
    /// Both dimensions must be nonzero, and a symmetric matrix must be
    /// square.  Returns [`SolverError::InvalidShape`] otherwise.
    pub fn new(rows: usize, cols: usize, symmetric: bool) -> Result<Self, SolverError> {
        if rows == 0 || cols == 0 {
            return Err(SolverError::InvalidShape);
        }
        if symmetric && rows != cols {
            return Err(SolverError::InvalidShape);
        }
        Ok(Self {
            m: rows,
            n: cols,
            symmetric,
            coeffs: BTreeMap::new(),
        })
    }

    /// Number of rows.
    pub fn nrows(&self) -> usize {
        self.m
    }

    /// Number of columns.
    pub fn ncols(&self) -> usize {
        self.n
    }

    /// `true` if the matrix was created as symmetric.
    pub fn is_symmetric(&self) -> bool {
        self.symmetric
    }

    /// Number of explicitly stored coefficients.
    ///
    /// For a symmetric matrix each off-diagonal pair counts once.
    pub fn nnz(&self) -> usize {
        self.coeffs.len()
    }

    /// Writes the coefficient at `(row, col)`, overwriting any previous
    /// value at that position.
    ///
    /// Returns [`SolverError::IndexOutOfRange`] if either index is
    /// outside the matrix dimensions.
    pub fn set_coef(&mut self, row: usize, col: usize, value: T) -> Result<(), SolverError> {
        let key = self.storage_key(row, col)?;
        self.coeffs.insert(key, value);
        Ok(())
    }

    /// Reads the coefficient at `(row, col)`, returning zero for
    /// positions that were never written.
    ///
    /// Returns [`SolverError::IndexOutOfRange`] if either index is
    /// outside the matrix dimensions.
    pub fn get_coef(&self, row: usize, col: usize) -> Result<T, SolverError> {
        let key = self.storage_key(row, col)?;
        Ok(self.coeffs.get(&key).copied().unwrap_or(T::zero()))
    }

    // Maps a user (row,col) position to its (col,row) storage key,
    // folding the lower triangle onto the upper one for symmetric
    // matrices.
    fn storage_key(&self, row: usize, col: usize) -> Result<(usize, usize), SolverError> {
        if row >= self.m || col >= self.n {
            return Err(SolverError::IndexOutOfRange);
        }
        if self.symmetric && row > col {
            Ok((row, col))
        } else {
            Ok((col, row))
        }
    }

    /// Compresses the stored coefficients into CSC form.  For a
    /// symmetric matrix the result holds the upper triangle only.
    ///
    /// With `dropzeros` set, coefficients that were explicitly written
    /// as zero are left out of the sparsity pattern.
    pub(crate) fn to_csc(&self, dropzeros: bool) -> CscMatrix<T> {
        let keep = |v: &T| !dropzeros || *v != T::zero();

        let mut colptr = vec![0; self.n + 1];
        for ((col, _), v) in self.coeffs.iter() {
            if keep(v) {
                colptr[col + 1] += 1;
            }
        }
        for c in 0..self.n {
            colptr[c + 1] += colptr[c];
        }

        let nnz = colptr[self.n];
        let mut rowval = Vec::with_capacity(nnz);
        let mut nzval = Vec::with_capacity(nnz);
        for ((_, row), v) in self.coeffs.iter() {
            if keep(v) {
                rowval.push(*row);
                nzval.push(*v);
            }
        }

        let out = CscMatrix::new(self.m, self.n, colptr, rowval, nzval);
        debug_assert!(out.check_format().is_ok());
        out
    }

    // Internal accessors for serialization support.
    #[cfg(feature = "serde")]
    pub(crate) fn coef_triplets(&self) -> (Vec<usize>, Vec<usize>, Vec<T>) {
        let mut rows = Vec::with_capacity(self.coeffs.len());
        let mut cols = Vec::with_capacity(self.coeffs.len());
        let mut vals = Vec::with_capacity(self.coeffs.len());
        for ((col, row), v) in self.coeffs.iter() {
            rows.push(*row);
            cols.push(*col);
            vals.push(*v);
        }
        (rows, cols, vals)
    }
}
