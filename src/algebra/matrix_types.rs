// Borrowed matrix views.  The compressed sparse column type itself
// lives in the csc module; these wrappers allow matrix-vector
// operations to be implemented on transposed and symmetric views
// without copying data.

/// Adjoint (transpose) view of a matrix
#[derive(Debug)]
pub struct Adjoint<'a, M> {
    /// reference to the source matrix
    pub src: &'a M,
}

/// Symmetric view of a matrix.  The source data should be triu.
#[derive(Debug)]
pub struct Symmetric<'a, M> {
    /// reference to the source matrix
    pub src: &'a M,
}
