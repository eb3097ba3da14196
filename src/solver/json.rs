use crate::algebra::FloatT;
use crate::solver::{SolverError, SparseMatrix};

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::io::Write;
use std::{fs::File, io, io::Read};

// A struct very similar to the matrix container, but holding the
// coefficients as parallel triplet arrays so the JSON layout is stable.

#[derive(Serialize, Deserialize)]
#[serde(bound = "T: Serialize + DeserializeOwned")]
struct JsonMatrixData<T: FloatT> {
    pub m: usize,
    pub n: usize,
    pub symmetric: bool,
    pub rows: Vec<usize>,
    pub cols: Vec<usize>,
    pub vals: Vec<T>,
}

/// Utilities for archiving matrices as JSON and replaying them later.
pub trait JsonReadWrite: Sized {
    /// Writes the matrix to a file as JSON.
    fn save_to_file(&self, file: &mut File) -> Result<(), io::Error>;
    /// Reads a matrix from a JSON file written by
    /// [`save_to_file`](Self::save_to_file).
    fn load_from_file(file: &mut File) -> Result<Self, io::Error>;
}

impl<T> JsonReadWrite for SparseMatrix<T>
where
    T: FloatT + DeserializeOwned + Serialize,
{
    fn save_to_file(&self, file: &mut File) -> Result<(), io::Error> {
        let (rows, cols, vals) = self.coef_triplets();
        let json_data = JsonMatrixData {
            m: self.nrows(),
            n: self.ncols(),
            symmetric: self.is_symmetric(),
            rows,
            cols,
            vals,
        };

        let json = serde_json::to_string(&json_data)?;
        file.write_all(json.as_bytes())?;

        Ok(())
    }

    fn load_from_file(file: &mut File) -> Result<Self, io::Error> {
        let mut buffer = String::new();
        file.read_to_string(&mut buffer)?;
        let json_data: JsonMatrixData<T> = serde_json::from_str(&buffer)?;

        if json_data.rows.len() != json_data.vals.len()
            || json_data.cols.len() != json_data.vals.len()
        {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "coefficient arrays have mismatched lengths",
            ));
        }

        let to_io_error = |e: SolverError| io::Error::new(io::ErrorKind::InvalidData, e);

        let mut matrix =
            SparseMatrix::new(json_data.m, json_data.n, json_data.symmetric).map_err(to_io_error)?;
        for i in 0..json_data.vals.len() {
            matrix
                .set_coef(json_data.rows[i], json_data.cols[i], json_data.vals[i])
                .map_err(to_io_error)?;
        }

        Ok(matrix)
    }
}
