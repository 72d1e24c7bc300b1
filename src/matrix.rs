//! Read-only matrix handed to the evaluator.
//!
//! The optimizer never looks inside; the matrix exists so an objective can
//! depend on external data loaded once before the run. Values are read as
//! whitespace-separated reals in row-major order.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::error::{QuadBoundError, Result};

/// Dense row-major matrix: `data[row * cols + col]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

/// Number of entries of a `rows x cols` matrix, or `MatrixShape` if it
/// does not fit in `usize`.
fn entry_count(rows: usize, cols: usize) -> Result<usize> {
    rows.checked_mul(cols)
        .ok_or(QuadBoundError::MatrixShape {
            rows,
            cols,
            found: 0,
        })
}

impl Matrix {
    /// A `rows × cols` matrix of zeros.
    pub fn zeros(rows: usize, cols: usize) -> Result<Self> {
        let len = entry_count(rows, cols)?;
        Ok(Self {
            rows,
            cols,
            data: vec![0.0; len],
        })
    }

    /// Build from row-major data.
    ///
    /// # Errors
    /// `MatrixShape` if `data.len() != rows * cols` or the shape overflows.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<f64>) -> Result<Self> {
        if entry_count(rows, cols).ok() != Some(data.len()) {
            return Err(QuadBoundError::MatrixShape {
                rows,
                cols,
                found: data.len(),
            });
        }
        Ok(Self { rows, cols, data })
    }

    /// Parse the first `rows * cols` whitespace-separated numbers of `text`.
    /// Anything after them is ignored.
    pub fn parse(rows: usize, cols: usize, text: &str) -> Result<Self> {
        let needed = entry_count(rows, cols)?;
        let mut data = Vec::new();
        for (index, token) in text.split_whitespace().take(needed).enumerate() {
            let v = token.parse::<f64>().map_err(|_| QuadBoundError::MatrixParse {
                index,
                token: token.to_string(),
            })?;
            data.push(v);
        }
        if data.len() < needed {
            return Err(QuadBoundError::MatrixShape {
                rows,
                cols,
                found: data.len(),
            });
        }
        Ok(Self { rows, cols, data })
    }

    /// Read and parse a matrix from any reader.
    pub fn from_reader<R: Read>(rows: usize, cols: usize, mut reader: R) -> Result<Self> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        Self::parse(rows, cols, &text)
    }

    /// Load a matrix from a text file.
    pub fn load<P: AsRef<Path>>(path: P, rows: usize, cols: usize) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(rows, cols, BufReader::new(file))
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Entry at `(row, col)`.
    ///
    /// # Errors
    /// `MatrixIndex` if either index is out of bounds. An evaluator that
    /// propagates this with `?` surfaces as an evaluation failure.
    pub fn get(&self, row: usize, col: usize) -> Result<f64> {
        if row >= self.rows || col >= self.cols {
            return Err(QuadBoundError::MatrixIndex {
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(self.data[row * self.cols + col])
    }

    /// Row `row` as a slice.
    pub fn row(&self, row: usize) -> Result<&[f64]> {
        if row >= self.rows {
            return Err(QuadBoundError::MatrixIndex {
                row,
                col: 0,
                rows: self.rows,
                cols: self.cols,
            });
        }
        let start = row * self.cols;
        Ok(&self.data[start..start + self.cols])
    }

    /// All entries in row-major order.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_row_major() {
        let m = Matrix::parse(2, 3, "1 2 3\n4 5 6\n").unwrap();
        assert_eq!(m.rows(), 2);
        assert_eq!(m.cols(), 3);
        assert_eq!(m.get(0, 2).unwrap(), 3.0);
        assert_eq!(m.get(1, 0).unwrap(), 4.0);
        assert_eq!(m.row(1).unwrap(), &[4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_parse_ignores_layout_and_trailing_values() {
        let m = Matrix::parse(2, 2, "  1.5\t-2e-1 \n\n 3   4 99 100").unwrap();
        assert_eq!(m.as_slice(), &[1.5, -0.2, 3.0, 4.0]);
    }

    #[test]
    fn test_parse_too_few_values() {
        match Matrix::parse(3, 3, "1 2 3 4") {
            Err(QuadBoundError::MatrixShape { rows, cols, found }) => {
                assert_eq!((rows, cols, found), (3, 3, 4));
            }
            other => panic!("expected MatrixShape, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_bad_token() {
        match Matrix::parse(1, 3, "1 two 3") {
            Err(QuadBoundError::MatrixParse { index, token }) => {
                assert_eq!(index, 1);
                assert_eq!(token, "two");
            }
            other => panic!("expected MatrixParse, got {:?}", other),
        }
    }

    #[test]
    fn test_from_reader() {
        let text = b"0.5 0.25\n0.125 1\n";
        let m = Matrix::from_reader(2, 2, &text[..]).unwrap();
        assert_eq!(m.get(1, 1).unwrap(), 1.0);
    }

    #[test]
    fn test_load_missing_file() {
        let err = Matrix::load("/nonexistent/definitely/matrix.txt", 2, 2).unwrap_err();
        assert!(matches!(err, QuadBoundError::MatrixIo(_)));
    }

    #[test]
    fn test_index_out_of_bounds() {
        let m = Matrix::zeros(2, 2).unwrap();
        assert!(m.get(2, 0).is_err());
        assert!(m.get(0, 2).is_err());
        assert!(m.row(5).is_err());
        assert_eq!(m.get(1, 1).unwrap(), 0.0);
    }

    #[test]
    fn test_overflowing_shape_is_an_error() {
        match Matrix::parse(usize::MAX, 2, "1 2") {
            Err(QuadBoundError::MatrixShape { rows, cols, .. }) => {
                assert_eq!((rows, cols), (usize::MAX, 2));
            }
            other => panic!("expected MatrixShape, got {:?}", other),
        }
        assert!(matches!(
            Matrix::zeros(2, usize::MAX),
            Err(QuadBoundError::MatrixShape { .. })
        ));
        assert!(matches!(
            Matrix::from_vec(usize::MAX, usize::MAX, vec![1.0]),
            Err(QuadBoundError::MatrixShape { found: 1, .. })
        ));
        let err = Matrix::from_reader(usize::MAX, 3, "1 2 3".as_bytes()).unwrap_err();
        assert_eq!(err.return_code(), crate::error::ReturnCode::MatrixFailure);
    }

    #[test]
    fn test_from_vec_shape_check() {
        assert!(Matrix::from_vec(2, 2, vec![1.0; 4]).is_ok());
        assert!(Matrix::from_vec(2, 2, vec![1.0; 3]).is_err());
    }
}
