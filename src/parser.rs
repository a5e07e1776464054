//! Reading augmented systems from text.
//!
//! The format is a whitespace-separated list of tokens: first the number of
//! unknowns `n`, followed by the `n x (n+1)` entries of the augmented matrix
//! in row-major order. Every row holds `n` coefficients and one constant.
//!
//! ```text
//! 2
//! 2 1  5
//! 1 3 10
//! ```

use std::{
    fs::File,
    io::{self, BufReader, Read},
    path::{Path, PathBuf},
};

use thiserror::Error;
use tracing::{debug, instrument};

use crate::tensors::matrix::{Matrix, MatrixError};

/// Errors that can occur when reading a matrix.
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("File {} does not exist", .0.display())]
    NotFound(PathBuf),
    #[error("Could not read the input: {0}")]
    Io(#[from] io::Error),
    #[error("The input is empty: expected the number of unknowns")]
    MissingSize,
    #[error("Invalid number of unknowns '{0}': expected a positive integer")]
    InvalidSize(String),
    #[error("Premature end of data: expected {expected} entries, found {found}")]
    Truncated { expected: usize, found: usize },
    #[error("Invalid number '{token}' for entry {position}")]
    InvalidNumber { position: usize, token: String },
    #[error(transparent)]
    Matrix(#[from] MatrixError),
}

/// Read an augmented system from the file at `path`.
#[instrument(level = "debug", skip_all, fields(path = %path.as_ref().display()))]
pub fn read_matrix(path: impl AsRef<Path>) -> Result<Matrix, ReadError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => ReadError::NotFound(path.to_path_buf()),
        _ => ReadError::Io(e),
    })?;

    parse_matrix(BufReader::new(file))
}

/// Read an augmented system from `input`.
pub fn parse_matrix(mut input: impl Read) -> Result<Matrix, ReadError> {
    let mut text = String::new();
    input.read_to_string(&mut text)?;
    parse_matrix_str(&text)
}

/// Parse an augmented system from a string.
pub fn parse_matrix_str(text: &str) -> Result<Matrix, ReadError> {
    let mut tokens = text.split_ascii_whitespace();

    let size = tokens.next().ok_or(ReadError::MissingSize)?;
    let n = match size.parse::<usize>() {
        Ok(n) if n > 0 => n,
        _ => return Err(ReadError::InvalidSize(size.to_owned())),
    };

    let ncols = n
        .checked_add(1)
        .ok_or_else(|| ReadError::InvalidSize(size.to_owned()))?;
    let mut m = Matrix::new(n, ncols)?;
    // the allocation succeeded, so the product fits
    let expected = n * ncols;

    for position in 0..expected {
        let token = tokens.next().ok_or(ReadError::Truncated {
            expected,
            found: position,
        })?;

        let value = token
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| ReadError::InvalidNumber {
                position,
                token: token.to_owned(),
            })?;

        m[(position / ncols, position % ncols)] = value;
    }

    let rest = tokens.count();
    if rest > 0 {
        debug!("Ignoring {} trailing tokens", rest);
    }

    Ok(m)
}

#[cfg(test)]
mod test {
    use super::{parse_matrix_str, read_matrix, ReadError};
    use crate::tensors::matrix::MatrixError;

    #[test]
    fn parse() {
        let m = parse_matrix_str("2\n2 1 5\n1 3 10\n").unwrap();
        assert_eq!(m.nrows(), 2);
        assert_eq!(m.to_linear(), vec![2., 1., 5., 1., 3., 10.]);

        let m = parse_matrix_str("  1\t-2.5e1   3  trailing").unwrap();
        assert_eq!(m.to_linear(), vec![-25., 3.]);
    }

    #[test]
    fn truncated() {
        assert!(matches!(
            parse_matrix_str("2\n2 1 5\n1 3"),
            Err(ReadError::Truncated {
                expected: 6,
                found: 5
            })
        ));
        assert!(matches!(
            parse_matrix_str("3"),
            Err(ReadError::Truncated {
                expected: 12,
                found: 0
            })
        ));
    }

    #[test]
    fn malformed() {
        assert!(matches!(parse_matrix_str(""), Err(ReadError::MissingSize)));
        assert!(matches!(parse_matrix_str(" \n "), Err(ReadError::MissingSize)));
        assert!(matches!(parse_matrix_str("0 1"), Err(ReadError::InvalidSize(s)) if s == "0"));
        assert!(matches!(parse_matrix_str("-2"), Err(ReadError::InvalidSize(_))));
        assert!(matches!(parse_matrix_str("2.5"), Err(ReadError::InvalidSize(_))));
        assert!(matches!(
            parse_matrix_str("1 4 x"),
            Err(ReadError::InvalidNumber { position: 1, token }) if token == "x"
        ));
        assert!(matches!(
            parse_matrix_str("1 nan 1"),
            Err(ReadError::InvalidNumber { position: 0, .. })
        ));
    }

    #[test]
    fn too_large() {
        assert!(matches!(
            parse_matrix_str("100000000000"),
            Err(ReadError::Matrix(MatrixError::Allocation { .. }))
        ));
        assert!(matches!(
            parse_matrix_str("18446744073709551615 1"),
            Err(ReadError::InvalidSize(s)) if s == "18446744073709551615"
        ));
    }

    #[test]
    fn missing_file() {
        assert!(matches!(
            read_matrix("/this/file/does/not/exist.txt"),
            Err(ReadError::NotFound(_))
        ));
    }
}
