//! Text rendering of matrices, vectors and numbers in arbitrary bases.

use std::fmt::{self, Write};

use thiserror::Error;

use crate::tensors::matrix::{Matrix, Vector};

/// Options that control how numbers are printed.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PrintOptions {
    /// The number of digits after the decimal point.
    pub precision: usize,
    /// Separate the last column of an augmented `n x (n+1)` matrix with a bar.
    pub augmented_bar: bool,
}

impl PrintOptions {
    pub fn with_precision(precision: usize) -> PrintOptions {
        PrintOptions {
            precision,
            ..Default::default()
        }
    }
}

impl Default for PrintOptions {
    fn default() -> Self {
        PrintOptions {
            precision: 4,
            augmented_bar: true,
        }
    }
}

/// A printer for matrices, one row per line.
pub struct MatrixPrinter<'a> {
    pub matrix: &'a Matrix,
    pub opts: PrintOptions,
}

impl<'a> MatrixPrinter<'a> {
    pub fn new(matrix: &'a Matrix) -> MatrixPrinter<'a> {
        MatrixPrinter {
            matrix,
            opts: PrintOptions::default(),
        }
    }

    pub fn new_with_options(matrix: &'a Matrix, opts: PrintOptions) -> MatrixPrinter<'a> {
        MatrixPrinter { matrix, opts }
    }
}

impl<'a> fmt::Display for MatrixPrinter<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let m = self.matrix;
        let prec = self.opts.precision;
        let bar = self.opts.augmented_bar && m.system_size().is_ok();

        let cells: Vec<String> = m
            .row_iter()
            .flatten()
            .map(|e| format!("{:.*}", prec, e))
            .collect();
        let width = cells.iter().map(|c| c.len()).max().unwrap_or(0);

        for (ri, row) in cells.chunks(m.ncols().max(1)).enumerate() {
            if ri > 0 {
                f.write_char('\n')?;
            }

            f.write_char('[')?;
            for (ci, c) in row.iter().enumerate() {
                if bar && ci + 1 == m.ncols() {
                    f.write_str(" |")?;
                }
                write!(f, " {:>width$}", c, width = width)?;
            }
            f.write_str(" ]")?;
        }

        Ok(())
    }
}

/// A printer for vectors, in the form `{x0, x1, ...}`.
pub struct VectorPrinter<'a> {
    pub vector: &'a Vector,
    pub opts: PrintOptions,
}

impl<'a> VectorPrinter<'a> {
    pub fn new(vector: &'a Vector) -> VectorPrinter<'a> {
        VectorPrinter {
            vector,
            opts: PrintOptions::default(),
        }
    }

    pub fn new_with_options(vector: &'a Vector, opts: PrintOptions) -> VectorPrinter<'a> {
        VectorPrinter { vector, opts }
    }
}

impl<'a> fmt::Display for VectorPrinter<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_char('{')?;
        for (i, e) in self.vector.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{:.*}", self.opts.precision, e)?;
        }
        f.write_char('}')
    }
}

/// Errors that can occur when writing a number in another base.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RadixError {
    #[error("Base {0} is not supported, it should be between 2 and 36")]
    InvalidBase(u32),
    #[error("Cannot convert {0} to another base")]
    NotFinite(f64),
    #[error("The integer part needs {needed} columns, but only {available} are available")]
    IntegerOverflow { needed: usize, available: usize },
}

/// The layout of a number written by [format_radix].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RadixFormat {
    /// Columns reserved for the sign and the integer digits.
    pub int_digits: usize,
    /// The maximal number of digits after the radix point.
    pub frac_digits: usize,
}

impl Default for RadixFormat {
    fn default() -> Self {
        RadixFormat {
            int_digits: 20,
            frac_digits: 20,
        }
    }
}

#[inline]
fn radix_digit(d: u32) -> char {
    // `d` is always smaller than the base, which is at most 36
    char::from_digit(d, 36).map_or('?', |c| c.to_ascii_uppercase())
}

/// Write `num` in base `base` as a fixed-width field of `int_digits + frac_digits + 1`
/// characters.
///
/// The integer part is right-aligned in the first `int_digits` columns. If the number has
/// a fractional part, a `.` follows, and then at most `frac_digits` digits, computed by
/// repeatedly multiplying the fraction by the base. Unused columns are spaces.
///
/// ```
/// use numkit::printer::{format_radix, RadixFormat};
///
/// let f = RadixFormat { int_digits: 4, frac_digits: 4 };
/// assert_eq!(format_radix(10.5, 16, f).unwrap(), "   A.8   ");
/// ```
pub fn format_radix(num: f64, base: u32, format: RadixFormat) -> Result<String, RadixError> {
    if !(2..=36).contains(&base) {
        return Err(RadixError::InvalidBase(base));
    }
    if !num.is_finite() {
        return Err(RadixError::NotFinite(num));
    }

    let negative = num < 0.;
    let abs = num.abs();
    let int_part = abs.trunc();
    let mut frac = abs - int_part;

    // u64::MAX as f64 rounds up to 2^64
    if int_part >= u64::MAX as f64 {
        return Err(RadixError::IntegerOverflow {
            needed: format.int_digits + 1,
            available: format.int_digits,
        });
    }

    let mut int = int_part as u64;
    let mut digits = vec![];
    loop {
        digits.push(radix_digit((int % base as u64) as u32));
        int /= base as u64;
        if int == 0 {
            break;
        }
    }
    if negative {
        digits.push('-');
    }

    if digits.len() > format.int_digits {
        return Err(RadixError::IntegerOverflow {
            needed: digits.len(),
            available: format.int_digits,
        });
    }

    let size = format.int_digits + format.frac_digits + 1;
    let mut out = vec![' '; size];

    for (k, d) in (0..format.int_digits).rev().zip(&digits) {
        out[k] = *d;
    }

    if frac > 0. {
        out[format.int_digits] = '.';

        let mut k = format.int_digits + 1;
        while frac > 0. && k < size {
            frac *= base as f64;
            let d = frac.trunc();
            out[k] = radix_digit(d as u32);
            frac -= d;
            k += 1;
        }
    }

    Ok(out.into_iter().collect())
}

#[cfg(test)]
mod test {
    use super::{format_radix, PrintOptions, RadixError, RadixFormat};
    use crate::tensors::matrix::{Matrix, Vector};
    use crate::printer::{MatrixPrinter, VectorPrinter};

    const SMALL: RadixFormat = RadixFormat {
        int_digits: 4,
        frac_digits: 4,
    };

    #[test]
    fn radix_integers() {
        assert_eq!(format_radix(255., 16, SMALL).unwrap(), "  FF     ");
        assert_eq!(format_radix(8., 8, SMALL).unwrap(), "  10     ");
        assert_eq!(format_radix(5., 2, SMALL).unwrap(), " 101     ");
        assert_eq!(format_radix(0., 2, SMALL).unwrap(), "   0     ");
        assert_eq!(format_radix(35., 36, SMALL).unwrap(), "   Z     ");
    }

    #[test]
    fn radix_fractions() {
        assert_eq!(format_radix(10.5, 16, SMALL).unwrap(), "   A.8   ");
        assert_eq!(format_radix(0.75, 2, SMALL).unwrap(), "   0.11  ");
        // 0.1 is not finite in base 2: the digits are cut off
        assert_eq!(format_radix(0.1, 2, SMALL).unwrap(), "   0.0001");
        assert_eq!(format_radix(2.25, 8, SMALL).unwrap(), "   2.2   ");
    }

    #[test]
    fn radix_default_width() {
        let s = format_radix(1., 16, RadixFormat::default()).unwrap();
        assert_eq!(s.len(), 41);
        assert_eq!(s.trim(), "1");
        assert_eq!(s.find('1'), Some(19));
    }

    #[test]
    fn radix_negative() {
        assert_eq!(format_radix(-10.5, 16, SMALL).unwrap(), "  -A.8   ");
        assert_eq!(
            format_radix(-255., 2, SMALL),
            Err(RadixError::IntegerOverflow {
                needed: 9,
                available: 4
            })
        );
    }

    #[test]
    fn radix_errors() {
        assert_eq!(format_radix(1., 1, SMALL), Err(RadixError::InvalidBase(1)));
        assert_eq!(format_radix(1., 37, SMALL), Err(RadixError::InvalidBase(37)));
        assert!(matches!(
            format_radix(f64::NAN, 2, SMALL),
            Err(RadixError::NotFinite(_))
        ));
        assert_eq!(
            format_radix(16., 2, SMALL),
            Err(RadixError::IntegerOverflow {
                needed: 5,
                available: 4
            })
        );
        assert!(format_radix(1e30, 16, RadixFormat::default()).is_err());
    }

    #[test]
    fn print_matrix() {
        let m = Matrix::from_linear(vec![2., 1., 5., 1., 3., 10.], 2, 3).unwrap();
        assert_eq!(
            format!("{}", MatrixPrinter::new_with_options(&m, PrintOptions::with_precision(1))),
            "[  2.0  1.0 |  5.0 ]\n[  1.0  3.0 | 10.0 ]"
        );

        let opts = PrintOptions {
            precision: 0,
            augmented_bar: false,
        };
        assert_eq!(
            format!("{}", MatrixPrinter::new_with_options(&m, opts)),
            "[  2  1  5 ]\n[  1  3 10 ]"
        );
    }

    #[test]
    fn print_vector() {
        let v = Vector::new(vec![1., -3.5]);
        assert_eq!(format!("{}", v), "{1.0000, -3.5000}");
        assert_eq!(
            format!(
                "{}",
                VectorPrinter::new_with_options(&v, PrintOptions::with_precision(1))
            ),
            "{1.0, -3.5}"
        );
    }
}
