use std::fmt::{Display, Write};

use thiserror::Error;

/// Errors that can occur when constructing a polynomial.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PolynomialError {
    #[error("A polynomial needs at least one coefficient")]
    Empty,
    #[error("Coefficient {index} is not a finite number")]
    NotFinite { index: usize },
}

/// A dense real univariate polynomial
/// `a_0 x^n + a_1 x^(n-1) + ... + a_n`, stored with
/// the coefficient of the highest degree first.
#[derive(Clone, PartialEq, Debug)]
pub struct Polynomial {
    coefficients: Vec<f64>,
}

impl Polynomial {
    /// Create a polynomial from its coefficients, highest degree first.
    ///
    /// The leading coefficient may be zero; operations that need a true
    /// degree-`n` polynomial check it themselves.
    pub fn new(coefficients: Vec<f64>) -> Result<Polynomial, PolynomialError> {
        if coefficients.is_empty() {
            return Err(PolynomialError::Empty);
        }
        if let Some(index) = coefficients.iter().position(|c| !c.is_finite()) {
            return Err(PolynomialError::NotFinite { index });
        }

        Ok(Polynomial { coefficients })
    }

    /// The coefficients, highest degree first.
    #[inline]
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    /// The nominal degree `n`, i.e. the number of coefficients minus one.
    #[inline]
    pub fn degree(&self) -> usize {
        self.coefficients.len() - 1
    }

    #[inline]
    pub fn leading_coefficient(&self) -> f64 {
        self.coefficients[0]
    }

    #[inline]
    pub fn constant_term(&self) -> f64 {
        self.coefficients[self.degree()]
    }

    /// Evaluate the polynomial at `x` using nested multiplication
    /// (Horner, or Briot-Ruffini).
    pub fn evaluate(&self, x: f64) -> f64 {
        let mut acc = self.coefficients[0];
        for c in &self.coefficients[1..] {
            acc = acc * x + c;
        }
        acc
    }

    /// Return `x^n p(1/x)`, whose roots are the reciprocals of the roots of `p`.
    pub fn reversed(&self) -> Polynomial {
        Polynomial {
            coefficients: self.coefficients.iter().rev().copied().collect(),
        }
    }

    /// Return `p(-x)`, whose roots are the negated roots of `p`.
    pub fn negated_argument(&self) -> Polynomial {
        let n = self.degree();
        Polynomial {
            coefficients: self
                .coefficients
                .iter()
                .enumerate()
                .map(|(i, c)| if (n - i) % 2 == 1 { -c } else { *c })
                .collect(),
        }
    }
}

impl Display for Polynomial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let n = self.degree();
        let mut first = true;
        for (i, c) in self.coefficients.iter().enumerate() {
            if *c == 0. {
                continue;
            }

            let e = n - i;
            if first {
                if *c < 0. {
                    f.write_char('-')?;
                }
                first = false;
            } else if *c < 0. {
                f.write_str(" - ")?;
            } else {
                f.write_str(" + ")?;
            }

            let a = c.abs();
            if a != 1. || e == 0 {
                write!(f, "{}", a)?;
            }
            match e {
                0 => {}
                1 => f.write_char('x')?,
                _ => write!(f, "x^{}", e)?,
            }
        }

        if first {
            f.write_char('0')?;
        }

        Ok(())
    }
}
