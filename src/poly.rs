//! Real univariate polynomials and the bracketing of their real roots.

pub mod roots;
pub mod univariate;
