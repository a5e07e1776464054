//! Dense matrices and the solution of linear systems by elimination.

pub mod elimination;
pub mod matrix;
