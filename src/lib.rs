//! Numkit is a small toolkit of classical numerical methods.
//!
//! It converts real numbers to other bases, solves dense linear systems
//! by Gauss and Gauss-Jordan elimination, and brackets and refines the
//! real roots of polynomials with Lagrange bounds and bisection.
//!
//! For example:
//!
//! ```
//! use numkit::{
//!     parser::parse_matrix_str,
//!     tensors::elimination::{Classification, EliminationOptions, Method},
//! };
//!
//! let m = parse_matrix_str("2\n2 1 5\n1 3 10").unwrap();
//! let s = m
//!     .reduce(Method::Gauss, &EliminationOptions::default())
//!     .unwrap()
//!     .solve();
//!
//! assert_eq!(s.classification, Classification::Determined);
//! println!("x = {}", s.values);
//! ```
//!
//! The binary wraps these methods in an interactive menu, see [menu::Menu].

pub mod menu;
pub mod parser;
pub mod poly;
pub mod printer;
pub mod settings;
pub mod tensors;
