//! Run-time settings of the toolkit.
//!
//! The defaults live here so that the command line of the binary and the
//! library agree on them.

use std::path::PathBuf;

use thiserror::Error;

use crate::{
    poly::roots::BisectionOptions,
    printer::{PrintOptions, RadixFormat},
    tensors::elimination::EliminationOptions,
};

pub const DEFAULT_TOLERANCE: f64 = 1e-6;
pub const DEFAULT_MAX_ITERATIONS: usize = 1000;
pub const DEFAULT_ZERO_TOLERANCE: f64 = 1e-12;
pub const DEFAULT_PRECISION: usize = 6;
pub const DEFAULT_INT_DIGITS: usize = 20;
pub const DEFAULT_FRAC_DIGITS: usize = 20;
pub const DEFAULT_SCAN_SUBDIVISIONS: usize = 1000;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SettingsError {
    #[error("The tolerance should be a positive number, got {0}")]
    Tolerance(f64),
    #[error("The zero tolerance should be a non-negative number, got {0}")]
    ZeroTolerance(f64),
    #[error("At least one bisection iteration is needed")]
    MaxIterations,
    #[error("At least one integer digit is needed to write a number")]
    IntDigits,
    #[error("At least one subdivision is needed to scan for sign changes")]
    Subdivisions,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub elimination: EliminationOptions,
    pub bisection: BisectionOptions,
    pub radix: RadixFormat,
    pub print: PrintOptions,
    /// The number of parts in which a Lagrange interval is split to look for sign changes.
    pub scan_subdivisions: usize,
    /// Clear the terminal before showing the menu.
    pub clear_screen: bool,
    /// The file offered when a linear system is requested.
    pub matrix_file: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            elimination: EliminationOptions {
                zero_tolerance: DEFAULT_ZERO_TOLERANCE,
                record_steps: true,
            },
            bisection: BisectionOptions {
                tolerance: DEFAULT_TOLERANCE,
                max_iterations: DEFAULT_MAX_ITERATIONS,
            },
            radix: RadixFormat {
                int_digits: DEFAULT_INT_DIGITS,
                frac_digits: DEFAULT_FRAC_DIGITS,
            },
            print: PrintOptions::with_precision(DEFAULT_PRECISION),
            scan_subdivisions: DEFAULT_SCAN_SUBDIVISIONS,
            clear_screen: true,
            matrix_file: None,
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        let tol = self.bisection.tolerance;
        if !(tol > 0.) || !tol.is_finite() {
            return Err(SettingsError::Tolerance(tol));
        }
        let zero_tol = self.elimination.zero_tolerance;
        if !(zero_tol >= 0.) || !zero_tol.is_finite() {
            return Err(SettingsError::ZeroTolerance(zero_tol));
        }
        if self.bisection.max_iterations == 0 {
            return Err(SettingsError::MaxIterations);
        }
        if self.radix.int_digits == 0 {
            return Err(SettingsError::IntDigits);
        }
        if self.scan_subdivisions == 0 {
            return Err(SettingsError::Subdivisions);
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::{Settings, SettingsError};

    #[test]
    fn defaults() {
        let s = Settings::default();
        assert_eq!(s.validate(), Ok(()));
        assert_eq!(s.bisection.max_iterations, 1000);
        assert_eq!(s.radix.int_digits + s.radix.frac_digits, 40);
        assert!(s.elimination.record_steps);
    }

    #[test]
    fn invalid() {
        let mut s = Settings::default();
        s.bisection.tolerance = 0.;
        assert_eq!(s.validate(), Err(SettingsError::Tolerance(0.)));

        let mut s = Settings::default();
        s.elimination.zero_tolerance = -1.;
        assert_eq!(s.validate(), Err(SettingsError::ZeroTolerance(-1.)));

        let mut s = Settings::default();
        s.radix.int_digits = 0;
        assert_eq!(s.validate(), Err(SettingsError::IntDigits));
    }
}
