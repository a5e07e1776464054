//! Bracketing of real roots with Lagrange bounds and their refinement by bisection.
//!
//! The Lagrange bound `L` of a polynomial bounds its positive real roots from above.
//! Applying it to the reversed polynomial (reciprocal roots), to `p(-x)` (negated roots)
//! and to both yields two intervals that contain all positive and all negative real roots:
//!
//! ```
//! use numkit::poly::{roots::BisectionOptions, univariate::Polynomial};
//!
//! let p = Polynomial::new(vec![1., 0., -2.]).unwrap();
//! let bounds = p.root_bounds().unwrap();
//! let positive = bounds.positive_interval();
//! assert!(positive.lower < 2f64.sqrt() && 2f64.sqrt() < positive.upper);
//!
//! let r = p.bisect(positive, &BisectionOptions::default());
//! assert!((r.root - 2f64.sqrt()).abs() < 1e-6);
//! ```

use std::fmt::Display;

use thiserror::Error;
use tracing::{debug, instrument, warn};

use super::univariate::Polynomial;

/// Errors that can occur when bounding or bracketing roots.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RootError {
    #[error("The Lagrange bound is undefined for a polynomial with a zero leading coefficient")]
    DegenerateLagrangeBound,
    #[error("A constant polynomial has no roots to bound")]
    ConstantPolynomial,
    #[error("Invalid interval ({lower}, {upper}): the lower end should be smaller than the upper end")]
    InvalidInterval { lower: f64, upper: f64 },
}

impl Polynomial {
    /// Compute the Lagrange upper bound `L = 1 + (|b|/a_0)^(1/k)` of the positive real roots,
    /// where `b` is the most negative coefficient and `k` the index of the first negative coefficient.
    ///
    /// Without negative coefficients the bound is `1`. A negative leading coefficient is
    /// handled by negating the polynomial, which does not change its roots.
    pub fn lagrange_bound(&self) -> Result<f64, RootError> {
        let n = self.degree();
        if n == 0 {
            return Err(RootError::ConstantPolynomial);
        }

        let a0 = self.leading_coefficient();
        if a0 == 0. {
            return Err(RootError::DegenerateLagrangeBound);
        }
        let sign = a0.signum();

        let mut first_negative = None;
        let mut b = 0f64;
        for (i, c) in self.coefficients().iter().enumerate().skip(1) {
            let c = c * sign;
            if c < 0. {
                first_negative.get_or_insert(i);
                b = b.min(c);
            }
        }

        let k = first_negative.unwrap_or(n);
        Ok(1. + (b.abs() / a0.abs()).powf(1. / k as f64))
    }

    /// Compute the Lagrange bounds of the positive and negative real roots.
    ///
    /// A zero constant term makes the reciprocal bounds undefined.
    #[instrument(level = "debug", skip_all, fields(degree = self.degree()))]
    pub fn root_bounds(&self) -> Result<RootBounds, RootError> {
        let positive_upper = self.lagrange_bound()?;
        if self.constant_term() == 0. {
            debug!("Zero constant term: the reciprocal bounds are undefined");
            return Err(RootError::DegenerateLagrangeBound);
        }

        let negated = self.negated_argument();
        let bounds = RootBounds {
            positive_upper,
            positive_reciprocal: self.reversed().lagrange_bound()?,
            negative_upper: negated.lagrange_bound()?,
            negative_reciprocal: negated.reversed().lagrange_bound()?,
        };

        debug!("Root bounds: {:?}", bounds);
        Ok(bounds)
    }

    /// Refine a root of the polynomial in `interval` by bisection.
    pub fn bisect(&self, interval: RootInterval, options: &BisectionOptions) -> BisectionResult {
        bisect(|x| self.evaluate(x), interval, options)
    }

    /// Bracket the real roots inside the Lagrange intervals by scanning each interval for
    /// sign changes on `subdivisions` equal parts, and refine every bracket by bisection.
    ///
    /// Roots of even multiplicity and roots closer together than the scan step
    /// may be missed.
    pub fn approximate_roots(
        &self,
        subdivisions: usize,
        options: &BisectionOptions,
    ) -> Result<Vec<BisectionResult>, RootError> {
        let bounds = self.root_bounds()?;

        let mut res = vec![];
        for interval in [bounds.negative_interval(), bounds.positive_interval()] {
            if interval.is_empty() {
                continue;
            }

            for bracket in interval.scan_sign_changes(|x| self.evaluate(x), subdivisions) {
                res.push(self.bisect(bracket, options));
            }
        }

        Ok(res)
    }
}

/// The four Lagrange bounds of a polynomial `p` of degree `n`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RootBounds {
    /// Bound `L` of the positive roots of `p`.
    pub positive_upper: f64,
    /// Bound of the positive roots of `x^n p(1/x)`.
    pub positive_reciprocal: f64,
    /// Bound of the positive roots of `p(-x)`.
    pub negative_upper: f64,
    /// Bound of the positive roots of `x^n p(-1/x)`.
    pub negative_reciprocal: f64,
}

impl RootBounds {
    /// The interval `(1/L_rev, L)` that contains all positive roots.
    pub fn positive_interval(&self) -> RootInterval {
        RootInterval {
            lower: 1. / self.positive_reciprocal,
            upper: self.positive_upper,
        }
    }

    /// The interval `(-L_neg, -1/L_negrev)` that contains all negative roots.
    pub fn negative_interval(&self) -> RootInterval {
        RootInterval {
            lower: -self.negative_upper,
            upper: -1. / self.negative_reciprocal,
        }
    }
}

/// A real interval `(lower, upper)`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RootInterval {
    pub lower: f64,
    pub upper: f64,
}

impl RootInterval {
    pub fn new(lower: f64, upper: f64) -> Result<RootInterval, RootError> {
        if !(lower < upper) || !lower.is_finite() || !upper.is_finite() {
            return Err(RootError::InvalidInterval { lower, upper });
        }

        Ok(RootInterval { lower, upper })
    }

    /// Return true iff the interval contains no point, which is the case for
    /// the bound interval of a polynomial without roots of that sign.
    pub fn is_empty(&self) -> bool {
        !(self.lower < self.upper)
    }

    #[inline]
    pub fn midpoint(&self) -> f64 {
        (self.lower + self.upper) / 2.
    }

    #[inline]
    pub fn contains(&self, x: f64) -> bool {
        self.lower <= x && x <= self.upper
    }

    /// Check the precondition of bisection: `f(lower) f(upper) <= 0`.
    pub fn has_sign_change(&self, f: impl Fn(f64) -> f64) -> bool {
        f(self.lower) * f(self.upper) <= 0.
    }

    /// Split the interval into `subdivisions` equal parts and return those with a sign change.
    /// A root that falls exactly on a split point is reported once.
    pub fn scan_sign_changes(
        &self,
        f: impl Fn(f64) -> f64,
        subdivisions: usize,
    ) -> Vec<RootInterval> {
        let subdivisions = subdivisions.max(1);
        let step = (self.upper - self.lower) / subdivisions as f64;

        let mut res = vec![];
        let mut a = self.lower;
        let mut fa = f(a);
        let mut root_at_a = false;
        for s in 1..=subdivisions {
            let b = if s == subdivisions {
                self.upper
            } else {
                self.lower + s as f64 * step
            };
            let fb = f(b);

            if fa * fb <= 0. && !(root_at_a && fb != 0.) {
                res.push(RootInterval { lower: a, upper: b });
            }

            root_at_a = fb == 0.;
            a = b;
            fa = fb;
        }

        res
    }
}

impl Display for RootInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.lower, self.upper)
    }
}

/// Settings of the bisection refiner.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BisectionOptions {
    /// Stop once half the width of the interval is at most this value.
    pub tolerance: f64,
    pub max_iterations: usize,
}

impl Default for BisectionOptions {
    fn default() -> Self {
        BisectionOptions {
            tolerance: 1e-6,
            max_iterations: 1000,
        }
    }
}

/// Why the bisection stopped.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Termination {
    /// The interval became narrower than the tolerance.
    Converged,
    /// The function is zero at the returned point.
    ExactRoot,
    /// The iteration budget ran out: the returned midpoint is a best effort.
    IterationBudgetExhausted,
}

impl Display for Termination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Termination::Converged => f.write_str("converged"),
            Termination::ExactRoot => f.write_str("exact root"),
            Termination::IterationBudgetExhausted => f.write_str("iteration budget exhausted"),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BisectionResult {
    pub root: f64,
    pub iterations: usize,
    /// Half the width of the last interval, a bound on the error of `root`
    /// when the interval brackets a root.
    pub half_width: f64,
    pub termination: Termination,
}

/// Approximate a root of `f` in `interval` by repeated halving.
///
/// The caller should check [RootInterval::has_sign_change] first: without a sign change,
/// the refiner returns the first midpoint as if it were a root.
#[instrument(level = "debug", skip(f, options), fields(tolerance = options.tolerance))]
pub fn bisect(
    f: impl Fn(f64) -> f64,
    interval: RootInterval,
    options: &BisectionOptions,
) -> BisectionResult {
    let (mut a, mut b) = (interval.lower, interval.upper);

    for end in [a, b] {
        if f(end) == 0. {
            return BisectionResult {
                root: end,
                iterations: 0,
                half_width: 0.,
                termination: Termination::ExactRoot,
            };
        }
    }

    let mut iterations = 0;
    let mut half_width = (b - a) / 2.;
    while iterations < options.max_iterations && half_width > options.tolerance {
        let m = (a + b) / 2.;
        let (fa, fb, fm) = (f(a), f(b), f(m));

        if fa * fm < 0. {
            b = m;
        } else if fb * fm < 0. {
            a = m;
        } else {
            debug!("Exact root at {} after {} iterations", m, iterations);
            return BisectionResult {
                root: m,
                iterations,
                half_width,
                termination: Termination::ExactRoot,
            };
        }

        iterations += 1;
        half_width = (b - a) / 2.;
    }

    let termination = if half_width <= options.tolerance {
        Termination::Converged
    } else {
        warn!(
            "Bisection stopped after {} iterations with half width {}",
            iterations, half_width
        );
        Termination::IterationBudgetExhausted
    };

    BisectionResult {
        root: (a + b) / 2.,
        iterations,
        half_width,
        termination,
    }
}

#[cfg(test)]
mod test {
    use super::{bisect, BisectionOptions, RootError, RootInterval, Termination};
    use crate::poly::univariate::Polynomial;

    #[test]
    fn lagrange() {
        let p = Polynomial::new(vec![1., 0., -2.]).unwrap();
        let l = p.lagrange_bound().unwrap();
        assert!(l >= 2f64.sqrt());
        assert!((l - (1. + 2f64.sqrt())).abs() < 1e-12);

        // no negative coefficient
        let p = Polynomial::new(vec![1., 2., 1.]).unwrap();
        assert_eq!(p.lagrange_bound().unwrap(), 1.);

        // x^3 - 2x^2 - 9: k = 1, b = -9
        let p = Polynomial::new(vec![1., -2., 0., -9.]).unwrap();
        assert_eq!(p.lagrange_bound().unwrap(), 10.);

        // same roots with a negative leading coefficient
        let p = Polynomial::new(vec![-1., 2., 0., 9.]).unwrap();
        assert_eq!(p.lagrange_bound().unwrap(), 10.);
    }

    #[test]
    fn lagrange_degenerate() {
        let p = Polynomial::new(vec![0., 1., -2.]).unwrap();
        assert_eq!(p.lagrange_bound(), Err(RootError::DegenerateLagrangeBound));

        // zero constant term: the reciprocal polynomial has a zero leading coefficient
        let p = Polynomial::new(vec![1., -1., 0.]).unwrap();
        assert_eq!(p.root_bounds(), Err(RootError::DegenerateLagrangeBound));

        let p = Polynomial::new(vec![3.]).unwrap();
        assert_eq!(p.lagrange_bound(), Err(RootError::ConstantPolynomial));
    }

    #[test]
    fn bounds_contain_roots() {
        // (x - 1)(x - 2)(x + 3)(x + 0.5)
        let p = Polynomial::new(vec![1., 0.5, -7., 2.5, 3.]).unwrap();
        let b = p.root_bounds().unwrap();

        let pos = b.positive_interval();
        let neg = b.negative_interval();
        for r in [1., 2.] {
            assert!(pos.contains(r), "{} not in {}", r, pos);
        }
        for r in [-3., -0.5] {
            assert!(neg.contains(r), "{} not in {}", r, neg);
        }
    }

    #[test]
    fn bounds_without_positive_roots() {
        let p = Polynomial::new(vec![1., 0., 1.]).unwrap();
        let b = p.root_bounds().unwrap();
        assert!(b.positive_interval().is_empty());
        assert!(b.negative_interval().is_empty());
        assert!(p
            .approximate_roots(100, &BisectionOptions::default())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn bisection_sqrt2() {
        let p = Polynomial::new(vec![1., 0., -2.]).unwrap();
        let i = RootInterval::new(1., 2.).unwrap();
        assert!(i.has_sign_change(|x| p.evaluate(x)));

        let r = p.bisect(i, &BisectionOptions::default());
        assert_eq!(r.termination, Termination::Converged);
        assert!((r.root - 2f64.sqrt()).abs() <= 1e-6);
        assert!(r.iterations < 1000);
        assert!(r.half_width <= 1e-6);
    }

    #[test]
    fn bisection_budget() {
        let opts = BisectionOptions {
            tolerance: 1e-12,
            max_iterations: 3,
        };
        let r = bisect(|x| x * x - 2., RootInterval::new(1., 2.).unwrap(), &opts);
        assert_eq!(r.termination, Termination::IterationBudgetExhausted);
        assert_eq!(r.iterations, 3);
        assert!((r.root - 2f64.sqrt()).abs() <= 1. / 16.);
    }

    #[test]
    fn bisection_exact() {
        let f = |x: f64| x * x - 4.;
        let opts = BisectionOptions::default();

        let r = bisect(f, RootInterval::new(0., 4.).unwrap(), &opts);
        assert_eq!(r.termination, Termination::ExactRoot);
        assert_eq!(r.root, 2.);
        assert_eq!(r.iterations, 0);

        let r = bisect(f, RootInterval::new(2., 5.).unwrap(), &opts);
        assert_eq!(r.termination, Termination::ExactRoot);
        assert_eq!(r.root, 2.);
    }

    #[test]
    fn interval() {
        assert_eq!(
            RootInterval::new(2., 1.),
            Err(RootError::InvalidInterval {
                lower: 2.,
                upper: 1.
            })
        );
        assert!(RootInterval::new(1., f64::NAN).is_err());

        let i = RootInterval::new(-1., 3.).unwrap();
        assert_eq!(i.midpoint(), 1.);
        assert!(!i.has_sign_change(|x| x * x + 1.));
    }

    #[test]
    fn scan() {
        // roots at -1 and 1, the latter on a split point
        let f = |x: f64| x * x - 1.;
        let i = RootInterval::new(-1.5, 2.).unwrap();
        let brackets = i.scan_sign_changes(f, 7);

        assert_eq!(brackets.len(), 2);
        assert_eq!(brackets[0], RootInterval { lower: -1.5, upper: -1. });
        assert_eq!(brackets[1], RootInterval { lower: 0.5, upper: 1. });
    }

    #[test]
    fn all_roots() {
        let p = Polynomial::new(vec![1., 0.5, -7., 2.5, 3.]).unwrap();
        let opts = BisectionOptions {
            tolerance: 1e-9,
            ..Default::default()
        };
        let roots = p.approximate_roots(1000, &opts).unwrap();

        let mut found: Vec<f64> = roots.iter().map(|r| r.root).collect();
        found.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(found.len(), 4);
        for (r, e) in found.iter().zip([-3., -0.5, 1., 2.]) {
            assert!((r - e).abs() < 1e-8, "{} vs {}", r, e);
        }
    }
}
