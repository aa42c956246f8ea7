//! Term evaluation and partial sums
//!
//! Three ways to evaluate the same addend:
//!
//! ```text
//!   Recurrence   c_0 = 1,  c_i = c_{i-1} · (2i-1)(2i) / (4i²),  term_i = c_i / (2i+1)
//!   Gamma        Γ(2i+1) / (4^i · Γ(i+1)² · (2i+1))              overflows from i = 85
//!   LogGamma     exp(lnΓ(2i+1) − i·ln4 − 2·lnΓ(i+1)) / (2i+1)
//! ```

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How each addend is evaluated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TermMethod {
    /// Ratio of consecutive terms. Stays finite for every index.
    #[default]
    Recurrence,
    /// Direct gamma-function formula.
    Gamma,
    /// Gamma ratio taken in log space.
    LogGamma,
}

impl TermMethod {
    pub const ALL: [TermMethod; 3] = [TermMethod::Recurrence, TermMethod::Gamma, TermMethod::LogGamma];

    pub fn name(&self) -> &'static str {
        match self {
            TermMethod::Recurrence => "recurrence",
            TermMethod::Gamma => "gamma",
            TermMethod::LogGamma => "log-gamma",
        }
    }
}

impl fmt::Display for TermMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TermMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "recurrence" | "rec" => Ok(TermMethod::Recurrence),
            "gamma" | "tgamma" => Ok(TermMethod::Gamma),
            "log-gamma" | "loggamma" | "lgamma" => Ok(TermMethod::LogGamma),
            other => Err(Error::UnknownMethod(other.to_string())),
        }
    }
}

/// Sum the first `n` terms with the default method.
///
/// Negative `n` is rejected with [`Error::InvalidArgument`]; `n = 0` is the
/// empty sum `0.0`.
pub fn compute_series(n: i64) -> Result<f64> {
    Series::default().sum_checked(n)
}

/// Evaluate the single addend at `index`.
pub fn term(index: usize, method: TermMethod) -> Result<f64> {
    let value = match method {
        TermMethod::Recurrence => {
            let mut central = 1.0;
            for k in 1..=index {
                central = next_central(central, k);
            }
            central / (2 * index + 1) as f64
        }
        TermMethod::Gamma => gamma_term(index)?,
        TermMethod::LogGamma => log_gamma_term(index),
    };

    if value.is_finite() {
        Ok(value)
    } else {
        Err(Error::Overflow { index })
    }
}

/// `C(2k,k) / 4^k` from its predecessor.
#[inline]
fn next_central(previous: f64, k: usize) -> f64 {
    let k = k as f64;
    previous * (2.0 * k - 1.0) * (2.0 * k) / (4.0 * k * k)
}

fn gamma_term(index: usize) -> Result<f64> {
    let i = index as f64;
    let numerator = libm::tgamma(2.0 * i + 1.0);
    let denominator = 4f64.powf(i) * libm::tgamma(i + 1.0).powi(2) * (2.0 * i + 1.0);

    // An infinite denominator would silently turn the term into 0.0
    if !numerator.is_finite() || !denominator.is_finite() {
        return Err(Error::Overflow { index });
    }
    Ok(numerator / denominator)
}

fn log_gamma_term(index: usize) -> f64 {
    let i = index as f64;
    let log_ratio = libm::lgamma(2.0 * i + 1.0) - i * std::f64::consts::LN_2 * 2.0 - 2.0 * libm::lgamma(i + 1.0);
    log_ratio.exp() / (2.0 * i + 1.0)
}

/// Series evaluator bound to one [`TermMethod`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Series {
    method: TermMethod,
}

impl Series {
    pub fn new(method: TermMethod) -> Self {
        Self { method }
    }

    pub fn method(&self) -> TermMethod {
        self.method
    }

    /// Sum of the first `n` terms.
    pub fn sum(&self, n: usize) -> Result<f64> {
        tracing::debug!(terms = n, method = %self.method, "summing series");

        let mut total = 0.0;
        for partial in self.partial_sums().take(n) {
            total = partial?;
        }
        Ok(total)
    }

    /// Like [`Series::sum`], for a signed term count. Negative `n` is an
    /// [`Error::InvalidArgument`].
    pub fn sum_checked(&self, n: i64) -> Result<f64> {
        let n = usize::try_from(n)
            .map_err(|_| Error::InvalidArgument(format!("term count must be non-negative, got {}", n)))?;
        self.sum(n)
    }

    /// Running sums `S(1), S(2), ...`.
    ///
    /// The iterator is unbounded for `Recurrence` and `LogGamma`. For `Gamma`
    /// it yields one `Err(Overflow)` and then stops.
    pub fn partial_sums(&self) -> PartialSums {
        PartialSums::new(self.method)
    }

    /// Every addend of the first `n` terms, in order.
    pub fn terms(&self, n: usize) -> Result<Vec<f64>> {
        let mut sums = self.partial_sums();
        (0..n).map(|_| sums.advance()).collect()
    }
}

/// Iterator over running sums, carrying the recurrence state between steps.
#[derive(Debug, Clone)]
pub struct PartialSums {
    method: TermMethod,
    index: usize,
    central: f64,
    sum: f64,
    done: bool,
}

impl PartialSums {
    fn new(method: TermMethod) -> Self {
        Self {
            method,
            index: 0,
            central: 1.0,
            sum: 0.0,
            done: false,
        }
    }

    /// Add the next term to the running sum and return the term itself.
    fn advance(&mut self) -> Result<f64> {
        let value = self.next_term()?;
        self.sum += value;
        self.index += 1;
        Ok(value)
    }

    fn next_term(&mut self) -> Result<f64> {
        let index = self.index;
        let value = match self.method {
            TermMethod::Recurrence => {
                if index > 0 {
                    self.central = next_central(self.central, index);
                }
                self.central / (2 * index + 1) as f64
            }
            TermMethod::Gamma => gamma_term(index)?,
            TermMethod::LogGamma => log_gamma_term(index),
        };

        if value.is_finite() {
            Ok(value)
        } else {
            Err(Error::Overflow { index })
        }
    }
}

impl Iterator for PartialSums {
    type Item = Result<f64>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.advance() {
            Ok(_) => Some(Ok(self.sum)),
            Err(e) => {
                tracing::debug!(index = self.index, method = %self.method, "term evaluation failed: {}", e);
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_zero_terms_is_exact_zero() {
        assert_eq!(compute_series(0).unwrap(), 0.0);
        for method in TermMethod::ALL {
            assert_eq!(Series::new(method).sum(0).unwrap(), 0.0);
        }
    }

    #[test]
    fn test_small_values() {
        assert!((compute_series(1).unwrap() - 1.0).abs() < EPS);
        assert!((compute_series(2).unwrap() - (1.0 + 1.0 / 6.0)).abs() < EPS);
        // 1 + 1/6 + 3/40
        assert!((compute_series(3).unwrap() - (1.0 + 1.0 / 6.0 + 3.0 / 40.0)).abs() < EPS);
    }

    #[test]
    fn test_large_values_bounded() {
        let s = compute_series(10).unwrap();
        assert!(s > 0.0);
        assert!(s < 5.0);
        assert!(s < std::f64::consts::FRAC_PI_2);
    }

    #[test]
    fn test_negative_rejected() {
        match compute_series(-1) {
            Err(Error::InvalidArgument(msg)) => assert!(msg.contains("-1")),
            other => panic!("expected InvalidArgument, got {:?}", other),
        }
        assert!(compute_series(i64::MIN).is_err());
    }

    #[test]
    fn test_sum_checked() {
        for method in TermMethod::ALL {
            let series = Series::new(method);
            assert_eq!(series.method(), method);
            assert_eq!(series.sum_checked(10).unwrap(), series.sum(10).unwrap());
            assert!(matches!(series.sum_checked(-3), Err(Error::InvalidArgument(_))));
        }
        assert_eq!(Series::default().method(), TermMethod::Recurrence);
        assert_eq!(compute_series(7).unwrap(), Series::default().sum_checked(7).unwrap());
    }

    #[test]
    fn test_monotonic_non_decreasing() {
        let mut previous = compute_series(0).unwrap();
        for n in 1..200 {
            let current = compute_series(n).unwrap();
            assert!(previous <= current, "S({}) = {} > S({}) = {}", n - 1, previous, n, current);
            previous = current;
        }
    }

    #[test]
    fn test_partial_sums_match_sum() {
        let series = Series::default();
        let sums: Vec<f64> = series.partial_sums().take(25).map(|s| s.unwrap()).collect();
        assert_eq!(sums.len(), 25);
        assert_eq!(sums[24], series.sum(25).unwrap());
    }

    #[test]
    fn test_methods_agree() {
        let reference = Series::new(TermMethod::Recurrence).sum(80).unwrap();
        let direct = Series::new(TermMethod::Gamma).sum(80).unwrap();
        let logged = Series::new(TermMethod::LogGamma).sum(80).unwrap();
        assert!((reference - direct).abs() < EPS);
        assert!((reference - logged).abs() < EPS);
    }

    #[test]
    fn test_single_term_matches_iterator() {
        let terms = Series::default().terms(40).unwrap();
        for (i, expected) in terms.iter().enumerate() {
            let got = term(i, TermMethod::Recurrence).unwrap();
            assert!((got - expected).abs() < 1e-15, "term {}", i);
        }
        assert!((term(1, TermMethod::Gamma).unwrap() - 1.0 / 6.0).abs() < EPS);
        assert!((term(1, TermMethod::LogGamma).unwrap() - 1.0 / 6.0).abs() < EPS);
    }

    #[test]
    fn test_gamma_overflow_reported() {
        assert!(Series::new(TermMethod::Gamma).sum(85).is_ok());
        assert_eq!(
            Series::new(TermMethod::Gamma).sum(200),
            Err(Error::Overflow { index: 85 })
        );
        assert_eq!(term(300, TermMethod::Gamma), Err(Error::Overflow { index: 300 }));
    }

    #[test]
    fn test_gamma_iterator_stops_after_overflow() {
        let mut sums = Series::new(TermMethod::Gamma).partial_sums().skip(85);
        assert!(matches!(sums.next(), Some(Err(Error::Overflow { .. }))));
        assert!(sums.next().is_none());
    }

    #[test]
    fn test_stable_methods_stay_finite() {
        let rec = Series::new(TermMethod::Recurrence).sum(100_000).unwrap();
        let log = Series::new(TermMethod::LogGamma).sum(10_000).unwrap();
        assert!(rec.is_finite() && rec < std::f64::consts::FRAC_PI_2);
        assert!(log.is_finite() && log < std::f64::consts::FRAC_PI_2);
    }

    #[test]
    fn test_method_parsing() {
        assert_eq!("gamma".parse::<TermMethod>().unwrap(), TermMethod::Gamma);
        assert_eq!("Log-Gamma".parse::<TermMethod>().unwrap(), TermMethod::LogGamma);
        assert_eq!(" recurrence ".parse::<TermMethod>().unwrap(), TermMethod::Recurrence);
        assert!(matches!("simpson".parse::<TermMethod>(), Err(Error::UnknownMethod(_))));
        for method in TermMethod::ALL {
            assert_eq!(method.to_string().parse::<TermMethod>().unwrap(), method);
        }
    }
}
