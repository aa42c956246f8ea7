//! Correctness checks
//!
//! Prints one line per passing check and stops at the first failure.

use anyhow::{ensure, Result};
use series_config::SeriesConfig;
use series_core::{compute_series, Error, Series, TermMethod, LIMIT};

/// Largest term count the direct gamma formula sums without overflow.
const GAMMA_SAFE_TERMS: usize = 85;

const MONOTONIC_TERMS: i64 = 1_000;

type Check = fn(&SeriesConfig) -> Result<()>;

const CHECKS: &[(&str, Check)] = &[
    ("TestSmallValues", small_values as Check),
    ("TestLargeValues", large_values as Check),
    ("TestMonotonic", monotonic as Check),
    ("TestBounded", bounded as Check),
    ("TestNegativeInput", negative_input as Check),
    ("TestMethodsAgree", methods_agree as Check),
];

/// Run every check. Returns `false` on the first failure.
pub fn run_all(config: &SeriesConfig) -> bool {
    println!("Running checks...");

    for (name, check) in CHECKS {
        if let Err(e) = check(config) {
            eprintln!("{} FAILED: {:#}", name, e);
            return false;
        }
        println!("{} passed.", name);
    }

    println!("All checks passed!");
    true
}

fn close(a: f64, b: f64, tolerance: f64) -> bool {
    (a - b).abs() < tolerance
}

fn small_values(config: &SeriesConfig) -> Result<()> {
    let s0 = compute_series(0)?;
    ensure!(s0 == 0.0, "S(0) = {}, expected exactly 0", s0);

    let s1 = compute_series(1)?;
    ensure!(close(s1, 1.0, config.tolerance), "S(1) = {}, expected 1", s1);

    let s2 = compute_series(2)?;
    let expected = 1.0 + 1.0 / 6.0;
    ensure!(close(s2, expected, config.tolerance), "S(2) = {}, expected {}", s2, expected);
    Ok(())
}

fn large_values(_config: &SeriesConfig) -> Result<()> {
    let s10 = compute_series(10)?;
    ensure!(s10 > 0.0, "S(10) = {} is not positive", s10);
    ensure!(s10 < 5.0, "S(10) = {} is not below 5", s10);
    Ok(())
}

fn monotonic(_config: &SeriesConfig) -> Result<()> {
    let mut previous = compute_series(0)?;
    for n in 1..=MONOTONIC_TERMS {
        let current = compute_series(n)?;
        ensure!(previous <= current, "S({}) = {} exceeds S({}) = {}", n - 1, previous, n, current);
        previous = current;
    }
    Ok(())
}

fn bounded(_config: &SeriesConfig) -> Result<()> {
    for (i, partial) in Series::default().partial_sums().take(MONOTONIC_TERMS as usize).enumerate() {
        let sum = partial?;
        ensure!(sum < LIMIT, "S({}) = {} is not below pi/2", i + 1, sum);
    }
    Ok(())
}

fn negative_input(_config: &SeriesConfig) -> Result<()> {
    match compute_series(-1) {
        Err(Error::InvalidArgument(_)) => Ok(()),
        other => anyhow::bail!("S(-1) returned {:?}, expected InvalidArgument", other),
    }
}

fn methods_agree(config: &SeriesConfig) -> Result<()> {
    let reference = Series::new(TermMethod::Recurrence);
    for method in [TermMethod::Gamma, TermMethod::LogGamma] {
        let series = Series::new(method);
        for n in [1, 2, 10, 30, GAMMA_SAFE_TERMS] {
            let a = reference.sum(n)?;
            let b = series.sum(n)?;
            ensure!(close(a, b, config.tolerance), "{} S({}) = {}, recurrence gives {}", method, n, b, a);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_checks_pass_with_defaults() {
        let config = SeriesConfig::default();
        for (name, check) in CHECKS {
            assert!(check(&config).is_ok(), "{} failed", name);
        }
        assert!(run_all(&config));
    }

    #[test]
    fn test_close() {
        assert!(close(1.0, 1.0 + 1e-12, 1e-9));
        assert!(!close(1.0, 1.1, 1e-9));
    }
}
