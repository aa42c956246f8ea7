//! # Series Core
//!
//! Truncated summation of the gamma-function series
//!
//! ```text
//!            n-1       Γ(2i+1)
//!   S(n) =   Σ    ─────────────────────────
//!           i=0   4^i · Γ(i+1)² · (2i+1)
//! ```
//!
//! Each addend is `C(2i,i) / (4^i · (2i+1))`, the Maclaurin coefficients of
//! `arcsin(x)` at `x = 1`, so the partial sums climb monotonically towards
//! `π/2`. Convergence is slow: the remainder after `n` terms is roughly
//! `1/√(πn)`.
//!
//! ```rust,ignore
//! use series_core::{compute_series, Series, TermMethod};
//!
//! assert_eq!(compute_series(0)?, 0.0);
//! let s = Series::new(TermMethod::Gamma).sum(30)?;
//! ```

pub mod benchmark;
pub mod convergence;
pub mod series;

pub use benchmark::{Benchmark, BenchmarkResult};
pub use convergence::{remainder, terms_for_tolerance, LIMIT};
pub use series::{compute_series, term, PartialSums, Series, TermMethod};

/// Result type for series-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in series-core
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Term {index} overflowed double precision")]
    Overflow { index: usize },

    #[error("No convergence within {max_terms} terms (remainder {remainder:e})")]
    NotConverged { max_terms: usize, remainder: f64 },

    #[error("Unknown term method: {0}")]
    UnknownMethod(String),
}
