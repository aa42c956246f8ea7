//! Throughput benchmark
//!
//! Repeatedly sums a fixed number of terms and reports the rate. Wall-clock
//! figures depend on the machine, so they are reported and never asserted.
//!
//! Reference workload: 2,000,000 evaluations of `S(30)`.

use crate::series::{Series, TermMethod};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::hint::black_box;
use std::time::{Duration, Instant};

pub const DEFAULT_ITERATIONS: u64 = 2_000_000;
pub const DEFAULT_TERMS: usize = 30;

/// Benchmark result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkResult {
    /// Term evaluation strategy
    pub method: TermMethod,
    /// Terms summed per call
    pub terms: usize,
    /// Number of calls
    pub iterations: u64,
    /// Total wall-clock time
    pub elapsed: Duration,
    /// Calls per second
    pub calls_per_sec: f64,
    /// Average nanoseconds per call
    pub ns_per_call: f64,
    /// Value of the last call
    pub value: f64,
}

/// Benchmark runner
pub struct Benchmark;

impl Benchmark {
    /// Run the reference workload
    pub fn run_default(method: TermMethod) -> Result<BenchmarkResult> {
        Self::run(DEFAULT_TERMS, DEFAULT_ITERATIONS, method)
    }

    pub fn run(terms: usize, iterations: u64, method: TermMethod) -> Result<BenchmarkResult> {
        if iterations == 0 {
            return Err(Error::InvalidArgument("iterations must be at least 1".into()));
        }

        let series = Series::new(method);

        // Surface overflow before timing anything
        let mut value = series.sum(terms)?;

        tracing::info!(terms, iterations, method = %method, "Starting series benchmark...");

        let start = Instant::now();
        for _ in 0..iterations {
            value = black_box(series.sum(black_box(terms))?);
        }
        let elapsed = start.elapsed();

        let secs = elapsed.as_secs_f64();
        let calls_per_sec = if secs > 0.0 { iterations as f64 / secs } else { f64::INFINITY };
        let ns_per_call = elapsed.as_nanos() as f64 / iterations as f64;

        tracing::info!("Benchmark complete: {:.0} calls/s, {:.1} ns/call", calls_per_sec, ns_per_call);

        Ok(BenchmarkResult {
            method,
            terms,
            iterations,
            elapsed,
            calls_per_sec,
            ns_per_call,
            value,
        })
    }
}
