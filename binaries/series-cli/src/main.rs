//! Series CLI
//!
//! Command-line front end for the gamma-series summation.

mod check;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;

use series_config::SeriesConfig;
use series_core::{remainder, terms_for_tolerance, Benchmark, Series, TermMethod, LIMIT};

#[derive(Parser)]
#[command(name = "series")]
#[command(about = "Truncated gamma-function series converging to pi/2")]
#[command(version)]
struct Cli {
    /// Config file (default: ~/.config/gamma-series/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print machine-readable JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sum the first N terms
    Compute {
        /// Number of terms (negative values are rejected)
        #[arg(allow_hyphen_values = true)]
        n: Option<i64>,

        /// recurrence, gamma or log-gamma
        #[arg(short, long)]
        method: Option<TermMethod>,
    },

    /// Print every term with its running sum
    Table {
        n: Option<usize>,

        #[arg(short, long)]
        method: Option<TermMethod>,
    },

    /// Number of terms needed to get within EPS of pi/2
    Tolerance {
        eps: f64,

        #[arg(long, default_value_t = 10_000_000)]
        max_terms: usize,
    },

    /// Run the correctness checks
    Check,

    /// Time repeated evaluations
    Bench {
        #[arg(short, long)]
        iterations: Option<u64>,

        #[arg(short, long)]
        terms: Option<usize>,

        #[arg(short, long)]
        method: Option<TermMethod>,
    },
}

#[derive(Debug, Serialize)]
struct ComputeOutput {
    n: i64,
    method: TermMethod,
    value: f64,
    remainder: f64,
}

#[derive(Debug, Serialize)]
struct TableRow {
    index: usize,
    term: f64,
    sum: f64,
    remainder: f64,
}

#[derive(Debug, Serialize)]
struct ToleranceOutput {
    tolerance: f64,
    terms: usize,
    remainder: f64,
}

fn main() -> Result<()> {
    init_logging();

    let cli = Cli::parse();
    let config = SeriesConfig::resolve(cli.config.as_deref()).context("Failed to load configuration")?;
    tracing::debug!(
        path = %cli.config.clone().unwrap_or_else(SeriesConfig::default_path).display(),
        method = %config.method,
        terms = config.terms,
        "configuration resolved"
    );

    match cli.command {
        Commands::Compute { n, method } => {
            let n = match n {
                Some(n) => n,
                None => configured_terms(config.terms)?,
            };
            let method = method.unwrap_or(config.method);
            cmd_compute(n, method, cli.json)
        }
        Commands::Table { n, method } => {
            cmd_table(n.unwrap_or(config.terms), method.unwrap_or(config.method), cli.json)
        }
        Commands::Tolerance { eps, max_terms } => cmd_tolerance(eps, max_terms, cli.json),
        Commands::Check => {
            if !check::run_all(&config) {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Bench { iterations, terms, method } => cmd_bench(
            terms.unwrap_or(config.benchmark.terms),
            iterations.unwrap_or(config.benchmark.iterations),
            method.unwrap_or(config.method),
            cli.json,
        ),
    }
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("series=info,series_core=info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn configured_terms(terms: usize) -> Result<i64> {
    i64::try_from(terms).with_context(|| format!("Configured term count {} does not fit in i64", terms))
}

fn compute(series: &Series, n: i64) -> Result<ComputeOutput> {
    let value = series
        .sum_checked(n)
        .with_context(|| format!("Failed to sum {} terms with {}", n, series.method()))?;

    Ok(ComputeOutput {
        n,
        method: series.method(),
        value,
        remainder: LIMIT - value,
    })
}

fn table(series: &Series, n: usize) -> Result<Vec<TableRow>> {
    let terms = series
        .terms(n)
        .with_context(|| format!("Failed to evaluate {} terms with {}", n, series.method()))?;

    let mut sum = 0.0;
    Ok(terms
        .into_iter()
        .enumerate()
        .map(|(index, term)| {
            sum += term;
            TableRow {
                index,
                term,
                sum,
                remainder: LIMIT - sum,
            }
        })
        .collect())
}

fn tolerance(eps: f64, max_terms: usize) -> Result<ToleranceOutput> {
    let terms = terms_for_tolerance(eps, max_terms)?;
    Ok(ToleranceOutput {
        tolerance: eps,
        terms,
        remainder: remainder(terms)?,
    })
}

fn cmd_compute(n: i64, method: TermMethod, json: bool) -> Result<()> {
    let out = compute(&Series::new(method), n)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("S({}) = {:.15}", out.n, out.value);
        println!("  method:    {}", out.method);
        println!("  remainder: {:.3e}", out.remainder);
    }
    Ok(())
}

fn cmd_table(n: usize, method: TermMethod, json: bool) -> Result<()> {
    let series = Series::new(method);
    let rows = table(&series, n)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    println!("method: {}", series.method());
    println!("{:>6}  {:>22}  {:>20}  {:>11}", "i", "term(i)", "S(i+1)", "remainder");
    for row in &rows {
        println!(
            "{:>6}  {:>22.15e}  {:>20.15}  {:>11.3e}",
            row.index, row.term, row.sum, row.remainder
        );
    }
    Ok(())
}

fn cmd_tolerance(eps: f64, max_terms: usize, json: bool) -> Result<()> {
    let out = tolerance(eps, max_terms)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!(
            "{} terms bring S(n) within {:e} of pi/2 (remainder {:.3e})",
            out.terms, out.tolerance, out.remainder
        );
    }
    Ok(())
}

fn cmd_bench(terms: usize, iterations: u64, method: TermMethod, json: bool) -> Result<()> {
    let result = Benchmark::run(terms, iterations, method).context("Benchmark failed")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("Benchmark: S({}) x {} [{}]", result.terms, result.iterations, result.method);
        println!("  elapsed:   {:.3?}", result.elapsed);
        println!("  rate:      {:.0} calls/s", result.calls_per_sec);
        println!("  per call:  {:.1} ns", result.ns_per_call);
        println!("  value:     {:.15}", result.value);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_configured_terms() {
        assert_eq!(configured_terms(30).unwrap(), 30);
        if usize::BITS >= 64 {
            let max = usize::try_from(i64::MAX).unwrap();
            assert_eq!(configured_terms(max).unwrap(), i64::MAX);
            assert!(configured_terms(usize::MAX).is_err());
        }
    }

    #[test]
    fn test_compute_negative_rejected() {
        let err = compute(&Series::default(), -3).unwrap_err();
        let core = err.downcast_ref::<series_core::Error>().unwrap();
        assert!(matches!(core, series_core::Error::InvalidArgument(_)));
    }

    #[test]
    fn test_compute_gamma_overflow() {
        let err = compute(&Series::new(TermMethod::Gamma), 200).unwrap_err();
        assert_eq!(
            err.downcast_ref::<series_core::Error>(),
            Some(&series_core::Error::Overflow { index: 85 })
        );
    }

    #[test]
    fn test_compute_json_shape() {
        let out = compute(&Series::new(TermMethod::LogGamma), 2).unwrap();
        let json = serde_json::to_value(&out).unwrap();
        assert_eq!(json["n"], 2);
        assert_eq!(json["method"], "log-gamma");
        assert!((json["value"].as_f64().unwrap() - (1.0 + 1.0 / 6.0)).abs() < 1e-9);
        assert!((json["remainder"].as_f64().unwrap() - (LIMIT - out.value)).abs() < 1e-15);
    }

    #[test]
    fn test_table_rows() {
        let rows = table(&Series::default(), 3).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].index, 0);
        assert_eq!(rows[0].term, 1.0);
        assert!((rows[2].sum - (1.0 + 1.0 / 6.0 + 3.0 / 40.0)).abs() < 1e-12);

        let json = serde_json::to_value(&rows).unwrap();
        let first = json[1].as_object().unwrap();
        for key in ["index", "term", "sum", "remainder"] {
            assert!(first.contains_key(key), "missing {}", key);
        }
        assert!(table(&Series::default(), 0).unwrap().is_empty());
    }

    #[test]
    fn test_tolerance_output() {
        let out = tolerance(1e-1, 1_000).unwrap();
        assert!(out.terms > 0);
        assert!(out.remainder < 1e-1);

        let json = serde_json::to_value(&out).unwrap();
        assert_eq!(json["terms"], out.terms);
        assert_eq!(json["tolerance"], 1e-1);

        assert!(tolerance(0.0, 10).is_err());
    }
}
