//! # Series Config
//!
//! YAML configuration for the series tools.
//!
//! Lookup order, later wins:
//!
//! ```text
//! defaults  →  ~/.config/gamma-series/config.yaml  →  SERIES_* environment
//! ```

use series_core::TermMethod;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const ENV_METHOD: &str = "SERIES_METHOD";
pub const ENV_TERMS: &str = "SERIES_TERMS";
pub const ENV_BENCH_ITERATIONS: &str = "SERIES_BENCH_ITERATIONS";
pub const ENV_BENCH_TERMS: &str = "SERIES_BENCH_TERMS";
pub const ENV_TOLERANCE: &str = "SERIES_TOLERANCE";

/// Result type for series-config operations
pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid value for {var}: {value}")]
    InvalidEnv { var: &'static str, value: String },

    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchmarkConfig {
    /// Number of timed calls
    pub iterations: u64,
    /// Terms summed per call
    pub terms: usize,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            iterations: series_core::benchmark::DEFAULT_ITERATIONS,
            terms: series_core::benchmark::DEFAULT_TERMS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeriesConfig {
    /// Term evaluation strategy
    pub method: TermMethod,
    /// Default term count for `compute` and `table`
    pub terms: usize,
    /// Tolerance used by the self-check
    pub tolerance: f64,
    /// Workload for `bench`
    pub benchmark: BenchmarkConfig,
}

impl Default for SeriesConfig {
    fn default() -> Self {
        Self {
            method: TermMethod::Recurrence,
            terms: 30,
            tolerance: 1e-9,
            benchmark: BenchmarkConfig::default(),
        }
    }
}

impl SeriesConfig {
    /// `<config_dir>/gamma-series/config.yaml`
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("gamma-series")
            .join("config.yaml")
    }

    /// Load from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: SeriesConfig = serde_yaml::from_str(&content)?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Load the file at `path` (or the default location), apply the
    /// environment and validate.
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        let path = path.map(Path::to_path_buf).unwrap_or_else(Self::default_path);
        let mut config = Self::load(&path)?;
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_yaml::to_string(self)?)?;
        Ok(())
    }

    /// Override fields from `SERIES_*` variables.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_vars(|var| std::env::var(var).ok())
    }

    fn apply_vars<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_METHOD) {
            self.method = parse_var(ENV_METHOD, value)?;
        }
        if let Some(value) = lookup(ENV_TERMS) {
            self.terms = parse_var(ENV_TERMS, value)?;
        }
        if let Some(value) = lookup(ENV_BENCH_ITERATIONS) {
            self.benchmark.iterations = parse_var(ENV_BENCH_ITERATIONS, value)?;
        }
        if let Some(value) = lookup(ENV_BENCH_TERMS) {
            self.benchmark.terms = parse_var(ENV_BENCH_TERMS, value)?;
        }
        if let Some(value) = lookup(ENV_TOLERANCE) {
            self.tolerance = parse_var(ENV_TOLERANCE, value)?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "tolerance must be positive and finite, got {}",
                self.tolerance
            )));
        }
        if self.benchmark.iterations == 0 {
            return Err(ConfigError::Invalid("benchmark.iterations must be at least 1".into()));
        }
        Ok(())
    }
}

fn parse_var<T: std::str::FromStr>(var: &'static str, value: String) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidEnv { var, value })
}
