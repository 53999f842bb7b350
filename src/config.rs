//! Suite and review configuration.
//!
//! Both structs carry sensible defaults. `SuiteConfig` can also be read from
//! YAML, missing keys falling back to their defaults:
//!
//! ```yaml
//! echo: true              # mirror recorded lines to stdout
//! results_dir: golden     # directory next to the suite's source file
//! ```

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::GoldenError;

/// Default name of the directory holding reference and scratch files.
pub const DEFAULT_RESULTS_DIR: &str = "test_results";

/// Configuration for a golden suite.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SuiteConfig {
    /// Also print every recorded line to standard output.
    pub echo: bool,
    /// Name of the results directory, relative to the declaring source file.
    pub results_dir: String,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            echo: false,
            results_dir: DEFAULT_RESULTS_DIR.to_string(),
        }
    }
}

impl SuiteConfig {
    /// Default configuration with screen echo switched on or off.
    pub fn with_echo(echo: bool) -> Self {
        Self {
            echo,
            ..Self::default()
        }
    }

    pub fn from_yaml_str(source: &str) -> Result<Self, GoldenError> {
        Self::parse(source, "<inline>")
    }

    pub fn load(path: &Path) -> Result<Self, GoldenError> {
        let content = fs::read_to_string(path).map_err(|e| GoldenError::Config {
            origin: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::parse(&content, &path.display().to_string())
    }

    fn parse(source: &str, origin: &str) -> Result<Self, GoldenError> {
        // An empty document deserializes as unit, not as an empty mapping.
        if source.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(source).map_err(|e| GoldenError::Config {
            origin: origin.to_string(),
            message: e.to_string(),
        })?;
        if config.results_dir.trim().is_empty() {
            return Err(GoldenError::Config {
                origin: origin.to_string(),
                message: "results_dir must not be empty".to_string(),
            });
        }
        Ok(config)
    }
}

/// Configuration for rendering pending artifacts.
#[derive(Debug, Clone)]
pub struct ReviewConfig {
    pub use_colors: bool,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            use_colors: atty::is(atty::Stream::Stdout),
        }
    }
}
