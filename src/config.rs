//! Analysis configuration loading and validation.
//!
//! ```toml
//! [period]
//! smoothing = 0.0001
//! weighting = "swell_envelope"
//! singular_bin = "exclude"
//!
//! [validation]
//! tolerance = 0.2
//! ```
//!
//! Files ending in `.json` are read as JSON, everything else as TOML.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::analysis::PeriodConfig;

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("Failed to read config file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// TOML syntax or schema error
    #[error("Failed to parse config as TOML: {0}")]
    Toml(#[from] toml::de::Error),

    /// JSON syntax or schema error
    #[error("Failed to parse config as JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Values parse but are out of range
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Top-level analysis configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Period statistics options.
    #[serde(default)]
    pub period: PeriodConfig,

    /// Hs validation options.
    #[serde(default)]
    pub validation: ValidationConfig,
}

/// Options for comparing computed and reported wave heights.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Maximum accepted |computed - reported| Hs (m).
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
}

fn default_tolerance() -> f64 {
    0.2
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            tolerance: default_tolerance(),
        }
    }
}

impl AnalysisConfig {
    /// Parse from a TOML string and validate.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse from a JSON string and validate.
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(step) = self.period.smoothing {
            if !(step.is_finite() && step > 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "period.smoothing must be a positive step in Hz, got {step}"
                )));
            }
        }

        let tol = self.validation.tolerance;
        if !(tol.is_finite() && tol >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "validation.tolerance must be non-negative, got {tol}"
            )));
        }

        Ok(())
    }
}

/// Load configuration from a file.
pub fn load_config(path: &Path) -> Result<AnalysisConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let config = if path.extension().is_some_and(|e| e == "json") {
        AnalysisConfig::from_json(&content)?
    } else {
        AnalysisConfig::from_toml(&content)?
    };

    tracing::debug!(path = %path.display(), ?config, "loaded analysis config");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{SingularBinPolicy, Weighting};
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = AnalysisConfig::from_toml("").unwrap();
        assert_eq!(config, AnalysisConfig::default());
        assert_eq!(config.period.smoothing, None);
        assert!((config.validation.tolerance - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_full_toml() {
        let content = r#"
[period]
smoothing = 0.0001
weighting = "swell_envelope"
singular_bin = "exclude"

[validation]
tolerance = 0.1
"#;
        let config = AnalysisConfig::from_toml(content).unwrap();
        assert_eq!(config.period.smoothing, Some(1e-4));
        assert_eq!(config.period.weighting, Weighting::SwellEnvelope);
        assert_eq!(config.period.singular_bin, SingularBinPolicy::Exclude);
        assert!((config.validation.tolerance - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_rejects_bad_values() {
        let result = AnalysisConfig::from_toml("[period]\nsmoothing = -1.0\n");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));

        let result = AnalysisConfig::from_toml("[validation]\ntolerance = -0.5\n");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));

        let result = AnalysisConfig::from_toml("[period]\nweighting = \"boxcar\"\n");
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn test_load_json() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"validation": {{"tolerance": 0.05}}}}"#).unwrap();

        let config = load_config(file.path()).unwrap();
        assert!((config.validation.tolerance - 0.05).abs() < 1e-12);
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_config(Path::new("/nonexistent/buoy.toml"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }
}
