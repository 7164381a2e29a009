//! YAML Configuration File Support for XMatch
//!
//! This module loads an engine and matcher setup from a single YAML file.
//!
//! ## Example YAML Configuration
//!
//! ```yaml
//! # XMatch configuration
//! version: "1.0"
//! name: "2-d positional match"
//!
//! engine:
//!   kind: anisotropic        # or "isotropic" with `error: 1.0`
//!   errors: [1.0, 0.5]
//!   bin_factor: 8.0
//!   normalize_scores: false
//!
//! matcher:
//!   version: 1
//!   mode: best               # all | best | best1 | best2
//!   use_parallel: true
//!   bound_filter: true
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;
use xmatch_engine::{
    AnisotropicCartesianEngine, CartesianEngine, DEFAULT_BIN_FACTOR, EngineError,
    IsotropicCartesianEngine,
};
use xmatch_rows::RowMatchConfig;

/// Errors that can occur when loading YAML configuration files
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unsupported config version: {0}")]
    UnsupportedVersion(String),

    #[error("invalid engine settings: {0}")]
    Engine(#[from] EngineError),
}

/// Top-level YAML configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct XmatchConfig {
    /// Configuration format version
    pub version: String,

    /// Optional configuration name/description
    #[serde(default)]
    pub name: Option<String>,

    pub engine: EngineYamlConfig,

    #[serde(default)]
    pub matcher: RowMatchConfig,
}

impl XmatchConfig {
    /// Load a YAML configuration file from the given path
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse YAML configuration from a string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: XmatchConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigLoadError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Build the configured engine.
    pub fn build_engine(&self) -> Result<CartesianEngine, ConfigLoadError> {
        self.engine.build().inspect_err(|err| {
            warn!(error = %err, kind = %self.engine.kind, "engine_config_rejected");
        })
    }

    fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.version.as_str() {
            "1.0" | "1" => Ok(()),
            v => Err(ConfigLoadError::UnsupportedVersion(v.to_string())),
        }?;

        self.engine.validate()?;
        self.matcher
            .validate()
            .map_err(|e| ConfigLoadError::Validation(format!("matcher: {e}")))?;

        // Catches errors only the engine itself checks (values, bin factor).
        self.build_engine()?;
        Ok(())
    }
}

/// Engine variant selector.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    /// One error shared by all axes.
    Isotropic,
    /// One error per axis.
    #[default]
    Anisotropic,
}

impl std::fmt::Display for EngineKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            EngineKind::Isotropic => "isotropic",
            EngineKind::Anisotropic => "anisotropic",
        })
    }
}

/// Engine YAML configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EngineYamlConfig {
    #[serde(default)]
    pub kind: EngineKind,

    /// Required for isotropic engines; checked against `errors` otherwise.
    #[serde(default)]
    pub dimensions: Option<usize>,

    /// Isotropic match radius.
    #[serde(default)]
    pub error: Option<f64>,

    /// Anisotropic per-axis errors.
    #[serde(default)]
    pub errors: Vec<f64>,

    #[serde(default = "default_bin_factor")]
    pub bin_factor: f64,

    /// Defaults to normalized for isotropic engines and raw for
    /// anisotropic ones.
    #[serde(default)]
    pub normalize_scores: Option<bool>,
}

impl EngineYamlConfig {
    fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.kind {
            EngineKind::Isotropic => {
                if self.dimensions.is_none() {
                    return Err(ConfigLoadError::Validation(
                        "engine.dimensions is required for isotropic engines".to_string(),
                    ));
                }
                if self.error.is_none() {
                    return Err(ConfigLoadError::Validation(
                        "engine.error is required for isotropic engines".to_string(),
                    ));
                }
                if !self.errors.is_empty() {
                    return Err(ConfigLoadError::Validation(
                        "engine.errors is only valid for anisotropic engines; use engine.error"
                            .to_string(),
                    ));
                }
            }
            EngineKind::Anisotropic => {
                if self.errors.is_empty() {
                    return Err(ConfigLoadError::Validation(
                        "engine.errors must list one error per axis".to_string(),
                    ));
                }
                if self.error.is_some() {
                    return Err(ConfigLoadError::Validation(
                        "engine.error is only valid for isotropic engines; use engine.errors"
                            .to_string(),
                    ));
                }
                if let Some(ndim) = self.dimensions
                    && ndim != self.errors.len()
                {
                    return Err(EngineError::ErrorCount {
                        expected: ndim,
                        got: self.errors.len(),
                    }
                    .into());
                }
            }
        }
        Ok(())
    }

    pub fn normalize_scores(&self) -> bool {
        self.normalize_scores
            .unwrap_or(self.kind == EngineKind::Isotropic)
    }

    fn build(&self) -> Result<CartesianEngine, ConfigLoadError> {
        let normalize = self.normalize_scores();
        let mut engine: CartesianEngine = match self.kind {
            EngineKind::Isotropic => {
                let (Some(ndim), Some(error)) = (self.dimensions, self.error) else {
                    return Err(ConfigLoadError::Validation(
                        "isotropic engine needs engine.dimensions and engine.error".to_string(),
                    ));
                };
                IsotropicCartesianEngine::new(ndim, error, normalize)?.into()
            }
            EngineKind::Anisotropic => {
                AnisotropicCartesianEngine::new(&self.errors, normalize)?.into()
            }
        };
        engine.set_bin_factor(self.bin_factor)?;
        Ok(engine)
    }
}

impl Default for EngineYamlConfig {
    fn default() -> Self {
        Self {
            kind: EngineKind::Anisotropic,
            dimensions: None,
            error: None,
            errors: vec![1.0, 1.0],
            bin_factor: DEFAULT_BIN_FACTOR,
            normalize_scores: None,
        }
    }
}

impl Default for XmatchConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            name: None,
            engine: EngineYamlConfig::default(),
            matcher: RowMatchConfig::default(),
        }
    }
}

fn default_bin_factor() -> f64 {
    DEFAULT_BIN_FACTOR
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;
    use xmatch_engine::{BIN_FACTOR_PARAM, MatchEngine};
    use xmatch_rows::PairMode;

    #[test]
    fn test_load_valid_yaml() {
        let yaml = r#"
version: "1.0"
name: "test config"
engine:
  kind: anisotropic
  errors: [1.0, 0.5]
matcher:
  mode: all
"#;

        let config = XmatchConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.version, "1.0");
        assert_eq!(config.name, Some("test config".to_string()));
        assert_eq!(config.engine.errors, vec![1.0, 0.5]);
        assert_eq!(config.engine.bin_factor, DEFAULT_BIN_FACTOR);
        assert_eq!(config.matcher.mode, PairMode::All);
        assert!(config.matcher.bound_filter);
    }

    #[test]
    fn test_load_from_file() {
        let yaml = r#"
version: "1.0"
engine:
  kind: isotropic
  dimensions: 3
  error: 0.25
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(yaml.as_bytes()).unwrap();

        let config = XmatchConfig::from_file(temp_file.path()).unwrap();
        let engine = config.build_engine().unwrap();
        assert_eq!(engine.to_string(), "3-d Cartesian");
        assert!(engine.cartesian().normalize_scores());
    }

    #[test]
    fn test_default_config() {
        let config = XmatchConfig::default();
        assert_eq!(config.version, "1.0");
        assert!(config.name.is_none());
        assert!(config.validate().is_ok());
        assert!(!config.engine.normalize_scores());
    }

    #[test]
    fn test_unsupported_version() {
        let yaml = r#"
version: "2.0"
engine:
  errors: [1.0]
"#;
        let err = XmatchConfig::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, ConfigLoadError::UnsupportedVersion(v) if v == "2.0"));
    }

    #[test]
    fn test_isotropic_requires_error() {
        let yaml = r#"
version: "1.0"
engine:
  kind: isotropic
  dimensions: 2
"#;
        let err = XmatchConfig::from_yaml(yaml).unwrap_err();
        assert!(err.to_string().contains("engine.error is required"));
    }

    #[test]
    fn test_dimension_mismatch() {
        let yaml = r#"
version: "1.0"
engine:
  dimensions: 3
  errors: [1.0, 1.0]
"#;
        let err = XmatchConfig::from_yaml(yaml).unwrap_err();
        assert!(matches!(
            err,
            ConfigLoadError::Engine(EngineError::ErrorCount { expected: 3, got: 2 })
        ));
    }

    #[test]
    fn test_engine_rejections_surface_on_load() {
        let bad_factor = r#"
version: "1.0"
engine:
  errors: [1.0]
  bin_factor: 0.5
"#;
        let err = XmatchConfig::from_yaml(bad_factor).unwrap_err();
        assert!(matches!(
            err,
            ConfigLoadError::Engine(EngineError::InvalidBinFactor { .. })
        ));

        let bad_error = r#"
version: "1.0"
engine:
  errors: [1.0, -2.0]
"#;
        assert!(matches!(
            XmatchConfig::from_yaml(bad_error).unwrap_err(),
            ConfigLoadError::Engine(EngineError::InvalidError { dim: 1, .. })
        ));
    }

    #[test]
    fn test_matcher_validation() {
        let yaml = r#"
version: "1.0"
engine:
  errors: [1.0]
matcher:
  version: 0
"#;
        let err = XmatchConfig::from_yaml(yaml).unwrap_err();
        assert!(err.to_string().contains("matcher"));
    }

    #[test]
    fn test_full_yaml_roundtrip() {
        let yaml = r#"
version: "1.0"
name: "production"
engine:
  kind: anisotropic
  dimensions: 2
  errors: [2.0, 0.5]
  bin_factor: 4.0
  normalize_scores: true

matcher:
  version: 1
  mode: best1
  use_parallel: true
  bound_filter: false
"#;

        let config = XmatchConfig::from_yaml(yaml).unwrap();
        let engine = config.build_engine().unwrap();
        assert_eq!(engine.parameter(BIN_FACTOR_PARAM), Some(4.0));
        assert_eq!(engine.parameter("Error in Y"), Some(0.5));
        assert!(config.matcher.use_parallel);

        let reparsed = XmatchConfig::from_yaml(&config.to_yaml().unwrap()).unwrap();
        assert_eq!(reparsed.engine, config.engine);
        assert_eq!(reparsed.matcher, config.matcher);
    }
}
