//! Builtin configuration document.
//!
//! The generator ships with a small YAML document next to its executable that
//! names the generator version and the feature set rule documents can test
//! with `when`. A missing or invalid document is fatal before any model is
//! parsed.

use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use thiserror::Error;

/// Environment variable overriding the builtin configuration path.
pub const CONFIG_ENV: &str = "IDLGEN_CONFIG";

/// File name of the builtin configuration next to the executable.
const CONFIG_FILE: &str = ".config";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read builtin config '{path}'")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse builtin config '{path}'")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid builtin config '{path}': missing '{key}'")]
    MissingKey { path: PathBuf, key: &'static str },
}

#[derive(Deserialize)]
struct RawConfig {
    #[serde(rename = "VERSION")]
    version: Option<serde_yaml::Value>,
    #[serde(rename = "FEATURES")]
    features: Option<Vec<String>>,
}

/// The parsed builtin configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltinConfig {
    version: String,
    features: BTreeSet<String>,
}

impl BuiltinConfig {
    pub fn new(version: impl Into<String>, features: impl IntoIterator<Item = String>) -> Self {
        Self {
            version: version.into(),
            features: features.into_iter().collect(),
        }
    }

    /// Resolve the configuration path: `$IDLGEN_CONFIG` if set, `<dir>/.config` otherwise.
    pub fn locate(dir: &Path) -> PathBuf {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => PathBuf::from(path),
            None => dir.join(CONFIG_FILE),
        }
    }

    /// Load and validate the configuration document at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse(&content, path)?;
        tracing::debug!(version = %config.version, "loaded builtin config from {}", path.display());
        Ok(config)
    }

    /// Parse a configuration document, `path` is used for error reporting only.
    pub fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
        let raw: RawConfig = serde_yaml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        let version = match raw.version {
            Some(serde_yaml::Value::String(s)) => s,
            Some(serde_yaml::Value::Number(n)) => n.to_string(),
            _ => {
                return Err(ConfigError::MissingKey {
                    path: path.to_path_buf(),
                    key: "VERSION",
                });
            }
        };
        let features = raw.features.ok_or_else(|| ConfigError::MissingKey {
            path: path.to_path_buf(),
            key: "FEATURES",
        })?;

        Ok(Self::new(version, features))
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn features(&self) -> &BTreeSet<String> {
        &self.features
    }

    pub fn has_feature(&self, feature: &str) -> bool {
        self.features.contains(feature)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_parse_valid() {
        let config = BuiltinConfig::parse(
            "VERSION: 6.8.0\nFEATURES:\n  - remoteobjects\n  - simulator\n",
            Path::new(".config"),
        )
        .unwrap();
        assert_eq!(config.version(), "6.8.0");
        assert!(config.has_feature("simulator"));
        assert!(!config.has_feature("dbus"));
    }

    #[test]
    fn test_parse_numeric_version() {
        let config =
            BuiltinConfig::parse("VERSION: 6.8\nFEATURES: []\n", Path::new(".config")).unwrap();
        assert_eq!(config.version(), "6.8");
        assert!(config.features().is_empty());
    }

    #[test]
    fn test_missing_features_is_invalid() {
        let err = BuiltinConfig::parse("VERSION: 1.0.0\n", Path::new(".config")).unwrap_err();
        assert!(matches!(err, ConfigError::MissingKey { key: "FEATURES", .. }));
        assert!(err.to_string().contains("Invalid builtin config"));
    }

    #[test]
    fn test_missing_version_is_invalid() {
        let err = BuiltinConfig::parse("FEATURES: []\n", Path::new(".config")).unwrap_err();
        assert!(matches!(err, ConfigError::MissingKey { key: "VERSION", .. }));
    }

    #[test]
    fn test_load_missing_file() {
        let temp = TempDir::new().unwrap();
        let err = BuiltinConfig::load(temp.path().join(".config")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_load_from_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(".config");
        std::fs::write(&path, "VERSION: '2.0'\nFEATURES: [a]\n").unwrap();

        let config = BuiltinConfig::load(&path).unwrap();
        assert_eq!(config.version(), "2.0");
        assert!(config.has_feature("a"));
    }
}
