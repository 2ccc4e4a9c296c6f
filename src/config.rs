//! Site configuration
//!
//! Read from `.staticgen.yml` by default; TOML files are accepted too. Every
//! field is optional:
//!
//! ```yaml
//! components: templates/components
//! pages: pages
//! output: dist
//! variables:
//!   siteName: My Awesome Site
//!   year: 2026
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::vars::Variables;

/// Config file looked up in the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = ".staticgen.yml";

/// Errors that can occur when loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("failed to parse config TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("unsupported config format: {}", .path.display())]
    UnsupportedFormat { path: PathBuf },
}

/// Build configuration for a site
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Directory holding component definitions
    pub components: PathBuf,
    /// Directory holding page sources
    pub pages: PathBuf,
    /// Directory generated pages are written to
    pub output: PathBuf,
    /// Values exposed to templates through `{{Var "name"}}`
    pub variables: BTreeMap<String, ScalarValue>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            components: PathBuf::from("templates/components"),
            pages: PathBuf::from("pages"),
            output: PathBuf::from("dist"),
            variables: BTreeMap::new(),
        }
    }
}

/// A config variable; non-string scalars are stringified
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ScalarValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarValue::Bool(b) => write!(f, "{b}"),
            ScalarValue::Integer(i) => write!(f, "{i}"),
            ScalarValue::Float(x) => write!(f, "{x}"),
            ScalarValue::String(s) => f.write_str(s),
        }
    }
}

impl SiteConfig {
    /// Load configuration
    ///
    /// With an explicit path the file must exist. Without one,
    /// [`DEFAULT_CONFIG_FILE`] is used when present and defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.is_file() {
                    Self::from_file(default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Load configuration from a YAML or TOML file, chosen by extension
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let format = path.extension().and_then(|ext| ext.to_str());
        if !matches!(format, Some("yml" | "yaml" | "toml")) {
            return Err(ConfigError::UnsupportedFormat {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        match format {
            Some("toml") => Self::from_toml_str(&content),
            _ => Self::from_yaml_str(&content),
        }
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Variable store populated from the `variables` table
    pub fn variables(&self) -> Variables {
        self.variables
            .iter()
            .map(|(name, value)| (name.clone(), value.to_string()))
            .collect()
    }
}
