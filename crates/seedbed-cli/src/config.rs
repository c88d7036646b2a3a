use std::fs;
use std::path::{Path, PathBuf};

use seedbed_core::RulesConfig;
use thiserror::Error;

/// Failures loading a rules file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read rules file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid YAML rules in {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("invalid TOML rules in {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid JSON rules in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RulesFormat {
    Yaml,
    Toml,
    Json,
}

impl RulesFormat {
    /// Chosen by extension; anything unrecognised is read as YAML.
    fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("toml") => RulesFormat::Toml,
            Some("json") => RulesFormat::Json,
            _ => RulesFormat::Yaml,
        }
    }
}

/// Load generation rules from a YAML, TOML or JSON file.
pub fn load_rules(path: &Path) -> Result<RulesConfig, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_rules(path, &text)
}

fn parse_rules(path: &Path, text: &str) -> Result<RulesConfig, ConfigError> {
    let path_buf = || path.to_path_buf();
    match RulesFormat::from_path(path) {
        RulesFormat::Yaml => {
            // An empty YAML document means no rules.
            if text.trim().is_empty() {
                return Ok(RulesConfig::default());
            }
            serde_yaml::from_str(text).map_err(|source| ConfigError::Yaml {
                path: path_buf(),
                source,
            })
        }
        RulesFormat::Toml => toml::from_str(text).map_err(|source| ConfigError::Toml {
            path: path_buf(),
            source,
        }),
        RulesFormat::Json => serde_json::from_str(text).map_err(|source| ConfigError::Json {
            path: path_buf(),
            source,
        }),
    }
}
