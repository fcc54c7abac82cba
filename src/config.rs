use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use validator::Validate;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Parse error for {field}: {value} - {source}")]
    Parse {
        field: String,
        value: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

#[derive(Error, Debug, Clone, PartialEq)]
#[error("unknown simple collections mode `{0}` (expected omit, only or both)")]
pub struct ParseSimpleCollectionsError(pub String);

/// Which collection fields a many-to-many relation exposes.
///
/// - `Omit`: connection field only (default)
/// - `Only`: simple collection field only
/// - `Both`: connection and simple collection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimpleCollections {
    #[default]
    Omit,
    Only,
    Both,
}

impl SimpleCollections {
    pub fn has_connections(self) -> bool {
        self != SimpleCollections::Only
    }

    pub fn has_simple_collections(self) -> bool {
        matches!(self, SimpleCollections::Only | SimpleCollections::Both)
    }
}

impl FromStr for SimpleCollections {
    type Err = ParseSimpleCollectionsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "omit" => Ok(SimpleCollections::Omit),
            "only" => Ok(SimpleCollections::Only),
            "both" => Ok(SimpleCollections::Both),
            other => Err(ParseSimpleCollectionsError(other.to_string())),
        }
    }
}

impl fmt::Display for SimpleCollections {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SimpleCollections::Omit => "omit",
            SimpleCollections::Only => "only",
            SimpleCollections::Both => "both",
        };
        f.write_str(s)
    }
}

fn default_max_page_size() -> u32 {
    1000
}

/// Schema generation configuration with validation
#[derive(Clone, Debug, Validate, Serialize, Deserialize)]
pub struct SchemaConfig {
    /// Default cardinality exposure for many-to-many relations.
    /// Overridden per relation by the `simpleCollections` tag.
    #[serde(default)]
    pub simple_collections: SimpleCollections,

    /// Upper bound applied to `first` on connection fields (1-10000)
    #[validate(range(
        min = 1,
        max = 10000,
        message = "Max page size must be between 1 and 10000"
    ))]
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u32,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            simple_collections: SimpleCollections::Omit,
            max_page_size: default_max_page_size(),
        }
    }
}

impl SchemaConfig {
    /// Create configuration from environment variables with validation
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self {
            simple_collections: parse_env_var("JUNCTIONGRAPH_SIMPLE_COLLECTIONS", "omit")?,
            max_page_size: parse_env_var("JUNCTIONGRAPH_MAX_PAGE_SIZE", "1000")?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Create configuration from YAML file
    pub fn from_yaml_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Parse {
            field: "yaml_file".to_string(),
            value: "file read failed".to_string(),
            source: Box::new(e),
        })?;

        let config: Self = serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse {
            field: "yaml_content".to_string(),
            value: content,
            source: Box::new(e),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Merge with another configuration (the other one wins)
    pub fn merge(&mut self, other: Self) {
        self.simple_collections = other.simple_collections;
        self.max_page_size = other.max_page_size;
    }
}

/// Parse an environment variable with a default value
fn parse_env_var<T: FromStr>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let value = env::var(key).unwrap_or_else(|_| default.to_string());
    value.parse().map_err(|e| ConfigError::Parse {
        field: key.to_string(),
        value,
        source: Box::new(e),
    })
}
