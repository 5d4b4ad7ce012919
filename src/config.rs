//! Parser and session settings.
//!
//! Every field has a default, so a config file only needs the keys it
//! changes:
//!
//! ```toml
//! [parser]
//! max_depth = 50
//!
//! [session]
//! size = 100
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EqlConfig {
    pub parser: ParserConfig,
    pub session: SessionConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Deepest nesting of expressions, `not`s and unary signs accepted.
    /// Each operator of an `and`/`or` or arithmetic chain counts as a level.
    pub max_depth: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        ParserConfig { max_depth: 200 }
    }
}

/// Settings handed to executables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Number of results returned to the caller.
    pub size: usize,
    /// Number of events requested from storage per round trip.
    pub fetch_size: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            size: 10,
            fetch_size: 1000,
        }
    }
}

impl EqlConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}
