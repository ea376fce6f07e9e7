//! Configuration loading for a party.
//!
//! Sources are layered in order: defaults, then an optional file (JSON,
//! TOML, or `.env` style), then `PARTYLINE_*` variables (with an optional
//! `.env` file filling gaps in the process environment).
//!
//! | Variable | Field |
//! |----------|-------|
//! | `PARTYLINE_INVITES` | `invites` (comma separated) |
//! | `PARTYLINE_IGNORE_MISSING_SERVICES` | `ignore_missing_services` |
//! | `PARTYLINE_KEY` | `partyline_key` |
//! | `PARTYLINE_BASE_URL` | `base_url` |
//!
//! ```rust,no_run
//! use partyline_config::PartyConfigLoader;
//!
//! let config = PartyConfigLoader::new()
//!     .file("party.toml")
//!     .from_env()
//!     .load()
//!     .unwrap();
//! ```

pub mod env;
pub mod error;
pub mod loader;
pub mod validation;

pub use env::{ENV_PREFIX, EnvLoader};
pub use error::{ConfigError, Result};
pub use loader::{ConfigLoader, FileFormat};
pub use validation::{ConfigValidator, Validate};

pub use partyline_core::PartyConfig;

use serde_json::{Map, Value};
use std::path::PathBuf;
use tracing::debug;

/// Layered loader producing a validated [`PartyConfig`]
#[derive(Default)]
pub struct PartyConfigLoader {
    file: Option<PathBuf>,
    env: Option<EnvLoader>,
}

impl PartyConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a configuration file; the format follows the extension
    pub fn file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    /// Overlay `PARTYLINE_*` variables from the process environment
    pub fn from_env(self) -> Self {
        self.env(EnvLoader::new(ENV_PREFIX))
    }

    /// Overlay variables from an explicit loader
    pub fn env(mut self, loader: EnvLoader) -> Self {
        self.env = Some(loader);
        self
    }

    pub fn load(&self) -> Result<PartyConfig> {
        let mut value = serde_json::to_value(PartyConfig::default())
            .map_err(|e| ConfigError::SerializationError(e.to_string()))?;

        if let Some(path) = &self.file {
            let loader = ConfigLoader::auto(path)?;
            let mut loaded = loader.load_file(path)?;
            if loader.format() == FileFormat::Env {
                let vars = EnvLoader::with_vars(ENV_PREFIX, flat_strings(&loaded));
                loaded = env_overrides(&vars)?;
            }
            debug!(path = %path.display(), "Loaded party configuration file");
            merge(&mut value, loaded);
        }

        if let Some(env) = &self.env {
            merge(&mut value, env_overrides(env)?);
        }

        let config: PartyConfig = serde_json::from_value(value)
            .map_err(|e| ConfigError::DeserializationError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

/// Load a configuration from an optional file and the process environment
pub fn load_party_config(file: Option<&str>) -> Result<PartyConfig> {
    let mut loader = PartyConfigLoader::new().from_env();
    if let Some(path) = file {
        loader = loader.file(path);
    }
    loader.load()
}

fn env_overrides(env: &EnvLoader) -> Result<Value> {
    let mut map = Map::new();

    for (key, raw) in env.load() {
        let value = match key.as_str() {
            "invites" => Value::Array(
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(|s| Value::String(s.to_string()))
                    .collect(),
            ),
            "ignore_missing_services" => Value::Bool(parse_bool(&key, &raw)?),
            "key" => {
                map.insert("partyline_key".to_string(), Value::String(raw));
                continue;
            }
            "base_url" => Value::String(raw),
            // Other PARTYLINE_* variables belong to other subsystems.
            _ => continue,
        };
        map.insert(key, value);
    }

    Ok(Value::Object(map))
}

fn parse_bool(key: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(ConfigError::ParseError(format!(
            "{} expects a boolean, got '{}'",
            key, other
        ))),
    }
}

fn flat_strings(value: &Value) -> Vec<(String, String)> {
    value
        .as_object()
        .map(|map| {
            map.iter()
                .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                .collect()
        })
        .unwrap_or_default()
}

fn merge(base: &mut Value, overlay: Value) {
    if let (Value::Object(base), Value::Object(overlay)) = (base, overlay) {
        for (key, value) in overlay {
            base.insert(key, value);
        }
    }
}
