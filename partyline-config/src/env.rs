// Environment variable loading

use crate::{ConfigError, Result};
use std::collections::HashMap;
use std::path::Path;

/// Prefix of every variable the party reads
pub const ENV_PREFIX: &str = "PARTYLINE";

/// Environment variable loader.
///
/// Reads variables starting with `prefix`, strips the prefix and the
/// separating underscore, and lowercases the rest: `PARTYLINE_BASE_URL`
/// becomes `base_url`.
pub struct EnvLoader {
    prefix: String,
    vars: HashMap<String, String>,
}

impl EnvLoader {
    /// Loader over the current process environment
    pub fn new(prefix: impl Into<String>) -> Self {
        Self::with_vars(prefix, std::env::vars())
    }

    /// Loader over an explicit set of variables
    pub fn with_vars<I, K, V>(prefix: impl Into<String>, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            prefix: prefix.into(),
            vars: vars
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Add variables from a `.env` file without overriding existing ones
    pub fn dotenv(mut self, path: impl AsRef<Path>) -> Result<Self> {
        let entries = dotenvy::from_path_iter(path.as_ref())
            .map_err(|e| ConfigError::LoadError(e.to_string()))?;

        for entry in entries {
            let (key, value) = entry.map_err(|e| ConfigError::ParseError(e.to_string()))?;
            self.vars.entry(key).or_insert(value);
        }
        Ok(self)
    }

    /// Prefixed variables with their keys normalized
    pub fn load(&self) -> HashMap<String, String> {
        self.vars
            .iter()
            .filter_map(|(key, value)| {
                let rest = key.strip_prefix(&self.prefix)?.strip_prefix('_')?;
                Some((rest.to_lowercase(), value.clone()))
            })
            .collect()
    }

    /// A single variable by its unprefixed name
    pub fn load_var(&self, key: &str) -> Option<&str> {
        let full_key = format!("{}_{}", self.prefix, key.to_uppercase());
        self.vars.get(&full_key).map(String::as_str)
    }

    pub fn load_var_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.load_var(key).unwrap_or(default)
    }
}

impl Default for EnvLoader {
    fn default() -> Self {
        Self::new(ENV_PREFIX)
    }
}
