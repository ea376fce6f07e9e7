// Configuration file loaders

use crate::{ConfigError, Result};
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Json,
    Toml,
    Env,
}

impl FileFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "json" => Some(FileFormat::Json),
            "toml" => Some(FileFormat::Toml),
            "env" => Some(FileFormat::Env),
            _ => None,
        }
    }
}

/// Configuration file loader
pub struct ConfigLoader {
    format: FileFormat,
}

impl ConfigLoader {
    pub fn new(format: FileFormat) -> Self {
        Self { format }
    }

    /// Pick the format from the file extension
    pub fn auto(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .ok_or_else(|| {
                ConfigError::LoadError(format!("No file extension on {}", path.display()))
            })?;

        let format = FileFormat::from_extension(ext)
            .ok_or_else(|| ConfigError::LoadError(format!("Unsupported format: {}", ext)))?;

        Ok(Self::new(format))
    }

    pub fn format(&self) -> FileFormat {
        self.format
    }

    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<Value> {
        let content = fs::read_to_string(path)?;
        self.parse(&content)
    }

    /// Parse configuration text into a JSON object
    pub fn parse(&self, content: &str) -> Result<Value> {
        match self.format {
            FileFormat::Json => parse_json(content),
            FileFormat::Toml => parse_toml(content),
            FileFormat::Env => parse_env(content),
        }
    }
}

fn parse_json(content: &str) -> Result<Value> {
    serde_json::from_str(content)
        .map_err(|e| ConfigError::ParseError(format!("JSON parse error: {}", e)))
}

fn parse_toml(content: &str) -> Result<Value> {
    let toml_value: toml::Value = toml::from_str(content)
        .map_err(|e| ConfigError::ParseError(format!("TOML parse error: {}", e)))?;

    serde_json::to_value(toml_value).map_err(|e| ConfigError::SerializationError(e.to_string()))
}

fn parse_env(content: &str) -> Result<Value> {
    let mut map = serde_json::Map::new();

    for entry in dotenvy::from_read_iter(content.as_bytes()) {
        let (key, value) =
            entry.map_err(|e| ConfigError::ParseError(format!("Env parse error: {}", e)))?;
        map.insert(key, Value::String(value));
    }

    Ok(Value::Object(map))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_json() {
        let loader = ConfigLoader::new(FileFormat::Json);
        let value = loader.parse(r#"{"invites": ["/__invite__"]}"#).unwrap();
        assert_eq!(value, json!({"invites": ["/__invite__"]}));
    }

    #[test]
    fn test_parse_toml() {
        let loader = ConfigLoader::new(FileFormat::Toml);
        let value = loader
            .parse(
                r#"
                invites = ["/__invite__", "/one/__invite__"]
                ignore_missing_services = true
            "#,
            )
            .unwrap();
        assert_eq!(value["invites"][1], json!("/one/__invite__"));
        assert_eq!(value["ignore_missing_services"], json!(true));
    }

    #[test]
    fn test_parse_env() {
        let loader = ConfigLoader::new(FileFormat::Env);
        let value = loader
            .parse(
                r#"
                PARTYLINE_KEY=party
                # Comment
                PARTYLINE_BASE_URL="http://localhost:5000"
            "#,
            )
            .unwrap();
        assert_eq!(value["PARTYLINE_KEY"], json!("party"));
        assert_eq!(value["PARTYLINE_BASE_URL"], json!("http://localhost:5000"));
    }

    #[test]
    fn test_parse_env_export_and_inline_comment() {
        let loader = ConfigLoader::new(FileFormat::Env);
        let value = loader
            .parse("export PARTYLINE_KEY=party\nPARTYLINE_BASE_URL=http://localhost:5000 # dev\n")
            .unwrap();
        assert_eq!(value["PARTYLINE_KEY"], json!("party"));
        assert_eq!(value["PARTYLINE_BASE_URL"], json!("http://localhost:5000"));
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            ConfigLoader::new(FileFormat::Json).parse("{"),
            Err(ConfigError::ParseError(_))
        ));
        assert!(matches!(
            ConfigLoader::new(FileFormat::Toml).parse("invites = ["),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(FileFormat::from_extension("JSON"), Some(FileFormat::Json));
        assert_eq!(FileFormat::from_extension("toml"), Some(FileFormat::Toml));
        assert_eq!(FileFormat::from_extension("env"), Some(FileFormat::Env));
        assert_eq!(FileFormat::from_extension("yaml"), None);
        assert_eq!(ConfigLoader::auto("party.toml").unwrap().format(), FileFormat::Toml);
        assert!(ConfigLoader::auto("party").is_err());
    }
}
