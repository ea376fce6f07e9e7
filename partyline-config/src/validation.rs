// Configuration validation

use crate::{ConfigError, Result};
use partyline_core::PartyConfig;

/// Trait for validating configuration
pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// Reusable validation rules
pub struct ConfigValidator;

impl ConfigValidator {
    pub fn not_empty(value: &str, field: &str) -> Result<()> {
        if value.trim().is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "{} cannot be empty",
                field
            )));
        }
        Ok(())
    }

    pub fn absolute_path(value: &str, field: &str) -> Result<()> {
        if !value.starts_with('/') {
            return Err(ConfigError::ValidationError(format!(
                "{} must start with '/': {}",
                field, value
            )));
        }
        Ok(())
    }

    pub fn is_url(value: &str, field: &str) -> Result<()> {
        if !value.starts_with("http://") && !value.starts_with("https://") {
            return Err(ConfigError::ValidationError(format!(
                "{} must be a valid URL",
                field
            )));
        }
        Ok(())
    }
}

impl Validate for PartyConfig {
    fn validate(&self) -> Result<()> {
        ConfigValidator::not_empty(&self.partyline_key, "partyline_key")?;
        for invite in &self.invites {
            ConfigValidator::absolute_path(invite, "invite path")?;
        }
        if let Some(base_url) = &self.base_url {
            ConfigValidator::is_url(base_url, "base_url")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_party_config_is_valid() {
        assert!(PartyConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_empty_key() {
        let config = PartyConfig {
            partyline_key: " ".into(),
            ..PartyConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_rejects_relative_invite() {
        let config = PartyConfig {
            invites: vec!["/__invite__".into(), "one/__invite__".into()],
            ..PartyConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("one/__invite__"));
    }

    #[test]
    fn test_rejects_bad_base_url() {
        let config = PartyConfig {
            base_url: Some("localhost:5000".into()),
            ..PartyConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
