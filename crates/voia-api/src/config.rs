use std::collections::HashMap;
use std::env;
use std::fmt;

use thiserror::Error;
use voia_core::media::JOURNAL_FOLDER;

const DEFAULT_CLOUDINARY_API_URL: &str = "https://api.cloudinary.com";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub cloudinary_api_url: String,
    pub cloudinary_cloud_name: String,
    pub cloudinary_api_key: String,
    pub cloudinary_api_secret: String,
    /// Folder hosted journal images live under
    pub image_folder: String,
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("AppConfig")
            .field("bind_addr", &self.bind_addr)
            .field("cloudinary_api_url", &self.cloudinary_api_url)
            .field("cloudinary_cloud_name", &self.cloudinary_cloud_name)
            .field("cloudinary_api_key", &self.cloudinary_api_key)
            .field("cloudinary_api_secret", &"[REDACTED]")
            .field("image_folder", &self.image_folder)
            .finish()
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let values: HashMap<String, String> = env::vars().collect();
        Self::from_lookup(|name| values.get(name).cloned())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bind_addr = value_or_default(&lookup, "VOIA_API_BIND_ADDR", "127.0.0.1:8080");

        let cloudinary_api_url = trim_trailing(&value_or_default(
            &lookup,
            "CLOUDINARY_API_URL",
            DEFAULT_CLOUDINARY_API_URL,
        ))
        .to_string();
        if !is_http_url(&cloudinary_api_url) {
            return Err(ConfigError::Invalid(
                "CLOUDINARY_API_URL must start with http:// or https://".to_string(),
            ));
        }

        let cloudinary_cloud_name = required_trimmed(&lookup, "CLOUDINARY_CLOUD_NAME")?;
        let cloudinary_api_key = required_trimmed(&lookup, "CLOUDINARY_API_KEY")?;
        let cloudinary_api_secret = required_trimmed(&lookup, "CLOUDINARY_API_SECRET")?;

        let image_folder = value_or_default(&lookup, "VOIA_IMAGE_FOLDER", JOURNAL_FOLDER)
            .trim_matches('/')
            .to_string();
        if image_folder.is_empty() {
            return Err(ConfigError::Invalid(
                "VOIA_IMAGE_FOLDER must name a folder".to_string(),
            ));
        }

        Ok(Self {
            bind_addr,
            cloudinary_api_url,
            cloudinary_cloud_name,
            cloudinary_api_key,
            cloudinary_api_secret,
            image_folder,
        })
    }
}

fn value_or_default(lookup: impl Fn(&str) -> Option<String>, name: &str, default: &str) -> String {
    optional_trimmed(lookup, name).unwrap_or_else(|| default.to_string())
}

fn required_trimmed(
    lookup: impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<String, ConfigError> {
    optional_trimmed(lookup, name).ok_or(ConfigError::MissingVar(name))
}

fn optional_trimmed(lookup: impl Fn(&str) -> Option<String>, name: &str) -> Option<String> {
    lookup(name).and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

fn is_http_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

fn trim_trailing(value: &str) -> &str {
    value.trim_end_matches('/')
}

#[cfg(test)]
pub(crate) fn test_config() -> AppConfig {
    AppConfig {
        bind_addr: "127.0.0.1:0".to_string(),
        cloudinary_api_url: DEFAULT_CLOUDINARY_API_URL.to_string(),
        cloudinary_cloud_name: "demo".to_string(),
        cloudinary_api_key: "key".to_string(),
        cloudinary_api_secret: "secret".to_string(),
        image_folder: JOURNAL_FOLDER.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use pretty_assertions::assert_eq;

    use super::*;

    fn config_from(map: &HashMap<&str, &str>) -> Result<AppConfig, ConfigError> {
        AppConfig::from_lookup(|key| map.get(key).map(|value| (*value).to_string()))
    }

    fn minimal() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("CLOUDINARY_CLOUD_NAME", "demo"),
            ("CLOUDINARY_API_KEY", "123456"),
            ("CLOUDINARY_API_SECRET", "sensitive-api-secret"),
        ])
    }

    #[test]
    fn config_requires_cloudinary_credentials() {
        let err = config_from(&HashMap::new()).unwrap_err();
        assert!(err.to_string().contains("CLOUDINARY_CLOUD_NAME"));

        let mut map = minimal();
        map.remove("CLOUDINARY_API_SECRET");
        assert!(config_from(&map)
            .unwrap_err()
            .to_string()
            .contains("CLOUDINARY_API_SECRET"));
    }

    #[test]
    fn config_applies_defaults() {
        let config = config_from(&minimal()).unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:8080");
        assert_eq!(config.cloudinary_api_url, "https://api.cloudinary.com");
        assert_eq!(config.image_folder, "journal");
    }

    #[test]
    fn config_rejects_non_http_api_url() {
        let mut map = minimal();
        map.insert("CLOUDINARY_API_URL", "api.cloudinary.com");
        assert!(matches!(config_from(&map), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn config_redacts_sensitive_debug_fields() {
        let config = config_from(&minimal()).unwrap();
        let debug_output = format!("{config:?}");
        assert!(!debug_output.contains("sensitive-api-secret"));
        assert!(debug_output.contains("[REDACTED]"));
    }
}
