//! Client configuration shared by every front end.
//!
//! Resolves the public endpoints and keys the app needs: the Supabase
//! project (auth + tables), the Cloudinary cloud used for unsigned uploads and
//! the base URL of the image deletion companion. Secret credentials never live
//! here; they belong to the server.

use std::collections::HashMap;
use std::env;

use serde::{Deserialize, Serialize};

use crate::util::{is_http_url, normalize_text_option};

pub const SUPABASE_URL_VAR: &str = "SUPABASE_URL";
pub const SUPABASE_ANON_KEY_VAR: &str = "SUPABASE_ANON_KEY";
pub const CLOUDINARY_CLOUD_NAME_VAR: &str = "CLOUDINARY_CLOUD_NAME";
pub const CLOUDINARY_UPLOAD_PRESET_VAR: &str = "CLOUDINARY_UPLOAD_PRESET";
pub const MEDIA_API_BASE_URL_VAR: &str = "VOIA_API_BASE_URL";

/// Public client configuration. Every field is optional until used.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClientConfig {
    #[serde(default)]
    pub supabase_url: Option<String>,
    #[serde(default)]
    pub supabase_anon_key: Option<String>,
    #[serde(default)]
    pub cloudinary_cloud_name: Option<String>,
    #[serde(default)]
    pub cloudinary_upload_preset: Option<String>,
    #[serde(default)]
    pub media_api_base_url: Option<String>,
}

impl ClientConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, String> {
        let values: HashMap<String, String> = env::vars().collect();
        Self::from_lookup(|name| values.get(name).cloned())
    }

    /// Read configuration through `lookup`, validating URL fields.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let config = Self {
            supabase_url: optional_http_url(&lookup, SUPABASE_URL_VAR)?,
            supabase_anon_key: normalize_text_option(lookup(SUPABASE_ANON_KEY_VAR)),
            cloudinary_cloud_name: normalize_text_option(lookup(CLOUDINARY_CLOUD_NAME_VAR)),
            cloudinary_upload_preset: normalize_text_option(lookup(CLOUDINARY_UPLOAD_PRESET_VAR)),
            media_api_base_url: optional_http_url(&lookup, MEDIA_API_BASE_URL_VAR)?,
        };
        Ok(config)
    }

    /// Fill unset fields from `fallback`.
    #[must_use]
    pub fn or(self, fallback: Self) -> Self {
        Self {
            supabase_url: self.supabase_url.or(fallback.supabase_url),
            supabase_anon_key: self.supabase_anon_key.or(fallback.supabase_anon_key),
            cloudinary_cloud_name: self.cloudinary_cloud_name.or(fallback.cloudinary_cloud_name),
            cloudinary_upload_preset: self
                .cloudinary_upload_preset
                .or(fallback.cloudinary_upload_preset),
            media_api_base_url: self.media_api_base_url.or(fallback.media_api_base_url),
        }
    }

    /// Supabase URL and anon key, when both are present.
    #[must_use]
    pub fn supabase(&self) -> Option<(&str, &str)> {
        Some((
            self.supabase_url.as_deref()?,
            self.supabase_anon_key.as_deref()?,
        ))
    }

    /// Cloudinary cloud name and upload preset, when both are present.
    #[must_use]
    pub fn cloudinary(&self) -> Option<(&str, &str)> {
        Some((
            self.cloudinary_cloud_name.as_deref()?,
            self.cloudinary_upload_preset.as_deref()?,
        ))
    }
}

fn optional_http_url(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
) -> Result<Option<String>, String> {
    let Some(value) = normalize_text_option(lookup(name)) else {
        return Ok(None);
    };
    if !is_http_url(&value) {
        return Err(format!("{name} must include http:// or https://"));
    }
    Ok(Some(value.trim_end_matches('/').to_string()))
}
