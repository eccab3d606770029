//! Journal image hosting clients.
//!
//! Images are uploaded straight to Cloudinary with an unsigned upload preset
//! and referenced from entry content by their hosted URL. Deletion needs the
//! account secret, so it goes through the companion endpoint served by
//! `voia-api`.

use std::path::Path;

use reqwest::multipart;
use serde::Deserialize;

use crate::util::{compact_text, normalize_base_url};
use crate::{Error, Result};

const CLOUDINARY_API_BASE: &str = "https://api.cloudinary.com/v1_1";
const DEFAULT_IMAGE_MIME: &str = "image/jpeg";

/// Folder journal images are stored under.
pub const JOURNAL_FOLDER: &str = "journal";

/// Cloudinary public id for a hosted image URL.
///
/// Takes the last path segment, drops its extension (and any query string),
/// percent-decodes it and prefixes `folder`. Returns `None` when no file stem
/// can be derived.
///
/// `https://res.cloudinary.com/x/image/upload/v123/journal/abc.jpg` with
/// folder `journal` yields `journal/abc`.
#[must_use]
pub fn derive_public_id(url: &str, folder: &str) -> Option<String> {
    let path = url.trim().split(['?', '#']).next().unwrap_or_default();
    let file_name = path.rsplit('/').next().unwrap_or_default();
    let stem = file_name.split('.').next().unwrap_or_default().trim();
    if stem.is_empty() {
        return None;
    }
    let stem = urlencoding::decode(stem)
        .map_or_else(|_| stem.to_string(), |decoded| decoded.into_owned());
    let folder = folder.trim().trim_matches('/');
    if folder.is_empty() {
        Some(stem)
    } else {
        Some(format!("{folder}/{stem}"))
    }
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
}

#[derive(Debug, Deserialize)]
struct CloudinaryErrorResponse {
    error: CloudinaryErrorMessage,
}

#[derive(Debug, Deserialize)]
struct CloudinaryErrorMessage {
    message: String,
}

/// Unsigned uploads to one Cloudinary cloud.
#[derive(Debug, Clone)]
pub struct CloudinaryUploader {
    upload_url: String,
    upload_preset: String,
    client: reqwest::Client,
}

impl CloudinaryUploader {
    pub fn new(cloud_name: &str, upload_preset: &str) -> Result<Self> {
        let cloud_name = cloud_name.trim();
        let upload_preset = upload_preset.trim();
        if cloud_name.is_empty() || upload_preset.is_empty() {
            return Err(Error::Config(
                "Cloudinary cloud name and upload preset are required".to_string(),
            ));
        }
        Ok(Self {
            upload_url: format!("{CLOUDINARY_API_BASE}/{cloud_name}/image/upload"),
            upload_preset: upload_preset.to_string(),
            client: reqwest::Client::builder().build()?,
        })
    }

    #[must_use]
    pub fn upload_url(&self) -> &str {
        &self.upload_url
    }

    /// Upload image bytes and return the hosted `secure_url`.
    pub async fn upload(&self, bytes: Vec<u8>, file_name: &str) -> Result<String> {
        let request = self.build_upload_request(bytes, file_name)?;
        let response = self.client.execute(request).await?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<CloudinaryErrorResponse>(&body)
                .map_or_else(|_| compact_text(&body), |payload| payload.error.message);
            return Err(Error::Upload(format!("HTTP {status}: {message}")));
        }
        let payload = response.json::<UploadResponse>().await?;
        tracing::info!(url = %payload.secure_url, "Uploaded image");
        Ok(payload.secure_url)
    }

    fn build_upload_request(&self, bytes: Vec<u8>, file_name: &str) -> Result<reqwest::Request> {
        let file_part = multipart::Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(&guess_image_mime(file_name))?;
        let form = multipart::Form::new()
            .text("upload_preset", self.upload_preset.clone())
            .part("file", file_part);
        Ok(self.client.post(&self.upload_url).multipart(form).build()?)
    }
}

/// Content type sent with an upload. Files without an extension are
/// assumed to be camera JPEGs.
fn guess_image_mime(file_name: &str) -> String {
    if Path::new(file_name).extension().is_none() {
        return DEFAULT_IMAGE_MIME.to_string();
    }
    mime_guess::from_path(file_name)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

/// Client for the image deletion companion endpoint.
#[derive(Debug, Clone)]
pub struct ImageDeletionClient {
    base_url: String,
    client: reqwest::Client,
}

impl ImageDeletionClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = normalize_base_url(base_url, "Media API base URL").map_err(Error::Config)?;
        Ok(Self {
            base_url,
            client: reqwest::Client::builder().build()?,
        })
    }

    #[must_use]
    pub fn endpoint(&self) -> String {
        format!("{}/api/images/delete", self.base_url)
    }

    /// Ask the companion endpoint to destroy the hosted image at `url`.
    pub async fn delete(&self, url: &str) -> Result<()> {
        let response = self
            .client
            .post(self.endpoint())
            .header("Accept", "application/json")
            .json(&serde_json::json!({ "url": url }))
            .send()
            .await?;
        if response.status().is_success() {
            tracing::info!(url, "Deleted hosted image");
            return Ok(());
        }
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|payload| payload["error"].as_str().map(ToString::to_string))
            .unwrap_or_else(|| compact_text(&body));
        Err(Error::ImageDeletion(format!("HTTP {status}: {message}")))
    }
}
