use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use serde::Deserialize;
use voia_core::util::compact_text;

use crate::config::AppConfig;
use crate::error::AppError;

/// Removes hosted images by public id.
pub trait ImageDestroyer: Clone + Send + Sync + 'static {
    fn destroy(&self, public_id: &str) -> impl Future<Output = Result<(), AppError>> + Send;
}

/// Cloudinary Admin API client authenticated with the account key/secret.
#[derive(Debug, Clone)]
pub struct CloudinaryAdmin {
    client: reqwest::Client,
    config: Arc<AppConfig>,
}

#[derive(Debug, Deserialize)]
struct DeleteResourcesResponse {
    #[serde(default)]
    deleted: HashMap<String, String>,
}

impl CloudinaryAdmin {
    pub fn new(config: Arc<AppConfig>) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    fn resources_url(&self) -> String {
        format!(
            "{}/v1_1/{}/resources/image/upload",
            self.config.cloudinary_api_url, self.config.cloudinary_cloud_name
        )
    }
}

impl ImageDestroyer for CloudinaryAdmin {
    async fn destroy(&self, public_id: &str) -> Result<(), AppError> {
        let response = self
            .client
            .delete(self.resources_url())
            .basic_auth(
                &self.config.cloudinary_api_key,
                Some(&self.config.cloudinary_api_secret),
            )
            .query(&[("public_ids[]", public_id)])
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|error| {
                AppError::external(format!(
                    "Cloudinary delete request failed: {}",
                    sanitize(&error)
                ))
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::external(delete_failure(status, &body)));
        }

        let payload = response
            .json::<DeleteResourcesResponse>()
            .await
            .map_err(|error| {
                AppError::external(format!(
                    "Cloudinary delete parse failed: {}",
                    sanitize(&error)
                ))
            })?;
        let outcome = payload
            .deleted
            .get(public_id)
            .map_or("unknown", String::as_str);
        tracing::info!(public_id, outcome, "Destroyed hosted image");
        Ok(())
    }
}

fn sanitize(error: &impl std::fmt::Display) -> String {
    error.to_string().replace('\n', " ").trim().to_string()
}

fn delete_failure(status: u16, body: &str) -> String {
    format!("Cloudinary delete failed with HTTP {status}: {}", compact_text(body))
}
