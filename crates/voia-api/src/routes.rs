use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use http::Method;
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use voia_core::media::derive_public_id;

use crate::cloudinary::{CloudinaryAdmin, ImageDestroyer};
use crate::config::AppConfig;
use crate::error::AppError;

#[derive(Clone)]
pub struct AppState<D> {
    pub config: Arc<AppConfig>,
    destroyer: D,
}

impl AppState<CloudinaryAdmin> {
    pub fn from_config(config: Arc<AppConfig>) -> Self {
        Self {
            destroyer: CloudinaryAdmin::new(config.clone()),
            config,
        }
    }
}

pub fn app_router<D: ImageDestroyer>(state: AppState<D>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/images/delete", post(delete_image::<D>))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_headers(Any)
                .allow_methods([Method::GET, Method::POST]),
        )
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp: i64,
}

async fn healthz() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        timestamp: Utc::now().timestamp(),
    })
}

#[derive(Debug, Deserialize)]
struct DeleteImageRequest {
    #[serde(default)]
    url: Option<String>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct DeleteImageResponse {
    success: bool,
}

async fn delete_image<D: ImageDestroyer>(
    State(state): State<AppState<D>>,
    payload: Result<Json<DeleteImageRequest>, JsonRejection>,
) -> Result<Json<DeleteImageResponse>, AppError> {
    let Json(request) = payload.map_err(|rejection| {
        tracing::error!(endpoint = "images_delete", error = %rejection, "Unreadable delete request");
        AppError::external("Delete failed")
    })?;
    let url = request
        .url
        .as_deref()
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .ok_or_else(|| AppError::bad_request("Missing image URL"))?;

    let public_id = derive_public_id(url, &state.config.image_folder)
        .ok_or_else(|| AppError::bad_request("Invalid URL"))?;

    if let Err(error) = state.destroyer.destroy(&public_id).await {
        tracing::error!(endpoint = "images_delete", %public_id, %error, "Image delete failed");
        return Err(AppError::external("Delete failed"));
    }
    tracing::info!(endpoint = "images_delete", %public_id, "Deleted image");
    Ok(Json(DeleteImageResponse { success: true }))
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use axum::extract::FromRequest;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::config::test_config;

    #[derive(Clone, Default)]
    struct RecordingDestroyer {
        destroyed: Arc<Mutex<Vec<String>>>,
        fail: bool,
    }

    impl ImageDestroyer for RecordingDestroyer {
        async fn destroy(&self, public_id: &str) -> Result<(), AppError> {
            if self.fail {
                return Err(AppError::external("HTTP 401: invalid credentials"));
            }
            self.destroyed.lock().unwrap().push(public_id.to_string());
            Ok(())
        }
    }

    fn state(destroyer: RecordingDestroyer) -> AppState<RecordingDestroyer> {
        AppState {
            config: Arc::new(test_config()),
            destroyer,
        }
    }

    fn request(url: Option<&str>) -> Result<Json<DeleteImageRequest>, JsonRejection> {
        Ok(Json(DeleteImageRequest {
            url: url.map(ToString::to_string),
        }))
    }

    #[tokio::test]
    async fn deletes_image_under_journal_folder() {
        let destroyer = RecordingDestroyer::default();
        let response = delete_image(
            State(state(destroyer.clone())),
            request(Some(
                "https://res.cloudinary.com/demo/image/upload/v1712/journal/abc123.jpg",
            )),
        )
        .await
        .unwrap();

        assert_eq!(response.0, DeleteImageResponse { success: true });
        assert_eq!(*destroyer.destroyed.lock().unwrap(), vec!["journal/abc123"]);
    }

    #[tokio::test]
    async fn missing_url_is_bad_request() {
        let destroyer = RecordingDestroyer::default();
        for url in [None, Some(""), Some("   ")] {
            let error = delete_image(State(state(destroyer.clone())), request(url))
                .await
                .unwrap_err();
            assert_eq!(error.to_string(), "Missing image URL");
            assert_eq!(error.into_response().status(), StatusCode::BAD_REQUEST);
        }
        assert!(destroyer.destroyed.lock().unwrap().is_empty());
    }

    async fn json_body(body: &'static str) -> Result<Json<DeleteImageRequest>, JsonRejection> {
        let request = http::Request::builder()
            .method(Method::POST)
            .header(http::header::CONTENT_TYPE, "application/json")
            .body(axum::body::Body::from(body))
            .unwrap();
        Json::from_request(request, &()).await
    }

    #[tokio::test]
    async fn malformed_body_fails_like_a_destroy_error() {
        let destroyer = RecordingDestroyer::default();
        for body in ["{not json", "", "[1, 2]"] {
            let payload = json_body(body).await;
            assert!(payload.is_err());
            let error = delete_image(State(state(destroyer.clone())), payload)
                .await
                .unwrap_err();
            assert_eq!(error.to_string(), "Delete failed");
            assert_eq!(error.status(), StatusCode::INTERNAL_SERVER_ERROR);
        }
        assert!(destroyer.destroyed.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn well_formed_body_without_url_is_bad_request() {
        let error = delete_image(
            State(state(RecordingDestroyer::default())),
            json_body(r#"{"public_id":"journal/a"}"#).await,
        )
        .await
        .unwrap_err();
        assert_eq!(error.to_string(), "Missing image URL");
        assert_eq!(error.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn url_without_file_stem_is_invalid() {
        let error = delete_image(
            State(state(RecordingDestroyer::default())),
            request(Some("https://res.cloudinary.com/demo/image/upload/")),
        )
        .await
        .unwrap_err();
        assert_eq!(error.to_string(), "Invalid URL");
        assert_eq!(error.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn destroy_failure_is_reported_generically() {
        let destroyer = RecordingDestroyer {
            fail: true,
            ..RecordingDestroyer::default()
        };
        let error = delete_image(
            State(state(destroyer)),
            request(Some("https://res.cloudinary.com/demo/image/upload/journal/a.png")),
        )
        .await
        .unwrap_err();
        assert_eq!(error.to_string(), "Delete failed");
        assert_eq!(error.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn healthz_reports_ok() {
        let Json(health) = healthz().await;
        assert_eq!(health.status, "ok");
    }

    #[test]
    fn router_builds_with_cloudinary_state() {
        let _router = app_router(AppState::from_config(Arc::new(test_config())));
    }
}
