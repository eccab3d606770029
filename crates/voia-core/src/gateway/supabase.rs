//! PostgREST-backed gateway for a Supabase project.

use std::sync::Arc;

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::RwLock;

use super::{Collection, Filter, Gateway, Op, Order};
use crate::auth::AuthSession;
use crate::models::UserId;
use crate::util::{compact_text, normalize_base_url};
use crate::{Error, Result};

/// Gateway talking to `<project>/rest/v1` with the signed-in user's token.
///
/// Row-level security on the hosted tables scopes every request to the
/// session's user, so requests without a session only see public rows.
#[derive(Clone)]
pub struct SupabaseGateway {
    rest_url: String,
    anon_key: String,
    client: Client,
    session: Arc<RwLock<Option<AuthSession>>>,
}

impl SupabaseGateway {
    pub fn new(url: impl AsRef<str>, anon_key: impl Into<String>) -> Result<Self> {
        let base = normalize_base_url(url.as_ref(), "Supabase URL").map_err(Error::Config)?;
        let anon_key = anon_key.into().trim().to_string();
        if anon_key.is_empty() {
            return Err(Error::Config(
                "Supabase anon key must not be empty".to_string(),
            ));
        }
        Ok(Self {
            rest_url: format!("{base}/rest/v1"),
            anon_key,
            client: Client::builder().build()?,
            session: Arc::new(RwLock::new(None)),
        })
    }

    /// Attach (or replace) the session used to authorize requests.
    pub async fn set_session(&self, session: Option<AuthSession>) {
        *self.session.write().await = session;
    }

    #[must_use]
    pub fn rest_url(&self) -> &str {
        &self.rest_url
    }

    async fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        let session = self.session.read().await;
        let token = session
            .as_ref()
            .map_or(self.anon_key.as_str(), |session| session.access_token.as_str());
        request
            .header("apikey", &self.anon_key)
            .bearer_auth(token)
            .header("Accept", "application/json")
    }

    fn table_url(&self, collection: Collection) -> String {
        format!("{}/{}", self.rest_url, collection.table_name())
    }

    async fn send(&self, request: RequestBuilder) -> Result<reqwest::Response> {
        let response = self.authorized(request).await.send().await?;
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(Error::gateway(parse_api_error(status, &body)))
    }
}

impl Gateway for SupabaseGateway {
    async fn query(
        &self,
        collection: Collection,
        filter: &Filter,
        order: &Order,
    ) -> Result<Vec<Value>> {
        let mut params = vec![("select".to_string(), "*".to_string())];
        params.extend(filter_params(filter));
        params.push(("order".to_string(), order_param(order)));

        let request = self.client.get(self.table_url(collection)).query(&params);
        let rows = self.send(request).await?.json::<Vec<Value>>().await?;
        tracing::debug!(collection = %collection, rows = rows.len(), "Loaded records");
        Ok(rows)
    }

    async fn insert(&self, collection: Collection, record: Value) -> Result<Value> {
        let request = self
            .client
            .post(self.table_url(collection))
            .header("Prefer", "return=representation")
            .json(&record);
        let rows = self.send(request).await?.json::<Vec<Value>>().await?;
        first_row(rows, collection, "insert")
    }

    async fn update(&self, collection: Collection, id: &str, patch: Value) -> Result<Value> {
        let request = self
            .client
            .patch(self.table_url(collection))
            .query(&[("id", format!("eq.{id}"))])
            .header("Prefer", "return=representation")
            .json(&patch);
        let rows = self.send(request).await?.json::<Vec<Value>>().await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| Error::NotFound(format!("{collection}/{id}")))
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<()> {
        let request = self
            .client
            .delete(self.table_url(collection))
            .query(&[("id", format!("eq.{id}"))]);
        self.send(request).await?;
        Ok(())
    }

    async fn current_user(&self) -> Option<UserId> {
        self.session
            .read()
            .await
            .as_ref()
            .map(|session| session.user.id.clone())
    }
}

fn first_row(rows: Vec<Value>, collection: Collection, operation: &str) -> Result<Value> {
    rows.into_iter().next().ok_or_else(|| {
        Error::gateway(format!(
            "{operation} on {collection} did not return the stored record"
        ))
    })
}

/// Render filter conditions as PostgREST query parameters.
fn filter_params(filter: &Filter) -> Vec<(String, String)> {
    filter
        .conditions()
        .iter()
        .map(|condition| {
            let rendered = match (&condition.value, condition.op) {
                (Value::Null, Op::Eq) => "is.null".to_string(),
                (Value::Null, Op::Neq) => "not.is.null".to_string(),
                (value, Op::Eq) => format!("eq.{}", render_value(value)),
                (value, Op::Neq) => format!("neq.{}", render_value(value)),
            };
            (condition.column.clone(), rendered)
        })
        .collect()
}

fn order_param(order: &Order) -> String {
    let direction = if order.ascending { "asc" } else { "desc" };
    format!("{}.{direction}", order.column)
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[derive(Debug, Deserialize)]
struct PostgrestError {
    message: Option<String>,
    details: Option<String>,
    hint: Option<String>,
}

fn parse_api_error(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<PostgrestError>(body) {
        if let Some(message) = payload.message {
            let extra = payload
                .details
                .or(payload.hint)
                .map(|detail| format!(": {}", detail.trim()))
                .unwrap_or_default();
            return format!("{}{extra} ({})", message.trim(), status.as_u16());
        }
    }

    let trimmed = compact_text(body);
    if trimmed.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        format!("{trimmed} ({})", status.as_u16())
    }
}
