//! In-process gateway used by tests and local demos.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
use std::sync::Arc;

use serde_json::{Map, Value};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{Collection, Filter, Gateway, Order};
use crate::models::UserId;
use crate::{Error, Result};

#[derive(Default)]
struct MemoryState {
    tables: BTreeMap<Collection, Vec<Value>>,
    user: Option<UserId>,
    fail_next: Option<String>,
}

/// Gateway backed by in-memory tables.
///
/// Mirrors the hosted backend closely enough for the app's needs: inserted
/// rows get an `id` and `created_at`, updates merge fields, and one failure
/// can be injected to exercise error paths.
#[derive(Clone, Default)]
pub struct MemoryGateway {
    state: Arc<Mutex<MemoryState>>,
    calls: Arc<AtomicUsize>,
}

impl MemoryGateway {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Gateway with `user` already signed in.
    #[must_use]
    pub fn signed_in(user: impl Into<UserId>) -> Self {
        Self {
            state: Arc::new(Mutex::new(MemoryState {
                user: Some(user.into()),
                ..MemoryState::default()
            })),
            calls: Arc::default(),
        }
    }

    pub async fn set_user(&self, user: Option<UserId>) {
        self.state.lock().await.user = user;
    }

    /// Make the next query/insert/update/delete fail with `message`.
    pub async fn fail_next(&self, message: impl Into<String>) {
        self.state.lock().await.fail_next = Some(message.into());
    }

    /// Store a row verbatim, bypassing id/timestamp assignment.
    pub async fn seed(&self, collection: Collection, row: Value) {
        self.state
            .lock()
            .await
            .tables
            .entry(collection)
            .or_default()
            .push(row);
    }

    /// Number of record operations issued so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(AtomicOrdering::SeqCst)
    }

    /// Snapshot of a table in insertion order.
    pub async fn rows(&self, collection: Collection) -> Vec<Value> {
        self.state
            .lock()
            .await
            .tables
            .get(&collection)
            .cloned()
            .unwrap_or_default()
    }

    fn begin(&self, state: &mut MemoryState) -> Result<()> {
        self.calls.fetch_add(1, AtomicOrdering::SeqCst);
        match state.fail_next.take() {
            Some(message) => Err(Error::gateway(message)),
            None => Ok(()),
        }
    }
}

impl Gateway for MemoryGateway {
    async fn query(
        &self,
        collection: Collection,
        filter: &Filter,
        order: &Order,
    ) -> Result<Vec<Value>> {
        let mut state = self.state.lock().await;
        self.begin(&mut state)?;

        let mut rows: Vec<Value> = state
            .tables
            .get(&collection)
            .map(|rows| rows.iter().filter(|row| filter.matches(row)).cloned().collect())
            .unwrap_or_default();

        rows.sort_by(|left, right| {
            let ordering = compare_values(
                left.get(&order.column).unwrap_or(&Value::Null),
                right.get(&order.column).unwrap_or(&Value::Null),
            );
            if order.ascending {
                ordering
            } else {
                ordering.reverse()
            }
        });
        Ok(rows)
    }

    async fn insert(&self, collection: Collection, record: Value) -> Result<Value> {
        let mut state = self.state.lock().await;
        self.begin(&mut state)?;

        let Value::Object(mut fields) = record else {
            return Err(Error::gateway("Insert payload must be a JSON object"));
        };
        fields
            .entry("id")
            .or_insert_with(|| Value::String(Uuid::now_v7().to_string()));
        fields
            .entry("created_at")
            .or_insert_with(|| Value::String(chrono::Utc::now().to_rfc3339()));
        apply_column_defaults(collection, &mut fields);

        let row = Value::Object(fields);
        state
            .tables
            .entry(collection)
            .or_default()
            .push(row.clone());
        tracing::debug!(collection = %collection, "memory gateway insert");
        Ok(row)
    }

    async fn update(&self, collection: Collection, id: &str, patch: Value) -> Result<Value> {
        let mut state = self.state.lock().await;
        self.begin(&mut state)?;

        let Value::Object(patch) = patch else {
            return Err(Error::gateway("Update payload must be a JSON object"));
        };
        let row = state
            .tables
            .get_mut(&collection)
            .and_then(|rows| rows.iter_mut().find(|row| row_has_id(row, id)))
            .ok_or_else(|| Error::NotFound(format!("{collection}/{id}")))?;

        if let Value::Object(fields) = row {
            for (key, value) in patch {
                fields.insert(key, value);
            }
        }
        Ok(row.clone())
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<()> {
        let mut state = self.state.lock().await;
        self.begin(&mut state)?;

        if let Some(rows) = state.tables.get_mut(&collection) {
            rows.retain(|row| !row_has_id(row, id));
        }
        Ok(())
    }

    async fn current_user(&self) -> Option<UserId> {
        self.state.lock().await.user.clone()
    }
}

fn row_has_id(row: &Value, id: &str) -> bool {
    row.get("id").and_then(Value::as_str) == Some(id)
}

// Column defaults declared by the hosted tables.
fn apply_column_defaults(collection: Collection, fields: &mut Map<String, Value>) {
    if collection == Collection::PrayerRequests {
        fields
            .entry("status")
            .or_insert_with(|| Value::String("in_progress".to_string()));
        fields.entry("answered_at").or_insert(Value::Null);
    }
}

// Nulls sort after every other value.
fn compare_values(left: &Value, right: &Value) -> Ordering {
    match (left, right) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Greater,
        (_, Value::Null) => Ordering::Less,
        (Value::String(left), Value::String(right)) => left.cmp(right),
        (Value::Bool(left), Value::Bool(right)) => left.cmp(right),
        (Value::Number(left), Value::Number(right)) => left
            .as_f64()
            .partial_cmp(&right.as_f64())
            .unwrap_or(Ordering::Equal),
        _ => Ordering::Equal,
    }
}
