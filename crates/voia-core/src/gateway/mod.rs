//! Remote data gateway seam.
//!
//! Every read and write of hosted records goes through [`Gateway`], keyed by a
//! [`Collection`] and carrying JSON record shapes. Typed decoding happens one
//! level up in the stores and services.

mod memory;
mod supabase;

use std::fmt;

use serde_json::Value;

use crate::models::UserId;
use crate::Result;

pub use memory::MemoryGateway;
pub use supabase::SupabaseGateway;

/// Hosted collections used by the app
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    DiaryEntries,
    JournalEntries,
    PrayerRequests,
    Reminders,
}

impl Collection {
    /// Table name on the hosted backend
    #[must_use]
    pub const fn table_name(self) -> &'static str {
        match self {
            Self::DiaryEntries => "diary_entries",
            Self::JournalEntries => "journal_entries",
            Self::PrayerRequests => "prayer_requests",
            Self::Reminders => "prayer_reminders",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table_name())
    }
}

/// Comparison applied by a filter condition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Eq,
    Neq,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub column: String,
    pub op: Op,
    pub value: Value,
}

impl Condition {
    /// Evaluate this condition against a JSON record.
    #[must_use]
    pub fn matches(&self, record: &Value) -> bool {
        let field = record.get(&self.column).unwrap_or(&Value::Null);
        match self.op {
            Op::Eq => field == &self.value,
            Op::Neq => field != &self.value,
        }
    }
}

/// Conjunction of column conditions. Empty matches every record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<Condition>,
}

impl Filter {
    #[must_use]
    pub const fn all() -> Self {
        Self {
            conditions: Vec::new(),
        }
    }

    #[must_use]
    pub fn eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push(Condition {
            column: column.into(),
            op: Op::Eq,
            value: value.into(),
        });
        self
    }

    #[must_use]
    pub fn neq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push(Condition {
            column: column.into(),
            op: Op::Neq,
            value: value.into(),
        });
        self
    }

    #[must_use]
    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    #[must_use]
    pub fn matches(&self, record: &Value) -> bool {
        self.conditions.iter().all(|condition| condition.matches(record))
    }
}

/// Result ordering by one column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub column: String,
    pub ascending: bool,
}

impl Order {
    #[must_use]
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            ascending: true,
        }
    }

    #[must_use]
    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            ascending: false,
        }
    }
}

/// Generic record access against the hosted backend.
///
/// Failures are terminal for the triggering action: implementations never
/// retry.
#[allow(async_fn_in_trait)]
pub trait Gateway: Send + Sync {
    /// Fetch every record of `collection` matching `filter`, sorted by `order`.
    async fn query(&self, collection: Collection, filter: &Filter, order: &Order)
        -> Result<Vec<Value>>;

    /// Insert one record and return it as stored.
    async fn insert(&self, collection: Collection, record: Value) -> Result<Value>;

    /// Apply a partial update to the record with `id` and return it as stored.
    async fn update(&self, collection: Collection, id: &str, patch: Value) -> Result<Value>;

    /// Delete the record with `id`.
    async fn delete(&self, collection: Collection, id: &str) -> Result<()>;

    /// Currently authenticated user, if any.
    async fn current_user(&self) -> Option<UserId>;
}
