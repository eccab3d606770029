//! Journal entry record

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{null_as_default, EntryId, Record, TagSet, UserId};
use crate::gateway::Collection;

/// A dated journal entry with rich-text content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub id: EntryId,
    pub title: String,
    /// Serialized rich-text markup
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
    #[serde(default)]
    pub experience_date: Option<NaiveDate>,
    #[serde(default)]
    pub tags: TagSet,
    #[serde(default, deserialize_with = "null_as_default")]
    pub images: Vec<String>,
    pub user_id: UserId,
}

impl JournalEntry {
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }
}

impl Record for JournalEntry {
    const COLLECTION: Collection = Collection::JournalEntries;

    fn record_id(&self) -> String {
        self.id.as_str()
    }
}

/// Insert/update body for a journal entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JournalPayload {
    pub title: String,
    pub content: String,
    pub experience_date: Option<NaiveDate>,
    pub tags: TagSet,
    pub images: Vec<String>,
    pub user_id: UserId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_gateway_row_with_nulls() {
        let row = serde_json::json!({
            "id": "0192f3a0-0000-7000-8000-000000000001",
            "title": "Answered prayer",
            "content": "<p>Thank you</p>",
            "experience_date": null,
            "tags": null,
            "images": null,
            "user_id": "user-1",
            "created_at": "2025-01-09T10:00:00+00:00"
        });
        let entry: JournalEntry = serde_json::from_value(row).unwrap();
        assert_eq!(entry.title, "Answered prayer");
        assert!(entry.experience_date.is_none());
        assert!(entry.tags.is_empty());
        assert!(entry.images.is_empty());
    }

    #[test]
    fn deserializes_date_and_normalizes_tags() {
        let row = serde_json::json!({
            "id": "0192f3a0-0000-7000-8000-000000000002",
            "title": "Struggle",
            "content": "hard day",
            "experience_date": "2025-01-07",
            "tags": ["Lupta", "lupta"],
            "images": [],
            "user_id": "user-1"
        });
        let entry: JournalEntry = serde_json::from_value(row).unwrap();
        assert_eq!(
            entry.experience_date,
            NaiveDate::from_ymd_opt(2025, 1, 7)
        );
        assert!(entry.has_tag("lupta"));
        assert_eq!(entry.tags.len(), 1);
    }
}
