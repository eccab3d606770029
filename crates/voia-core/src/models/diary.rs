//! Diary note record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{null_as_default, DiaryId, Record, UserId};
use crate::gateway::Collection;

/// A short plain-text diary note with an optional photo
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiaryEntry {
    pub id: DiaryId,
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
    #[serde(default)]
    pub photo_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub user_id: UserId,
}

impl Record for DiaryEntry {
    const COLLECTION: Collection = Collection::DiaryEntries;

    fn record_id(&self) -> String {
        self.id.as_str()
    }
}

/// Insert body for a diary note
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewDiaryEntry {
    pub user_id: UserId,
    pub title: String,
    pub content: String,
    pub photo_url: Option<String>,
}
