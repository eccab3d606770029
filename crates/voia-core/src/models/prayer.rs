//! Prayer request record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{null_as_default, PrayerId, Record, UserId};
use crate::gateway::Collection;

/// Progress of a prayer request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PrayerStatus {
    #[default]
    InProgress,
    Answered,
}

impl PrayerStatus {
    /// The other status
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::InProgress => Self::Answered,
            Self::Answered => Self::InProgress,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InProgress => "in_progress",
            Self::Answered => "answered",
        }
    }
}

/// A prayer request, private or shared with the community
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrayerRequest {
    pub id: PrayerId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: PrayerStatus,
    #[serde(default, deserialize_with = "null_as_default")]
    pub labels: Vec<String>,
    #[serde(default)]
    pub is_shared: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub answered_at: Option<DateTime<Utc>>,
    pub user_id: UserId,
}

impl PrayerRequest {
    /// Field patch that flips this prayer's status.
    #[must_use]
    pub fn toggle_status_patch(&self, now: DateTime<Utc>) -> StatusPatch {
        StatusPatch::new(self.status.toggled(), now)
    }
}

impl Record for PrayerRequest {
    const COLLECTION: Collection = Collection::PrayerRequests;

    fn record_id(&self) -> String {
        self.id.as_str()
    }
}

/// Status update body. `answered_at` is set iff the status is answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusPatch {
    pub status: PrayerStatus,
    pub answered_at: Option<DateTime<Utc>>,
}

impl StatusPatch {
    #[must_use]
    pub fn new(status: PrayerStatus, now: DateTime<Utc>) -> Self {
        let answered_at = match status {
            PrayerStatus::Answered => Some(now),
            PrayerStatus::InProgress => None,
        };
        Self {
            status,
            answered_at,
        }
    }
}

/// Insert body for a prayer request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewPrayerRequest {
    pub user_id: UserId,
    pub title: String,
    pub description: Option<String>,
    pub labels: Vec<String>,
    pub is_shared: bool,
}

/// Split a comma-separated label string into trimmed, non-empty labels.
///
/// Labels keep their case and duplicates.
#[must_use]
pub fn parse_labels(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|label| !label.is_empty())
        .map(ToString::to_string)
        .collect()
}
