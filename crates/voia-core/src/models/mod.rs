//! Record types for the hosted collections

mod diary;
mod id;
mod journal;
mod prayer;
mod reminder;
mod settings;
mod tag;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

use crate::gateway::Collection;

pub use diary::{DiaryEntry, NewDiaryEntry};
pub use id::{DiaryId, EntryId, PrayerId, ReminderId, UserId};
pub use journal::{JournalEntry, JournalPayload};
pub use prayer::{parse_labels, NewPrayerRequest, PrayerRequest, PrayerStatus, StatusPatch};
pub use reminder::{NewReminder, Reminder, ReminderTime};
pub use settings::Preferences;
pub use tag::{normalize_tag, TagSet};

/// A typed record stored in one gateway collection.
pub trait Record: DeserializeOwned + Serialize + Clone + Send + Sync + 'static {
    /// Collection this record type is loaded from.
    const COLLECTION: Collection;

    /// Record identifier as stored by the gateway.
    fn record_id(&self) -> String;
}

/// Treat JSON `null` the same as a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
