//! Per-collection operations over a [`Gateway`].
//!
//! Each service wraps a shared gateway handle. Loads decode gateway rows into
//! typed records; writes return the stored record (where there is one) and
//! the [`Invalidation`](crate::store::Invalidation) naming the lists to
//! reload.

mod diary;
mod journal;
mod prayers;
mod reminders;

use serde_json::Value;

use crate::gateway::Gateway;
use crate::models::{Record, UserId};
use crate::{Error, Result};

pub use diary::DiaryService;
pub use journal::JournalService;
pub use prayers::PrayerService;
pub use reminders::ReminderService;

fn decode_row<R: Record>(row: Value) -> Result<R> {
    Ok(serde_json::from_value(row)?)
}

fn decode_rows<R: Record>(rows: Vec<Value>) -> Result<Vec<R>> {
    rows.into_iter().map(decode_row).collect()
}

async fn require_user<G: Gateway>(gateway: &G) -> Result<UserId> {
    gateway.current_user().await.ok_or(Error::NotAuthenticated)
}

fn require_title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(Error::validation("Title is required"));
    }
    Ok(())
}
