use std::sync::Arc;

use super::{decode_row, decode_rows, require_title};
use crate::gateway::{Collection, Filter, Gateway, Order};
use crate::models::{EntryId, JournalEntry, JournalPayload};
use crate::store::{Invalidation, ListKind};
use crate::Result;

/// Journal entry operations.
#[derive(Clone)]
pub struct JournalService<G> {
    gateway: Arc<G>,
}

impl<G: Gateway> JournalService<G> {
    pub const fn new(gateway: Arc<G>) -> Self {
        Self { gateway }
    }

    /// All entries visible to the session, most recent experience first.
    pub async fn load(&self) -> Result<Vec<JournalEntry>> {
        let rows = self
            .gateway
            .query(
                Collection::JournalEntries,
                &Filter::all(),
                &Order::desc("experience_date"),
            )
            .await?;
        decode_rows(rows)
    }

    /// Insert a new entry, or update `target` when given.
    pub async fn save(
        &self,
        target: Option<&EntryId>,
        payload: &JournalPayload,
    ) -> Result<(JournalEntry, Invalidation)> {
        require_title(&payload.title)?;
        let body = serde_json::to_value(payload)?;

        let row = match target {
            Some(id) => {
                tracing::debug!(entry = %id, "Updating journal entry");
                self.gateway
                    .update(Collection::JournalEntries, &id.as_str(), body)
                    .await?
            }
            None => {
                tracing::debug!("Creating journal entry");
                self.gateway.insert(Collection::JournalEntries, body).await?
            }
        };
        Ok((decode_row(row)?, Invalidation::of(ListKind::Journal)))
    }

    pub async fn delete(&self, id: &EntryId) -> Result<Invalidation> {
        self.gateway
            .delete(Collection::JournalEntries, &id.as_str())
            .await?;
        Ok(Invalidation::of(ListKind::Journal))
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::gateway::MemoryGateway;
    use crate::models::{TagSet, UserId};
    use crate::Error;

    fn payload(title: &str, date: Option<NaiveDate>) -> JournalPayload {
        JournalPayload {
            title: title.to_string(),
            content: "<p>text</p>".to_string(),
            experience_date: date,
            tags: ["credinta"].into_iter().collect::<TagSet>(),
            images: Vec::new(),
            user_id: UserId::new("user-1"),
        }
    }

    #[tokio::test]
    async fn load_orders_by_experience_date_desc() {
        let gateway = Arc::new(MemoryGateway::signed_in("user-1"));
        let service = JournalService::new(Arc::clone(&gateway));
        for (title, day) in [("first", 1), ("third", 20), ("second", 10)] {
            service
                .save(None, &payload(title, NaiveDate::from_ymd_opt(2025, 1, day)))
                .await
                .unwrap();
        }

        let titles: Vec<String> = service
            .load()
            .await
            .unwrap()
            .into_iter()
            .map(|entry| entry.title)
            .collect();
        assert_eq!(titles, vec!["third", "second", "first"]);
    }

    #[tokio::test]
    async fn save_with_target_updates_in_place() {
        let gateway = Arc::new(MemoryGateway::signed_in("user-1"));
        let service = JournalService::new(Arc::clone(&gateway));
        let (created, invalidation) = service.save(None, &payload("draft", None)).await.unwrap();
        assert!(invalidation.contains(ListKind::Journal));

        let (updated, _) = service
            .save(Some(&created.id), &payload("final", None))
            .await
            .unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.title, "final");
        assert_eq!(gateway.rows(Collection::JournalEntries).await.len(), 1);
    }

    #[tokio::test]
    async fn blank_title_never_reaches_gateway() {
        let gateway = Arc::new(MemoryGateway::signed_in("user-1"));
        let service = JournalService::new(Arc::clone(&gateway));
        let error = service.save(None, &payload("   ", None)).await.unwrap_err();
        assert!(matches!(error, Error::Validation(_)));
        assert_eq!(gateway.calls(), 0);
    }

    #[tokio::test]
    async fn delete_removes_entry() {
        let gateway = Arc::new(MemoryGateway::signed_in("user-1"));
        let service = JournalService::new(Arc::clone(&gateway));
        let (created, _) = service.save(None, &payload("gone", None)).await.unwrap();
        let invalidation = service.delete(&created.id).await.unwrap();
        assert_eq!(invalidation, Invalidation::of(ListKind::Journal));
        assert!(service.load().await.unwrap().is_empty());
    }
}
