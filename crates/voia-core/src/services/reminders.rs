use std::sync::Arc;

use serde_json::json;

use super::{decode_row, decode_rows, require_user};
use crate::gateway::{Collection, Filter, Gateway, Order};
use crate::models::{NewReminder, Reminder, ReminderId, ReminderTime};
use crate::store::{Invalidation, ListKind};
use crate::Result;

/// Daily reminder operations.
#[derive(Clone)]
pub struct ReminderService<G> {
    gateway: Arc<G>,
}

impl<G: Gateway> ReminderService<G> {
    pub const fn new(gateway: Arc<G>) -> Self {
        Self { gateway }
    }

    /// The signed-in user's reminders, earliest time of day first.
    pub async fn load(&self) -> Result<Vec<Reminder>> {
        let user = require_user(self.gateway.as_ref()).await?;
        let rows = self
            .gateway
            .query(
                Collection::Reminders,
                &Filter::all().eq("user_id", user.as_str()),
                &Order::asc("time"),
            )
            .await?;
        decode_rows(rows)
    }

    /// Create an enabled reminder at `time` for the signed-in user.
    pub async fn create(&self, time: ReminderTime) -> Result<(Reminder, Invalidation)> {
        let user_id = require_user(self.gateway.as_ref()).await?;
        let body = NewReminder {
            user_id,
            time,
            enabled: true,
        };
        let row = self
            .gateway
            .insert(Collection::Reminders, serde_json::to_value(&body)?)
            .await?;
        tracing::debug!(%time, "Created reminder");
        Ok((decode_row(row)?, Invalidation::of(ListKind::Reminders)))
    }

    pub async fn toggle_enabled(&self, reminder: &Reminder) -> Result<(Reminder, Invalidation)> {
        let row = self
            .gateway
            .update(
                Collection::Reminders,
                &reminder.id.as_str(),
                json!({ "enabled": !reminder.enabled }),
            )
            .await?;
        Ok((decode_row(row)?, Invalidation::of(ListKind::Reminders)))
    }

    pub async fn delete(&self, id: &ReminderId) -> Result<Invalidation> {
        self.gateway.delete(Collection::Reminders, &id.as_str()).await?;
        Ok(Invalidation::of(ListKind::Reminders))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::gateway::MemoryGateway;

    #[tokio::test]
    async fn create_is_enabled_and_load_orders_by_time() {
        let gateway = Arc::new(MemoryGateway::signed_in("me"));
        let service = ReminderService::new(gateway);
        for time in ["21:00", "07:30", "12:15"] {
            let (reminder, invalidation) = service.create(time.parse().unwrap()).await.unwrap();
            assert!(reminder.enabled);
            assert_eq!(invalidation, Invalidation::of(ListKind::Reminders));
        }

        let times: Vec<String> = service
            .load()
            .await
            .unwrap()
            .iter()
            .map(|reminder| reminder.time.to_string())
            .collect();
        assert_eq!(times, vec!["07:30", "12:15", "21:00"]);
    }

    #[tokio::test]
    async fn toggle_enabled_flips_flag() {
        let gateway = Arc::new(MemoryGateway::signed_in("me"));
        let service = ReminderService::new(gateway);
        let (reminder, _) = service.create(ReminderTime::default()).await.unwrap();
        let (toggled, _) = service.toggle_enabled(&reminder).await.unwrap();
        assert!(!toggled.enabled);
        let (toggled, _) = service.toggle_enabled(&toggled).await.unwrap();
        assert!(toggled.enabled);
    }

    #[tokio::test]
    async fn load_only_returns_own_reminders() {
        let gateway = Arc::new(MemoryGateway::signed_in("me"));
        let service = ReminderService::new(Arc::clone(&gateway));
        service.create(ReminderTime::default()).await.unwrap();
        gateway
            .seed(
                Collection::Reminders,
                json!({
                    "id": ReminderId::new().as_str(),
                    "time": "06:00:00",
                    "enabled": true,
                    "created_at": "2025-01-01T06:00:00Z",
                    "user_id": "someone-else"
                }),
            )
            .await;

        let reminders = service.load().await.unwrap();
        assert_eq!(reminders.len(), 1);
        assert_eq!(reminders[0].time.to_string(), "09:00");
    }

    #[tokio::test]
    async fn delete_invalidates_reminders() {
        let gateway = Arc::new(MemoryGateway::signed_in("me"));
        let service = ReminderService::new(gateway);
        let (reminder, _) = service.create(ReminderTime::default()).await.unwrap();
        let invalidation = service.delete(&reminder.id).await.unwrap();
        assert!(invalidation.contains(ListKind::Reminders));
        assert!(service.load().await.unwrap().is_empty());
    }
}
