use std::sync::Arc;

use chrono::Utc;
use serde_json::json;

use super::{decode_row, decode_rows, require_title, require_user};
use crate::gateway::{Collection, Filter, Gateway, Order};
use crate::models::{NewPrayerRequest, PrayerId, PrayerRequest};
use crate::store::{Invalidation, ListKind};
use crate::Result;

/// Prayer request operations, for the user's own list and the shared feed.
#[derive(Clone)]
pub struct PrayerService<G> {
    gateway: Arc<G>,
}

impl<G: Gateway> PrayerService<G> {
    pub const fn new(gateway: Arc<G>) -> Self {
        Self { gateway }
    }

    /// The signed-in user's prayers, newest first.
    pub async fn load_mine(&self) -> Result<Vec<PrayerRequest>> {
        let user = require_user(self.gateway.as_ref()).await?;
        let rows = self
            .gateway
            .query(
                Collection::PrayerRequests,
                &Filter::all().eq("user_id", user.as_str()),
                &Order::desc("created_at"),
            )
            .await?;
        decode_rows(rows)
    }

    /// Prayers other users chose to share, newest first.
    ///
    /// The viewer's own shared prayers are excluded.
    pub async fn load_shared(&self) -> Result<Vec<PrayerRequest>> {
        let user = require_user(self.gateway.as_ref()).await?;
        let rows = self
            .gateway
            .query(
                Collection::PrayerRequests,
                &Filter::all()
                    .eq("is_shared", true)
                    .neq("user_id", user.as_str()),
                &Order::desc("created_at"),
            )
            .await?;
        decode_rows(rows)
    }

    pub async fn create(
        &self,
        request: &NewPrayerRequest,
    ) -> Result<(PrayerRequest, Invalidation)> {
        require_title(&request.title)?;
        let row = self
            .gateway
            .insert(Collection::PrayerRequests, serde_json::to_value(request)?)
            .await?;
        let prayer: PrayerRequest = decode_row(row)?;
        tracing::debug!(prayer = %prayer.id, shared = prayer.is_shared, "Created prayer request");

        let mut invalidation = Invalidation::of(ListKind::MyPrayers);
        if request.is_shared {
            invalidation = invalidation.and(ListKind::SharedPrayers);
        }
        Ok((prayer, invalidation))
    }

    /// Flip between in progress and answered.
    ///
    /// Answering stamps `answered_at` with the current time; reopening clears
    /// it.
    pub async fn toggle_status(
        &self,
        prayer: &PrayerRequest,
    ) -> Result<(PrayerRequest, Invalidation)> {
        let patch = prayer.toggle_status_patch(Utc::now());
        let row = self
            .gateway
            .update(
                Collection::PrayerRequests,
                &prayer.id.as_str(),
                serde_json::to_value(patch)?,
            )
            .await?;
        Ok((decode_row(row)?, Invalidation::of(ListKind::MyPrayers)))
    }

    pub async fn toggle_share(
        &self,
        prayer: &PrayerRequest,
    ) -> Result<(PrayerRequest, Invalidation)> {
        let row = self
            .gateway
            .update(
                Collection::PrayerRequests,
                &prayer.id.as_str(),
                json!({ "is_shared": !prayer.is_shared }),
            )
            .await?;
        Ok((
            decode_row(row)?,
            Invalidation::of(ListKind::MyPrayers).and(ListKind::SharedPrayers),
        ))
    }

    pub async fn delete(&self, id: &PrayerId) -> Result<Invalidation> {
        self.gateway
            .delete(Collection::PrayerRequests, &id.as_str())
            .await?;
        Ok(Invalidation::of(ListKind::MyPrayers))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::gateway::MemoryGateway;
    use crate::models::{parse_labels, PrayerStatus, UserId};
    use crate::Error;

    fn request(user: &str, title: &str, shared: bool) -> NewPrayerRequest {
        NewPrayerRequest {
            user_id: UserId::new(user),
            title: title.to_string(),
            description: None,
            labels: parse_labels("sanatate, familie"),
            is_shared: shared,
        }
    }

    #[tokio::test]
    async fn create_defaults_to_in_progress() {
        let gateway = Arc::new(MemoryGateway::signed_in("me"));
        let service = PrayerService::new(gateway);
        let (prayer, invalidation) = service.create(&request("me", "Health", false)).await.unwrap();
        assert_eq!(prayer.status, PrayerStatus::InProgress);
        assert_eq!(prayer.answered_at, None);
        assert_eq!(prayer.labels, vec!["sanatate", "familie"]);
        assert_eq!(invalidation, Invalidation::of(ListKind::MyPrayers));
    }

    #[tokio::test]
    async fn creating_shared_prayer_invalidates_feed() {
        let gateway = Arc::new(MemoryGateway::signed_in("me"));
        let service = PrayerService::new(gateway);
        let (_, invalidation) = service.create(&request("me", "Job", true)).await.unwrap();
        assert!(invalidation.contains(ListKind::SharedPrayers));
    }

    #[tokio::test]
    async fn toggle_status_sets_and_clears_answered_at() {
        let gateway = Arc::new(MemoryGateway::signed_in("me"));
        let service = PrayerService::new(gateway);
        let (prayer, _) = service.create(&request("me", "Exam", false)).await.unwrap();

        let before = Utc::now();
        let (answered, _) = service.toggle_status(&prayer).await.unwrap();
        assert_eq!(answered.status, PrayerStatus::Answered);
        let answered_at = answered.answered_at.unwrap();
        assert!(answered_at >= before && answered_at <= Utc::now());

        let (reopened, _) = service.toggle_status(&answered).await.unwrap();
        assert_eq!(reopened.status, PrayerStatus::InProgress);
        assert_eq!(reopened.answered_at, None);
    }

    #[tokio::test]
    async fn shared_feed_excludes_own_prayers() {
        let gateway = Arc::new(MemoryGateway::signed_in("me"));
        let service = PrayerService::new(Arc::clone(&gateway));
        service.create(&request("me", "Mine shared", true)).await.unwrap();
        service.create(&request("other", "Theirs shared", true)).await.unwrap();
        service.create(&request("other", "Theirs private", false)).await.unwrap();

        let shared: Vec<String> = service
            .load_shared()
            .await
            .unwrap()
            .into_iter()
            .map(|prayer| prayer.title)
            .collect();
        assert_eq!(shared, vec!["Theirs shared"]);

        let mine = service.load_mine().await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].title, "Mine shared");
    }

    #[tokio::test]
    async fn toggle_share_invalidates_both_lists() {
        let gateway = Arc::new(MemoryGateway::signed_in("me"));
        let service = PrayerService::new(gateway);
        let (prayer, _) = service.create(&request("me", "Family", false)).await.unwrap();
        let (shared, invalidation) = service.toggle_share(&prayer).await.unwrap();
        assert!(shared.is_shared);
        assert!(invalidation.contains(ListKind::MyPrayers));
        assert!(invalidation.contains(ListKind::SharedPrayers));
    }

    #[tokio::test]
    async fn loads_require_a_session() {
        let gateway = Arc::new(MemoryGateway::new());
        let service = PrayerService::new(Arc::clone(&gateway));
        assert!(matches!(
            service.load_mine().await.unwrap_err(),
            Error::NotAuthenticated
        ));
        assert_eq!(gateway.calls(), 0);
    }

    #[tokio::test]
    async fn gateway_failure_is_surfaced_verbatim() {
        let gateway = Arc::new(MemoryGateway::signed_in("me"));
        let service = PrayerService::new(Arc::clone(&gateway));
        let (prayer, _) = service.create(&request("me", "Peace", false)).await.unwrap();
        gateway.fail_next("permission denied for table prayer_requests").await;
        let error = service.delete(&prayer.id).await.unwrap_err();
        assert_eq!(error.to_string(), "permission denied for table prayer_requests");
    }
}
