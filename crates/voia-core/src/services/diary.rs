use std::sync::Arc;

use super::{decode_row, decode_rows, require_title, require_user};
use crate::gateway::{Collection, Filter, Gateway, Order};
use crate::models::{DiaryEntry, DiaryId, NewDiaryEntry};
use crate::store::{Invalidation, ListKind};
use crate::util::is_http_url;
use crate::{Error, Result};

/// Diary note operations.
#[derive(Clone)]
pub struct DiaryService<G> {
    gateway: Arc<G>,
}

impl<G: Gateway> DiaryService<G> {
    pub const fn new(gateway: Arc<G>) -> Self {
        Self { gateway }
    }

    /// The signed-in user's notes, newest first.
    pub async fn load(&self) -> Result<Vec<DiaryEntry>> {
        let user = require_user(self.gateway.as_ref()).await?;
        let rows = self
            .gateway
            .query(
                Collection::DiaryEntries,
                &Filter::all().eq("user_id", user.as_str()),
                &Order::desc("created_at"),
            )
            .await?;
        decode_rows(rows)
    }

    /// Add a note. A blank photo URL is stored as no photo.
    pub async fn create(
        &self,
        title: &str,
        content: &str,
        photo_url: Option<&str>,
    ) -> Result<(DiaryEntry, Invalidation)> {
        require_title(title)?;
        if content.trim().is_empty() {
            return Err(Error::validation("Content is required"));
        }
        let photo_url = photo_url
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(ToString::to_string);
        if photo_url.as_deref().is_some_and(|url| !is_http_url(url)) {
            return Err(Error::validation(
                "Photo URL must start with http:// or https://",
            ));
        }
        let user_id = require_user(self.gateway.as_ref()).await?;

        let body = NewDiaryEntry {
            user_id,
            title: title.to_string(),
            content: content.to_string(),
            photo_url,
        };
        let row = self
            .gateway
            .insert(Collection::DiaryEntries, serde_json::to_value(&body)?)
            .await?;
        tracing::debug!("Created diary entry");
        Ok((decode_row(row)?, Invalidation::of(ListKind::Diary)))
    }

    pub async fn delete(&self, id: &DiaryId) -> Result<Invalidation> {
        self.gateway
            .delete(Collection::DiaryEntries, &id.as_str())
            .await?;
        Ok(Invalidation::of(ListKind::Diary))
    }
}
