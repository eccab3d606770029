use std::sync::Arc;

use crate::gateway::Gateway;
use crate::models::{parse_labels, NewPrayerRequest, PrayerRequest};
use crate::services::PrayerService;
use crate::store::Invalidation;
use crate::{Error, Result};

/// New prayer request form.
///
/// Prayers are only created through the form; status and sharing change
/// through targeted toggles on the list.
pub struct PrayerForm<G> {
    gateway: Arc<G>,
    service: PrayerService<G>,
    pub title: String,
    pub description: String,
    /// Comma-separated labels, split on submit
    pub labels: String,
    pub is_shared: bool,
}

impl<G: Gateway> PrayerForm<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        Self {
            service: PrayerService::new(Arc::clone(&gateway)),
            gateway,
            title: String::new(),
            description: String::new(),
            labels: String::new(),
            is_shared: false,
        }
    }

    /// Labels as they will be stored.
    #[must_use]
    pub fn parsed_labels(&self) -> Vec<String> {
        parse_labels(&self.labels)
    }

    pub async fn submit(&mut self) -> Result<(PrayerRequest, Invalidation)> {
        if self.title.trim().is_empty() {
            return Err(Error::validation("Title is required"));
        }
        let user_id = self
            .gateway
            .current_user()
            .await
            .ok_or(Error::NotAuthenticated)?;

        let request = NewPrayerRequest {
            user_id,
            title: self.title.clone(),
            description: Some(self.description.clone()).filter(|text| !text.trim().is_empty()),
            labels: self.parsed_labels(),
            is_shared: self.is_shared,
        };
        let created = self.service.create(&request).await?;
        self.reset();
        Ok(created)
    }

    pub fn reset(&mut self) {
        self.title.clear();
        self.description.clear();
        self.labels.clear();
        self.is_shared = false;
    }
}
