use std::sync::Arc;

use crate::gateway::Gateway;
use crate::models::{Reminder, ReminderTime};
use crate::services::ReminderService;
use crate::store::Invalidation;
use crate::{Error, Result};

/// New reminder form. The time starts at 09:00 and returns there after each
/// successful submit.
pub struct ReminderForm<G> {
    service: ReminderService<G>,
    time: ReminderTime,
}

impl<G: Gateway> ReminderForm<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        Self {
            service: ReminderService::new(gateway),
            time: ReminderTime::default(),
        }
    }

    #[must_use]
    pub const fn time(&self) -> ReminderTime {
        self.time
    }

    /// Set the time from `HH:MM` input. Invalid input leaves the draft as is.
    pub fn set_time(&mut self, raw: &str) -> Result<()> {
        self.time = raw.parse().map_err(Error::Validation)?;
        Ok(())
    }

    pub async fn submit(&mut self) -> Result<(Reminder, Invalidation)> {
        let created = self.service.create(self.time).await?;
        self.time = ReminderTime::default();
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::gateway::MemoryGateway;

    #[tokio::test]
    async fn submit_creates_enabled_reminder_and_resets_time() {
        let gateway = Arc::new(MemoryGateway::signed_in("me"));
        let mut form = ReminderForm::new(gateway);
        form.set_time("06:45").unwrap();

        let (reminder, _) = form.submit().await.unwrap();
        assert_eq!(reminder.time.to_string(), "06:45");
        assert!(reminder.enabled);
        assert_eq!(form.time().to_string(), "09:00");
    }

    #[test]
    fn invalid_time_is_rejected() {
        let mut form = ReminderForm::new(Arc::new(MemoryGateway::signed_in("me")));
        for raw in ["", "25:00", "7", "ab:cd", "12:60"] {
            assert!(form.set_time(raw).unwrap_err().is_validation(), "{raw}");
        }
        assert_eq!(form.time().to_string(), "09:00");
    }

    #[tokio::test]
    async fn submit_without_session_keeps_time() {
        let gateway = Arc::new(MemoryGateway::new());
        let mut form = ReminderForm::new(Arc::clone(&gateway));
        form.set_time("22:10").unwrap();
        assert!(matches!(form.submit().await.unwrap_err(), Error::NotAuthenticated));
        assert_eq!(form.time().to_string(), "22:10");
        assert_eq!(gateway.calls(), 0);
    }
}
