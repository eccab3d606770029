use std::sync::Arc;

use chrono::{Local, NaiveDate};

use super::FormMode;
use crate::content::RichTextEditor;
use crate::gateway::Gateway;
use crate::models::{EntryId, JournalEntry, JournalPayload, TagSet};
use crate::services::JournalService;
use crate::store::Invalidation;
use crate::{Error, Result};

/// Journal entry form: title, rich-text content, experience date and tags.
pub struct JournalForm<G> {
    gateway: Arc<G>,
    service: JournalService<G>,
    mode: FormMode<EntryId>,
    title: String,
    editor: RichTextEditor,
    experience_date: Option<NaiveDate>,
    tags: TagSet,
    tag_input: String,
}

impl<G: Gateway> JournalForm<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        Self {
            service: JournalService::new(Arc::clone(&gateway)),
            gateway,
            mode: FormMode::Creating,
            title: String::new(),
            editor: RichTextEditor::new(),
            experience_date: Some(today()),
            tags: TagSet::new(),
            tag_input: String::new(),
        }
    }

    #[must_use]
    pub const fn mode(&self) -> &FormMode<EntryId> {
        &self.mode
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    #[must_use]
    pub const fn editor(&self) -> &RichTextEditor {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut RichTextEditor {
        &mut self.editor
    }

    #[must_use]
    pub const fn experience_date(&self) -> Option<NaiveDate> {
        self.experience_date
    }

    pub fn set_experience_date(&mut self, date: Option<NaiveDate>) {
        self.experience_date = date;
    }

    #[must_use]
    pub const fn tags(&self) -> &TagSet {
        &self.tags
    }

    #[must_use]
    pub fn tag_input(&self) -> &str {
        &self.tag_input
    }

    pub fn set_tag_input(&mut self, input: impl Into<String>) {
        self.tag_input = input.into();
    }

    /// Add the pending tag input. The input is cleared only when a tag was
    /// actually added.
    pub fn commit_tag_input(&mut self) -> bool {
        let added = self.tags.add(&self.tag_input);
        if added {
            self.tag_input.clear();
        }
        added
    }

    /// Add a tag (trimmed, lowercased). Blank or present tags are ignored.
    pub fn add_tag(&mut self, raw: &str) -> bool {
        self.tags.add(raw)
    }

    /// Remove a tag by exact match. Missing tags are ignored.
    pub fn remove_tag(&mut self, tag: &str) -> bool {
        self.tags.remove(tag)
    }

    /// Load `entry` into the draft and bind its id.
    pub fn start_edit(&mut self, entry: &JournalEntry) {
        self.mode = FormMode::Editing(entry.id);
        self.title.clone_from(&entry.title);
        self.editor.set_content(&entry.content);
        self.experience_date = entry.experience_date;
        self.tags = entry.tags.clone();
        self.tag_input.clear();
    }

    /// Drop the draft and return to creating.
    pub fn cancel(&mut self) {
        self.reset();
    }

    /// Validate and submit the draft.
    ///
    /// Image URLs are collected from the content's `<img>` tags.
    pub async fn save(&mut self) -> Result<(JournalEntry, Invalidation)> {
        if self.title.trim().is_empty() {
            return Err(Error::validation("Title is required"));
        }
        let user_id = self
            .gateway
            .current_user()
            .await
            .ok_or(Error::NotAuthenticated)?;

        let payload = JournalPayload {
            title: self.title.clone(),
            content: self.editor.markup(),
            experience_date: self.experience_date,
            tags: self.tags.clone(),
            images: self.editor.document().image_urls(),
            user_id,
        };
        let saved = self.service.save(self.mode.target(), &payload).await?;
        self.reset();
        Ok(saved)
    }

    fn reset(&mut self) {
        self.mode = FormMode::Creating;
        self.title.clear();
        self.editor.clear();
        self.experience_date = Some(today());
        self.tags.clear();
        self.tag_input.clear();
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::gateway::{Collection, MemoryGateway};
    use crate::store::ListKind;

    fn signed_in_form() -> (Arc<MemoryGateway>, JournalForm<MemoryGateway>) {
        let gateway = Arc::new(MemoryGateway::signed_in("user-1"));
        let form = JournalForm::new(Arc::clone(&gateway));
        (gateway, form)
    }

    #[tokio::test]
    async fn empty_title_is_rejected_without_gateway_call() {
        let (gateway, mut form) = signed_in_form();
        form.set_title("   ");
        form.editor_mut().insert_text("keep me");
        form.add_tag("credinta");

        let error = form.save().await.unwrap_err();
        assert!(error.is_validation());
        assert_eq!(gateway.calls(), 0);
        assert_eq!(form.editor().markup(), "<p>keep me</p>");
        assert!(form.tags().contains("credinta"));
    }

    #[tokio::test]
    async fn missing_session_is_rejected_without_gateway_call() {
        let gateway = Arc::new(MemoryGateway::new());
        let mut form = JournalForm::new(Arc::clone(&gateway));
        form.set_title("Answered prayer");
        assert!(matches!(form.save().await.unwrap_err(), Error::NotAuthenticated));
        assert_eq!(gateway.calls(), 0);
        assert_eq!(form.title(), "Answered prayer");
    }

    #[tokio::test]
    async fn save_creates_entry_and_resets() {
        let (gateway, mut form) = signed_in_form();
        form.set_title("Answered prayer");
        form.editor_mut().insert_text("Thank you");
        form.editor_mut()
            .insert_image("https://res.cloudinary.com/demo/image/upload/v1/journal/a.jpg");
        form.set_tag_input(" Multumire ");
        assert!(form.commit_tag_input());
        assert_eq!(form.tag_input(), "");

        let (entry, invalidation) = form.save().await.unwrap();
        assert!(invalidation.contains(ListKind::Journal));
        assert_eq!(entry.title, "Answered prayer");
        assert_eq!(entry.tags.as_slice(), ["multumire"]);
        assert_eq!(
            entry.images,
            vec!["https://res.cloudinary.com/demo/image/upload/v1/journal/a.jpg"]
        );
        assert_eq!(gateway.rows(Collection::JournalEntries).await.len(), 1);

        assert_eq!(form.mode(), &FormMode::Creating);
        assert_eq!(form.title(), "");
        assert!(form.editor().is_empty());
        assert!(form.tags().is_empty());
        assert_eq!(form.experience_date(), Some(today()));
    }

    #[tokio::test]
    async fn edit_round_trip_updates_bound_entry() {
        let (gateway, mut form) = signed_in_form();
        form.set_title("Struggle");
        form.set_experience_date(NaiveDate::from_ymd_opt(2025, 1, 7));
        let (created, _) = form.save().await.unwrap();

        form.start_edit(&created);
        assert_eq!(form.mode(), &FormMode::Editing(created.id));
        assert_eq!(form.title(), "Struggle");
        assert_eq!(form.experience_date(), NaiveDate::from_ymd_opt(2025, 1, 7));

        form.set_title("Victory");
        let (updated, _) = form.save().await.unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.title, "Victory");
        assert_eq!(gateway.rows(Collection::JournalEntries).await.len(), 1);
        assert!(!form.mode().is_editing());
    }

    #[tokio::test]
    async fn unchanged_edit_keeps_stored_content() {
        let (gateway, mut form) = signed_in_form();
        let stored = "<h2>Psalm</h2><ol><li><p>one</p></li><li><p>two</p></li></ol>\
                      <p>a</p><p></p><p>b</p><blockquote><p>q</p></blockquote><p><s>x</s></p>";
        form.set_title("Psalm");
        form.editor_mut().set_content(stored);
        let (created, _) = form.save().await.unwrap();
        assert_eq!(created.content, stored);

        form.start_edit(&created);
        assert_eq!(form.editor().markup(), stored);
        let (updated, _) = form.save().await.unwrap();
        assert_eq!(updated.content, stored);
        let rows = gateway.rows(Collection::JournalEntries).await;
        assert_eq!(rows[0]["content"], stored);
    }

    #[tokio::test]
    async fn edit_appends_without_flattening_structure() {
        let (_, mut form) = signed_in_form();
        form.set_title("Psalm");
        form.editor_mut()
            .set_content("<h2>Psalm</h2><p></p><blockquote><p>q</p></blockquote>");
        let (created, _) = form.save().await.unwrap();

        form.start_edit(&created);
        form.editor_mut().new_line();
        form.editor_mut().insert_text("amen");
        let (updated, _) = form.save().await.unwrap();
        assert_eq!(
            updated.content,
            "<h2>Psalm</h2><p></p><blockquote><p>q</p></blockquote><p>amen</p>"
        );
    }

    #[tokio::test]
    async fn gateway_failure_keeps_draft_and_binding() {
        let (gateway, mut form) = signed_in_form();
        form.set_title("Draft");
        let (created, _) = form.save().await.unwrap();
        form.start_edit(&created);
        form.set_title("Changed");

        gateway.fail_next("network down").await;
        let error = form.save().await.unwrap_err();
        assert_eq!(error.to_string(), "network down");
        assert_eq!(form.title(), "Changed");
        assert_eq!(form.mode().target(), Some(&created.id));
    }

    #[test]
    fn duplicate_tag_and_missing_removal_are_noops() {
        let (_, mut form) = signed_in_form();
        assert!(form.add_tag("Pace"));
        assert!(!form.add_tag("pace"));
        assert!(!form.remove_tag("lupta"));
        assert_eq!(form.tags().as_slice(), ["pace"]);

        form.set_tag_input("pace");
        assert!(!form.commit_tag_input());
        assert_eq!(form.tag_input(), "pace");
    }

    #[test]
    fn cancel_clears_edit_binding() {
        let (_, mut form) = signed_in_form();
        let entry = JournalEntry {
            id: EntryId::new(),
            title: "Old".to_string(),
            content: "<p>old</p>".to_string(),
            experience_date: None,
            tags: ["x"].into_iter().collect(),
            images: Vec::new(),
            user_id: "user-1".into(),
        };
        form.start_edit(&entry);
        assert_eq!(form.experience_date(), None);
        form.cancel();
        assert_eq!(form.mode(), &FormMode::Creating);
        assert!(form.editor().is_empty());
    }
}
