//! Draft state for the create/edit forms.
//!
//! A form is either creating a new record or editing a bound one. Submitting
//! validates locally first: a draft that fails validation never reaches the
//! gateway. A failed submit keeps the draft; a successful one clears it and
//! hands back the [`Invalidation`](crate::store::Invalidation) to apply.

mod journal;
mod prayer;
mod reminder;

pub use journal::JournalForm;
pub use prayer::PrayerForm;
pub use reminder::ReminderForm;

/// Whether a form creates a record or edits the one with the bound id.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FormMode<Id> {
    #[default]
    Creating,
    Editing(Id),
}

impl<Id> FormMode<Id> {
    #[must_use]
    pub const fn is_editing(&self) -> bool {
        matches!(self, Self::Editing(_))
    }

    #[must_use]
    pub const fn target(&self) -> Option<&Id> {
        match self {
            Self::Creating => None,
            Self::Editing(id) => Some(id),
        }
    }
}
