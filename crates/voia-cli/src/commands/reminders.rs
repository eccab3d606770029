use std::sync::Arc;

use voia_core::form::ReminderForm;
use voia_core::services::ReminderService;
use voia_core::store::{EntryStore, ListKind};
use voia_core::Reminder;

use crate::cli::ReminderCommands;
use crate::commands::common::{connect, format_reminder_lines, resolve_record};
use crate::error::CliError;

const KIND: &str = "reminder";

pub async fn run_reminders(
    command: ReminderCommands,
    global_profile: Option<&str>,
) -> Result<(), CliError> {
    let connection = connect(global_profile).await?;
    let service = ReminderService::new(Arc::clone(&connection.gateway));
    let mut store: EntryStore<Reminder> = EntryStore::new(ListKind::Reminders);

    match command {
        ReminderCommands::List { json } => {
            let reminders = store.reload(|| service.load()).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(reminders)?);
            } else if reminders.is_empty() {
                println!("No reminders.");
            } else {
                for line in format_reminder_lines(reminders) {
                    println!("{line}");
                }
            }
            Ok(())
        }
        ReminderCommands::Add { time } => {
            let mut form = ReminderForm::new(Arc::clone(&connection.gateway));
            if let Some(time) = time {
                form.set_time(&time)?;
            }
            let (reminder, _) = form.submit().await?;
            println!("{} {}", reminder.id, reminder.time);
            Ok(())
        }
        ReminderCommands::Toggle { id } => {
            store.reload(|| service.load()).await?;
            let reminder = resolve_record(store.records(), &id, KIND)?.clone();
            let (updated, _) = service.toggle_enabled(&reminder).await?;
            let state = if updated.enabled { "on" } else { "off" };
            println!("{} {} {state}", updated.id, updated.time);
            Ok(())
        }
        ReminderCommands::Delete { id } => {
            store.reload(|| service.load()).await?;
            let reminder = resolve_record(store.records(), &id, KIND)?.clone();
            let invalidation = service.delete(&reminder.id).await?;
            store.refresh_if(&invalidation, || service.load()).await?;
            tracing::debug!(remaining = store.len(), "Reminders reloaded");
            println!("{}", reminder.id);
            Ok(())
        }
    }
}
