use std::sync::Arc;

use voia_core::filter::{filter_prayers, StatusFilter};
use voia_core::form::PrayerForm;
use voia_core::gateway::SupabaseGateway;
use voia_core::services::PrayerService;
use voia_core::store::{EntryStore, ListKind};
use voia_core::PrayerRequest;

use crate::cli::PrayerCommands;
use crate::commands::common::{connect, format_prayer_lines, resolve_record};
use crate::error::CliError;

const KIND: &str = "prayer request";

pub async fn run_prayers(
    command: PrayerCommands,
    global_profile: Option<&str>,
) -> Result<(), CliError> {
    let connection = connect(global_profile).await?;
    let service = PrayerService::new(Arc::clone(&connection.gateway));
    match command {
        PrayerCommands::List {
            shared,
            status,
            json,
        } => {
            let kind = if shared {
                ListKind::SharedPrayers
            } else {
                ListKind::MyPrayers
            };
            let mut store = EntryStore::new(kind);
            if shared {
                store.reload(|| service.load_shared()).await?;
            } else {
                store.reload(|| service.load_mine()).await?;
            }

            let prayers = filter_prayers(store.records(), StatusFilter::from(status));
            if json {
                println!("{}", serde_json::to_string_pretty(&prayers)?);
            } else if prayers.is_empty() {
                println!("No prayer requests.");
            } else {
                for line in format_prayer_lines(&prayers) {
                    println!("{line}");
                }
            }
            Ok(())
        }
        PrayerCommands::Add {
            title,
            description,
            labels,
            shared,
        } => {
            let mut form = PrayerForm::new(Arc::clone(&connection.gateway));
            form.title = title;
            form.description = description.unwrap_or_default();
            form.labels = labels;
            form.is_shared = shared;
            let (prayer, _) = form.submit().await?;
            println!("{}", prayer.id);
            Ok(())
        }
        PrayerCommands::ToggleStatus { id } => {
            let prayer = find_mine(&service, &id).await?;
            let (updated, _) = service.toggle_status(&prayer).await?;
            println!("{} {}", updated.id, updated.status.as_str());
            Ok(())
        }
        PrayerCommands::ToggleShare { id } => {
            let prayer = find_mine(&service, &id).await?;
            let (updated, _) = service.toggle_share(&prayer).await?;
            let state = if updated.is_shared { "shared" } else { "private" };
            println!("{} {state}", updated.id);
            Ok(())
        }
        PrayerCommands::Delete { id } => {
            let mut store = EntryStore::new(ListKind::MyPrayers);
            store.reload(|| service.load_mine()).await?;
            let prayer = resolve_record(store.records(), &id, KIND)?.clone();
            let invalidation = service.delete(&prayer.id).await?;
            store.refresh_if(&invalidation, || service.load_mine()).await?;
            tracing::debug!(remaining = store.len(), "Prayer list reloaded");
            println!("{}", prayer.id);
            Ok(())
        }
    }
}

/// Status and sharing change only on the viewer's own prayers.
async fn find_mine(
    service: &PrayerService<SupabaseGateway>,
    id: &str,
) -> Result<PrayerRequest, CliError> {
    let mut store = EntryStore::new(ListKind::MyPrayers);
    store.reload(|| service.load_mine()).await?;
    Ok(resolve_record(store.records(), id, KIND)?.clone())
}
