use std::sync::Arc;

use voia_core::services::DiaryService;
use voia_core::store::{EntryStore, ListKind};
use voia_core::DiaryEntry;

use crate::cli::DiaryCommands;
use crate::commands::common::{
    connect, format_diary_lines, resolve_entry_content, resolve_record, upload_file,
};
use crate::error::CliError;

const KIND: &str = "diary note";

pub async fn run_diary(command: DiaryCommands, global_profile: Option<&str>) -> Result<(), CliError> {
    let connection = connect(global_profile).await?;
    let service = DiaryService::new(Arc::clone(&connection.gateway));
    let mut store: EntryStore<DiaryEntry> = EntryStore::new(ListKind::Diary);

    match command {
        DiaryCommands::List { json } => {
            let entries = store.reload(|| service.load()).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(entries)?);
            } else if entries.is_empty() {
                println!("No diary notes yet.");
            } else {
                for line in format_diary_lines(entries) {
                    println!("{line}");
                }
            }
            Ok(())
        }
        DiaryCommands::Add {
            title,
            content,
            photo_url,
            photo,
        } => {
            let content = resolve_entry_content(content.as_deref())?.unwrap_or_default();
            let photo_url = match photo {
                Some(path) => Some(upload_file(&connection.uploader()?, &path).await?),
                None => photo_url,
            };
            let (entry, invalidation) = service
                .create(&title, &content, photo_url.as_deref())
                .await?;
            store.refresh_if(&invalidation, || service.load()).await?;
            tracing::debug!(notes = store.len(), "Diary reloaded");
            println!("{}", entry.id);
            Ok(())
        }
        DiaryCommands::Delete { id } => {
            store.reload(|| service.load()).await?;
            let entry = resolve_record(store.records(), &id, KIND)?.clone();
            let invalidation = service.delete(&entry.id).await?;
            store.refresh_if(&invalidation, || service.load()).await?;
            tracing::debug!(remaining = store.len(), "Diary reloaded");
            println!("{}", entry.id);
            Ok(())
        }
    }
}
