use std::path::PathBuf;
use std::sync::Arc;

use chrono::{Local, NaiveDate};
use voia_core::content::RichTextEditor;
use voia_core::filter::{collect_tags, filter_entries, EntryFilter};
use voia_core::form::JournalForm;
use voia_core::models::normalize_tag;
use voia_core::services::JournalService;
use voia_core::store::{EntryStore, ListKind};
use voia_core::JournalEntry;

use crate::cli::JournalCommands;
use crate::commands::common::{
    capture_editor_input_with_initial, connect, format_entry_detail, format_entry_lines,
    parse_month, resolve_entry_content, resolve_record, upload_file, Connection,
};
use crate::error::CliError;

const KIND: &str = "journal entry";

pub async fn run_journal(
    command: JournalCommands,
    global_profile: Option<&str>,
) -> Result<(), CliError> {
    let connection = connect(global_profile).await?;
    match command {
        JournalCommands::List {
            query,
            month,
            tag,
            json,
        } => run_list(&connection, query, month.as_deref(), tag, json).await,
        JournalCommands::Show { id } => {
            let store = load_journal(&connection).await?;
            let entry = resolve_record(store.records(), &id, KIND)?;
            println!("{}", format_entry_detail(entry));
            Ok(())
        }
        JournalCommands::Tags => {
            let store = load_journal(&connection).await?;
            for tag in collect_tags(store.records()) {
                println!("#{tag}");
            }
            Ok(())
        }
        JournalCommands::Add {
            title,
            content,
            date,
            no_date,
            tags,
            images,
        } => {
            let mut form = JournalForm::new(Arc::clone(&connection.gateway));
            form.set_title(title);
            if let Some(content) = resolve_entry_content(content.as_deref())? {
                compose_content(form.editor_mut(), &content);
            }
            form.set_experience_date(entry_date(date, no_date, Some(today())));
            for tag in &tags {
                form.add_tag(tag);
            }
            attach_images(&connection, form.editor_mut(), &images).await?;

            let (entry, _) = form.save().await?;
            println!("{}", entry.id);
            Ok(())
        }
        JournalCommands::Edit {
            id,
            title,
            content,
            editor,
            date,
            no_date,
            add_tags,
            remove_tags,
            images,
        } => {
            let store = load_journal(&connection).await?;
            let entry = resolve_record(store.records(), &id, KIND)?.clone();

            let mut form = JournalForm::new(Arc::clone(&connection.gateway));
            form.start_edit(&entry);
            if let Some(title) = title {
                form.set_title(title);
            }
            if let Some(content) = content {
                form.editor_mut().clear();
                compose_content(form.editor_mut(), &content);
            } else if editor {
                let markup = form.editor().markup();
                match capture_editor_input_with_initial(&markup)? {
                    Some(edited) => {
                        form.editor_mut().set_content(&edited);
                    }
                    None => form.editor_mut().clear(),
                }
            }
            form.set_experience_date(entry_date(date, no_date, entry.experience_date));
            for tag in &add_tags {
                form.add_tag(tag);
            }
            for tag in &remove_tags {
                let tag = normalize_tag(tag).unwrap_or_else(|| tag.clone());
                form.remove_tag(&tag);
            }
            attach_images(&connection, form.editor_mut(), &images).await?;

            let (updated, _) = form.save().await?;
            println!("{}", updated.id);
            Ok(())
        }
        JournalCommands::Delete { id, purge_images } => {
            run_delete(&connection, &id, purge_images).await
        }
    }
}

async fn run_list(
    connection: &Connection,
    query: Option<String>,
    month: Option<&str>,
    tag: Option<String>,
    json: bool,
) -> Result<(), CliError> {
    let mut filter = EntryFilter::default();
    if let Some(query) = query {
        filter = filter.with_query(query);
    }
    if let Some(month) = month {
        filter = filter.with_month(parse_month(month)?);
    }
    if let Some(tag) = tag {
        filter = filter.with_tag(normalize_tag(&tag).unwrap_or(tag));
    }

    let store = load_journal(connection).await?;
    let entries = filter_entries(store.records(), &filter);
    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else if entries.is_empty() {
        println!("No journal entries.");
    } else {
        for line in format_entry_lines(&entries) {
            println!("{line}");
        }
    }
    Ok(())
}

async fn run_delete(connection: &Connection, id: &str, purge_images: bool) -> Result<(), CliError> {
    let service = JournalService::new(Arc::clone(&connection.gateway));
    let mut store = load_journal(connection).await?;
    let entry = resolve_record(store.records(), id, KIND)?.clone();
    let deletion = if purge_images && !entry.images.is_empty() {
        Some(connection.deletion_client()?)
    } else {
        None
    };

    let invalidation = service.delete(&entry.id).await?;
    if let Some(client) = deletion {
        for url in &entry.images {
            if let Err(error) = client.delete(url).await {
                tracing::warn!(%url, %error, "Image deletion failed");
                eprintln!("Could not delete image {url}: {error}");
            }
        }
    }

    store.refresh_if(&invalidation, || service.load()).await?;
    tracing::debug!(remaining = store.len(), "Journal reloaded");
    println!("{}", entry.id);
    Ok(())
}

async fn load_journal(
    connection: &Connection,
) -> Result<EntryStore<JournalEntry>, CliError> {
    let service = JournalService::new(Arc::clone(&connection.gateway));
    let mut store = EntryStore::new(ListKind::Journal);
    store.reload(|| service.load()).await?;
    Ok(store)
}

async fn attach_images(
    connection: &Connection,
    editor: &mut RichTextEditor,
    paths: &[PathBuf],
) -> Result<(), CliError> {
    if paths.is_empty() {
        return Ok(());
    }
    let uploader = connection.uploader()?;
    for path in paths {
        match upload_file(&uploader, path).await {
            Ok(url) => {
                editor.insert_image(&url);
            }
            Err(error) => {
                tracing::warn!(path = %path.display(), %error, "Image upload failed");
                eprintln!("Skipped image {}: {error}", path.display());
            }
        }
    }
    Ok(())
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// `--no-date` clears the date, `--date` sets it, otherwise `fallback`.
pub fn entry_date(
    date: Option<NaiveDate>,
    no_date: bool,
    fallback: Option<NaiveDate>,
) -> Option<NaiveDate> {
    if no_date {
        None
    } else {
        date.or(fallback)
    }
}

/// Type plain text into `editor`.
///
/// Each non-blank line becomes a paragraph, or a bullet item when it starts
/// with `- `. `**` toggles bold and `*` toggles italic; marks end with the
/// line.
pub fn compose_content(editor: &mut RichTextEditor, text: &str) {
    for line in text.lines().map(str::trim_end) {
        if line.trim().is_empty() {
            continue;
        }
        if !editor.is_empty() {
            editor.new_line();
        }

        let (bullet, body) = line
            .strip_prefix("- ")
            .map_or((false, line), |rest| (true, rest));
        if bullet != editor.in_bullet_list() {
            editor.toggle_bullet_list();
        }

        let mut rest = body;
        while !rest.is_empty() {
            if let Some(after) = rest.strip_prefix("**") {
                editor.toggle_bold();
                rest = after;
            } else if let Some(after) = rest.strip_prefix('*') {
                editor.toggle_italic();
                rest = after;
            } else {
                let end = rest.find('*').unwrap_or(rest.len());
                editor.insert_text(&rest[..end]);
                rest = &rest[end..];
            }
        }

        if editor.is_bold() {
            editor.toggle_bold();
        }
        if editor.is_italic() {
            editor.toggle_italic();
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn composed(text: &str) -> String {
        let mut editor = RichTextEditor::new();
        compose_content(&mut editor, text);
        editor.markup()
    }

    #[test]
    fn plain_lines_become_paragraphs() {
        assert_eq!(
            composed("Thank you\n\nfor today"),
            "<p>Thank you</p><p>for today</p>"
        );
    }

    #[test]
    fn dash_lines_become_one_bullet_list() {
        assert_eq!(
            composed("Grateful for:\n- family\n- health\nAmen"),
            "<p>Grateful for:</p><ul><li><p>family</p></li><li><p>health</p></li></ul><p>Amen</p>"
        );
    }

    #[test]
    fn leading_bullet_starts_a_list() {
        assert_eq!(composed("- one"), "<ul><li><p>one</p></li></ul>");
    }

    #[test]
    fn stars_toggle_marks_within_a_line() {
        assert_eq!(
            composed("Be **still** and *know*"),
            "<p>Be <strong>still</strong> and <em>know</em></p>"
        );
    }

    #[test]
    fn unclosed_marks_end_with_the_line() {
        assert_eq!(
            composed("**bold\nplain"),
            "<p><strong>bold</strong></p><p>plain</p>"
        );
    }

    #[test]
    fn entry_date_prefers_flags_over_fallback() {
        let fallback = NaiveDate::from_ymd_opt(2024, 3, 1);
        let explicit = NaiveDate::from_ymd_opt(2024, 5, 9);
        assert_eq!(entry_date(None, false, fallback), fallback);
        assert_eq!(entry_date(explicit, false, fallback), explicit);
        assert_eq!(entry_date(None, true, fallback), None);
    }
}
