use std::env;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::Month;
use voia_core::config::ClientConfig;
use voia_core::content::Document;
use voia_core::filter::{month_from_index, MONTH_NAMES};
use voia_core::gateway::SupabaseGateway;
use voia_core::media::{CloudinaryUploader, ImageDeletionClient};
use voia_core::models::{DiaryEntry, JournalEntry, PrayerRequest, PrayerStatus, Record, Reminder};

use crate::auth::{profile_auth, ProfileAuth};
use crate::config_profiles::{CliProfile, CliProfilesConfig};
use crate::error::CliError;

/// A signed-in profile with a gateway bound to its session.
pub struct Connection {
    pub profile_name: String,
    pub config: ClientConfig,
    pub gateway: Arc<SupabaseGateway>,
}

impl Connection {
    pub fn uploader(&self) -> Result<CloudinaryUploader, CliError> {
        uploader(&self.profile_name, &self.config)
    }

    pub fn deletion_client(&self) -> Result<ImageDeletionClient, CliError> {
        deletion_client(&self.profile_name, &self.config)
    }
}

/// Resolve the profile name and its client configuration. Stored profile
/// values win over environment variables.
pub fn load_client_config(global_profile: Option<&str>) -> Result<(String, ClientConfig), CliError> {
    let profiles = CliProfilesConfig::load().map_err(CliError::Config)?;
    let profile_name = profiles.resolve_profile_name(global_profile);
    let stored = profiles
        .profile(&profile_name)
        .map(CliProfile::client_config)
        .unwrap_or_default();
    let env = ClientConfig::from_env().map_err(CliError::Config)?;
    Ok((profile_name, stored.or(env)))
}

pub fn auth_service(profile_name: &str, config: &ClientConfig) -> Result<ProfileAuth, CliError> {
    profile_auth(profile_name, config)
        .map_err(CliError::auth)?
        .ok_or_else(|| {
            CliError::Config(format!(
                "Profile '{profile_name}' missing Supabase config. Run `voia config init --profile {profile_name}`."
            ))
        })
}

/// Restore the profile's session and bind a gateway to it.
pub async fn connect(global_profile: Option<&str>) -> Result<Connection, CliError> {
    let (profile_name, config) = load_client_config(global_profile)?;
    let auth = auth_service(&profile_name, &config)?;
    let session = auth
        .restore_session()
        .await
        .map_err(CliError::auth)?
        .ok_or_else(|| CliError::NotSignedIn(profile_name.clone()))?;

    let (url, anon_key) = config.supabase().ok_or_else(|| {
        CliError::Config(format!("Profile '{profile_name}' missing Supabase config"))
    })?;
    let gateway = SupabaseGateway::new(url, anon_key)?;
    tracing::debug!(profile = %profile_name, user = %session.user.id, "Session restored");
    gateway.set_session(Some(session)).await;

    Ok(Connection {
        profile_name,
        config,
        gateway: Arc::new(gateway),
    })
}

pub fn uploader(profile_name: &str, config: &ClientConfig) -> Result<CloudinaryUploader, CliError> {
    let (cloud_name, upload_preset) = config.cloudinary().ok_or_else(|| {
        CliError::Config(format!(
            "Profile '{profile_name}' missing Cloudinary config. Set cloud name and upload preset via `voia config init`."
        ))
    })?;
    Ok(CloudinaryUploader::new(cloud_name, upload_preset)?)
}

pub fn deletion_client(
    profile_name: &str,
    config: &ClientConfig,
) -> Result<ImageDeletionClient, CliError> {
    let base_url = config.media_api_base_url.as_deref().ok_or_else(|| {
        CliError::Config(format!(
            "Profile '{profile_name}' missing api_base_url. Set it via `voia config init --api-base-url <URL>`."
        ))
    })?;
    Ok(ImageDeletionClient::new(base_url)?)
}

/// Upload an image file and return its hosted URL.
pub async fn upload_file(uploader: &CloudinaryUploader, path: &Path) -> Result<String, CliError> {
    let bytes = tokio::fs::read(path).await?;
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("image");
    Ok(uploader.upload(bytes, file_name).await?)
}

/// Find a record by exact id or unique id prefix.
pub fn resolve_record<'a, R: Record>(
    records: &'a [R],
    query: &str,
    kind: &'static str,
) -> Result<&'a R, CliError> {
    let query = normalize_record_identifier(query)?;
    if let Some(record) = records.iter().find(|record| record.record_id() == query) {
        return Ok(record);
    }

    let matching = records
        .iter()
        .filter(|record| record.record_id().starts_with(&query))
        .take(3)
        .collect::<Vec<_>>();
    match matching.as_slice() {
        [] => Err(CliError::RecordNotFound { kind, query }),
        [record] => Ok(*record),
        _ => {
            let options = matching
                .iter()
                .map(|record| short_id(&record.record_id()))
                .collect::<Vec<_>>()
                .join(", ");
            Err(CliError::AmbiguousRecordId(format!(
                "ID prefix '{query}' is ambiguous; matches: {options}"
            )))
        }
    }
}

pub fn normalize_record_identifier(id: &str) -> Result<String, CliError> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        Err(CliError::EmptyRecordId)
    } else {
        Ok(trimmed.to_string())
    }
}

/// Month from `1`-`12` or a month name (Romanian or English, any case).
pub fn parse_month(raw: &str) -> Result<Month, CliError> {
    let trimmed = raw.trim();
    if let Ok(number) = trimmed.parse::<u32>() {
        return number
            .checked_sub(1)
            .and_then(month_from_index)
            .ok_or_else(|| CliError::InvalidMonth(raw.to_string()));
    }
    if let Some(index) = MONTH_NAMES
        .iter()
        .position(|name| name.eq_ignore_ascii_case(trimmed))
    {
        return u32::try_from(index)
            .ok()
            .and_then(month_from_index)
            .ok_or_else(|| CliError::InvalidMonth(raw.to_string()));
    }
    trimmed
        .parse::<Month>()
        .map_err(|_| CliError::InvalidMonth(raw.to_string()))
}

pub fn short_id(id: &str) -> String {
    id.chars().take(13).collect()
}

pub fn truncate(text: &str, max_chars: usize) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= max_chars {
        collapsed
    } else {
        let take_len = max_chars.saturating_sub(3);
        let mut truncated = collapsed.chars().take(take_len).collect::<String>();
        truncated.push_str("...");
        truncated
    }
}

pub fn render_tags<'a>(tags: impl IntoIterator<Item = &'a str>) -> String {
    tags.into_iter()
        .map(|tag| format!("#{tag}"))
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn format_diary_lines(entries: &[DiaryEntry]) -> Vec<String> {
    entries
        .iter()
        .map(|entry| {
            let id = short_id(&entry.id.to_string());
            let day = entry.created_at.date_naive();
            let title = truncate(&entry.title, 40);
            let photo = if entry.photo_url.is_some() { "photo" } else { "" };
            format!("{id:<13}  {day}  {title:<40}  {photo}")
                .trim_end()
                .to_string()
        })
        .collect()
}

pub fn format_entry_lines(entries: &[JournalEntry]) -> Vec<String> {
    entries
        .iter()
        .map(|entry| {
            let id = short_id(&entry.id.to_string());
            let date = entry
                .experience_date
                .map_or_else(|| "-".to_string(), |date| date.to_string());
            let title = truncate(&entry.title, 40);
            let tags = render_tags(entry.tags.iter());
            if tags.is_empty() {
                format!("{id:<13}  {date:<10}  {title}")
            } else {
                format!("{id:<13}  {date:<10}  {title:<40}  {tags}")
            }
        })
        .collect()
}

pub fn format_entry_detail(entry: &JournalEntry) -> String {
    let document = Document::parse(&entry.content);
    let mut lines = vec![
        entry.title.clone(),
        format!("id: {}", entry.id),
        format!(
            "date: {}",
            entry
                .experience_date
                .map_or_else(|| "-".to_string(), |date| date.to_string())
        ),
    ];
    if !entry.tags.is_empty() {
        lines.push(format!("tags: {}", render_tags(entry.tags.iter())));
    }
    let text = document.plain_text();
    if !text.is_empty() {
        lines.push(String::new());
        lines.push(text);
    }
    for url in &entry.images {
        lines.push(format!("image: {url}"));
    }
    lines.join("\n")
}

pub fn format_prayer_lines(prayers: &[PrayerRequest]) -> Vec<String> {
    prayers
        .iter()
        .map(|prayer| {
            let id = short_id(&prayer.id.to_string());
            let status = match prayer.status {
                PrayerStatus::InProgress => "open",
                PrayerStatus::Answered => "answered",
            };
            let shared = if prayer.is_shared { "shared" } else { "" };
            let title = truncate(&prayer.title, 40);
            let labels = render_tags(prayer.labels.iter().map(String::as_str));
            format!("{id:<13}  {status:<8}  {shared:<6}  {title:<40}  {labels}")
                .trim_end()
                .to_string()
        })
        .collect()
}

pub fn format_reminder_lines(reminders: &[Reminder]) -> Vec<String> {
    reminders
        .iter()
        .map(|reminder| {
            let state = if reminder.enabled { "on" } else { "off" };
            format!(
                "{:<13}  {}  {state}",
                short_id(&reminder.id.to_string()),
                reminder.time
            )
        })
        .collect()
}

pub fn normalize_content(content: &str) -> Option<String> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Content from the flag, piped stdin or `$EDITOR`, in that order.
pub fn resolve_entry_content(content: Option<&str>) -> Result<Option<String>, CliError> {
    if let Some(content) = content.and_then(normalize_content) {
        return Ok(Some(content));
    }
    if let Some(content) = read_piped_stdin()? {
        return Ok(Some(content));
    }
    capture_editor_input_with_initial("")
}

pub fn read_piped_stdin() -> Result<Option<String>, CliError> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        return Ok(None);
    }

    let mut buffer = String::new();
    stdin.lock().read_to_string(&mut buffer)?;
    Ok(normalize_content(&buffer))
}

pub fn capture_editor_input_with_initial(
    initial_content: &str,
) -> Result<Option<String>, CliError> {
    let editor = preferred_editor();
    let temp_file = create_temp_entry_file_path();
    std::fs::write(&temp_file, initial_content)?;

    let launch_result = launch_editor(&editor, &temp_file);
    let content = std::fs::read_to_string(&temp_file)?;
    let _ = std::fs::remove_file(&temp_file);

    launch_result?;
    Ok(normalize_content(&content))
}

pub fn launch_editor(editor: &str, file_path: &Path) -> Result<(), CliError> {
    match Command::new(editor).arg(file_path).status() {
        Ok(status) if status.success() => Ok(()),
        Ok(status) => Err(CliError::EditorFailed(format!(
            "`{editor}` exited with status {status}"
        ))),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            let mut parts = editor.split_whitespace();
            let Some(program) = parts.next() else {
                return Err(CliError::EditorFailed("empty EDITOR command".into()));
            };

            let status = Command::new(program).args(parts).arg(file_path).status()?;
            if status.success() {
                Ok(())
            } else {
                Err(CliError::EditorFailed(format!(
                    "`{editor}` exited with status {status}"
                )))
            }
        }
        Err(err) => Err(CliError::Io(err)),
    }
}

pub fn preferred_editor() -> String {
    env::var("VISUAL")
        .or_else(|_| env::var("EDITOR"))
        .unwrap_or_else(|_| default_editor().to_string())
}

pub const fn default_editor() -> &'static str {
    if cfg!(windows) {
        "notepad"
    } else {
        "vi"
    }
}

pub fn create_temp_entry_file_path() -> PathBuf {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |duration| duration.as_nanos());
    env::temp_dir().join(format!("voia-entry-{}-{now}.txt", std::process::id()))
}
