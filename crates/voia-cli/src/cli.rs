use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use voia_core::filter::StatusFilter;

#[derive(Parser)]
#[command(name = "voia")]
#[command(about = "Spiritual journal, prayer list and prayer reminders")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// CLI profile name for Supabase/Cloudinary configuration
    #[arg(long, global = true, value_name = "NAME")]
    pub profile: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Quick diary notes with an optional photo
    Diary {
        #[command(subcommand)]
        command: DiaryCommands,
    },
    /// Journal entries
    Journal {
        #[command(subcommand)]
        command: JournalCommands,
    },
    /// Prayer requests
    #[command(alias = "prayer")]
    Prayers {
        #[command(subcommand)]
        command: PrayerCommands,
    },
    /// Daily prayer reminders
    #[command(alias = "reminder")]
    Reminders {
        #[command(subcommand)]
        command: ReminderCommands,
    },
    /// Hosted journal images
    Image {
        #[command(subcommand)]
        command: ImageCommands,
    },
    /// Local preferences
    Prefs {
        #[command(subcommand)]
        command: PrefsCommands,
    },
    /// Show the verse of the day
    Verse {
        /// Day of month to pick the verse for (defaults to today)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=31))]
        day: Option<u32>,
    },
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
        /// Script file, or a directory to write the shell's conventional
        /// file name into (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
    /// Configure CLI profiles
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Authenticate CLI profile with Supabase
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
    },
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum StatusArg {
    #[default]
    All,
    InProgress,
    Answered,
}

impl From<StatusArg> for StatusFilter {
    fn from(value: StatusArg) -> Self {
        match value {
            StatusArg::All => Self::All,
            StatusArg::InProgress => Self::InProgress,
            StatusArg::Answered => Self::Answered,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum Switch {
    On,
    Off,
    Toggle,
}

#[derive(Subcommand)]
pub enum DiaryCommands {
    /// List your notes, newest first
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Write a note
    #[command(alias = "new")]
    Add {
        /// Note title
        #[arg(long)]
        title: String,
        /// Note text. Read from stdin or $EDITOR when omitted.
        #[arg(long)]
        content: Option<String>,
        /// Hosted photo URL
        #[arg(long, value_name = "URL", conflicts_with = "photo")]
        photo_url: Option<String>,
        /// Photo file to upload
        #[arg(long, value_name = "PATH")]
        photo: Option<PathBuf>,
    },
    /// Delete a note
    Delete {
        /// Note ID or unique ID prefix
        id: String,
    },
}

#[derive(Subcommand)]
pub enum JournalCommands {
    /// List entries, newest experience first
    List {
        /// Text to search for in titles and content
        #[arg(short, long)]
        query: Option<String>,
        /// Month of the experience date (1-12 or month name)
        #[arg(short, long)]
        month: Option<String>,
        /// Only entries carrying this tag
        #[arg(short, long)]
        tag: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one entry
    Show {
        /// Entry ID or unique ID prefix
        id: String,
    },
    /// List every tag in use
    Tags,
    /// Write a new entry
    #[command(alias = "new")]
    Add {
        /// Entry title
        #[arg(long)]
        title: String,
        /// Entry text; `- ` starts a bullet, `**bold**` and `*italic*` mark text.
        /// Read from stdin or $EDITOR when omitted.
        #[arg(long)]
        content: Option<String>,
        /// Experience date (YYYY-MM-DD, defaults to today)
        #[arg(long, conflicts_with = "no_date")]
        date: Option<NaiveDate>,
        /// Save without an experience date
        #[arg(long)]
        no_date: bool,
        /// Tag to attach (repeatable)
        #[arg(long = "tag", value_name = "TAG")]
        tags: Vec<String>,
        /// Image file to upload and append (repeatable)
        #[arg(long = "image", value_name = "PATH")]
        images: Vec<PathBuf>,
    },
    /// Edit an existing entry
    Edit {
        /// Entry ID or unique ID prefix
        id: String,
        /// New title
        #[arg(long)]
        title: Option<String>,
        /// Replace the content with this text
        #[arg(long, conflicts_with = "editor")]
        content: Option<String>,
        /// Edit the stored markup in $EDITOR
        #[arg(long)]
        editor: bool,
        /// New experience date (YYYY-MM-DD)
        #[arg(long, conflicts_with = "no_date")]
        date: Option<NaiveDate>,
        /// Clear the experience date
        #[arg(long)]
        no_date: bool,
        /// Tag to add (repeatable)
        #[arg(long = "add-tag", value_name = "TAG")]
        add_tags: Vec<String>,
        /// Tag to remove (repeatable)
        #[arg(long = "remove-tag", value_name = "TAG")]
        remove_tags: Vec<String>,
        /// Image file to upload and append (repeatable)
        #[arg(long = "image", value_name = "PATH")]
        images: Vec<PathBuf>,
    },
    /// Delete an entry
    Delete {
        /// Entry ID or unique ID prefix
        id: String,
        /// Also delete the entry's hosted images
        #[arg(long)]
        purge_images: bool,
    },
}

#[derive(Subcommand)]
pub enum PrayerCommands {
    /// List your prayer requests, or the community feed with --shared
    List {
        /// Show prayers other users shared
        #[arg(long)]
        shared: bool,
        /// Status filter
        #[arg(long, value_enum, default_value_t = StatusArg::All)]
        status: StatusArg,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Add a prayer request
    #[command(alias = "new")]
    Add {
        /// Prayer title
        #[arg(long)]
        title: String,
        /// Optional description
        #[arg(long)]
        description: Option<String>,
        /// Comma-separated labels
        #[arg(long, default_value = "")]
        labels: String,
        /// Share with the community
        #[arg(long)]
        shared: bool,
    },
    /// Switch between in progress and answered
    ToggleStatus {
        /// Prayer ID or unique ID prefix
        id: String,
    },
    /// Share or unshare with the community
    ToggleShare {
        /// Prayer ID or unique ID prefix
        id: String,
    },
    /// Delete a prayer request
    Delete {
        /// Prayer ID or unique ID prefix
        id: String,
    },
}

#[derive(Subcommand)]
pub enum ReminderCommands {
    /// List reminders by time of day
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Add a reminder
    #[command(alias = "new")]
    Add {
        /// Time of day (HH:MM, defaults to 09:00)
        time: Option<String>,
    },
    /// Enable or disable a reminder
    Toggle {
        /// Reminder ID or unique ID prefix
        id: String,
    },
    /// Delete a reminder
    Delete {
        /// Reminder ID or unique ID prefix
        id: String,
    },
}

#[derive(Subcommand)]
pub enum ImageCommands {
    /// Upload an image and print its hosted URL
    Upload {
        /// Image file
        path: PathBuf,
    },
    /// Delete a hosted image by URL
    Delete {
        /// Hosted image URL
        url: String,
    },
}

#[derive(Subcommand)]
pub enum PrefsCommands {
    /// Show or change dark mode
    DarkMode {
        /// New value (shows the current value when omitted)
        #[arg(value_enum)]
        value: Option<Switch>,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Initialize or update profile config
    Init {
        /// Profile name to initialize
        #[arg(long, value_name = "NAME")]
        profile: Option<String>,
        /// Supabase project URL
        #[arg(long, value_name = "URL")]
        supabase_url: Option<String>,
        /// Supabase anon/public key
        #[arg(long, value_name = "KEY")]
        supabase_anon_key: Option<String>,
        /// Cloudinary cloud name
        #[arg(long, value_name = "NAME")]
        cloudinary_cloud_name: Option<String>,
        /// Cloudinary unsigned upload preset
        #[arg(long, value_name = "PRESET")]
        cloudinary_upload_preset: Option<String>,
        /// Base URL of voia-api (image deletion)
        #[arg(long, value_name = "URL")]
        api_base_url: Option<String>,
        /// Keep current active profile instead of activating this one
        #[arg(long)]
        no_activate: bool,
    },
    /// Print the resolved profile
    Show {
        /// Optional profile override
        #[arg(long, value_name = "NAME")]
        profile: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum AuthCommands {
    /// Create an account
    Signup {
        /// Optional profile override
        #[arg(long, value_name = "NAME")]
        profile: Option<String>,
        /// Full name shown on the account
        #[arg(long, value_name = "NAME")]
        full_name: String,
        /// Account email
        #[arg(long, value_name = "EMAIL")]
        email: String,
        /// Account password
        #[arg(long, value_name = "PASSWORD")]
        password: String,
        /// Password confirmation
        #[arg(long, value_name = "PASSWORD")]
        confirm_password: String,
    },
    /// Login with email/password and store session in keychain
    Login {
        /// Optional profile override
        #[arg(long, value_name = "NAME")]
        profile: Option<String>,
        /// Account email
        #[arg(long, value_name = "EMAIL")]
        email: String,
        /// Account password
        #[arg(long, value_name = "PASSWORD")]
        password: String,
    },
    /// Show auth status for profile
    Status {
        /// Optional profile override
        #[arg(long, value_name = "NAME")]
        profile: Option<String>,
    },
    /// Logout profile and clear stored session
    Logout {
        /// Optional profile override
        #[arg(long, value_name = "NAME")]
        profile: Option<String>,
    },
}
