//! Voia CLI - spiritual journal, prayer list and reminders from the terminal

mod auth;
mod cli;
mod commands;
mod config_profiles;
mod error;


use clap::{CommandFactory, Parser};

use crate::cli::{Cli, Commands};
use crate::commands::auth_cmd::run_auth;
use crate::commands::completions::run_completions;
use crate::commands::config::run_config;
use crate::commands::diary::run_diary;
use crate::commands::image::run_image;
use crate::commands::journal::run_journal;
use crate::commands::prayers::run_prayers;
use crate::commands::prefs::run_prefs;
use crate::commands::reminders::run_reminders;
use crate::commands::verse::run_verse;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("voia_cli=info".parse().expect("valid directive")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let profile = cli.profile.as_deref();

    match cli.command {
        Some(Commands::Journal { command }) => run_journal(command, profile).await?,
        Some(Commands::Prayers { command }) => run_prayers(command, profile).await?,
        Some(Commands::Diary { command }) => run_diary(command, profile).await?,
        Some(Commands::Reminders { command }) => run_reminders(command, profile).await?,
        Some(Commands::Image { command }) => run_image(command, profile).await?,
        Some(Commands::Prefs { command }) => run_prefs(command)?,
        Some(Commands::Verse { day }) => run_verse(day),
        Some(Commands::Completions { shell, output }) => {
            run_completions(shell, output.as_deref())?;
        }
        Some(Commands::Config { command }) => run_config(command, profile)?,
        Some(Commands::Auth { command }) => run_auth(command, profile).await?,
        None => {
            Cli::command().print_help().map_err(CliError::Io)?;
            println!();
        }
    }

    Ok(())
}
