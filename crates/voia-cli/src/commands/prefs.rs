use voia_core::preferences::{JsonFilePreferenceStore, PreferencesService};

use crate::cli::{PrefsCommands, Switch};
use crate::error::CliError;

pub fn run_prefs(command: PrefsCommands) -> Result<(), CliError> {
    let mut service = PreferencesService::load(JsonFilePreferenceStore::default_location()?);
    match command {
        PrefsCommands::DarkMode { value } => {
            let enabled = match value {
                None => service.dark_mode(),
                Some(Switch::On) => {
                    service.set_dark_mode(true)?;
                    true
                }
                Some(Switch::Off) => {
                    service.set_dark_mode(false)?;
                    false
                }
                Some(Switch::Toggle) => service.toggle_dark_mode()?,
            };
            println!("dark mode: {}", if enabled { "on" } else { "off" });
        }
    }
    Ok(())
}
