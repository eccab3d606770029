use voia_core::config::{
    CLOUDINARY_CLOUD_NAME_VAR, CLOUDINARY_UPLOAD_PRESET_VAR, MEDIA_API_BASE_URL_VAR,
    SUPABASE_ANON_KEY_VAR, SUPABASE_URL_VAR,
};
use voia_core::util::is_http_url;

use crate::cli::ConfigCommands;
use crate::config_profiles::{normalize_text_option, CliProfile, CliProfilesConfig};
use crate::error::CliError;

/// Values given on the command line for `config init`.
#[derive(Debug, Default)]
pub struct ProfileValues {
    pub supabase_url: Option<String>,
    pub supabase_anon_key: Option<String>,
    pub cloudinary_cloud_name: Option<String>,
    pub cloudinary_upload_preset: Option<String>,
    pub api_base_url: Option<String>,
}

pub fn run_config(command: ConfigCommands, global_profile: Option<&str>) -> Result<(), CliError> {
    match command {
        ConfigCommands::Init {
            profile,
            supabase_url,
            supabase_anon_key,
            cloudinary_cloud_name,
            cloudinary_upload_preset,
            api_base_url,
            no_activate,
        } => run_config_init(
            profile.as_deref().or(global_profile),
            ProfileValues {
                supabase_url,
                supabase_anon_key,
                cloudinary_cloud_name,
                cloudinary_upload_preset,
                api_base_url,
            },
            no_activate,
        ),
        ConfigCommands::Show { profile } => run_config_show(profile.as_deref().or(global_profile)),
    }
}

pub fn run_config_init(
    profile_name: Option<&str>,
    values: ProfileValues,
    no_activate: bool,
) -> Result<(), CliError> {
    let mut config = CliProfilesConfig::load().map_err(CliError::Config)?;
    let profile_name = config.resolve_profile_name(profile_name);
    let existing = config.profile(&profile_name).cloned().unwrap_or_default();
    let merged = merge_profile(values, &existing, |name| std::env::var(name).ok());
    validate_profile_urls(&merged)?;

    *config.profile_mut_or_default(&profile_name) = merged;
    if !no_activate {
        config.active_profile = Some(profile_name.clone());
    }

    let path = config.save().map_err(CliError::Config)?;
    println!("Profile '{profile_name}' initialized at {}", path.display());

    let missing = config
        .profile(&profile_name)
        .map(CliProfile::missing_fields)
        .unwrap_or_default();
    if missing.is_empty() {
        println!(
            "Profile '{profile_name}' is ready. Run `voia auth login --email <email> --password <password>`."
        );
    } else {
        println!("Profile '{profile_name}' is missing: {}", missing.join(", "));
    }
    Ok(())
}

pub fn run_config_show(profile_name: Option<&str>) -> Result<(), CliError> {
    let config = CliProfilesConfig::load().map_err(CliError::Config)?;
    let profile_name = config.resolve_profile_name(profile_name);
    let Some(profile) = config.profile(&profile_name) else {
        println!("Profile '{profile_name}' is not configured.");
        return Ok(());
    };
    println!("{}", serde_json::to_string_pretty(profile)?);
    Ok(())
}

/// Flags first, then the environment, then what the profile already has.
pub fn merge_profile(
    values: ProfileValues,
    existing: &CliProfile,
    env: impl Fn(&str) -> Option<String>,
) -> CliProfile {
    let pick = |explicit: Option<String>, var: &str, current: &Option<String>| {
        normalize_text_option(explicit)
            .or_else(|| normalize_text_option(env(var)))
            .or_else(|| normalize_text_option(current.clone()))
    };

    CliProfile {
        supabase_url: pick(values.supabase_url, SUPABASE_URL_VAR, &existing.supabase_url),
        supabase_anon_key: pick(
            values.supabase_anon_key,
            SUPABASE_ANON_KEY_VAR,
            &existing.supabase_anon_key,
        ),
        cloudinary_cloud_name: pick(
            values.cloudinary_cloud_name,
            CLOUDINARY_CLOUD_NAME_VAR,
            &existing.cloudinary_cloud_name,
        ),
        cloudinary_upload_preset: pick(
            values.cloudinary_upload_preset,
            CLOUDINARY_UPLOAD_PRESET_VAR,
            &existing.cloudinary_upload_preset,
        ),
        voia_api_base_url: pick(
            values.api_base_url,
            MEDIA_API_BASE_URL_VAR,
            &existing.voia_api_base_url,
        ),
    }
}

pub fn validate_profile_urls(profile: &CliProfile) -> Result<(), CliError> {
    for (field, value) in [
        ("supabase_url", &profile.supabase_url),
        ("api_base_url", &profile.voia_api_base_url),
    ] {
        if let Some(url) = value {
            if !is_http_url(url) {
                return Err(CliError::Config(format!(
                    "{field} must include http:// or https://"
                )));
            }
        }
    }
    Ok(())
}
