use voia_core::auth::{AuthSession, SessionPersistence, SignUpOutcome, SignUpRequest};

use crate::auth::{profile_auth, SessionStore};
use crate::cli::AuthCommands;
use crate::commands::common::{auth_service, load_client_config};
use crate::error::CliError;

pub async fn run_auth(command: AuthCommands, global_profile: Option<&str>) -> Result<(), CliError> {
    match command {
        AuthCommands::Signup {
            profile,
            full_name,
            email,
            password,
            confirm_password,
        } => {
            let (profile_name, config) = load_client_config(profile.as_deref().or(global_profile))?;
            let service = auth_service(&profile_name, &config)?;
            let request = SignUpRequest {
                full_name,
                email,
                password,
                confirm_password,
            };
            match service.sign_up(&request).await.map_err(CliError::auth)? {
                SignUpOutcome::SignedIn(session) => {
                    println!(
                        "Welcome, {}. Profile '{profile_name}' is signed in.",
                        display_name(&session)
                    );
                }
                SignUpOutcome::ConfirmationRequired { email } => {
                    println!("Account created. Check {email} for a confirmation link,");
                    println!("then run `voia auth login --email {email}`.");
                }
            }
            Ok(())
        }
        AuthCommands::Login {
            profile,
            email,
            password,
        } => {
            let (profile_name, config) = load_client_config(profile.as_deref().or(global_profile))?;
            let service = auth_service(&profile_name, &config)?;
            let session = service
                .sign_in(&email, &password)
                .await
                .map_err(CliError::auth)?;
            println!(
                "Signed in profile '{profile_name}' as {}",
                display_name(&session)
            );
            Ok(())
        }
        AuthCommands::Status { profile } => {
            let (profile_name, config) = load_client_config(profile.as_deref().or(global_profile))?;
            let session = match profile_auth(&profile_name, &config).map_err(CliError::auth)? {
                Some(service) => service.restore_session().await.map_err(CliError::auth)?,
                None => SessionStore::for_profile(&profile_name)
                    .load_session()
                    .map_err(CliError::auth)?,
            };

            match session {
                Some(session) => println!(
                    "Profile '{profile_name}' is signed in as {} (expires_at={})",
                    display_name(&session),
                    session.expires_at
                ),
                None => println!("Profile '{profile_name}' is not signed in."),
            }
            Ok(())
        }
        AuthCommands::Logout { profile } => {
            let (profile_name, config) = load_client_config(profile.as_deref().or(global_profile))?;
            match profile_auth(&profile_name, &config).map_err(CliError::auth)? {
                Some(service) => service.sign_out().await,
                None => SessionStore::for_profile(&profile_name).clear_session(),
            }
            .map_err(CliError::auth)?;
            println!("Signed out profile '{profile_name}'");
            Ok(())
        }
    }
}

/// `Full Name <email>`, or whichever of the two the session has.
pub fn display_name(session: &AuthSession) -> String {
    let user = &session.user;
    match (user.full_name.as_deref(), user.email.as_deref()) {
        (Some(name), Some(email)) => format!("{name} <{email}>"),
        (Some(name), None) => name.to_string(),
        (None, Some(email)) => email.to_string(),
        (None, None) => user.id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use voia_core::auth::AuthUser;

    use super::*;

    fn session(full_name: Option<&str>, email: Option<&str>) -> AuthSession {
        AuthSession {
            access_token: "a".to_string(),
            refresh_token: "r".to_string(),
            expires_at: 0,
            user: AuthUser {
                id: "user-1".into(),
                email: email.map(ToString::to_string),
                full_name: full_name.map(ToString::to_string),
            },
        }
    }

    #[test]
    fn display_name_prefers_name_with_email() {
        assert_eq!(
            display_name(&session(Some("Ana Pop"), Some("ana@example.com"))),
            "Ana Pop <ana@example.com>"
        );
        assert_eq!(display_name(&session(None, Some("ana@example.com"))), "ana@example.com");
        assert_eq!(display_name(&session(None, None)), "user-1");
    }
}
