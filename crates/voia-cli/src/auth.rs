//! Per-profile session storage in the OS keychain.
//!
//! Each CLI profile keeps its Supabase session as one JSON secret under the
//! `voia-cli` keychain service. Test builds keep secrets in a process-wide
//! map instead.

use voia_core::auth::{AuthResult, AuthSession, SessionPersistence, SupabaseAuthClient};
use voia_core::config::ClientConfig;

/// Auth client bound to one profile's keychain slot.
pub type ProfileAuth = SupabaseAuthClient<SessionStore>;

/// Auth client for `profile_name`, `None` when the profile has no Supabase
/// project configured.
pub fn profile_auth(profile_name: &str, config: &ClientConfig) -> AuthResult<Option<ProfileAuth>> {
    SupabaseAuthClient::from_config(config, SessionStore::for_profile(profile_name))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStore {
    slot: slot::Slot,
}

impl SessionStore {
    pub fn for_profile(profile_name: &str) -> Self {
        Self {
            slot: slot::Slot::new(format!("session/{profile_name}")),
        }
    }
}

impl SessionPersistence for SessionStore {
    fn load_session(&self) -> AuthResult<Option<AuthSession>> {
        match self.slot.read()? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    fn save_session(&self, session: &AuthSession) -> AuthResult<()> {
        self.slot.write(&serde_json::to_string(session)?)
    }

    fn clear_session(&self) -> AuthResult<()> {
        self.slot.erase()
    }
}

#[cfg(not(test))]
mod slot {
    use keyring::Entry;
    use voia_core::auth::{AuthError, AuthResult};

    const SERVICE: &str = "voia-cli";

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct Slot {
        account: String,
    }

    impl Slot {
        pub const fn new(account: String) -> Self {
            Self { account }
        }

        fn entry(&self) -> AuthResult<Entry> {
            Entry::new(SERVICE, &self.account).map_err(storage)
        }

        pub fn read(&self) -> AuthResult<Option<String>> {
            match self.entry()?.get_password() {
                Ok(raw) => Ok(Some(raw)),
                Err(keyring::Error::NoEntry) => Ok(None),
                Err(error) => Err(storage(error)),
            }
        }

        pub fn write(&self, secret: &str) -> AuthResult<()> {
            self.entry()?.set_password(secret).map_err(storage)
        }

        pub fn erase(&self) -> AuthResult<()> {
            match self.entry()?.delete_credential() {
                Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
                Err(error) => Err(storage(error)),
            }
        }
    }

    fn storage(error: keyring::Error) -> AuthError {
        AuthError::Storage(error.to_string())
    }
}
