//! Account sign-up, sign-in and session upkeep against Supabase auth.
//!
//! Accounts are created with a full name and a confirmed password. Projects
//! that require email confirmation answer sign-up without a session; the user
//! signs in once the address is confirmed. The signed-in session is kept in a
//! [`SessionPersistence`] and refreshed when it is restored after expiry.

mod gotrue;

use std::fmt;

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use self::gotrue::{rejection, ProfileData, SignUpBody, SignUpReply, TokenGrant, TokenReply};
use crate::config::ClientConfig;
use crate::models::UserId;
use crate::util::{normalize_base_url, unix_timestamp_now};

/// Sessions this close to expiry are refreshed before use.
const EXPIRY_MARGIN_SECONDS: i64 = 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: UserId,
    pub email: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: String,
    /// Unix seconds
    pub expires_at: i64,
    pub user: AuthUser,
}

impl AuthSession {
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires_at <= unix_timestamp_now() + EXPIRY_MARGIN_SECONDS
    }
}

impl fmt::Debug for AuthSession {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("AuthSession")
            .field("user", &self.user)
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignUpOutcome {
    SignedIn(AuthSession),
    /// A confirmation link was emailed; sign in after following it.
    ConfirmationRequired { email: String },
}

/// Sign-up form values.
#[derive(Debug, Clone, Default)]
pub struct SignUpRequest {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl SignUpRequest {
    /// Check the form before anything is sent. Passwords are compared as
    /// typed.
    pub fn validate(&self) -> AuthResult<()> {
        if self.full_name.trim().is_empty() {
            return Err(AuthError::Invalid("Full name is required".to_string()));
        }
        require_credentials(&self.email, &self.password)?;
        if self.password != self.confirm_password {
            return Err(AuthError::Invalid("Passwords do not match".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0}")]
    Invalid(String),
    #[error("Invalid Supabase configuration: {0}")]
    Configuration(String),
    #[error("Email address is not confirmed yet. Follow the link sent at sign-up, then sign in.")]
    EmailNotConfirmed,
    #[error("{0}")]
    Rejected(String),
    #[error("Auth request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Unexpected auth payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Session storage error: {0}")]
    Storage(String),
}

pub type AuthResult<T> = Result<T, AuthError>;

/// Where a signed-in session survives between runs.
pub trait SessionPersistence: Clone + Send + Sync + 'static {
    fn load_session(&self) -> AuthResult<Option<AuthSession>>;
    fn save_session(&self, session: &AuthSession) -> AuthResult<()>;
    fn clear_session(&self) -> AuthResult<()>;
}

/// Email/password client for one Supabase project.
#[derive(Clone)]
pub struct SupabaseAuthClient<S> {
    endpoint: String,
    anon_key: String,
    client: Client,
    store: S,
}

impl<S: SessionPersistence> SupabaseAuthClient<S> {
    pub fn new(project_url: &str, anon_key: &str, store: S) -> AuthResult<Self> {
        let project_url =
            normalize_base_url(project_url, "Supabase URL").map_err(AuthError::Configuration)?;
        let anon_key = anon_key.trim();
        if anon_key.is_empty() {
            return Err(AuthError::Configuration(
                "Supabase anon key must not be empty".to_string(),
            ));
        }
        Ok(Self {
            endpoint: format!("{project_url}/auth/v1"),
            anon_key: anon_key.to_string(),
            client: Client::builder().build()?,
            store,
        })
    }

    /// Client for the project in `config`, `None` until both the URL and the
    /// anon key are set.
    pub fn from_config(config: &ClientConfig, store: S) -> AuthResult<Option<Self>> {
        config
            .supabase()
            .map(|(url, anon_key)| Self::new(url, anon_key, store))
            .transpose()
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Register an account. The session is stored when the project signs
    /// new accounts in right away.
    pub async fn sign_up(&self, request: &SignUpRequest) -> AuthResult<SignUpOutcome> {
        request.validate()?;
        let email = request.email.trim();
        let body = SignUpBody {
            email,
            password: &request.password,
            data: ProfileData {
                full_name: request.full_name.trim(),
            },
        };
        let reply: SignUpReply = self
            .send(self.anonymous(self.client.post(self.url("signup"))).json(&body))
            .await?;

        match reply {
            SignUpReply::Session(reply) => {
                let session = self.keep(reply)?;
                tracing::info!(user = %session.user.id, "Account created and signed in");
                Ok(SignUpOutcome::SignedIn(session))
            }
            SignUpReply::Pending(_) => {
                tracing::info!("Account created, awaiting email confirmation");
                Ok(SignUpOutcome::ConfirmationRequired {
                    email: email.to_string(),
                })
            }
        }
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> AuthResult<AuthSession> {
        require_credentials(email, password)?;
        let session = self
            .grant(&TokenGrant::Password {
                email: email.trim(),
                password,
            })
            .await?;
        tracing::info!(user = %session.user.id, "Signed in");
        Ok(session)
    }

    /// The stored session, refreshed when it has expired.
    ///
    /// A session that can no longer be refreshed is dropped and `None`
    /// returned, so the caller asks the user to sign in again.
    pub async fn restore_session(&self) -> AuthResult<Option<AuthSession>> {
        let Some(session) = self.store.load_session()? else {
            return Ok(None);
        };
        if !session.is_expired() {
            return Ok(Some(session));
        }

        let refreshed = self
            .grant(&TokenGrant::Refresh {
                refresh_token: &session.refresh_token,
            })
            .await;
        match refreshed {
            Ok(session) => Ok(Some(session)),
            Err(error) => {
                tracing::warn!(%error, "Stored session could not be refreshed");
                self.store.clear_session()?;
                Ok(None)
            }
        }
    }

    /// Revoke the stored session and forget it locally. A failed revoke is
    /// logged; the local session is cleared regardless.
    pub async fn sign_out(&self) -> AuthResult<()> {
        if let Some(session) = self.store.load_session()? {
            let revoke = self
                .client
                .post(self.url("logout"))
                .header("apikey", &self.anon_key)
                .bearer_auth(&session.access_token)
                .send()
                .await;
            match revoke {
                Ok(response)
                    if response.status().is_success()
                        || response.status() == StatusCode::UNAUTHORIZED => {}
                Ok(response) => {
                    tracing::warn!(status = %response.status(), "Session revoke rejected");
                }
                Err(error) => tracing::warn!(%error, "Session revoke failed"),
            }
        }
        self.store.clear_session()
    }

    async fn grant(&self, grant: &TokenGrant<'_>) -> AuthResult<AuthSession> {
        let request = self
            .client
            .post(self.url("token"))
            .query(&[("grant_type", grant.grant_type())])
            .json(grant);
        let reply: TokenReply = self.send(self.anonymous(request)).await?;
        self.keep(reply)
    }

    fn keep(&self, reply: TokenReply) -> AuthResult<AuthSession> {
        let session = AuthSession::from(reply);
        self.store.save_session(&session)?;
        Ok(session)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.endpoint)
    }

    fn anonymous(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.anon_key)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> AuthResult<T> {
        let response: Response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(rejection(status, &body));
        }
        Ok(serde_json::from_str(&body)?)
    }
}

fn require_credentials(email: &str, password: &str) -> AuthResult<()> {
    if email.trim().is_empty() {
        return Err(AuthError::Invalid("Email is required".to_string()));
    }
    if password.is_empty() {
        return Err(AuthError::Invalid("Password is required".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use pretty_assertions::assert_eq;

    use super::*;

    #[derive(Clone, Default)]
    struct SlotStore(Arc<Mutex<Option<AuthSession>>>);

    impl SessionPersistence for SlotStore {
        fn load_session(&self) -> AuthResult<Option<AuthSession>> {
            Ok(self.0.lock().unwrap().clone())
        }

        fn save_session(&self, session: &AuthSession) -> AuthResult<()> {
            *self.0.lock().unwrap() = Some(session.clone());
            Ok(())
        }

        fn clear_session(&self) -> AuthResult<()> {
            *self.0.lock().unwrap() = None;
            Ok(())
        }
    }

    fn session(expires_at: i64) -> AuthSession {
        AuthSession {
            access_token: "secret-access-token".to_string(),
            refresh_token: "secret-refresh-token".to_string(),
            expires_at,
            user: AuthUser {
                id: UserId::new("user-1"),
                email: Some("ana@example.com".to_string()),
                full_name: Some("Ana Pop".to_string()),
            },
        }
    }

    fn sign_up(full_name: &str, password: &str, confirm: &str) -> SignUpRequest {
        SignUpRequest {
            full_name: full_name.to_string(),
            email: "ana@example.com".to_string(),
            password: password.to_string(),
            confirm_password: confirm.to_string(),
        }
    }

    #[test]
    fn endpoint_is_under_project_auth_path() {
        let client =
            SupabaseAuthClient::new("https://demo.supabase.co/", " anon ", SlotStore::default())
                .unwrap();
        assert_eq!(client.endpoint(), "https://demo.supabase.co/auth/v1");
        assert_eq!(client.url("token"), "https://demo.supabase.co/auth/v1/token");
    }

    #[test]
    fn configuration_must_be_complete_and_http() {
        assert!(matches!(
            SupabaseAuthClient::new("demo.supabase.co", "anon", SlotStore::default()),
            Err(AuthError::Configuration(_))
        ));
        assert!(matches!(
            SupabaseAuthClient::new("https://demo.supabase.co", "  ", SlotStore::default()),
            Err(AuthError::Configuration(_))
        ));
    }

    #[test]
    fn from_config_waits_for_url_and_key() {
        let mut config = ClientConfig {
            supabase_url: Some("https://demo.supabase.co".to_string()),
            ..ClientConfig::default()
        };
        assert!(SupabaseAuthClient::from_config(&config, SlotStore::default())
            .unwrap()
            .is_none());
        config.supabase_anon_key = Some("anon".to_string());
        assert!(SupabaseAuthClient::from_config(&config, SlotStore::default())
            .unwrap()
            .is_some());
    }

    #[test]
    fn sign_up_checks_name_and_matching_passwords() {
        assert!(sign_up("Ana Pop", "secret-1", "secret-1").validate().is_ok());
        assert_eq!(
            sign_up("Ana Pop", "secret-1", "secret-2")
                .validate()
                .unwrap_err()
                .to_string(),
            "Passwords do not match"
        );
        assert_eq!(
            sign_up("  ", "secret-1", "secret-1")
                .validate()
                .unwrap_err()
                .to_string(),
            "Full name is required"
        );
        assert!(matches!(
            sign_up("Ana Pop", "", "").validate(),
            Err(AuthError::Invalid(_))
        ));
    }

    #[tokio::test]
    async fn invalid_sign_up_never_reaches_the_network() {
        let client =
            SupabaseAuthClient::new("http://127.0.0.1:9", "anon", SlotStore::default()).unwrap();
        let error = client
            .sign_up(&sign_up("Ana Pop", "a", "b"))
            .await
            .unwrap_err();
        assert!(matches!(error, AuthError::Invalid(_)));
    }

    #[tokio::test]
    async fn live_session_is_restored_without_refresh() {
        let store = SlotStore::default();
        let live = session(unix_timestamp_now() + 3600);
        store.save_session(&live).unwrap();
        let client = SupabaseAuthClient::new("http://127.0.0.1:9", "anon", store).unwrap();
        assert_eq!(client.restore_session().await.unwrap(), Some(live));
    }

    #[tokio::test]
    async fn unrefreshable_session_is_dropped() {
        let store = SlotStore::default();
        store.save_session(&session(0)).unwrap();
        let client =
            SupabaseAuthClient::new("http://127.0.0.1:9", "anon", store.clone()).unwrap();
        assert_eq!(client.restore_session().await.unwrap(), None);
        assert_eq!(store.load_session().unwrap(), None);
    }

    #[tokio::test]
    async fn sign_out_clears_local_session_even_when_offline() {
        let store = SlotStore::default();
        store.save_session(&session(unix_timestamp_now() + 3600)).unwrap();
        let client =
            SupabaseAuthClient::new("http://127.0.0.1:9", "anon", store.clone()).unwrap();
        client.sign_out().await.unwrap();
        assert_eq!(store.load_session().unwrap(), None);
    }

    #[test]
    fn session_debug_hides_tokens() {
        let rendered = format!("{:?}", session(1_700_000_000));
        assert!(!rendered.contains("secret-access-token"));
        assert!(!rendered.contains("secret-refresh-token"));
        assert!(rendered.contains("user-1"));
    }
}
