//! GoTrue wire shapes: token grants, sign-up replies and error bodies.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{AuthError, AuthSession, AuthUser};
use crate::models::UserId;
use crate::util::unix_timestamp_now;

/// Body of `POST /token`; the variant picks the `grant_type` query value.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub(super) enum TokenGrant<'a> {
    Password { email: &'a str, password: &'a str },
    Refresh { refresh_token: &'a str },
}

impl TokenGrant<'_> {
    pub(super) const fn grant_type(&self) -> &'static str {
        match self {
            Self::Password { .. } => "password",
            Self::Refresh { .. } => "refresh_token",
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct SignUpBody<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub data: ProfileData<'a>,
}

#[derive(Debug, Serialize)]
pub(super) struct ProfileData<'a> {
    pub full_name: &'a str,
}

/// Successful token grant. Sign-up returns the same shape when the project
/// confirms accounts automatically.
#[derive(Debug, Deserialize)]
pub(super) struct TokenReply {
    access_token: String,
    refresh_token: String,
    expires_in: i64,
    #[serde(default)]
    expires_at: Option<i64>,
    user: GoTrueUser,
}

impl From<TokenReply> for AuthSession {
    fn from(reply: TokenReply) -> Self {
        Self {
            access_token: reply.access_token,
            refresh_token: reply.refresh_token,
            expires_at: reply
                .expires_at
                .unwrap_or_else(|| unix_timestamp_now().saturating_add(reply.expires_in)),
            user: reply.user.into(),
        }
    }
}

/// Sign-up answers with a session, or with the bare pending user when the
/// address still has to be confirmed.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(super) enum SignUpReply {
    Session(TokenReply),
    Pending(GoTrueUser),
}

#[derive(Debug, Deserialize)]
pub(super) struct GoTrueUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    user_metadata: Value,
}

impl From<GoTrueUser> for AuthUser {
    fn from(user: GoTrueUser) -> Self {
        Self {
            id: UserId::new(user.id),
            email: user.email,
            full_name: user.user_metadata["full_name"]
                .as_str()
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(ToString::to_string),
        }
    }
}

const MESSAGE_KEYS: [&str; 4] = ["msg", "message", "error_description", "error"];

/// Turn a failed GoTrue response into an [`AuthError`].
pub(super) fn rejection(status: StatusCode, body: &str) -> AuthError {
    let payload: Value = serde_json::from_str(body).unwrap_or(Value::Null);
    let message = MESSAGE_KEYS
        .iter()
        .find_map(|key| payload[*key].as_str())
        .map_or_else(|| body.trim().to_string(), |message| message.trim().to_string());

    let unconfirmed = payload["error_code"].as_str() == Some("email_not_confirmed")
        || message.eq_ignore_ascii_case("email not confirmed");
    if unconfirmed {
        return AuthError::EmailNotConfirmed;
    }
    if message.is_empty() {
        AuthError::Rejected(format!("HTTP {}", status.as_u16()))
    } else {
        AuthError::Rejected(format!("{message} ({})", status.as_u16()))
    }
}
