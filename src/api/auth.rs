use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::http::{ApiClient, ApiRequest, Transport};
use crate::types::{Role, UserId};

pub(crate) const REFRESH_PATH: &str = "/Auth/RefreshToken";

/// Access/refresh token pair issued at login and on refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthTokens {
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: String,
}

impl AuthTokens {
    #[must_use]
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }

    pub(crate) fn is_complete(&self) -> bool {
        !self.access_token.is_empty() && !self.refresh_token.is_empty()
    }
}

/// Current-user DTO.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub role: Role,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub profile_picture_url: Option<String>,
}

impl User {
    #[must_use]
    pub fn new(id: UserId, email: impl Into<String>, role: Role) -> Self {
        Self {
            id,
            email: email.into(),
            role,
            first_name: None,
            last_name: None,
            profile_picture_url: None,
        }
    }

    #[must_use]
    pub fn with_name(mut self, first: impl Into<String>, last: impl Into<String>) -> Self {
        self.first_name = Some(first.into());
        self.last_name = Some(last.into());
        self
    }

    /// "First Last", falling back to the email.
    #[must_use]
    pub fn display_name(&self) -> String {
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => format!("{first} {last}"),
            (Some(first), None) => first.clone(),
            _ => self.email.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    #[serde(flatten)]
    pub tokens: AuthTokens,
    pub user: User,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RefreshRequest {
    pub(crate) access_token: String,
    pub(crate) refresh_token: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct LogoutRequest {
    refresh_token: String,
}

/// `POST /Auth/Login`. Persists the token pair and user on success.
///
/// # Errors
///
/// Returns [`Error::Status`] (401 for bad credentials), [`Error::Business`],
/// or [`Error::Storage`] if the session cannot be persisted.
pub async fn login<T: Transport>(
    client: &ApiClient<T>,
    email: &str,
    password: &str,
) -> Result<LoginResponse, Error> {
    let request = ApiRequest::post("/Auth/Login")
        .json(&LoginRequest {
            email: email.to_owned(),
            password: password.to_owned(),
        })?
        .without_auth()
        .without_refresh();

    let response: LoginResponse = client.call(request).await?;
    if !response.tokens.is_complete() {
        return Err(Error::Token("login response carried no tokens".into()));
    }

    let session = client.session();
    session.store_tokens(&response.tokens)?;
    session.store_user(&response.user)?;
    tracing::info!(user_id = %response.user.id, role = %response.user.role, "Login successful");
    Ok(response)
}

/// `POST /Auth/Register`. Does not sign the new account in.
///
/// # Errors
///
/// Returns [`Error::Business`] for validation failures reported by the server.
pub async fn register<T: Transport>(
    client: &ApiClient<T>,
    registration: &RegisterRequest,
) -> Result<User, Error> {
    let request = ApiRequest::post("/Auth/Register")
        .json(registration)?
        .without_auth()
        .without_refresh();
    client.call(request).await
}

/// `POST /Auth/Logout`, then clear the local session.
///
/// The local session is cleared even when the server call fails.
///
/// # Errors
///
/// Returns [`Error::Storage`] only if the session cannot be cleared.
pub async fn logout<T: Transport>(client: &ApiClient<T>) -> Result<(), Error> {
    let session = client.session();
    if let Some(refresh_token) = session.refresh_token()? {
        let request = ApiRequest::post("/Auth/Logout")
            .json(&LogoutRequest { refresh_token })?
            .without_refresh();
        if let Err(e) = client.call::<serde_json::Value>(request).await {
            tracing::warn!(error = %e, "Logout call failed, clearing local session anyway");
        }
    }
    session.clear()?;
    tracing::info!("Logged out");
    Ok(())
}
