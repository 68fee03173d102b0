use time::OffsetDateTime;

use super::AsyncStatus;
use crate::api::auth::{self, RegisterRequest, User};
use crate::error::Error;
use crate::http::{ApiClient, Transport};
use crate::session::Session;
use crate::token;
use crate::types::Role;

const LOGIN_FAILED: &str = "Could not sign in. Check your email and password.";
const REGISTER_FAILED: &str = "Could not create the account.";
const LOGOUT_FAILED: &str = "Could not sign out.";

/// Authentication state: who is signed in.
#[derive(Debug, Clone, Default)]
pub struct AuthSlice {
    pub status: AsyncStatus,
    is_authenticated: bool,
    user: Option<User>,
}

impl AuthSlice {
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.is_authenticated
    }

    #[must_use]
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    #[must_use]
    pub fn role(&self) -> Option<Role> {
        self.user.as_ref().map(|u| u.role)
    }

    pub async fn login<T: Transport>(
        &mut self,
        client: &ApiClient<T>,
        email: &str,
        password: &str,
    ) -> Result<(), Error> {
        self.status.pending();
        let result = auth::login(client, email, password).await;
        let response = self.status.settle(result, LOGIN_FAILED)?;
        self.user = Some(response.user);
        self.is_authenticated = true;
        Ok(())
    }

    /// Create an account. The slice stays signed out.
    pub async fn register<T: Transport>(
        &mut self,
        client: &ApiClient<T>,
        registration: &RegisterRequest,
    ) -> Result<User, Error> {
        self.status.pending();
        let result = auth::register(client, registration).await;
        self.status.settle(result, REGISTER_FAILED)
    }

    pub async fn logout<T: Transport>(&mut self, client: &ApiClient<T>) -> Result<(), Error> {
        self.status.pending();
        let result = auth::logout(client).await;
        // Local state is dropped even if storage could not be cleared.
        self.user = None;
        self.is_authenticated = false;
        self.status.settle(result, LOGOUT_FAILED)
    }

    /// Rebuild state from persisted credentials (application start).
    pub fn restore(&mut self, session: &Session) -> Result<(), Error> {
        self.restore_at(session, OffsetDateTime::now_utc())
    }

    /// A session is restored when an access token and user are stored. An
    /// access token that is already expired with no refresh token to renew it
    /// is discarded along with the rest of the session.
    pub(crate) fn restore_at(&mut self, session: &Session, now: OffsetDateTime) -> Result<(), Error> {
        self.user = None;
        self.is_authenticated = false;

        let Some(access_token) = session.access_token()? else {
            return Ok(());
        };

        // Opaque tokens carry no readable expiry and are trusted as-is.
        let expired = token::decode_unverified(&access_token)
            .map(|claims| claims.is_expired_at(now))
            .unwrap_or(false);
        if expired && session.refresh_token()?.is_none() {
            tracing::info!("Discarding expired session");
            session.clear()?;
            return Ok(());
        }

        if let Some(user) = session.user()? {
            self.user = Some(user);
            self.is_authenticated = true;
        }
        Ok(())
    }

    /// Drop local state after the client reported an expired session.
    pub fn session_expired(&mut self) {
        self.user = None;
        self.is_authenticated = false;
    }
}
