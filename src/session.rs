use std::sync::Arc;

use crate::api::auth::{AuthTokens, User};
use crate::error::Error;
use crate::storage::Storage;

pub const ACCESS_TOKEN_KEY: &str = "accessToken";
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";
pub const USER_KEY: &str = "user";

/// Credential holder shared by every request an [`ApiClient`](crate::ApiClient) sends.
///
/// Wraps a [`Storage`] backend and knows the persisted layout
/// (`accessToken`, `refreshToken`, `user`).
#[derive(Clone)]
pub struct Session {
    storage: Arc<dyn Storage>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session").finish_non_exhaustive()
    }
}

impl Session {
    #[must_use]
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    pub fn access_token(&self) -> Result<Option<String>, Error> {
        Ok(self
            .storage
            .get(ACCESS_TOKEN_KEY)?
            .filter(|t| !t.is_empty()))
    }

    pub fn refresh_token(&self) -> Result<Option<String>, Error> {
        Ok(self
            .storage
            .get(REFRESH_TOKEN_KEY)?
            .filter(|t| !t.is_empty()))
    }

    /// Persist a new token pair, replacing the old one.
    pub fn store_tokens(&self, tokens: &AuthTokens) -> Result<(), Error> {
        self.storage.set(ACCESS_TOKEN_KEY, &tokens.access_token)?;
        self.storage.set(REFRESH_TOKEN_KEY, &tokens.refresh_token)
    }

    /// Current user DTO, if one was stored at login.
    ///
    /// A corrupt entry reads as absent.
    pub fn user(&self) -> Result<Option<User>, Error> {
        let Some(raw) = self.storage.get(USER_KEY)? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(user) => Ok(Some(user)),
            Err(e) => {
                tracing::warn!(error = %e, "Discarding unreadable stored user");
                Ok(None)
            }
        }
    }

    pub fn store_user(&self, user: &User) -> Result<(), Error> {
        let json = serde_json::to_string(user)?;
        self.storage.set(USER_KEY, &json)
    }

    /// Drop every persisted credential.
    pub fn clear(&self) -> Result<(), Error> {
        self.storage.clear()
    }
}

/// Receives redirect requests when the session becomes unrecoverable.
///
/// A UI layer implements this to route to its login screen. Closures
/// taking the route work as navigators.
pub trait Navigator: Send + Sync + 'static {
    fn redirect(&self, route: &str);
}

impl<F> Navigator for F
where
    F: Fn(&str) + Send + Sync + 'static,
{
    fn redirect(&self, route: &str) {
        self(route);
    }
}

/// Navigator that only logs the requested route.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn redirect(&self, route: &str) {
        tracing::info!(route = %route, "Redirect requested");
    }
}
