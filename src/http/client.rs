use std::sync::Arc;

use serde::de::DeserializeOwned;
use tokio::sync::Mutex;

use super::request::{ApiRequest, RawResponse};
use super::transport::{ReqwestTransport, Transport};
use crate::api::auth::{AuthTokens, REFRESH_PATH, RefreshRequest};
use crate::config::ClientConfig;
use crate::envelope;
use crate::error::Error;
use crate::session::{LogNavigator, Navigator, Session};

/// Retry state of a single request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Attempt {
    NotTried,
    Retried,
}

/// Authenticated request pipeline.
///
/// Every request gets `Authorization: Bearer <access token>` from the
/// [`Session`]. A 401 triggers one refresh through `POST /Auth/RefreshToken`
/// and one re-issue of the request. Refreshes are serialized: requests that
/// fail together share the first refresh instead of each minting new tokens.
/// When the session cannot be refreshed it is cleared and the
/// [`Navigator`] is sent to the login route.
pub struct ApiClient<T = ReqwestTransport> {
    transport: Arc<T>,
    session: Session,
    navigator: Arc<dyn Navigator>,
    login_route: Arc<str>,
    refresh_lock: Arc<Mutex<()>>,
}

// Manual Clone: avoid derive adding a `T: Clone` bound.
impl<T> Clone for ApiClient<T> {
    fn clone(&self) -> Self {
        Self {
            transport: self.transport.clone(),
            session: self.session.clone(),
            navigator: self.navigator.clone(),
            login_route: self.login_route.clone(),
            refresh_lock: self.refresh_lock.clone(),
        }
    }
}

impl ApiClient<ReqwestTransport> {
    /// Create a client over `reqwest` for the configured backend.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] if the HTTP client cannot be built.
    pub fn new(config: ClientConfig, session: Session) -> Result<Self, Error> {
        let login_route = config.login_route().to_owned();
        let transport = ReqwestTransport::new(config)?;
        Ok(Self::with_transport(transport, session, login_route))
    }
}

impl<T: Transport> ApiClient<T> {
    #[must_use]
    pub fn with_transport(transport: T, session: Session, login_route: impl Into<String>) -> Self {
        Self {
            transport: Arc::new(transport),
            session,
            navigator: Arc::new(LogNavigator),
            login_route: Arc::from(login_route.into()),
            refresh_lock: Arc::new(Mutex::new(())),
        }
    }

    #[must_use]
    pub fn with_navigator(mut self, navigator: impl Navigator) -> Self {
        self.navigator = Arc::new(navigator);
        self
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Send `request` and decode the envelope's `data` as `R`.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::send`]; additionally [`Error::Business`] for
    /// `success: false` and [`Error::Decode`] for an unexpected payload.
    pub async fn call<R: DeserializeOwned>(&self, request: ApiRequest) -> Result<R, Error> {
        let response = self.send(request).await?;
        envelope::unwrap_data(&response.body)
    }

    /// Send `request` through the interceptors.
    ///
    /// # Errors
    ///
    /// - [`Error::Http`] when no response was received
    /// - [`Error::Status`] for any non-2xx status that was not recovered
    /// - [`Error::SessionExpired`] when a 401 could not be recovered by refreshing
    pub async fn send(&self, mut request: ApiRequest) -> Result<RawResponse, Error> {
        let mut attempt = Attempt::NotTried;
        loop {
            let sent_token = self.authorize(&mut request)?;
            tracing::debug!(
                method = %request.method,
                path = %request.path,
                ?attempt,
                "Sending request"
            );

            let response = self.transport.send(&request).await?;
            if response.status != 401 || request.skip_refresh || attempt == Attempt::Retried {
                return ensure_success(&request, response);
            }

            tracing::debug!(path = %request.path, "Access token rejected, refreshing session");
            self.refresh_session(sent_token.as_deref()).await?;
            attempt = Attempt::Retried;
        }
    }

    /// Request interceptor: attach the stored bearer token. Returns the token used.
    fn authorize(&self, request: &mut ApiRequest) -> Result<Option<String>, Error> {
        if !request.attach_auth {
            request.authorization = None;
            return Ok(None);
        }
        let token = self.session.access_token()?;
        request.authorization = token.as_ref().map(|t| format!("Bearer {t}"));
        Ok(token)
    }

    /// Mint a new token pair, unless another request already replaced `stale_token`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SessionExpired`] (after clearing the session and
    /// redirecting) if credentials are missing or the refresh fails, or
    /// [`Error::Storage`] if the session store cannot be read.
    pub async fn refresh_session(&self, stale_token: Option<&str>) -> Result<(), Error> {
        let _guard = self.refresh_lock.lock().await;

        let access_token = self.session.access_token()?;
        if access_token.is_some() && access_token.as_deref() != stale_token {
            tracing::debug!("Session already refreshed by a concurrent request");
            return Ok(());
        }
        if access_token.is_none() && stale_token.is_some() {
            // A concurrent request already cleared the session and redirected.
            tracing::debug!("Session already expired by a concurrent request");
            return Err(Error::SessionExpired);
        }

        let (Some(access_token), Some(refresh_token)) =
            (access_token, self.session.refresh_token()?)
        else {
            tracing::warn!("Session refresh impossible: credentials missing");
            return Err(self.expire_session());
        };

        let request = ApiRequest::post(REFRESH_PATH)
            .json(&RefreshRequest {
                access_token,
                refresh_token,
            })?
            .without_auth()
            .without_refresh();

        match self.exchange_refresh(&request).await {
            Ok(tokens) if tokens.is_complete() => {
                self.session.store_tokens(&tokens)?;
                tracing::info!("Session refreshed");
                Ok(())
            }
            Ok(_) => {
                tracing::warn!("Session refresh returned incomplete tokens");
                Err(self.expire_session())
            }
            Err(e) => {
                tracing::warn!(error = %e, "Session refresh failed");
                Err(self.expire_session())
            }
        }
    }

    async fn exchange_refresh(&self, request: &ApiRequest) -> Result<AuthTokens, Error> {
        let response = self.transport.send(request).await?;
        let response = ensure_success(request, response)?;
        envelope::unwrap_data(&response.body)
    }

    /// Clear credentials and send the user to the login route.
    fn expire_session(&self) -> Error {
        if let Err(e) = self.session.clear() {
            tracing::error!(error = %e, "Failed to clear session storage");
        }
        self.navigator.redirect(&self.login_route);
        Error::SessionExpired
    }
}

fn ensure_success(request: &ApiRequest, response: RawResponse) -> Result<RawResponse, Error> {
    if response.is_success() {
        return Ok(response);
    }
    Err(Error::Status {
        method: request.method.to_string(),
        path: request.path.clone(),
        status: response.status,
        body: response.body_text(),
    })
}
