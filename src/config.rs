use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::error::Error;

const DEFAULT_LOGIN_ROUTE: &str = "/login";

/// Backend connection settings.
///
/// The base URL is a constructor parameter; everything else has a default
/// and can be overridden with the `with_*` methods.
///
/// ```rust,ignore
/// use mindwell_client::ClientConfig;
///
/// let config = ClientConfig::new("https://api.mindwell.app/api".parse()?)
///     .with_timeout(std::time::Duration::from_secs(20));
/// ```
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct ClientConfig {
    pub(crate) base_url: Url,
    pub(crate) login_route: String,
    pub(crate) timeout: Option<Duration>,
    pub(crate) user_agent: Option<String>,
    pub(crate) session_file: Option<PathBuf>,
}

impl ClientConfig {
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            login_route: DEFAULT_LOGIN_ROUTE.into(),
            timeout: None,
            user_agent: None,
            session_file: None,
        }
    }

    /// Create config from environment variables.
    ///
    /// # Required env vars
    /// - `MINDWELL_API_URL`: backend base URL
    ///
    /// # Optional env vars
    /// - `MINDWELL_LOGIN_ROUTE`: route handed to the navigator on forced logout
    /// - `MINDWELL_TIMEOUT_SECS`: per-request timeout in seconds
    /// - `MINDWELL_USER_AGENT`: `User-Agent` header value
    /// - `MINDWELL_SESSION_FILE`: file backing [`FileStorage`](crate::FileStorage)
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the base URL is missing or any value is invalid.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let base_url: Url = lookup("MINDWELL_API_URL")
            .ok_or_else(|| Error::Config("MINDWELL_API_URL is required".into()))?
            .parse()
            .map_err(|e| Error::Config(format!("MINDWELL_API_URL: {e}")))?;

        let mut config = Self::new(base_url);

        if let Some(route) = lookup("MINDWELL_LOGIN_ROUTE") {
            config = config.with_login_route(route);
        }
        if let Some(secs) = lookup("MINDWELL_TIMEOUT_SECS") {
            let secs: u64 = secs
                .trim()
                .parse()
                .map_err(|e| Error::Config(format!("MINDWELL_TIMEOUT_SECS: {e}")))?;
            config = config.with_timeout(Duration::from_secs(secs));
        }
        if let Some(agent) = lookup("MINDWELL_USER_AGENT") {
            config = config.with_user_agent(agent);
        }
        if let Some(path) = lookup("MINDWELL_SESSION_FILE") {
            config = config.with_session_file(path);
        }

        Ok(config)
    }

    #[must_use]
    pub fn with_login_route(mut self, route: impl Into<String>) -> Self {
        self.login_route = route.into();
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn with_user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    #[must_use]
    pub fn with_session_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.session_file = Some(path.into());
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Route the navigator is sent to when the session cannot be recovered.
    #[must_use]
    pub fn login_route(&self) -> &str {
        &self.login_route
    }

    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    #[must_use]
    pub fn user_agent(&self) -> Option<&str> {
        self.user_agent.as_deref()
    }

    #[must_use]
    pub fn session_file(&self) -> Option<&std::path::Path> {
        self.session_file.as_deref()
    }

    /// Absolute URL for a backend path such as `/DailyTips/Today`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the joined URL does not parse.
    pub fn endpoint(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{base}/{path}")
            .parse()
            .map_err(|e| Error::Config(format!("invalid endpoint {path}: {e}")))
    }
}
