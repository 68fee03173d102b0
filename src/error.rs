#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Transport failure: no response was received.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-2xx status.
    #[error("{method} {path} failed with status {status}")]
    Status {
        method: String,
        path: String,
        status: u16,
        body: String,
    },

    /// HTTP 200 with `success: false` in the envelope.
    #[error("Request rejected: {message}")]
    Business { message: String },

    /// The session could not be refreshed; credentials were cleared.
    #[error("Session expired")]
    SessionExpired,

    #[error("Invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Token error: {0}")]
    Token(String),

    #[error("Unsupported operation: {0}")]
    Unsupported(String),
}

impl Error {
    /// HTTP status of the failed response, if the server answered.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    /// Best-effort message supplied by the server.
    ///
    /// Business failures carry it directly; HTTP errors carry it in a JSON
    /// body as `message` (or `title` for framework-generated problem details).
    #[must_use]
    pub fn server_message(&self) -> Option<String> {
        match self {
            Self::Business { message } if !message.is_empty() => Some(message.clone()),
            Self::Status { body, .. } => {
                let value: serde_json::Value = serde_json::from_str(body).ok()?;
                ["message", "title"]
                    .iter()
                    .filter_map(|key| value.get(key).and_then(|v| v.as_str()))
                    .find(|s| !s.is_empty())
                    .map(str::to_owned)
            }
            _ => None,
        }
    }

    /// Message to show the user: the server's, else `fallback`.
    #[must_use]
    pub fn user_message(&self, fallback: &str) -> String {
        self.server_message().unwrap_or_else(|| fallback.to_owned())
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Storage(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_error(status: u16, body: &str) -> Error {
        Error::Status {
            method: "GET".into(),
            path: "/DailyTips".into(),
            status,
            body: body.into(),
        }
    }

    #[test]
    fn server_message_from_json_body() {
        let err = status_error(400, r#"{"success":false,"message":"Invalid date"}"#);
        assert_eq!(err.server_message().as_deref(), Some("Invalid date"));
        assert_eq!(err.user_message("fallback"), "Invalid date");
    }

    #[test]
    fn server_message_from_problem_details_title() {
        let err = status_error(422, r#"{"title":"One or more validation errors occurred."}"#);
        assert_eq!(
            err.server_message().as_deref(),
            Some("One or more validation errors occurred.")
        );
    }

    #[test]
    fn falls_back_when_body_is_not_json() {
        let err = status_error(502, "<html>Bad gateway</html>");
        assert_eq!(err.server_message(), None);
        assert_eq!(err.user_message("Could not load tips"), "Could not load tips");
    }

    #[test]
    fn business_message_is_used() {
        let err = Error::Business {
            message: "Plan already active".into(),
        };
        assert_eq!(err.user_message("x"), "Plan already active");
        assert_eq!(err.status(), None);
    }

    #[test]
    fn unauthorized_detection() {
        assert!(status_error(401, "").is_unauthorized());
        assert!(!status_error(403, "").is_unauthorized());
        assert!(!Error::SessionExpired.is_unauthorized());
    }
}
