use reqwest::Method;
use serde::Serialize;

use crate::error::Error;

/// Request body, owned so a request can be re-issued after a session refresh.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(serde_json::Value),
    Multipart(Vec<FormPart>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormPart {
    pub name: String,
    pub content: PartContent,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PartContent {
    Text(String),
    File {
        file_name: String,
        mime_type: String,
        bytes: Vec<u8>,
    },
}

impl FormPart {
    #[must_use]
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: PartContent::Text(value.into()),
        }
    }

    #[must_use]
    pub fn file(
        name: impl Into<String>,
        file_name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            name: name.into(),
            content: PartContent::File {
                file_name: file_name.into(),
                mime_type: mime_type.into(),
                bytes,
            },
        }
    }
}

/// A request relative to the configured base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: RequestBody,
    /// `Authorization` header value, filled by the client's request interceptor.
    pub authorization: Option<String>,
    pub(crate) attach_auth: bool,
    pub(crate) skip_refresh: bool,
}

impl ApiRequest {
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: RequestBody::Empty,
            authorization: None,
            attach_auth: true,
            skip_refresh: false,
        }
    }

    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    #[must_use]
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Serialize `body` as the JSON payload.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if `body` does not serialize.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, Error> {
        self.body = RequestBody::Json(serde_json::to_value(body)?);
        Ok(self)
    }

    #[must_use]
    pub fn multipart(mut self, parts: Vec<FormPart>) -> Self {
        self.body = RequestBody::Multipart(parts);
        self
    }

    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Send without the bearer credential.
    #[must_use]
    pub fn without_auth(mut self) -> Self {
        self.attach_auth = false;
        self
    }

    /// Return a 401 to the caller instead of attempting a session refresh.
    #[must_use]
    pub fn without_refresh(mut self) -> Self {
        self.skip_refresh = true;
        self
    }

    #[must_use]
    pub fn bearer_token(&self) -> Option<&str> {
        self.authorization.as_deref()?.strip_prefix("Bearer ")
    }
}

/// Status and body of a completed exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl RawResponse {
    #[must_use]
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    #[must_use]
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Percent-encode a single path segment such as a user id.
#[must_use]
pub fn segment(value: impl std::fmt::Display) -> String {
    urlencoding::encode(&value.to_string()).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_fields() {
        let req = ApiRequest::get("/DailyTips")
            .query("category", "sleep")
            .without_auth();

        assert_eq!(req.method, Method::GET);
        assert_eq!(req.query, vec![("category".to_owned(), "sleep".to_owned())]);
        assert!(!req.attach_auth);
        assert!(!req.skip_refresh);
    }

    #[test]
    fn json_body_is_captured() {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Body {
            plan_id: i64,
        }

        let req = ApiRequest::post("/Subscriptions/Subscribe")
            .json(&Body { plan_id: 3 })
            .unwrap();
        assert_eq!(req.body, RequestBody::Json(serde_json::json!({ "planId": 3 })));
    }

    #[test]
    fn bearer_token_strips_scheme() {
        let mut req = ApiRequest::get("/x");
        assert_eq!(req.bearer_token(), None);
        req.authorization = Some("Bearer abc".into());
        assert_eq!(req.bearer_token(), Some("abc"));
    }

    #[test]
    fn segment_encodes_reserved_characters() {
        assert_eq!(segment("a b/c"), "a%20b%2Fc");
        assert_eq!(segment(42), "42");
    }
}
