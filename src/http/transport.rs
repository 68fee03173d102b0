use std::future::Future;

use reqwest::header::AUTHORIZATION;
use reqwest::multipart::{Form, Part};

use super::request::{ApiRequest, PartContent, RawResponse, RequestBody};
use crate::config::ClientConfig;
use crate::error::Error;

/// Sends a fully-prepared request and returns the raw response.
///
/// Non-2xx statuses are NOT errors at this layer; only a missing response is.
pub trait Transport: Send + Sync + 'static {
    fn send(
        &self,
        request: &ApiRequest,
    ) -> impl Future<Output = Result<RawResponse, Error>> + Send;
}

/// Production transport over `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    config: ClientConfig,
    http: reqwest::Client,
}

impl ReqwestTransport {
    /// Build a transport honoring the configured timeout and user agent.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] if the underlying client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self, Error> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        if let Some(agent) = config.user_agent() {
            builder = builder.user_agent(agent);
        }
        Ok(Self {
            http: builder.build()?,
            config,
        })
    }

    /// Use a custom HTTP client (for connection pool reuse or testing).
    #[must_use]
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http = client;
        self
    }

    fn build(&self, request: &ApiRequest) -> Result<reqwest::RequestBuilder, Error> {
        let url = self.config.endpoint(&request.path)?;
        let mut builder = self.http.request(request.method.clone(), url);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(value) = &request.authorization {
            builder = builder.header(AUTHORIZATION, value);
        }

        builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(value),
            RequestBody::Multipart(parts) => {
                let mut form = Form::new();
                for part in parts {
                    form = match &part.content {
                        PartContent::Text(value) => form.text(part.name.clone(), value.clone()),
                        PartContent::File {
                            file_name,
                            mime_type,
                            bytes,
                        } => {
                            let file = Part::bytes(bytes.clone())
                                .file_name(file_name.clone())
                                .mime_str(mime_type)?;
                            form.part(part.name.clone(), file)
                        }
                    };
                }
                builder.multipart(form)
            }
        };

        Ok(builder)
    }
}

impl Transport for ReqwestTransport {
    async fn send(&self, request: &ApiRequest) -> Result<RawResponse, Error> {
        let builder = self.build(request)?;
        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;
        Ok(RawResponse::new(status, body.to_vec()))
    }
}
