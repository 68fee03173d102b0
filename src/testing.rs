//! In-memory backend for unit tests.

use std::sync::{Arc, Mutex};

use serde_json::{Value as JsonValue, json};

use crate::error::Error;
use crate::http::{ApiClient, ApiRequest, RawResponse, Transport};
use crate::session::Session;
use crate::storage::MemoryStorage;

type Handler = dyn Fn(&ApiRequest) -> RawResponse + Send + Sync;

/// Transport answering every request with a handler and recording what was sent.
#[derive(Clone)]
pub(crate) struct MockTransport {
    handler: Arc<Handler>,
    requests: Arc<Mutex<Vec<ApiRequest>>>,
}

impl Transport for MockTransport {
    async fn send(&self, request: &ApiRequest) -> Result<RawResponse, Error> {
        // Suspend once so concurrent requests interleave like real network calls.
        tokio::task::yield_now().await;
        self.requests.lock().unwrap().push(request.clone());
        Ok((self.handler)(request))
    }
}

pub(crate) struct Harness {
    pub client: ApiClient<MockTransport>,
    pub storage: Arc<MemoryStorage>,
    redirects: Arc<Mutex<Vec<String>>>,
}

impl Harness {
    pub fn new(handler: impl Fn(&ApiRequest) -> RawResponse + Send + Sync + 'static) -> Self {
        let transport = MockTransport {
            handler: Arc::new(handler),
            requests: Arc::default(),
        };
        let storage = Arc::new(MemoryStorage::new());
        let redirects: Arc<Mutex<Vec<String>>> = Arc::default();
        let sink = redirects.clone();
        let client = ApiClient::with_transport(transport, Session::new(storage.clone()), "/login")
            .with_navigator(move |route: &str| sink.lock().unwrap().push(route.to_owned()));
        Self {
            client,
            storage,
            redirects,
        }
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.client.transport().requests.lock().unwrap().clone()
    }

    pub fn redirects(&self) -> Vec<String> {
        self.redirects.lock().unwrap().clone()
    }
}

pub(crate) fn json_response(status: u16, body: JsonValue) -> RawResponse {
    RawResponse::new(status, body.to_string())
}

pub(crate) fn envelope_ok(data: JsonValue) -> RawResponse {
    json_response(200, json!({ "success": true, "data": data }))
}
