//! Authenticated HTTP pipeline: request model, transport and the refreshing client.

mod client;
mod request;
mod transport;

pub use client::ApiClient;
pub use request::{ApiRequest, FormPart, PartContent, RawResponse, RequestBody, segment};
pub use transport::{ReqwestTransport, Transport};
