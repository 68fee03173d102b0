#![doc = include_str!("../README.md")]

pub mod api;
pub mod config;
pub mod envelope;
pub mod error;
pub mod http;
pub mod session;
pub mod storage;
pub mod store;
pub mod timestamp;
pub mod token;
pub mod types;

#[cfg(test)]
mod testing;

// Re-exports for convenient access
pub use api::auth::{AuthTokens, User};
pub use config::ClientConfig;
pub use error::Error;
pub use http::{ApiClient, ApiRequest, RawResponse, ReqwestTransport, Transport};
pub use session::{LogNavigator, Navigator, Session};
pub use storage::{FileStorage, MemoryStorage, Storage};
pub use types::{
    ChatSessionId, EntryId, MessageId, PlanId, Role, SubscriptionId, TipId, UserId,
};
