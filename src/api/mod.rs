//! Thin per-domain calls: one function per backend endpoint.
//!
//! Every function takes the shared [`ApiClient`](crate::ApiClient), sends a
//! fixed verb and path, and returns the envelope's `data`. No caching and no
//! retries happen here beyond the client's session refresh.

pub mod auth;
pub mod chat;
pub mod mood;
pub mod profile;
pub mod subscription;
pub mod tips;
