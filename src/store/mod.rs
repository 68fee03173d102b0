//! State slices: cached server state plus the async operations that fill it.
//!
//! Every operation runs the same three phases on the slice's [`AsyncStatus`]:
//! pending (loading, error cleared), then fulfilled (payload stored, success)
//! or rejected (user-facing message stored). Operations also return the
//! outcome so callers can chain on it; the slice is updated either way.

mod auth;
mod chat;
mod mood;
mod profile;
mod subscription;
mod tips;

pub use auth::AuthSlice;
pub use chat::ChatSlice;
pub use mood::{MoodFilter, MoodSlice, ViewMode};
pub use profile::ProfileSlice;
pub use subscription::SubscriptionSlice;
pub use tips::TipsSlice;

use crate::error::Error;

/// Loading/success/error flags of a slice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AsyncStatus {
    loading: bool,
    success: bool,
    error: Option<String>,
}

impl AsyncStatus {
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Whether the last operation succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.success
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Dismiss the current error message.
    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub(crate) fn pending(&mut self) {
        self.loading = true;
        self.error = None;
    }

    pub(crate) fn fulfilled(&mut self) {
        self.loading = false;
        self.success = true;
    }

    pub(crate) fn rejected(&mut self, error: &Error, fallback: &str) {
        tracing::debug!(error = %error, "Slice operation rejected");
        self.loading = false;
        self.success = false;
        self.error = Some(error.user_message(fallback));
    }

    /// Record the outcome of an operation and hand it back.
    pub(crate) fn settle<R>(&mut self, result: Result<R, Error>, fallback: &str) -> Result<R, Error> {
        match &result {
            Ok(_) => self.fulfilled(),
            Err(e) => self.rejected(e, fallback),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_phase_contract() {
        let mut status = AsyncStatus::default();

        status.pending();
        assert!(status.is_loading());
        assert_eq!(status.error(), None);

        let _ = status.settle::<()>(Err(Error::SessionExpired), "Could not load data");
        assert!(!status.is_loading());
        assert!(!status.is_success());
        assert_eq!(status.error(), Some("Could not load data"));

        status.pending();
        assert_eq!(status.error(), None, "pending clears the previous error");

        let value = status.settle(Ok(3), "unused").unwrap();
        assert_eq!(value, 3);
        assert!(status.is_success());
        assert!(!status.is_loading());
    }

    #[test]
    fn server_message_wins_over_fallback() {
        let mut status = AsyncStatus::default();
        status.pending();
        let _ = status.settle::<()>(
            Err(Error::Business {
                message: "Daily chat limit reached".into(),
            }),
            "Could not send message",
        );
        assert_eq!(status.error(), Some("Daily chat limit reached"));
    }
}
