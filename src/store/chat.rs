use super::AsyncStatus;
use crate::api::chat::{self, ChatMessage, ChatSession};
use crate::error::Error;
use crate::http::{ApiClient, Transport};
use crate::types::ChatSessionId;

const START_FAILED: &str = "Could not start a chat session.";
const SEND_FAILED: &str = "Your message could not be sent.";
const END_FAILED: &str = "Could not end the chat session.";
const SESSIONS_FAILED: &str = "Could not load your chat sessions.";
const HISTORY_FAILED: &str = "Could not load this conversation.";

/// Therapy chat: past sessions, the open conversation and its messages.
#[derive(Debug, Clone, Default)]
pub struct ChatSlice {
    pub status: AsyncStatus,
    sending: bool,
    sessions: Vec<ChatSession>,
    current: Option<ChatSession>,
    messages: Vec<ChatMessage>,
}

impl ChatSlice {
    /// A message is in flight. Tracked apart from `status.is_loading()` so
    /// the conversation stays interactive while the reply is generated.
    #[must_use]
    pub fn is_sending(&self) -> bool {
        self.sending
    }

    #[must_use]
    pub fn sessions(&self) -> &[ChatSession] {
        &self.sessions
    }

    #[must_use]
    pub fn current(&self) -> Option<&ChatSession> {
        self.current.as_ref()
    }

    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub async fn start_session<T: Transport>(
        &mut self,
        client: &ApiClient<T>,
        title: Option<&str>,
    ) -> Result<(), Error> {
        self.status.pending();
        let result = chat::start_session(client, title).await;
        let session = self.status.settle(result, START_FAILED)?;
        self.sessions.retain(|s| s.id != session.id);
        self.sessions.insert(0, session.clone());
        self.current = Some(session);
        self.messages.clear();
        Ok(())
    }

    /// Send a message in the open session and append both sides of the exchange.
    pub async fn send_message<T: Transport>(
        &mut self,
        client: &ApiClient<T>,
        content: &str,
    ) -> Result<(), Error> {
        self.status.clear_error();
        let Some(session_id) = self.current.as_ref().filter(|s| s.is_active()).map(|s| s.id) else {
            let err = Error::Unsupported("no active chat session".into());
            self.status.rejected(&err, SEND_FAILED);
            return Err(err);
        };

        self.sending = true;
        let result = chat::send_message(client, session_id, content).await;
        self.sending = false;

        match result {
            Ok(exchange) => {
                self.messages.push(exchange.user_message);
                self.messages.push(exchange.ai_response);
                if let Some(current) = self.current.as_mut() {
                    current.message_count += 2;
                }
                self.status.fulfilled();
                Ok(())
            }
            Err(e) => {
                self.status.rejected(&e, SEND_FAILED);
                Err(e)
            }
        }
    }

    /// Close the open session. Its messages stay visible.
    pub async fn end_session<T: Transport>(&mut self, client: &ApiClient<T>) -> Result<(), Error> {
        let Some(session_id) = self.current.as_ref().map(|s| s.id) else {
            return Ok(());
        };
        self.status.pending();
        let result = chat::end_session(client, session_id).await;
        let ended = self.status.settle(result, END_FAILED)?;
        if let Some(cached) = self.sessions.iter_mut().find(|s| s.id == ended.id) {
            *cached = ended;
        }
        self.current = None;
        Ok(())
    }

    pub async fn fetch_sessions<T: Transport>(
        &mut self,
        client: &ApiClient<T>,
    ) -> Result<(), Error> {
        self.status.pending();
        let result = chat::sessions(client).await;
        self.sessions = self.status.settle(result, SESSIONS_FAILED)?;
        Ok(())
    }

    /// Load a past conversation and make it current.
    pub async fn fetch_history<T: Transport>(
        &mut self,
        client: &ApiClient<T>,
        session_id: ChatSessionId,
    ) -> Result<(), Error> {
        self.status.pending();
        let result = chat::history(client, session_id).await;
        self.messages = self.status.settle(result, HISTORY_FAILED)?;
        self.current = self.sessions.iter().find(|s| s.id == session_id).cloned();
        Ok(())
    }
}
