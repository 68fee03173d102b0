use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::error::Error;
use crate::http::{ApiClient, ApiRequest, Transport};
use crate::types::{ChatSessionId, MessageId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sender {
    User,
    #[serde(alias = "AI", alias = "Assistant")]
    Ai,
    #[serde(other)]
    System,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: MessageId,
    pub session_id: ChatSessionId,
    pub sender: Sender,
    pub content: String,
    #[serde(with = "crate::timestamp")]
    pub sent_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSession {
    pub id: ChatSessionId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(with = "crate::timestamp")]
    pub started_at: OffsetDateTime,
    #[serde(default, with = "crate::timestamp::option")]
    pub ended_at: Option<OffsetDateTime>,
    #[serde(default)]
    pub message_count: u32,
}

impl ChatSession {
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.ended_at.is_none()
    }
}

/// The stored user message and the generated reply.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatExchange {
    pub user_message: ChatMessage,
    pub ai_response: ChatMessage,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct StartSessionRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<&'a str>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct SendMessageRequest<'a> {
    session_id: ChatSessionId,
    content: &'a str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct EndSessionRequest {
    session_id: ChatSessionId,
}

/// `POST /TherapyChat/StartSession`.
pub async fn start_session<T: Transport>(
    client: &ApiClient<T>,
    title: Option<&str>,
) -> Result<ChatSession, Error> {
    let request = ApiRequest::post("/TherapyChat/StartSession").json(&StartSessionRequest { title })?;
    client.call(request).await
}

/// `POST /TherapyChat/SendMessage`.
///
/// # Errors
///
/// A blank message is rejected locally as [`Error::Business`].
pub async fn send_message<T: Transport>(
    client: &ApiClient<T>,
    session_id: ChatSessionId,
    content: &str,
) -> Result<ChatExchange, Error> {
    let content = content.trim();
    if content.is_empty() {
        return Err(Error::Business {
            message: "message cannot be empty".into(),
        });
    }
    let request = ApiRequest::post("/TherapyChat/SendMessage")
        .json(&SendMessageRequest { session_id, content })?;
    client.call(request).await
}

/// `POST /TherapyChat/EndSession`. Returns the closed session.
pub async fn end_session<T: Transport>(
    client: &ApiClient<T>,
    session_id: ChatSessionId,
) -> Result<ChatSession, Error> {
    let request =
        ApiRequest::post("/TherapyChat/EndSession").json(&EndSessionRequest { session_id })?;
    client.call(request).await
}

/// `GET /TherapyChat/Sessions`.
pub async fn sessions<T: Transport>(client: &ApiClient<T>) -> Result<Vec<ChatSession>, Error> {
    let sessions: Option<Vec<ChatSession>> =
        client.call(ApiRequest::get("/TherapyChat/Sessions")).await?;
    Ok(sessions.unwrap_or_default())
}

/// `GET /TherapyChat/Sessions/{id}/Messages`, oldest first.
pub async fn history<T: Transport>(
    client: &ApiClient<T>,
    session_id: ChatSessionId,
) -> Result<Vec<ChatMessage>, Error> {
    let request = ApiRequest::get(format!("/TherapyChat/Sessions/{session_id}/Messages"));
    let mut messages: Vec<ChatMessage> = client
        .call::<Option<Vec<ChatMessage>>>(request)
        .await?
        .unwrap_or_default();
    messages.sort_by_key(|m| m.sent_at);
    Ok(messages)
}
