use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{ConfigError, HttpStatus, WebhookRequest, WebhookResponse};

/// Produces the whole HTTP response for an incoming-message callback.
#[async_trait]
pub trait AutoReplyHandler: Send + Sync {
    async fn reply(&self, request: &WebhookRequest) -> WebhookResponse;
}

#[async_trait]
impl<F> AutoReplyHandler for F
where
    F: Fn(&WebhookRequest) -> WebhookResponse + Send + Sync,
{
    async fn reply(&self, request: &WebhookRequest) -> WebhookResponse {
        self(request)
    }
}

/// One outbound message in a webhook reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyMessage {
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_secret: Option<String>,
}

impl ReplyMessage {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            to_number: None,
            message_type: None,
            status_url: None,
            status_secret: None,
        }
    }
}

/// Fixed reply loaded from configuration, answered as `{"messages": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticReply {
    #[serde(default)]
    pub messages: Vec<ReplyMessage>,
}

impl StaticReply {
    pub fn new(messages: Vec<ReplyMessage>) -> Self {
        Self { messages }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.messages.is_empty() {
            return Err(ConfigError::InvalidAutoReply(
                "static reply has no messages".into(),
            ));
        }
        if let Some(pos) = self.messages.iter().position(|m| m.content.trim().is_empty()) {
            return Err(ConfigError::InvalidAutoReply(format!(
                "message {} has empty content",
                pos
            )));
        }
        Ok(())
    }
}

/// The response path taken for the incoming-message sentinel event.
#[derive(Clone)]
pub enum AutoReply {
    Handler(Arc<dyn AutoReplyHandler>),
    Static(StaticReply),
}

impl AutoReply {
    pub fn handler<H: AutoReplyHandler + 'static>(handler: H) -> Self {
        Self::Handler(Arc::new(handler))
    }

    /// Check that this auto-reply can actually produce a response.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self {
            Self::Handler(_) => Ok(()),
            Self::Static(reply) => reply.validate(),
        }
    }

    pub async fn reply(&self, request: &WebhookRequest) -> WebhookResponse {
        match self {
            Self::Handler(handler) => handler.reply(request).await,
            Self::Static(reply) => WebhookResponse::json(HttpStatus::Ok, reply),
        }
    }
}

impl fmt::Debug for AutoReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Handler(_) => f.write_str("Handler(..)"),
            Self::Static(reply) => f.debug_tuple("Static").field(reply).finish(),
        }
    }
}

impl From<StaticReply> for AutoReply {
    fn from(reply: StaticReply) -> Self {
        Self::Static(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Payload;

    fn incoming() -> WebhookRequest {
        WebhookRequest::new(
            vec![],
            Payload::from([("event", "incoming_message"), ("content", "hi")]),
        )
    }

    #[tokio::test]
    async fn static_reply_answers_messages_json() {
        let reply = AutoReply::from(StaticReply::new(vec![ReplyMessage::text("Thanks!")]));
        let response = reply.reply(&incoming()).await;

        assert_eq!(response.status, HttpStatus::Ok);
        assert_eq!(response.content_type.as_deref(), Some("application/json"));
        let json: serde_json::Value = serde_json::from_str(&response.body).unwrap();
        assert_eq!(json, serde_json::json!({ "messages": [{ "content": "Thanks!" }] }));
    }

    #[tokio::test]
    async fn closure_handler_sees_request() {
        let reply = AutoReply::handler(|req: &WebhookRequest| {
            let echo = req.payload.get("content").unwrap_or_default().to_string();
            WebhookResponse::json(HttpStatus::Ok, &serde_json::json!({ "echo": echo }))
        });
        let response = reply.reply(&incoming()).await;
        assert_eq!(response.body, r#"{"echo":"hi"}"#);
    }

    #[test]
    fn empty_static_reply_is_invalid() {
        let err = AutoReply::from(StaticReply::default()).validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidAutoReply(_)));
        assert!(err.to_string().to_lowercase().contains("autoreply"));
    }

    #[test]
    fn blank_message_content_is_invalid() {
        let reply = StaticReply::new(vec![ReplyMessage::text("ok"), ReplyMessage::text("  ")]);
        assert_eq!(
            reply.validate(),
            Err(ConfigError::InvalidAutoReply("message 1 has empty content".into()))
        );
    }

    #[test]
    fn deserializes_from_config_shape() {
        let reply: StaticReply = serde_json::from_value(serde_json::json!({
            "messages": [{ "content": "Got it", "to_number": "+15005550015" }]
        }))
        .unwrap();
        assert!(reply.validate().is_ok());
        assert_eq!(reply.messages[0].to_number.as_deref(), Some("+15005550015"));
    }
}
