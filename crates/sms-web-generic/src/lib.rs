//! Framework-agnostic handling of SMS gateway webhook callbacks.
//!
//! [`WebhookProcessor`] owns the whole request flow: decode the form body, check the
//! secret, republish the payload on its [`EventEmitter`], then either hand the response
//! to the auto-reply or acknowledge with an empty JSON 200. Framework adapters only
//! translate headers, bodies and responses.

use std::sync::Arc;

use sms_core::{
    AutoReply, AutoReplyHandler, Authenticator, ConfigError, EventEmitter, Headers, HttpStatus,
    Payload, SecretValidator, Verdict, WebhookError, WebhookRequest, WebhookResponse,
    CLIENT_VERSION, CONTENT_TYPE_FORM, EVENT_INCOMING_MESSAGE,
};
use tracing::{debug, info_span, warn, Instrument};

/// Framework-agnostic webhook processor that handles the core callback logic
#[derive(Clone, Debug)]
pub struct WebhookProcessor {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    authenticator: Authenticator,
    auto_reply: Option<AutoReply>,
    incoming_event: String,
    events: EventEmitter,
}

impl WebhookProcessor {
    pub fn builder() -> WebhookProcessorBuilder {
        WebhookProcessorBuilder::default()
    }

    /// Event source the processor publishes callbacks on.
    pub fn events(&self) -> &EventEmitter {
        &self.inner.events
    }

    pub fn incoming_event(&self) -> &str {
        &self.inner.incoming_event
    }

    pub fn has_auto_reply(&self) -> bool {
        self.inner.auto_reply.is_some()
    }

    pub fn version(&self) -> &'static str {
        CLIENT_VERSION
    }

    /// Process a raw form-encoded callback and return a framework-agnostic response
    pub async fn process_webhook(&self, headers: Headers, body: &[u8]) -> WebhookResponse {
        match decode_body(&headers, body) {
            Ok(payload) => {
                self.process_request(WebhookRequest::new(headers, payload))
                    .await
            }
            Err(e) => self.error_to_response(e),
        }
    }

    /// Process an already decoded callback.
    pub async fn process_request(&self, request: WebhookRequest) -> WebhookResponse {
        let span = info_span!("webhook", request_id = %request.id);
        self.handle(request).instrument(span).await
    }

    async fn handle(&self, mut request: WebhookRequest) -> WebhookResponse {
        if let Verdict::Reject(response) = self.inner.authenticator.authenticate(&mut request) {
            debug!(status = response.status.as_u16(), "webhook secret rejected");
            return response;
        }

        let event = request.payload.event().map(str::to_owned);
        match event.as_deref() {
            Some(event) => {
                let listeners = self.inner.events.emit(event, &request.payload);
                debug!(event = %event, listeners = listeners, "webhook event published");
            }
            None => warn!("webhook payload has no event field, nothing published"),
        }

        match &self.inner.auto_reply {
            Some(auto_reply) if event.as_deref() == Some(self.inner.incoming_event.as_str()) => {
                debug!("handing response to auto-reply");
                auto_reply.reply(&request).await
            }
            _ => WebhookResponse::acknowledged(),
        }
    }

    fn error_to_response(&self, error: WebhookError) -> WebhookResponse {
        match error {
            WebhookError::ParseError(msg) => {
                debug!(error = %msg, "undecodable webhook body");
                WebhookResponse::error(HttpStatus::BadRequest, &format!("parse error: {}", msg))
            }
        }
    }
}

/// Only form bodies are decoded. Anything else, including a body without a
/// content type, yields an empty payload.
fn decode_body(headers: &Headers, body: &[u8]) -> Result<Payload, WebhookError> {
    let is_form = headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case("content-type"))
        .is_some_and(|(_, v)| {
            v.split(';')
                .next()
                .is_some_and(|mime| mime.trim().eq_ignore_ascii_case(CONTENT_TYPE_FORM))
        });

    if is_form {
        Payload::from_form(body)
    } else {
        Ok(Payload::new())
    }
}

/// Builder enforcing the construction checks: a secret is mandatory and an
/// auto-reply, when given, must be able to answer.
#[derive(Default)]
pub struct WebhookProcessorBuilder {
    secret: Option<Authenticator>,
    auto_reply: Option<AutoReply>,
    incoming_event: Option<String>,
}

impl WebhookProcessorBuilder {
    /// Static secret or a ready-made [`Authenticator`].
    pub fn webhook_secret(mut self, secret: impl Into<Authenticator>) -> Self {
        self.secret = Some(secret.into());
        self
    }

    pub fn secret_validator<V: SecretValidator + 'static>(mut self, validator: V) -> Self {
        self.secret = Some(Authenticator::validator(validator));
        self
    }

    pub fn auto_reply(mut self, auto_reply: impl Into<AutoReply>) -> Self {
        self.auto_reply = Some(auto_reply.into());
        self
    }

    pub fn auto_reply_handler<H: AutoReplyHandler + 'static>(mut self, handler: H) -> Self {
        self.auto_reply = Some(AutoReply::handler(handler));
        self
    }

    /// Override the sentinel event that triggers the auto-reply.
    pub fn incoming_event(mut self, event: impl Into<String>) -> Self {
        self.incoming_event = Some(event.into());
        self
    }

    pub fn build(self) -> Result<WebhookProcessor, ConfigError> {
        let authenticator = self
            .secret
            .filter(Authenticator::is_configured)
            .ok_or(ConfigError::MissingSecret)?;

        if let Some(auto_reply) = &self.auto_reply {
            auto_reply.validate()?;
        }

        let incoming_event = self
            .incoming_event
            .unwrap_or_else(|| EVENT_INCOMING_MESSAGE.to_string());
        if incoming_event.is_empty() {
            return Err(ConfigError::InvalidIncomingEvent);
        }

        Ok(WebhookProcessor {
            inner: Arc::new(Inner {
                authenticator,
                auto_reply: self.auto_reply,
                incoming_event,
                events: EventEmitter::new(),
            }),
        })
    }
}

/// Helper trait for framework adapters to convert headers
pub trait HeaderConverter {
    type HeaderType;

    fn to_generic_headers(headers: &Self::HeaderType) -> Headers;
}

/// Helper trait for framework adapters to convert responses
pub trait ResponseConverter {
    type ResponseType;

    fn from_webhook_response(response: WebhookResponse) -> Self::ResponseType;
}
