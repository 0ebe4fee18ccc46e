//! Axum adapter: one `POST /` route feeding a [`WebhookProcessor`].
//!
//! ```rust,ignore
//! let app = WebhookApp::builder().webhook_secret("shh").build()?;
//! app.on("delivered", |payload| { println!("{:?}", payload.get("id")); Ok(()) });
//! axum::serve(listener, app.router()).await?;
//! ```

use std::time::Duration;

use axum::{
    body::Body,
    extract::{DefaultBodyLimit, State},
    http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::Response,
    routing::post,
    Router,
};
use bytes::Bytes;
use sms_core::{
    AutoReply, AutoReplyHandler, Authenticator, ConfigError, EventEmitter, Headers, ListenerError,
    ListenerId, Payload, SecretValidator, WebhookResponse,
};
use sms_web_generic::{
    HeaderConverter, ResponseConverter, WebhookProcessor, WebhookProcessorBuilder,
};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

/// Default request body limit (1MB).
pub const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

/// Default time a request may take before it is answered with 408.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct AppState {
    pub processor: WebhookProcessor,
}

/// Axum-specific header converter
pub struct AxumHeaderConverter;

impl HeaderConverter for AxumHeaderConverter {
    type HeaderType = HeaderMap;

    fn to_generic_headers(headers: &Self::HeaderType) -> Headers {
        headers
            .iter()
            .map(|(k, v)| {
                (
                    k.as_str().to_string(),
                    v.to_str().unwrap_or_default().to_string(),
                )
            })
            .collect()
    }
}

/// Axum-specific response converter
pub struct AxumResponseConverter;

impl ResponseConverter for AxumResponseConverter {
    type ResponseType = Response;

    fn from_webhook_response(response: WebhookResponse) -> Self::ResponseType {
        let status = StatusCode::from_u16(response.status.as_u16())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        // No content type unless the processor (or auto-reply) asked for one.
        let mut res = Response::new(Body::from(response.body));
        *res.status_mut() = status;
        if let Some(content_type) = response
            .content_type
            .and_then(|ct| HeaderValue::from_str(&ct).ok())
        {
            res.headers_mut().insert(header::CONTENT_TYPE, content_type);
        }
        for (name, value) in response.headers {
            match (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(&value),
            ) {
                (Ok(name), Ok(value)) => {
                    res.headers_mut().append(name, value);
                }
                _ => tracing::warn!(header = %name, "dropping invalid response header"),
            }
        }
        res
    }
}

/// Handler: POST /
pub async fn receive_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let generic_headers = AxumHeaderConverter::to_generic_headers(&headers);
    let response = state.processor.process_webhook(generic_headers, &body).await;
    AxumResponseConverter::from_webhook_response(response)
}

/// A built webhook receiver: the processor, its event source and the version marker.
#[derive(Clone, Debug)]
pub struct WebhookApp {
    processor: WebhookProcessor,
    body_limit: usize,
    request_timeout: Duration,
}

impl WebhookApp {
    pub fn builder() -> WebhookAppBuilder {
        WebhookAppBuilder::default()
    }

    pub fn from_processor(processor: WebhookProcessor) -> Self {
        Self {
            processor,
            body_limit: DEFAULT_BODY_LIMIT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Static version marker, for diagnostics.
    pub fn version(&self) -> &'static str {
        self.processor.version()
    }

    pub fn events(&self) -> &EventEmitter {
        self.processor.events()
    }

    /// Shorthand for `events().on(..)`.
    pub fn on<F>(&self, event: impl Into<String>, listener: F) -> ListenerId
    where
        F: Fn(&Payload) -> Result<(), ListenerError> + Send + Sync + 'static,
    {
        self.processor.events().on(event, listener)
    }

    pub fn processor(&self) -> &WebhookProcessor {
        &self.processor
    }

    pub fn body_limit(&self) -> usize {
        self.body_limit
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Router exposing exactly one route, `POST /`.
    pub fn router(&self) -> Router {
        let state = AppState {
            processor: self.processor.clone(),
        };

        Router::new()
            .route("/", post(receive_webhook))
            .layer(DefaultBodyLimit::max(self.body_limit))
            .layer(TimeoutLayer::new(self.request_timeout))
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }
}

#[derive(Default)]
pub struct WebhookAppBuilder {
    processor: WebhookProcessorBuilder,
    body_limit: Option<usize>,
    request_timeout: Option<Duration>,
}

impl WebhookAppBuilder {
    pub fn webhook_secret(mut self, secret: impl Into<Authenticator>) -> Self {
        self.processor = self.processor.webhook_secret(secret);
        self
    }

    pub fn secret_validator<V: SecretValidator + 'static>(mut self, validator: V) -> Self {
        self.processor = self.processor.secret_validator(validator);
        self
    }

    pub fn auto_reply(mut self, auto_reply: impl Into<AutoReply>) -> Self {
        self.processor = self.processor.auto_reply(auto_reply);
        self
    }

    pub fn auto_reply_handler<H: AutoReplyHandler + 'static>(mut self, handler: H) -> Self {
        self.processor = self.processor.auto_reply_handler(handler);
        self
    }

    pub fn incoming_event(mut self, event: impl Into<String>) -> Self {
        self.processor = self.processor.incoming_event(event);
        self
    }

    pub fn body_limit(mut self, bytes: usize) -> Self {
        self.body_limit = Some(bytes);
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Result<WebhookApp, ConfigError> {
        let processor = self.processor.build()?;
        Ok(WebhookApp {
            processor,
            body_limit: self.body_limit.unwrap_or(DEFAULT_BODY_LIMIT),
            request_timeout: self.request_timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT),
        })
    }
}
