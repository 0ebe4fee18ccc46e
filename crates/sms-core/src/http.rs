use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{Payload, CONTENT_TYPE_JSON};

/// Lightweight header representation to avoid tying the core to any HTTP framework.
pub type Headers = Vec<(String, String)>;

/// HTTP status code for web responses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpStatus {
    Ok,
    Created,
    Accepted,
    NoContent,
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    PayloadTooLarge,
    UnsupportedMediaType,
    TooManyRequests,
    InternalServerError,
    /// Any other code a validator or auto-reply wants to send.
    Other(u16),
}

impl HttpStatus {
    pub fn as_u16(self) -> u16 {
        match self {
            Self::Ok => 200,
            Self::Created => 201,
            Self::Accepted => 202,
            Self::NoContent => 204,
            Self::BadRequest => 400,
            Self::Unauthorized => 401,
            Self::Forbidden => 403,
            Self::NotFound => 404,
            Self::PayloadTooLarge => 413,
            Self::UnsupportedMediaType => 415,
            Self::TooManyRequests => 429,
            Self::InternalServerError => 500,
            Self::Other(code) => code,
        }
    }

    /// Named variant when one exists, `Other` otherwise.
    pub fn from_u16(code: u16) -> Self {
        match code {
            200 => Self::Ok,
            201 => Self::Created,
            202 => Self::Accepted,
            204 => Self::NoContent,
            400 => Self::BadRequest,
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            413 => Self::PayloadTooLarge,
            415 => Self::UnsupportedMediaType,
            429 => Self::TooManyRequests,
            500 => Self::InternalServerError,
            other => Self::Other(other),
        }
    }
}

impl From<u16> for HttpStatus {
    fn from(code: u16) -> Self {
        Self::from_u16(code)
    }
}

/// A decoded provider callback as seen by validators and auto-reply handlers.
#[derive(Debug, Clone)]
pub struct WebhookRequest {
    /// Identifier used to correlate log lines for this request.
    pub id: Uuid,
    pub received_at: OffsetDateTime,
    pub headers: Headers,
    pub payload: Payload,
}

impl WebhookRequest {
    pub fn new(headers: Headers, payload: Payload) -> Self {
        Self {
            id: Uuid::new_v4(),
            received_at: OffsetDateTime::now_utc(),
            headers,
            payload,
        }
    }

    /// Case-insensitive header lookup, first match wins.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Generic webhook response that can be converted to any framework's response type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookResponse {
    pub status: HttpStatus,
    pub body: String,
    pub content_type: Option<String>,
    /// Extra response headers, sent as given.
    pub headers: Headers,
}

impl WebhookResponse {
    /// Default acknowledgement: 200, JSON content type, empty body.
    pub fn acknowledged() -> Self {
        Self {
            status: HttpStatus::Ok,
            body: String::new(),
            content_type: Some(CONTENT_TYPE_JSON.to_string()),
            headers: Headers::new(),
        }
    }

    /// Rejection for a failed secret check: 403 with an empty body.
    pub fn forbidden() -> Self {
        Self::empty(HttpStatus::Forbidden)
    }

    pub fn empty(status: HttpStatus) -> Self {
        Self {
            status,
            body: String::new(),
            content_type: None,
            headers: Headers::new(),
        }
    }

    pub fn json<T: Serialize>(status: HttpStatus, value: &T) -> Self {
        match serde_json::to_string(value) {
            Ok(body) => Self {
                status,
                body,
                content_type: Some(CONTENT_TYPE_JSON.to_string()),
                headers: Headers::new(),
            },
            Err(e) => Self::error(HttpStatus::InternalServerError, &e.to_string()),
        }
    }

    pub fn error(status: HttpStatus, message: &str) -> Self {
        Self {
            status,
            body: serde_json::json!({ "error": message }).to_string(),
            content_type: Some(CONTENT_TYPE_JSON.to_string()),
            headers: Headers::new(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}
