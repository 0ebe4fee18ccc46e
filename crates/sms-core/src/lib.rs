//! # SMS Core
//!
//! Core types for the SMS gateway webhook adapter.
//!
//! This crate is framework-free and provides the building blocks the adapters share:
//! - [`Payload`], [`WebhookRequest`] and [`WebhookResponse`] for the HTTP exchange
//! - [`Authenticator`] and the [`SecretValidator`] trait for the shared-secret gate
//! - [`AutoReply`] and the [`AutoReplyHandler`] trait for the incoming-message reply path
//! - [`EventEmitter`] for republishing provider callbacks as named in-process events
//!
//! ## Example
//!
//! ```rust,ignore
//! use sms_core::{EventEmitter, Payload};
//!
//! let events = EventEmitter::new();
//! events.on("delivered", |payload: &Payload| {
//!     println!("delivered: {:?}", payload.get("id"));
//!     Ok(())
//! });
//! ```

mod auth;
mod error;
mod events;
mod http;
mod payload;
mod reply;

pub use auth::{Authenticator, CompositeSecretValidator, SecretValidator, Verdict};
pub use error::{ConfigError, ListenerError, WebhookError};
pub use events::{EventEmitter, ListenerId};
pub use http::{Headers, HttpStatus, WebhookRequest, WebhookResponse};
pub use payload::Payload;
pub use reply::{AutoReply, AutoReplyHandler, ReplyMessage, StaticReply};

/// Version marker exposed by every adapter built from this crate.
pub const CLIENT_VERSION: &str = "1.1.0";

/// Default sentinel event that triggers the auto-reply path.
pub const EVENT_INCOMING_MESSAGE: &str = "incoming_message";

/// Body field naming the event to emit.
pub const FIELD_EVENT: &str = "event";

/// Body field carrying the shared webhook secret.
pub const FIELD_SECRET: &str = "secret";

/// Body field the composite validator stores the message identifier under.
pub const FIELD_MESSAGE_ID: &str = "__id";

pub const CONTENT_TYPE_JSON: &str = "application/json";
pub const CONTENT_TYPE_FORM: &str = "application/x-www-form-urlencoded";
