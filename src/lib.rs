//! # SMS Webhook
//!
//! Receives an SMS gateway's webhook callbacks (incoming messages and delivery-status
//! notifications) and republishes them as named in-process events.
//!
//! ## Features
//!
//! - **Single endpoint**: `POST /` accepting `application/x-www-form-urlencoded` callbacks
//! - **Secret gate**: static shared secret or a custom validator
//! - **Event source**: listeners per event name, failures isolated from the HTTP response
//! - **Auto-reply**: optional handler that answers incoming messages directly
//! - **Configuration**: layered files plus environment variables
//! - **Observability**: structured logging through `tracing`
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use sms_webhook::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let app = WebhookApp::builder().webhook_secret("shh").build()?;
//!
//!     app.on("delivered", |payload: &Payload| {
//!         println!("delivered: {:?}", payload.get("id"));
//!         Ok(())
//!     });
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//!     axum::serve(listener, app.router()).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration
//!
//! ```rust,ignore
//! use sms_webhook::config::AppConfig;
//!
//! let config = AppConfig::load()?;
//! let app = sms_webhook::server::build_app(&config)?;
//! ```

pub mod config;
pub mod logging;
pub mod server;

pub use crate::config::{
    AppConfig, LoggingConfig, SecretMode, SecurityConfig, ServerConfig, WebhookSettings,
};

/// Common imports for webhook receivers
pub mod prelude {
    pub use crate::config::{
        AppConfig, LoggingConfig, SecretMode, SecurityConfig, ServerConfig, WebhookSettings,
    };
    pub use crate::server::{build_app, serve, shutdown_signal, ServeError};
    pub use sms_core::*;
    pub use sms_web_axum::{WebhookApp, WebhookAppBuilder};
    pub use sms_web_generic::WebhookProcessor;
}
