//! Composite secrets plus a programmatic auto-reply.
//!
//! Status callbacks arrive with `secret=<secret>:<message id>`; the id is exposed
//! to listeners as `__id`. Incoming messages are answered with an echo.

use sms_webhook::prelude::*;
use tracing::info;

const INCOMING: &str = "telerivet::incoming_message";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    sms_webhook::logging::init(&LoggingConfig {
        level: "debug".into(),
        format: "pretty".into(),
    })?;

    let app = WebhookApp::builder()
        .secret_validator(CompositeSecretValidator::new("shh").with_incoming_event(INCOMING))
        .incoming_event(INCOMING)
        .auto_reply_handler(|req: &WebhookRequest| {
            let text = req.payload.get("content").unwrap_or_default();
            WebhookResponse::json(
                HttpStatus::Ok,
                &StaticReply::new(vec![ReplyMessage::text(format!("You said: {}", text))]),
            )
        })
        .build()?;

    app.on(INCOMING, |payload: &Payload| {
        info!(from = ?payload.get("from_number"), "incoming message");
        Ok(())
    });
    for status in ["telerivet::sent", "telerivet::delivered", "telerivet::failed"] {
        app.on(status, move |payload: &Payload| {
            info!(status = %status, id = ?payload.get("__id"), "status notification");
            Ok(())
        });
    }

    let server = ServerConfig {
        host: "127.0.0.1".into(),
        port: 3000,
    };
    serve(&app, &server, shutdown_signal()).await?;
    Ok(())
}
