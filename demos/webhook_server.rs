//! Run the webhook receiver from configuration.
//!
//! ```text
//! SMSWEBHOOK__WEBHOOK__SECRET=shh cargo run --example webhook_server
//! curl -X POST http://127.0.0.1:3000/ -d 'secret=shh&event=delivered&id=abc'
//! ```

use sms_webhook::prelude::*;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = AppConfig::load()?;
    sms_webhook::logging::init(&config.logging)?;

    let app = build_app(&config)?;
    app.events().on_any(|event: &str, payload: &Payload| {
        info!(event = %event, fields = payload.len(), "callback received");
        Ok(())
    });

    serve(&app, &config.server, shutdown_signal()).await?;
    Ok(())
}
