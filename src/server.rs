use std::future::Future;
use std::time::Duration;

use sms_core::ConfigError;
use sms_web_axum::WebhookApp;
use tokio::net::TcpListener;
use tracing::info;

use crate::config::{AppConfig, ServerConfig};

#[derive(Debug, thiserror::Error)]
pub enum ServeError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("failed to bind {0}: {1}")]
    Bind(String, std::io::Error),
    #[error("server error: {0}")]
    Server(std::io::Error),
}

/// Build the webhook app described by `config`.
pub fn build_app(config: &AppConfig) -> Result<WebhookApp, ConfigError> {
    config
        .webhook
        .to_builder()
        .body_limit(config.security.max_body_size)
        .request_timeout(Duration::from_secs(config.security.request_timeout))
        .build()
}

/// Serve `app` until `shutdown` resolves.
pub async fn serve<F>(app: &WebhookApp, server: &ServerConfig, shutdown: F) -> Result<(), ServeError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = format!("{}:{}", server.host, server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| ServeError::Bind(addr.clone(), e))?;
    info!(%addr, version = app.version(), "webhook receiver listening");

    axum::serve(listener, app.router())
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(ServeError::Server)?;

    info!("webhook receiver stopped");
    Ok(())
}

/// Resolves on Ctrl-C.
pub async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
