use crate::error::RelayError;
use crate::models::Notification;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Accepts Alertmanager-style webhook posts and forwards them onto the alert
/// channel. Malformed JSON is rejected by the extractor before it reaches us.
pub async fn run_server(
    addr: SocketAddr,
    cancel: CancellationToken,
    alerts: mpsc::Sender<Notification>,
) -> Result<(), RelayError> {
    let listener = TcpListener::bind(addr).await.map_err(RelayError::Bind)?;
    tracing::info!(%addr, "webhook listener started");
    serve(listener, cancel, alerts).await
}

async fn serve(
    listener: TcpListener,
    cancel: CancellationToken,
    alerts: mpsc::Sender<Notification>,
) -> Result<(), RelayError> {
    let app = Router::new()
        .route("/webhook", post(receive_webhook))
        .route("/healthz", get(|| async { "ok" }))
        .with_state(alerts);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { cancel.cancelled().await })
        .await
        .map_err(RelayError::Serve)
}

async fn receive_webhook(
    State(alerts): State<mpsc::Sender<Notification>>,
    Json(notification): Json<Notification>,
) -> StatusCode {
    match alerts.send(notification).await {
        Ok(()) => StatusCode::OK,
        Err(_) => {
            tracing::error!("alert channel closed, rejecting webhook");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
