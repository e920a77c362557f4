//! HTTP surface for the prompt handler.

use crate::handler::{Outcome, PromptHandler};
use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::State;
use axum::http::{header, HeaderValue, Method};
use axum::routing::any;
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, info_span, Instrument};
use uuid::Uuid;

pub const ROUTE: &str = "/api/generate-prompt";

/// Router exposing the handler on [`ROUTE`] for every method.
///
/// The CORS headers are fixed and attached to every response, including the
/// pre-flight acknowledgment.
pub fn router(handler: Arc<PromptHandler>) -> Router {
    Router::new()
        .route(ROUTE, any(generate_prompt))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("POST, OPTIONS"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("Content-Type"),
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(handler)
}

async fn generate_prompt(
    State(handler): State<Arc<PromptHandler>>,
    method: Method,
    body: Result<Bytes, BytesRejection>,
) -> Outcome {
    let span = info_span!("prompt_request", request_id = %Uuid::new_v4(), method = %method);

    async move {
        match body {
            Ok(body) => handler.handle(&method, &body).await,
            // Oversized or unreadable bodies still answer with a JSON prompt.
            Err(rejection) => {
                error!("Failed to read request body: {}", rejection);
                Outcome::Internal(format!("Internal Server Error. Details: {}", rejection))
            }
        }
    }
    .instrument(span)
    .await
}

/// Serve until Ctrl-C.
pub async fn serve(listener: TcpListener, handler: Arc<PromptHandler>) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!("Listening on http://{}{}", addr, ROUTE);
    }

    axum::serve(listener, router(handler))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
