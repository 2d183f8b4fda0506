use std::net::SocketAddr;
use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::get;
use axum::routing::post;
use axum::routing::put;
use serde::Serialize;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::config::HubSettings;
use crate::engine::Dialog;
use crate::engine::Engine;
use crate::engine::Intent;
use crate::hub::HubClient;

/// Response for the /v1/ping endpoint
#[derive(Serialize)]
struct PingResponse {
    status: String,
}

/// Response for the /v1/info endpoint
#[derive(Serialize)]
struct InfoResponse {
    version: String,
    hostname: String,
    configured: bool,
    hub_devices: usize,
}

#[derive(Serialize)]
struct IntentResponse {
    dialogs: Vec<Dialog>,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// Shared application state
struct AppState<C: HubClient> {
    version: &'static str,
    engine: Arc<Engine<C>>,
}

/// Handler for GET /v1/ping
#[tracing::instrument]
async fn ping() -> impl IntoResponse {
    tracing::debug!("Handling /v1/ping request");
    (
        StatusCode::OK,
        Json(PingResponse {
            status: "ok".to_string(),
        }),
    )
}

/// Handler for GET /v1/info
#[tracing::instrument(skip(state))]
async fn info<C: HubClient + 'static>(State(state): State<Arc<AppState<C>>>) -> impl IntoResponse {
    tracing::debug!("Handling /v1/info request");

    let hostname = hostname::get()
        .ok()
        .and_then(|h| h.into_string().ok())
        .unwrap_or_else(|| "unknown".to_string());

    (
        StatusCode::OK,
        Json(InfoResponse {
            version: state.version.to_string(),
            hostname,
            configured: state.engine.is_configured(),
            hub_devices: state.engine.catalog().hub_device_count(),
        }),
    )
}

/// Handler for POST /v1/intent
///
/// Always answers 200 with the dialogs to speak; failures are dialogs too.
#[tracing::instrument(skip(state))]
async fn intent<C: HubClient + 'static>(
    State(state): State<Arc<AppState<C>>>,
    Json(intent): Json<Intent>,
) -> impl IntoResponse {
    let dialogs = state.engine.handle_intent(intent).await;
    (StatusCode::OK, Json(IntentResponse { dialogs }))
}

/// Handler for PUT /v1/settings
#[tracing::instrument(skip_all)]
async fn settings<C: HubClient + 'static>(
    State(state): State<Arc<AppState<C>>>,
    Json(settings): Json<HubSettings>,
) -> Response {
    match state.engine.apply_config(&settings).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
            .into_response(),
    }
}

/// Create the API router with all endpoints
fn create_router<C: HubClient + 'static>(state: Arc<AppState<C>>) -> Router {
    Router::new()
        .route("/v1/ping", get(ping))
        .route("/v1/info", get(info::<C>))
        .route("/v1/intent", post(intent::<C>))
        .route("/v1/settings", put(settings::<C>))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP API server
///
/// Binds to `listen:port` and serves until `shutdown_rx` fires.
pub async fn serve<C: HubClient + 'static>(
    listen: String,
    port: u16,
    engine: Arc<Engine<C>>,
    shutdown_rx: tokio::sync::oneshot::Receiver<()>,
) -> Result<(), Box<dyn std::error::Error>> {
    let version = env!("CARGO_PKG_VERSION");

    let state = Arc::new(AppState { version, engine });
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", listen, port).parse()?;
    tracing::info!("Starting HTTP API server on {}", addr);

    let listener = TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            shutdown_rx.await.ok();
            tracing::info!("HTTP API server shutting down gracefully");
        })
        .await?;

    Ok(())
}
