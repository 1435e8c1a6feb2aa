//! HTTP and WebSocket surface of the relay.
//!
//! Routes:
//! - `GET /ws` upgrades to the relay WebSocket
//! - `/health` returns the fixed readiness body for any method
//! - anything else, including non-upgrade requests to `/ws`, is `404` with an empty body

use axum::{
    extract::ws::{Message, WebSocket, WebSocketUpgrade},
    extract::State,
    http::{HeaderValue, Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::any,
    Router,
};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tower_http::cors::{AllowOrigin, CorsLayer};

use api_shared::{ClientEvent, HealthRes, HealthService, ServerEvent};
use intake_core::constants::SOCKET_PATH;
use intake_core::{CorsOrigins, RelayConfig};

use crate::hub::{spawn_hub, ConnectionId, HubHandle, RelayHub};
use crate::RelayError;

/// State shared by the relay's handlers.
#[derive(Clone)]
struct AppState {
    hub: HubHandle,
}

/// Builds the relay router around a running hub.
pub fn router(hub: HubHandle, cors_origins: &CorsOrigins) -> Router {
    Router::new()
        .route("/health", any(health))
        .route(SOCKET_PATH, any(ws_upgrade))
        .fallback(not_found)
        .layer(cors_layer(cors_origins))
        .with_state(AppState { hub })
}

/// Runs the relay until the listener fails.
///
/// # Errors
///
/// Returns [`RelayError`] if the empty snapshot cannot be created, the address cannot be bound
/// or the server stops with an I/O error.
pub async fn serve(cfg: RelayConfig) -> Result<(), RelayError> {
    let listener = TcpListener::bind(cfg.bind_addr())
        .await
        .map_err(RelayError::Bind)?;
    serve_on(listener, &cfg).await
}

/// Runs the relay on an already bound listener.
pub async fn serve_on(listener: TcpListener, cfg: &RelayConfig) -> Result<(), RelayError> {
    let hub = spawn_hub(RelayHub::new()?);
    let app = router(hub, cfg.cors_origins());

    match listener.local_addr() {
        Ok(addr) => tracing::info!("++ Relay listening on {} (ws path {})", addr, SOCKET_PATH),
        Err(e) => tracing::warn!("relay listening on unknown address: {e}"),
    }

    axum::serve(listener, app).await.map_err(RelayError::Serve)
}

fn cors_layer(origins: &CorsOrigins) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods([Method::GET, Method::POST]);
    match origins {
        CorsOrigins::Any => layer.allow_origin(AllowOrigin::any()),
        CorsOrigins::List(list) => {
            let values: Vec<HeaderValue> = list
                .iter()
                .filter_map(|origin| match HeaderValue::from_str(origin) {
                    Ok(value) => Some(value),
                    Err(_) => {
                        tracing::warn!(origin = %origin, "ignoring invalid CORS origin");
                        None
                    }
                })
                .collect();
            layer.allow_origin(AllowOrigin::list(values))
        }
    }
}

/// Readiness check, unrelated to the relay protocol.
async fn health() -> Json<HealthRes> {
    Json(HealthService::check_health())
}

async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}

/// Upgrades WebSocket handshakes. Any other request to the socket path is a plain 404.
async fn ws_upgrade(ws: Option<WebSocketUpgrade>, State(state): State<AppState>) -> Response {
    match ws {
        Some(ws) => ws
            .on_upgrade(move |socket| handle_socket(socket, state.hub))
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Drives one WebSocket connection.
///
/// A writer task drains the connection's outbound queue into the socket while this task reads
/// frames and forwards updates to the hub. When the peer goes away the hub is told, which
/// forces the stored snapshot inactive for everyone else.
async fn handle_socket(socket: WebSocket, hub: HubHandle) {
    let id = ConnectionId::new();
    let (mut sink, mut stream) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerEvent>();

    if hub.connect(id, tx).is_err() {
        tracing::error!(connection = %id, "relay hub unavailable; dropping connection");
        return;
    }
    tracing::info!(connection = %id, "connection opened");

    let writer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let text = match event.encode() {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!("failed to encode outbound event: {e}");
                    continue;
                }
            };
            if sink.send(Message::Text(text)).await.is_err() {
                break;
            }
        }
        let _ = sink.close().await;
    });

    while let Some(frame) = stream.next().await {
        let message = match frame {
            Ok(message) => message,
            Err(e) => {
                tracing::debug!(connection = %id, "socket error: {e}");
                break;
            }
        };

        match message {
            Message::Text(text) => match ClientEvent::decode(&text) {
                Ok(ClientEvent::PatientUpdate(payload)) => {
                    if hub.update(id, payload).is_err() {
                        break;
                    }
                }
                Err(e) => tracing::debug!(connection = %id, "ignoring frame: {e}"),
            },
            Message::Close(_) => break,
            // Pings are answered by axum; binary frames are not part of the protocol.
            _ => {}
        }
    }

    if hub.disconnect(id).is_err() {
        tracing::error!(connection = %id, "relay hub unavailable during disconnect");
    }
    writer.abort();
    tracing::info!(connection = %id, "connection closed");
}
