//! WebSocket upgrade handler.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use tracing::{info, warn};

use tasklane_entity::user::UserSnapshot;
use tasklane_realtime::connection::authenticator::AuthenticatedConnection;
use tasklane_realtime::connection::heartbeat;

use crate::error::ApiError;
use crate::state::AppState;

/// Query parameter for WebSocket authentication.
#[derive(Debug, serde::Deserialize)]
pub struct WsQuery {
    /// JWT bearer token.
    pub token: String,
}

/// GET /ws?token={jwt} — WebSocket upgrade.
pub async fn ws_upgrade(
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
    Query(query): Query<WsQuery>,
) -> Result<Response, ApiError> {
    // Authenticate before upgrading.
    let auth = state.realtime.authenticator.authenticate(&query.token)?;

    Ok(ws.on_upgrade(move |socket| handle_connection(state, auth, socket)))
}

/// Drives an established WebSocket connection to completion.
async fn handle_connection(state: AppState, auth: AuthenticatedConnection, socket: WebSocket) {
    let (mut ws_tx, mut ws_rx) = socket.split();

    let user = match load_snapshot(&state, &auth).await {
        Some(user) => user,
        None => {
            warn!(user_id = %auth.user_id, "WebSocket user no longer exists");
            return;
        }
    };

    let (handle, mut outbound_rx) = state.realtime.connections.register(user);
    let conn_id = handle.id;

    state
        .presence_service
        .socket_connected(auth.user_id, conn_id)
        .await;

    // Outbound forwarder: registry → socket.
    let outbound_task = tokio::spawn(async move {
        while let Some(msg) = outbound_rx.recv().await {
            if ws_tx.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    });

    // Keepalive loop.
    let heartbeat_task = tokio::spawn(heartbeat::run_heartbeat(
        Arc::clone(&handle),
        state.realtime.heartbeat.clone(),
    ));

    // Inbound loop.
    while let Some(result) = ws_rx.next().await {
        match result {
            Ok(Message::Text(text)) => {
                state
                    .realtime
                    .connections
                    .handle_inbound(&conn_id, text.as_str())
                    .await;
            }
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                warn!(conn_id = %conn_id, error = %e, "WebSocket error");
                break;
            }
        }

        if !handle.is_alive() {
            break;
        }
    }

    outbound_task.abort();
    heartbeat_task.abort();
    state.realtime.connections.unregister(&conn_id);
    state
        .presence_service
        .socket_disconnected(auth.user_id, conn_id)
        .await;

    info!(conn_id = %conn_id, user_id = %auth.user_id, "WebSocket connection closed");
}

/// Loads a fresh user snapshot for a newly authenticated socket.
async fn load_snapshot(state: &AppState, auth: &AuthenticatedConnection) -> Option<UserSnapshot> {
    use tasklane_service::RequestContext;

    let ctx = RequestContext::new(auth.user_id, auth.username.clone());
    match state.user_service.get_profile(&ctx).await {
        Ok(user) => Some(UserSnapshot::from(&user)),
        Err(_) => None,
    }
}
