//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    extract::{
        Query, State,
        ws::{WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;

use crate::{
    domain::{AccessError, Connection, RoomId, UserId},
    hub::{Client, spawn_pumps},
    infrastructure::connection::WebSocketConnection,
    ui::state::AppState,
};

/// Query parameters for WebSocket connection
#[derive(Debug, Deserialize)]
pub struct ConnectQuery {
    pub user_id: String,
    /// 省略時・空文字は "general"
    pub room: Option<String>,
}

/// Validate the caller and room, then upgrade to a WebSocket.
///
/// - 不正な user_id → 400
/// - 形式の崩れたプライベートルーム → 400
/// - 自分が含まれないプライベートルーム → 403
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ConnectQuery>,
) -> Result<impl IntoResponse, StatusCode> {
    let user_id = match UserId::new(query.user_id.clone()) {
        Ok(id) => id,
        Err(_) => {
            tracing::warn!("Invalid user_id: '{}'", query.user_id);
            return Err(StatusCode::BAD_REQUEST);
        }
    };

    let room_id = match query.room.filter(|room| !room.trim().is_empty()) {
        None => RoomId::general(),
        Some(room) => RoomId::new(room).map_err(|_| StatusCode::BAD_REQUEST)?,
    };

    match room_id.authorize(&user_id) {
        Ok(()) => {}
        Err(e @ AccessError::MalformedPrivateRoom(_)) => {
            tracing::warn!("Rejecting '{}': {}", user_id, e);
            return Err(StatusCode::BAD_REQUEST);
        }
        Err(e @ AccessError::NotAParticipant { .. }) => {
            tracing::warn!("Rejecting '{}': {}", user_id, e);
            return Err(StatusCode::FORBIDDEN);
        }
    }

    tracing::info!("User '{}' connecting to room '{}'", user_id, room_id);
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, user_id, room_id)))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, user_id: UserId, room_id: RoomId) {
    let (client, mailbox) = Client::new(user_id, room_id, state.mailbox_capacity);
    let info = client.info().clone();

    if let Err(e) = state.hub.register(client).await {
        tracing::error!("Failed to register user '{}': {}", info.user_id, e);
        return;
    }

    let connection: Arc<dyn Connection> = Arc::new(WebSocketConnection::new(socket));
    let (reader, writer) = spawn_pumps(
        info.clone(),
        connection,
        mailbox,
        state.hub.clone(),
        state.pump_options.clone(),
    );

    let (read_result, write_result) = tokio::join!(reader, writer);
    if let Err(e) = read_result.and(write_result) {
        tracing::error!("Pump task of user '{}' failed: {}", info.user_id, e);
    }

    tracing::info!(
        "User '{}' disconnected from room '{}'",
        info.user_id,
        info.room_id
    );
}
