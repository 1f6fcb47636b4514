//! Server execution logic.

use std::{io, sync::Arc};

use axum::{Router, routing::get};
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::hub::{HubHandle, PumpOptions};

use super::{
    handler::{get_room_detail, get_rooms, health_check, websocket_handler},
    signal::shutdown_signal,
    state::AppState,
};

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// WebSocket chat server
///
/// # Example
///
/// ```ignore
/// let hub = Hub::new(store, directory).spawn();
/// let server = Server::new(hub, DEFAULT_MAILBOX_CAPACITY, PumpOptions::default());
/// server.run("127.0.0.1:8080").await?;
/// ```
pub struct Server {
    hub: HubHandle,
    mailbox_capacity: usize,
    pump_options: PumpOptions,
}

impl Server {
    pub fn new(hub: HubHandle, mailbox_capacity: usize, pump_options: PumpOptions) -> Self {
        Self {
            hub,
            mailbox_capacity,
            pump_options,
        }
    }

    /// Build the router with all endpoints
    pub fn router(self) -> Router {
        let app_state = Arc::new(AppState {
            hub: self.hub,
            mailbox_capacity: self.mailbox_capacity,
            pump_options: self.pump_options,
        });

        Router::new()
            // WebSocket エンドポイント
            .route("/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .route("/api/rooms", get(get_rooms))
            .route("/api/rooms/{room_id}", get(get_room_detail))
            .layer(TraceLayer::new_for_http())
            .with_state(app_state)
    }

    /// Bind to `bind_addr` (`host:port`) and serve until a shutdown signal arrives
    pub async fn run(self, bind_addr: &str) -> Result<(), ServerError> {
        let listener = TcpListener::bind(bind_addr)
            .await
            .map_err(|source| ServerError::Bind {
                addr: bind_addr.to_string(),
                source,
            })?;

        tracing::info!("Connect to: ws://{}/ws?user_id=<id>&room=<room>", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");
        self.serve(listener).await
    }

    /// Serve on an already bound listener
    pub async fn serve(self, listener: TcpListener) -> Result<(), ServerError> {
        tracing::info!("Chat hub server listening on {}", listener.local_addr()?);

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}
