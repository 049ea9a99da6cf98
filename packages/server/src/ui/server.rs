//! Server execution logic.

use std::{collections::HashMap, sync::Arc};

use axum::{Router, routing::get};
use roomcast_shared::time::{Clock, SystemClock};
use tokio::{net::TcpListener, sync::Mutex};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::{
    config::RelayConfig,
    domain::{MessagePusher, RelayRepository, RoomTable},
    infrastructure::{message_pusher::WebSocketMessagePusher, repository::InMemoryRelayRepository},
    usecase::{
        AcceptConnectionUseCase, DisconnectConnectionUseCase, GetRoomDetailUseCase,
        GetRoomsUseCase, SendMessageUseCase,
    },
};

use super::{
    handler::{get_room_detail, get_rooms, health_check, websocket_handler},
    signal::shutdown_signal,
    state::AppState,
};

/// WebSocket broadcast relay server
///
/// Owns the relay state for its whole lifetime: the room table is created here
/// and dropped when the server stops.
///
/// # Example
///
/// ```ignore
/// let server = Server::from_config(RelayConfig::default());
/// server.run().await?;
/// ```
pub struct Server {
    config: RelayConfig,
    state: Arc<AppState>,
}

impl Server {
    /// Wire up the relay with the in-memory repository and the WebSocket pusher.
    pub fn from_config(config: RelayConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Same as [`Server::from_config`] with an explicit clock.
    pub fn with_clock(config: RelayConfig, clock: Arc<dyn Clock>) -> Self {
        // 1. Repository (room table + connection registry, one lock)
        let table = Arc::new(Mutex::new(RoomTable::new(config.room_retention)));
        let repository: Arc<dyn RelayRepository> = Arc::new(InMemoryRelayRepository::new(table));

        // 2. MessagePusher (outbound queues)
        let message_pusher: Arc<dyn MessagePusher> = Arc::new(WebSocketMessagePusher::new(
            Arc::new(Mutex::new(HashMap::new())),
        ));

        // 3. UseCases + AppState
        let state = Arc::new(AppState {
            accept_connection_usecase: AcceptConnectionUseCase::new(
                repository.clone(),
                message_pusher.clone(),
                clock.clone(),
                config.max_connections,
            ),
            send_message_usecase: SendMessageUseCase::new(
                repository.clone(),
                message_pusher.clone(),
                clock,
            ),
            disconnect_connection_usecase: DisconnectConnectionUseCase::new(
                repository.clone(),
                message_pusher,
            ),
            get_rooms_usecase: GetRoomsUseCase::new(repository.clone()),
            get_room_detail_usecase: GetRoomDetailUseCase::new(repository),
            outbound_buffer: config.outbound_buffer.max(1),
            drain_timeout: config.drain_timeout,
        });

        Self { config, state }
    }

    /// Build the axum router for this server
    pub fn router(&self) -> Router {
        let mut app = Router::new()
            // WebSocket エンドポイント（クライアントはルートにも接続できる）
            .route("/", get(websocket_handler))
            .route("/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .route("/api/rooms", get(get_rooms))
            .route("/api/rooms/{room_id}", get(get_room_detail));

        if let Some(dir) = &self.config.static_dir {
            app = app.nest_service("/static", ServeDir::new(dir));
        }

        app.layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Bind to the configured address and run until a shutdown signal arrives
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the configured address or
    /// if there's an error during server execution.
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        let listener = TcpListener::bind(self.config.bind_addr()).await?;
        self.serve(listener).await
    }

    /// Run on an already bound listener until a shutdown signal arrives
    pub async fn serve(self, listener: TcpListener) -> Result<(), Box<dyn std::error::Error>> {
        let local_addr = listener.local_addr()?;
        tracing::info!("Broadcast relay listening on {}", local_addr);
        tracing::info!("Connect to: ws://{}/ (or /ws)", local_addr);
        if let Some(dir) = &self.config.static_dir {
            tracing::info!("Serving static documents from {}", dir.display());
        }
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}
