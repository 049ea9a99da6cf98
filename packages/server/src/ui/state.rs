//! Shared application state.

use std::time::Duration;

use crate::usecase::{
    AcceptConnectionUseCase, DisconnectConnectionUseCase, GetRoomDetailUseCase, GetRoomsUseCase,
    SendMessageUseCase,
};

/// Shared application state
pub struct AppState {
    pub accept_connection_usecase: AcceptConnectionUseCase,
    pub send_message_usecase: SendMessageUseCase,
    pub disconnect_connection_usecase: DisconnectConnectionUseCase,
    pub get_rooms_usecase: GetRoomsUseCase,
    pub get_room_detail_usecase: GetRoomDetailUseCase,
    /// Capacity of each connection's outbound queue
    pub outbound_buffer: usize,
    /// How long a closing connection may keep flushing queued frames
    pub drain_timeout: Duration,
}
