//! UseCase layer: the relay's operations, orchestrating repository and pusher.

pub mod accept_connection;
pub mod disconnect_connection;
pub mod error;
pub mod get_room_detail;
pub mod get_rooms;
pub mod send_message;

pub use accept_connection::AcceptConnectionUseCase;
pub use disconnect_connection::{Disconnected, DisconnectConnectionUseCase};
pub use error::{AcceptError, GetRoomDetailError, SendMessageError};
pub use get_room_detail::{GetRoomDetailUseCase, RoomDetail};
pub use get_rooms::GetRoomsUseCase;
pub use send_message::SendMessageUseCase;
