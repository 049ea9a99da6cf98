//! UseCase: room 詳細取得

use std::sync::Arc;

use crate::domain::{Connection, RelayRepository, Room, RoomId};

use super::error::GetRoomDetailError;

/// room とそのメンバーの接続情報
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomDetail {
    pub room: Room,
    /// メンバーの接続情報（参加順）
    pub members: Vec<Connection>,
}

/// room 詳細取得のユースケース
pub struct GetRoomDetailUseCase {
    repository: Arc<dyn RelayRepository>,
}

impl GetRoomDetailUseCase {
    pub fn new(repository: Arc<dyn RelayRepository>) -> Self {
        Self { repository }
    }

    pub async fn execute(&self, room_id: RoomId) -> Result<RoomDetail, GetRoomDetailError> {
        let (room, members) = self
            .repository
            .get_room_detail(&room_id)
            .await
            .map_err(|_| GetRoomDetailError::RoomNotFound(room_id.into_string()))?;

        Ok(RoomDetail { room, members })
    }
}
