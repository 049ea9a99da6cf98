//! UseCase: room 一覧取得

use std::sync::Arc;

use crate::domain::{RelayRepository, Room};

/// room 一覧取得のユースケース
pub struct GetRoomsUseCase {
    repository: Arc<dyn RelayRepository>,
}

impl GetRoomsUseCase {
    pub fn new(repository: Arc<dyn RelayRepository>) -> Self {
        Self { repository }
    }

    /// 全ての room を ID 順で返す
    pub async fn execute(&self) -> Vec<Room> {
        self.repository.get_rooms().await
    }
}
