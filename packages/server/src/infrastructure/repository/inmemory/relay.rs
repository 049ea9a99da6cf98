//! InMemory Relay Repository 実装
//!
//! ドメイン層が定義する RelayRepository trait の具体的な実装。
//! `RoomTable` を一つの `tokio::sync::Mutex` で保護し、接続レジストリと
//! room テーブルへの全ての変更を直列化します。

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    Connection, ConnectionId, RelayRepository, RepositoryError, Room, RoomId, RoomTable,
    Timestamp,
};

/// インメモリ Relay Repository 実装
pub struct InMemoryRelayRepository {
    table: Arc<Mutex<RoomTable>>,
}

impl InMemoryRelayRepository {
    /// 新しい InMemoryRelayRepository を作成
    pub fn new(table: Arc<Mutex<RoomTable>>) -> Self {
        Self { table }
    }
}

#[async_trait]
impl RelayRepository for InMemoryRelayRepository {
    async fn add_connection(
        &self,
        connection_id: ConnectionId,
        connected_at: Timestamp,
    ) -> Result<(), RepositoryError> {
        let mut table = self.table.lock().await;
        table.register(Connection::new(connection_id, connected_at))?;
        Ok(())
    }

    async fn join_room(
        &self,
        connection_id: &ConnectionId,
        room_id: RoomId,
        now: Timestamp,
    ) -> Result<Vec<ConnectionId>, RepositoryError> {
        let mut table = self.table.lock().await;
        Ok(table.join(connection_id, room_id, now)?)
    }

    async fn mark_closing(&self, connection_id: &ConnectionId) -> Result<(), RepositoryError> {
        let mut table = self.table.lock().await;
        Ok(table.mark_closing(connection_id)?)
    }

    async fn remove_connection(&self, connection_id: &ConnectionId) -> Option<Connection> {
        let mut table = self.table.lock().await;
        table.remove(connection_id)
    }

    async fn get_room_detail(
        &self,
        room_id: &RoomId,
    ) -> Result<(Room, Vec<Connection>), RepositoryError> {
        let table = self.table.lock().await;
        let (room, members) = table
            .room_with_members(room_id)
            .ok_or_else(|| RepositoryError::RoomNotFound(room_id.as_str().to_string()))?;
        Ok((room.clone(), members.into_iter().cloned().collect()))
    }

    async fn get_rooms(&self) -> Vec<Room> {
        let table = self.table.lock().await;
        table.rooms().into_iter().cloned().collect()
    }

    async fn count_connections(&self) -> usize {
        let table = self.table.lock().await;
        table.connection_count()
    }
}
