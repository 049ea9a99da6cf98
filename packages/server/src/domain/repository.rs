//! Repository trait 定義
//!
//! ドメイン層が必要とするデータアクセスのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

use async_trait::async_trait;

use super::{Connection, ConnectionId, RepositoryError, Room, RoomId, Timestamp};

/// Relay Repository trait
///
/// 接続レジストリと room テーブルを一つの単位として扱います。
/// 実装は全ての操作を単一の排他制御ドメインで直列化しなければなりません。
#[async_trait]
pub trait RelayRepository: Send + Sync {
    /// 接続を登録（room への所属は空）
    async fn add_connection(
        &self,
        connection_id: ConnectionId,
        connected_at: Timestamp,
    ) -> Result<(), RepositoryError>;

    /// room を（必要なら作成して）参加し、ブロードキャスト対象のスナップショットを返す
    async fn join_room(
        &self,
        connection_id: &ConnectionId,
        room_id: RoomId,
        now: Timestamp,
    ) -> Result<Vec<ConnectionId>, RepositoryError>;

    /// 接続を Closing 状態にする
    async fn mark_closing(&self, connection_id: &ConnectionId) -> Result<(), RepositoryError>;

    /// 接続を削除し、所属していた全ての room から外す
    ///
    /// 既に削除済みの場合は `None`（冪等）
    async fn remove_connection(&self, connection_id: &ConnectionId) -> Option<Connection>;

    /// room とメンバーの接続情報を一度に取得
    async fn get_room_detail(
        &self,
        room_id: &RoomId,
    ) -> Result<(Room, Vec<Connection>), RepositoryError>;

    /// 全ての room を取得（ID 順）
    async fn get_rooms(&self) -> Vec<Room>;

    /// 接続数を取得
    async fn count_connections(&self) -> usize;
}
