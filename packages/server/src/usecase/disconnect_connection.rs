//! UseCase: 切断処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - DisconnectConnectionUseCase::execute() メソッド
//! - 切断された接続が全ての room から削除されること
//!
//! ### なぜこのテストが必要か
//! - 切断完了後にその接続がどの room のメンバーにも残っていないことを保証する
//! - 二重に呼ばれても追加の効果がないこと（冪等性）
//!
//! ### どのような状況を想定しているか
//! - 正常系：複数 room に所属する接続の切断
//! - エッジケース：二重切断、未登録の接続の切断
//! - シナリオ：切断後に同じ room へ送られたメッセージが残りのメンバーに届く
//! - 並行処理：複数タスクからの送信と切断が交互に起きる場合

use std::sync::Arc;

use crate::domain::{ConnectionId, MessagePusher, RelayRepository, RepositoryError, RoomId};

/// 切断処理の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Disconnected {
    /// 所属していた room（ID 順）
    pub rooms: Vec<RoomId>,
    /// 送信キューが満杯で破棄されたフレーム数
    pub dropped_frames: u64,
}

/// 切断のユースケース
pub struct DisconnectConnectionUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn RelayRepository>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl DisconnectConnectionUseCase {
    /// 新しい DisconnectConnectionUseCase を作成
    pub fn new(
        repository: Arc<dyn RelayRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
        }
    }

    /// 接続を Closing 状態にする（新しいブロードキャストの対象外になる）
    pub async fn begin_close(&self, connection_id: &ConnectionId) -> Result<(), RepositoryError> {
        self.repository.mark_closing(connection_id).await
    }

    /// 切断を実行
    ///
    /// # Returns
    ///
    /// * `Some(Disconnected)` - 所属していた room と破棄されたフレーム数
    /// * `None` - 既に切断済み（冪等）
    pub async fn execute(&self, connection_id: &ConnectionId) -> Option<Disconnected> {
        // 1. Closing にしてスナップショットから外す（既に削除済みなら何もしない）
        self.begin_close(connection_id).await.ok()?;

        // 2. 送信キューを閉じる。キューに残っているフレームは送信タスクが送り切る
        let dropped_frames = self
            .message_pusher
            .unregister_client(connection_id)
            .await
            .unwrap_or(0);

        // 3. 全ての room から削除
        let connection = self.repository.remove_connection(connection_id).await?;

        let mut rooms: Vec<RoomId> = connection.rooms.into_iter().collect();
        rooms.sort();
        Some(Disconnected {
            rooms,
            dropped_frames,
        })
    }
}
