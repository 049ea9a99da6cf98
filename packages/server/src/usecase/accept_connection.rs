//! UseCase: 接続受付処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - AcceptConnectionUseCase::execute() メソッド
//! - 新しい接続 ID の発行、Repository と MessagePusher への登録
//!
//! ### どのような状況を想定しているか
//! - 正常系：接続の受付（所属 room は空）
//! - 異常系：接続数上限に達している場合の拒否

use std::sync::Arc;

use roomcast_shared::time::Clock;

use crate::domain::{
    ConnectionId, ConnectionIdFactory, MessagePusher, PusherChannel, RelayRepository, Timestamp,
};

use super::error::AcceptError;

/// 接続受付のユースケース
pub struct AcceptConnectionUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn RelayRepository>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
    /// 同時接続数の上限（None なら無制限）
    max_connections: Option<usize>,
}

impl AcceptConnectionUseCase {
    /// 新しい AcceptConnectionUseCase を作成
    pub fn new(
        repository: Arc<dyn RelayRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
        max_connections: Option<usize>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
            clock,
            max_connections,
        }
    }

    /// 接続受付を実行
    ///
    /// # Arguments
    ///
    /// * `sender` - この接続の送信キュー
    ///
    /// # Returns
    ///
    /// * `Ok((ConnectionId, Timestamp))` - 発行された接続 ID と接続時刻
    /// * `Err(AcceptError)` - 上限超過など
    pub async fn execute(
        &self,
        sender: PusherChannel,
    ) -> Result<(ConnectionId, Timestamp), AcceptError> {
        if let Some(limit) = self.max_connections
            && self.repository.count_connections().await >= limit
        {
            return Err(AcceptError::CapacityExceeded(limit));
        }

        let connection_id = ConnectionIdFactory::generate()?;
        let connected_at = Timestamp::new(self.clock.now_millis());

        // 送信キューを先に登録し、room に参加した瞬間から配信対象になれるようにする
        self.message_pusher
            .register_client(connection_id.clone(), sender)
            .await;
        if let Err(e) = self
            .repository
            .add_connection(connection_id.clone(), connected_at)
            .await
        {
            self.message_pusher.unregister_client(&connection_id).await;
            return Err(e.into());
        }

        Ok((connection_id, connected_at))
    }
}
