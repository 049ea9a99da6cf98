//! UseCase: メッセージ中継処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - SendMessageUseCase::execute() メソッド
//! - envelope の解析、room の遅延作成、メンバー登録、エコー付きブロードキャスト
//!
//! ### なぜこのテストが必要か
//! - 送信者自身にも同じバイト列が届くこと（エコー）は下流の描画が依存する契約
//! - 不正な envelope は破棄されるが接続は維持されること
//! - メンバー登録が冪等であること
//!
//! ### どのような状況を想定しているか
//! - 正常系：既存 room へのブロードキャスト、新規 room の作成
//! - 異常系：room フィールドなし、壊れた JSON
//! - エッジケース：切断済みメンバーがいる room、同一接続からの連続送信
//! - 並行処理：スナップショット取得後に別の接続の参加・切断が割り込む場合

use std::sync::Arc;

use roomcast_shared::time::Clock;

use crate::domain::{
    BroadcastReport, ConnectionId, Envelope, Frame, MessagePusher, RelayRepository, Timestamp,
};

use super::error::SendMessageError;

/// メッセージ中継のユースケース
pub struct SendMessageUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn RelayRepository>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
}

impl SendMessageUseCase {
    /// 新しい SendMessageUseCase を作成
    pub fn new(
        repository: Arc<dyn RelayRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
            clock,
        }
    }

    /// 受信したフレームを中継する
    ///
    /// # Arguments
    ///
    /// * `from` - 送信元の接続 ID
    /// * `frame` - 受信したままのフレーム
    ///
    /// # Returns
    ///
    /// * `Ok(BroadcastReport)` - 配信結果（送信者自身を含む）
    /// * `Err(SendMessageError)` - 破棄された（クライアントには通知しない）
    pub async fn execute(
        &self,
        from: &ConnectionId,
        frame: Frame,
    ) -> Result<BroadcastReport, SendMessageError> {
        // 1. room だけを取り出す（ペイロードは解釈しない）
        let envelope = Envelope::parse(frame)?;

        // 2. room を作成・参加し、同じロック内でスナップショットを取得
        let now = Timestamp::new(self.clock.now_millis());
        let targets = self
            .repository
            .join_room(from, envelope.room().clone(), now)
            .await?;

        tracing::debug!(
            "Relaying {} bytes from '{}' to {} member(s) of room '{}'",
            envelope.frame().len(),
            from,
            targets.len(),
            envelope.room()
        );

        // 3. 元のフレームをそのままブロードキャスト
        Ok(self
            .message_pusher
            .broadcast(targets, envelope.frame())
            .await)
    }
}
