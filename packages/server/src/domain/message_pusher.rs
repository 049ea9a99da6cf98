//! MessagePusher trait 定義
//!
//! 接続中のクライアントへのフレーム送信を抽象化します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{ConnectionId, Frame};

/// Outbound queue of a single connection.
///
/// Bounded: a recipient that does not drain its queue loses frames instead of
/// stalling the broadcaster.
pub type PusherChannel = mpsc::Sender<Arc<Frame>>;

/// Outcome of one fan-out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Frames queued to recipients
    pub delivered: usize,
    /// Recipients skipped (queue full, closed, or already unregistered)
    pub failed: usize,
}

/// MessagePusher trait
///
/// 送信は常にノンブロッキング。一部の宛先への失敗はブロードキャスト全体を中断しない。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// クライアントの送信キューを登録
    async fn register_client(&self, client_id: ConnectionId, sender: PusherChannel);

    /// クライアントの送信キューを登録解除（キューは閉じられる）
    ///
    /// 登録されていた場合は、キューが満杯で破棄されたフレーム数を返す
    async fn unregister_client(&self, client_id: &ConnectionId) -> Option<u64>;

    /// 複数のクライアントにフレームをブロードキャスト
    async fn broadcast(&self, targets: Vec<ConnectionId>, frame: Arc<Frame>) -> BroadcastReport;
}
