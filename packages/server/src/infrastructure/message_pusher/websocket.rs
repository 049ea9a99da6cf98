//! WebSocket を使った MessagePusher 実装
//!
//! ## 責務
//!
//! - 各接続の送信キュー（有界 `mpsc::Sender`）を管理
//! - クライアントへのフレーム送信（broadcast）
//!
//! ## 設計ノート
//!
//! 送信は全て `try_send` で行います。キューが満杯の宛先はそのフレームを失い、
//! 破棄数がカウントされます。送信側や他の宛先がブロックされることはありません。

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::{Mutex, mpsc::error::TrySendError};

use crate::domain::{
    BroadcastReport, ConnectionId, Frame, MessagePushError, MessagePusher, PusherChannel,
};

/// 登録済みクライアントの送信キュー
pub struct ClientQueue {
    sender: PusherChannel,
    /// キューが満杯で破棄されたフレーム数
    dropped: u64,
}

impl ClientQueue {
    fn new(sender: PusherChannel) -> Self {
        Self { sender, dropped: 0 }
    }

    fn try_push(
        &mut self,
        client_id: &ConnectionId,
        frame: Arc<Frame>,
    ) -> Result<(), MessagePushError> {
        match self.sender.try_send(frame) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                self.dropped += 1;
                Err(MessagePushError::QueueFull(client_id.as_str().to_string()))
            }
            Err(TrySendError::Closed(_)) => {
                Err(MessagePushError::ClientClosed(client_id.as_str().to_string()))
            }
        }
    }
}

/// WebSocket を使った MessagePusher 実装
pub struct WebSocketMessagePusher {
    /// 接続中のクライアントの送信キュー
    clients: Arc<Mutex<HashMap<ConnectionId, ClientQueue>>>,
}

impl WebSocketMessagePusher {
    /// 新しい WebSocketMessagePusher を作成
    pub fn new(clients: Arc<Mutex<HashMap<ConnectionId, ClientQueue>>>) -> Self {
        Self { clients }
    }
}

impl Default for WebSocketMessagePusher {
    fn default() -> Self {
        Self::new(Arc::new(Mutex::new(HashMap::new())))
    }
}

#[async_trait]
impl MessagePusher for WebSocketMessagePusher {
    async fn register_client(&self, client_id: ConnectionId, sender: PusherChannel) {
        let mut clients = self.clients.lock().await;
        tracing::debug!("Connection '{}' registered to MessagePusher", client_id);
        clients.insert(client_id, ClientQueue::new(sender));
    }

    async fn unregister_client(&self, client_id: &ConnectionId) -> Option<u64> {
        let mut clients = self.clients.lock().await;
        let queue = clients.remove(client_id)?;
        tracing::debug!("Connection '{}' unregistered from MessagePusher", client_id);
        Some(queue.dropped)
    }

    async fn broadcast(&self, targets: Vec<ConnectionId>, frame: Arc<Frame>) -> BroadcastReport {
        let mut clients = self.clients.lock().await;
        let mut report = BroadcastReport::default();

        for target in &targets {
            let result = match clients.get_mut(target) {
                Some(queue) => queue.try_push(target, Arc::clone(&frame)),
                None => Err(MessagePushError::ClientNotFound(target.as_str().to_string())),
            };

            // ブロードキャストでは一部の送信失敗を許容
            match result {
                Ok(()) => report.delivered += 1,
                Err(e @ MessagePushError::QueueFull(_)) => {
                    report.failed += 1;
                    tracing::warn!("Dropped frame: {}", e);
                }
                Err(e) => {
                    report.failed += 1;
                    tracing::debug!("Skipped recipient during broadcast: {}", e);
                }
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn id(value: &str) -> ConnectionId {
        ConnectionId::new(value.to_string()).unwrap()
    }

    fn text(value: &str) -> Arc<Frame> {
        Arc::new(Frame::Text(value.into()))
    }

    #[tokio::test]
    async fn test_broadcast_success() {
        // テスト項目: 複数のクライアントに同じフレームをブロードキャストできる
        // given (前提条件):
        let pusher = WebSocketMessagePusher::default();
        let (tx1, mut rx1) = mpsc::channel(8);
        let (tx2, mut rx2) = mpsc::channel(8);
        pusher.register_client(id("alice"), tx1).await;
        pusher.register_client(id("bob"), tx2).await;

        // when (操作):
        let frame = text(r#"{"room":"r1"}"#);
        let report = pusher
            .broadcast(vec![id("alice"), id("bob")], Arc::clone(&frame))
            .await;

        // then (期待する結果):
        assert_eq!(
            report,
            BroadcastReport {
                delivered: 2,
                failed: 0
            }
        );
        let received1 = rx1.recv().await.unwrap();
        let received2 = rx2.recv().await.unwrap();
        // 全ての宛先が同一のフレームを共有する
        assert!(Arc::ptr_eq(&received1, &frame));
        assert!(Arc::ptr_eq(&received2, &frame));
    }

    #[tokio::test]
    async fn test_broadcast_partial_failure() {
        // テスト項目: 閉じた宛先や未登録の宛先があっても残りには送信される
        // given (前提条件):
        let pusher = WebSocketMessagePusher::default();
        let (tx1, rx1) = mpsc::channel(8);
        let (tx2, mut rx2) = mpsc::channel(8);
        pusher.register_client(id("closed"), tx1).await;
        pusher.register_client(id("bob"), tx2).await;
        drop(rx1);

        // when (操作):
        let targets = vec![id("closed"), id("nonexistent"), id("bob")];
        let report = pusher.broadcast(targets, text("Broadcast")).await;

        // then (期待する結果):
        assert_eq!(
            report,
            BroadcastReport {
                delivered: 1,
                failed: 2
            }
        );
        assert_eq!(rx2.recv().await, Some(text("Broadcast")));
    }

    #[tokio::test]
    async fn test_broadcast_full_queue_does_not_block() {
        // テスト項目: キューが満杯の宛先はブロックせずにフレームを破棄し、破棄数を数える
        // given (前提条件):
        let pusher = WebSocketMessagePusher::default();
        let (slow_tx, _slow_rx) = mpsc::channel(1);
        let (fast_tx, mut fast_rx) = mpsc::channel(8);
        slow_tx.try_send(text("first")).unwrap();
        pusher.register_client(id("slow"), slow_tx).await;
        pusher.register_client(id("fast"), fast_tx).await;

        // when (操作):
        let report = pusher
            .broadcast(vec![id("slow"), id("fast")], text("second"))
            .await;

        // then (期待する結果):
        assert_eq!(report.delivered, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(fast_rx.recv().await, Some(text("second")));
        assert_eq!(pusher.unregister_client(&id("slow")).await, Some(1));
        assert_eq!(pusher.unregister_client(&id("fast")).await, Some(0));
    }

    #[tokio::test]
    async fn test_unregister_closes_queue() {
        // テスト項目: 登録解除するとキューが閉じられ、残っていたフレームは受信できる
        // given (前提条件):
        let pusher = WebSocketMessagePusher::default();
        let (tx, mut rx) = mpsc::channel(8);
        pusher.register_client(id("alice"), tx).await;
        pusher.broadcast(vec![id("alice")], text("in-flight")).await;

        // when (操作):
        let dropped = pusher.unregister_client(&id("alice")).await;

        // then (期待する結果):
        assert_eq!(dropped, Some(0));
        assert_eq!(rx.recv().await, Some(text("in-flight")));
        assert_eq!(rx.recv().await, None);
        // 二回目の登録解除は何もしない
        assert_eq!(pusher.unregister_client(&id("alice")).await, None);
    }

    #[tokio::test]
    async fn test_broadcast_empty_targets() {
        // テスト項目: 空のターゲットリストでもエラーにならない
        // given (前提条件):
        let pusher = WebSocketMessagePusher::default();

        // when (操作):
        let report = pusher.broadcast(vec![], text("Message")).await;

        // then (期待する結果):
        assert_eq!(report, BroadcastReport::default());
    }
}
