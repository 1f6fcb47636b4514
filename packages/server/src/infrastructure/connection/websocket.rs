//! axum の WebSocket を使った Connection 実装
//!
//! ## 責務
//!
//! - WebSocket を送信側（sink）と受信側（stream）に分割して保持
//! - テキストフレーム単位の読み書きとクローズ
//!
//! ## 設計ノート
//!
//! 読み取りポンプと書き込みポンプが同じ接続を共有するため、sink と stream は
//! それぞれ別の Mutex で保護します。読み取り中でも書き込みは待たされません。
//!
//! close() は watch チャネルでクローズ済みを通知し、待機中の read_frame も
//! `ConnectionError::Closed` で終わらせます。相手がクローズハンドシェイクに
//! 応じずにフレームを送り続けても、閉じた接続からは何も読み出されません。

use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, SplitStream, StreamExt},
};
use tokio::sync::{Mutex, watch};

use crate::domain::{Connection, ConnectionError};

/// WebSocket を使った Connection 実装
pub struct WebSocketConnection {
    sink: Mutex<SplitSink<WebSocket, Message>>,
    stream: Mutex<SplitStream<WebSocket>>,
    closed: watch::Sender<bool>,
}

impl WebSocketConnection {
    pub fn new(socket: WebSocket) -> Self {
        let (sink, stream) = socket.split();
        Self {
            sink: Mutex::new(sink),
            stream: Mutex::new(stream),
            closed: watch::Sender::new(false),
        }
    }

    fn is_closed(&self) -> bool {
        *self.closed.borrow()
    }

    async fn next_text(stream: &mut SplitStream<WebSocket>) -> Result<String, ConnectionError> {
        loop {
            let message = match stream.next().await {
                None => return Err(ConnectionError::Closed),
                Some(Err(e)) => return Err(ConnectionError::Transport(e.to_string())),
                Some(Ok(message)) => message,
            };

            match message {
                Message::Text(text) => return Ok(text.as_str().to_owned()),
                Message::Binary(bytes) => {
                    return String::from_utf8(bytes.to_vec())
                        .map_err(|e| ConnectionError::InvalidFrame(e.to_string()));
                }
                Message::Close(_) => return Err(ConnectionError::Closed),
                // ping/pong は axum が応答する
                Message::Ping(_) | Message::Pong(_) => continue,
            }
        }
    }
}

#[async_trait]
impl Connection for WebSocketConnection {
    async fn read_frame(&self) -> Result<String, ConnectionError> {
        let mut closed = self.closed.subscribe();
        let mut stream = self.stream.lock().await;
        tokio::select! {
            // wait_for は現在値も確認するので、close() との競合で取りこぼさない
            _ = closed.wait_for(|closed| *closed) => Err(ConnectionError::Closed),
            frame = Self::next_text(&mut stream) => frame,
        }
    }

    async fn write_frame(&self, frame: String) -> Result<(), ConnectionError> {
        if self.is_closed() {
            return Err(ConnectionError::Closed);
        }
        self.sink
            .lock()
            .await
            .send(Message::Text(frame.into()))
            .await
            .map_err(|e| ConnectionError::Transport(e.to_string()))
    }

    async fn close(&self) {
        if self.closed.send_replace(true) {
            return;
        }
        let mut sink = self.sink.lock().await;
        // 相手が既に切断している場合の失敗は無視する
        let _ = sink.send(Message::Close(None)).await;
        let _ = sink.close().await;
        tracing::debug!("WebSocket connection closed");
    }
}

#[cfg(test)]
mod tests {
    use std::{future::Future, net::SocketAddr, sync::Arc, time::Duration};

    use axum::{Router, extract::ws::WebSocketUpgrade, routing::get};
    use tokio::sync::mpsc;
    use tokio_tungstenite::{connect_async, tungstenite};

    use super::*;

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - 実際の WebSocket 上での WebSocketConnection の読み取りとクローズ
    //
    // 【なぜこのテストが必要か】
    // - 不正なフレーム 1 つで接続全体が切れてはいけない
    // - 退出させたクライアントの読み取りは close() で確実に止まる必要がある
    //
    // 【どのようなシナリオをテストするか】
    // 1. UTF-8 でないバイナリフレームは InvalidFrame になり、次のフレームは読める
    // 2. close() は待機中の読み取りを Closed で終わらせ、以後の読み書きも Closed
    // ========================================

    /// `session` を WebSocket 接続ごとに実行するサーバーを起動する
    async fn start_server<F, Fut>(session: F) -> SocketAddr
    where
        F: Fn(WebSocketConnection) -> Fut + Clone + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let app = Router::new().route(
            "/ws",
            get(move |ws: WebSocketUpgrade| {
                let session = session.clone();
                async move {
                    ws.on_upgrade(move |socket| session(WebSocketConnection::new(socket)))
                }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    #[tokio::test]
    async fn test_non_utf8_binary_frame_is_rejected_alone() {
        // テスト項目: UTF-8 でないバイナリフレームはそのフレームだけが拒否される
        // given (前提条件):
        let (tx, mut rx) = mpsc::unbounded_channel();
        let addr = start_server(move |conn| {
            let tx = tx.clone();
            async move {
                let first = conn.read_frame().await;
                let second = conn.read_frame().await;
                let _ = tx.send((first, second));
            }
        })
        .await;
        let (mut peer, _) = connect_async(format!("ws://{addr}/ws")).await.unwrap();

        // when (操作):
        peer.send(tungstenite::Message::Binary(vec![0xff, 0xfe, 0x00].into()))
            .await
            .unwrap();
        peer.send(tungstenite::Message::Text("after binary".into()))
            .await
            .unwrap();

        // then (期待する結果):
        let (first, second) = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(first, Err(ConnectionError::InvalidFrame(_))));
        assert_eq!(second.unwrap(), "after binary");
    }

    #[tokio::test]
    async fn test_close_cancels_pending_read() {
        // テスト項目: close() は待機中の読み取りを終わらせ、相手が送り続けても読めない
        // given (前提条件):
        let (tx, mut rx) = mpsc::unbounded_channel();
        let addr = start_server(move |conn| {
            let tx = tx.clone();
            async move {
                let conn = Arc::new(conn);
                let reader = tokio::spawn({
                    let conn = conn.clone();
                    async move { conn.read_frame().await }
                });
                tokio::time::sleep(Duration::from_millis(50)).await;

                // when (操作):
                conn.close().await;
                conn.close().await;

                let pending = reader.await.unwrap();
                let later = conn.read_frame().await;
                let write = conn.write_frame("x".to_string()).await;
                let _ = tx.send((pending, later, write));
            }
        })
        .await;
        // 相手はクローズフレームに応答せずに送信を続ける
        let (mut peer, _) = connect_async(format!("ws://{addr}/ws")).await.unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        let _ = peer
            .send(tungstenite::Message::Text("still talking".into()))
            .await;

        // then (期待する結果):
        let (pending, later, write) = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(pending, Err(ConnectionError::Closed)));
        assert!(matches!(later, Err(ConnectionError::Closed)));
        assert!(matches!(write, Err(ConnectionError::Closed)));
    }
}
