//! End-to-end tests: a real server on an ephemeral port driven over WebSocket and HTTP.

use std::{collections::HashMap, net::SocketAddr, sync::Arc, time::Duration};

use futures_util::{SinkExt, StreamExt};
use lobby_server::{
    hub::{DEFAULT_MAILBOX_CAPACITY, Hub, PumpOptions},
    infrastructure::repository::{InMemoryMessageStore, InMemoryUserDirectory},
    ui::Server,
};
use lobby_shared::time::SystemClock;
use serde_json::Value;
use tokio::{net::TcpStream, task::JoinHandle};
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async,
    tungstenite::{self, Message},
};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

const RECV_TIMEOUT: Duration = Duration::from_secs(5);

/// Helper struct to manage the server task lifecycle
struct TestServer {
    addr: SocketAddr,
    task: JoinHandle<()>,
}

impl TestServer {
    async fn start() -> Self {
        let users = HashMap::from([(1, "Alice".to_string()), (2, "Bob".to_string())]);
        let store = Arc::new(InMemoryMessageStore::new(Arc::new(SystemClock)));
        let directory = Arc::new(InMemoryUserDirectory::new(users));
        let hub = Hub::new(store, directory).spawn();
        let server = Server::new(hub, DEFAULT_MAILBOX_CAPACITY, PumpOptions::default());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Failed to read local addr");
        let task = tokio::spawn(async move {
            let _ = server.serve(listener).await;
        });

        TestServer { addr, task }
    }

    fn ws_url(&self, user_id: &str, room: &str) -> String {
        format!("ws://{}/ws?user_id={}&room={}", self.addr, user_id, room)
    }

    fn http_url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    async fn connect(&self, user_id: &str, room: &str) -> Socket {
        let (socket, _) = connect_async(self.ws_url(user_id, room))
            .await
            .expect("Failed to connect");
        socket
    }

    async fn rooms(&self) -> Vec<Value> {
        reqwest::get(self.http_url("/api/rooms"))
            .await
            .expect("Failed to request rooms")
            .json()
            .await
            .expect("Failed to decode rooms")
    }

    /// Poll `/api/rooms` until `room` has `count` members (0 = room absent)
    async fn wait_for_members(&self, room: &str, count: u64) {
        for _ in 0..100 {
            let current = self
                .rooms()
                .await
                .iter()
                .find(|r| r["id"] == room)
                .map(|r| r["member_count"].as_u64().unwrap_or(0))
                .unwrap_or(0);
            if current == count {
                return;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("room '{room}' never reached {count} member(s)");
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn send(socket: &mut Socket, content: &str) {
    let frame = serde_json::json!({ "content": content }).to_string();
    socket
        .send(Message::Text(frame.into()))
        .await
        .expect("Failed to send frame");
}

async fn recv_json(socket: &mut Socket) -> Value {
    loop {
        let message = tokio::time::timeout(RECV_TIMEOUT, socket.next())
            .await
            .expect("Timed out waiting for a frame")
            .expect("Connection ended")
            .expect("WebSocket error");
        if let Message::Text(text) = message {
            return serde_json::from_str(text.as_str()).expect("Frame is not JSON");
        }
    }
}

async fn connect_status(url: &str) -> u16 {
    match connect_async(url).await {
        Ok(_) => 101,
        Err(tungstenite::Error::Http(response)) => response.status().as_u16(),
        Err(e) => panic!("unexpected connect error: {e}"),
    }
}

#[tokio::test]
async fn test_broadcast_reaches_every_member_including_sender() {
    // テスト項目: ルーム内の全員（送信者を含む）にメッセージが届く
    // given (前提条件):
    let server = TestServer::start().await;
    let mut alice = server.connect("1", "general").await;
    let mut bob = server.connect("2", "general").await;
    server.wait_for_members("general", 2).await;

    // when (操作):
    send(&mut alice, "hi").await;

    // then (期待する結果):
    for socket in [&mut alice, &mut bob] {
        let frame = recv_json(socket).await;
        assert_eq!(frame["type"], "chat_message");
        assert_eq!(frame["content"], "hi");
        assert_eq!(frame["sender_id"], "1");
        assert_eq!(frame["sender_name"], "Alice");
        assert_eq!(frame["room_id"], "general");
        assert!(frame["timestamp"].as_str().is_some_and(|t| t.ends_with('Z')));
    }
}

#[tokio::test]
async fn test_messages_stay_in_their_room() {
    // テスト項目: 別ルームのクライアントにはメッセージが届かない
    // given (前提条件):
    let server = TestServer::start().await;
    let mut alice = server.connect("1", "r1").await;
    let mut bob = server.connect("2", "r2").await;
    server.wait_for_members("r1", 1).await;
    server.wait_for_members("r2", 1).await;

    // when (操作):
    send(&mut alice, "only r1").await;
    send(&mut bob, "only r2").await;

    // then (期待する結果):
    assert_eq!(recv_json(&mut alice).await["content"], "only r1");
    assert_eq!(recv_json(&mut bob).await["content"], "only r2");
}

#[tokio::test]
async fn test_history_is_replayed_on_join() {
    // テスト項目: 参加時にルームの履歴が古い順に届く
    // given (前提条件):
    let server = TestServer::start().await;
    let mut alice = server.connect("1", "r1").await;
    server.wait_for_members("r1", 1).await;
    send(&mut alice, "first").await;
    send(&mut alice, "second").await;
    // 自分宛てのエコーが届いた時点で保存済み
    recv_json(&mut alice).await;
    recv_json(&mut alice).await;

    // when (操作):
    let mut carol = server.connect("3", "r1").await;

    // then (期待する結果):
    let first = recv_json(&mut carol).await;
    let second = recv_json(&mut carol).await;
    assert_eq!(first["type"], "history_message");
    assert_eq!(first["content"], "first");
    assert_eq!(first["sender_name"], "Alice");
    assert_eq!(second["type"], "history_message");
    assert_eq!(second["content"], "second");
}

#[tokio::test]
async fn test_unknown_sender_has_blank_name() {
    // テスト項目: ディレクトリに無いユーザーの表示名は空文字
    // given (前提条件):
    let server = TestServer::start().await;
    let mut dave = server.connect("4", "general").await;
    server.wait_for_members("general", 1).await;

    // when (操作):
    send(&mut dave, "hello").await;

    // then (期待する結果):
    let frame = recv_json(&mut dave).await;
    assert_eq!(frame["sender_id"], "4");
    assert_eq!(frame["sender_name"], "");
}

#[tokio::test]
async fn test_undecodable_frame_is_skipped() {
    // テスト項目: JSON として解釈できないフレームは無視され、接続は維持される
    // given (前提条件):
    let server = TestServer::start().await;
    let mut alice = server.connect("1", "general").await;
    server.wait_for_members("general", 1).await;

    // when (操作):
    alice
        .send(Message::Text("not json".into()))
        .await
        .expect("Failed to send frame");
    send(&mut alice, "still here").await;

    // then (期待する結果):
    assert_eq!(recv_json(&mut alice).await["content"], "still here");
}

#[tokio::test]
async fn test_non_utf8_binary_frame_keeps_connection() {
    // テスト項目: UTF-8 でないバイナリフレームを送っても接続は維持される
    // given (前提条件):
    let server = TestServer::start().await;
    let mut alice = server.connect("1", "general").await;
    server.wait_for_members("general", 1).await;

    // when (操作):
    alice
        .send(Message::Binary(vec![0xff, 0xfe, 0x00].into()))
        .await
        .expect("Failed to send frame");
    alice
        .send(Message::Binary(br#"{"content":"as binary"}"#.to_vec().into()))
        .await
        .expect("Failed to send frame");
    send(&mut alice, "after binary").await;

    // then (期待する結果):
    assert_eq!(recv_json(&mut alice).await["content"], "as binary");
    assert_eq!(recv_json(&mut alice).await["content"], "after binary");
    server.wait_for_members("general", 1).await;
}

#[tokio::test]
async fn test_room_is_removed_after_last_member_leaves() {
    // テスト項目: 最後のメンバーが切断するとルームが消える
    // given (前提条件):
    let server = TestServer::start().await;
    let mut alice = server.connect("1", "lonely").await;
    server.wait_for_members("lonely", 1).await;

    // when (操作):
    alice.close(None).await.expect("Failed to close");

    // then (期待する結果):
    server.wait_for_members("lonely", 0).await;
    assert!(server.rooms().await.iter().all(|r| r["id"] != "lonely"));
}

#[tokio::test]
async fn test_connection_admission() {
    // テスト項目: 接続時のユーザー ID とプライベートルームの検証
    // given (前提条件):
    let server = TestServer::start().await;

    // when (操作):
    let participant = connect_status(&server.ws_url("1", "private-1-2")).await;
    let outsider = connect_status(&server.ws_url("3", "private-1-2")).await;
    let malformed = connect_status(&server.ws_url("1", "private-1")).await;
    let blank_user = connect_status(&server.ws_url("%20", "general")).await;
    let default_room = connect_status(&format!("ws://{}/ws?user_id=1", server.addr)).await;

    // then (期待する結果):
    assert_eq!(participant, 101);
    assert_eq!(outsider, 403);
    assert_eq!(malformed, 400);
    assert_eq!(blank_user, 400);
    assert_eq!(default_room, 101);
}

#[tokio::test]
async fn test_http_api() {
    // テスト項目: ヘルスチェックとルーム一覧・詳細 API
    // given (前提条件):
    let server = TestServer::start().await;
    let _alice = server.connect("1", "general").await;
    server.wait_for_members("general", 1).await;

    // when (操作):
    let health: Value = reqwest::get(server.http_url("/api/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let detail = reqwest::get(server.http_url("/api/rooms/general"))
        .await
        .unwrap();
    let missing = reqwest::get(server.http_url("/api/rooms/nowhere"))
        .await
        .unwrap();

    // then (期待する結果):
    assert_eq!(health, serde_json::json!({ "status": "ok" }));
    assert_eq!(detail.status(), reqwest::StatusCode::OK);
    let detail: Value = detail.json().await.unwrap();
    assert_eq!(detail["id"], "general");
    assert_eq!(detail["members"], serde_json::json!(["1"]));
    assert_eq!(detail["member_count"], 1);
    assert_eq!(missing.status(), reqwest::StatusCode::NOT_FOUND);
}
