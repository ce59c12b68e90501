//! Realtime channel against a local WebSocket server.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::{mpsc, oneshot};
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::Message;

use carbonlink::{ApiClient, ApiError, ClientConfig, MemoryTokenStore};

const WAIT: Duration = Duration::from_secs(5);

fn client_for(addr: SocketAddr) -> ApiClient {
    let config = ClientConfig::new(&format!("http://{}/api", addr)).unwrap();
    ApiClient::new(config, Arc::new(MemoryTokenStore::new())).unwrap()
}

/// Accept one connection, report its path, send `frames`, then echo client
/// frames back wrapped in `{"echo": ...}` until the client closes.
async fn spawn_ws_server(frames: Vec<Message>) -> (SocketAddr, oneshot::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (path_tx, path_rx) = oneshot::channel();

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let callback = move |req: &Request, resp: Response| -> Result<Response, ErrorResponse> {
            let _ = path_tx.send(req.uri().path().to_string());
            Ok(resp)
        };
        let mut ws = tokio_tungstenite::accept_hdr_async(stream, callback)
            .await
            .unwrap();

        for frame in frames {
            ws.send(frame).await.unwrap();
        }

        while let Some(Ok(msg)) = ws.next().await {
            match msg {
                Message::Text(text) => {
                    let inner: Value = serde_json::from_str(&text).unwrap();
                    let reply = json!({ "echo": inner }).to_string();
                    if ws.send(Message::Text(reply)).await.is_err() {
                        break;
                    }
                }
                Message::Close(_) => break,
                _ => {}
            }
        }
    });

    (addr, path_rx)
}

#[tokio::test]
async fn test_frames_are_delivered_parsed() {
    let (addr, path_rx) = spawn_ws_server(vec![
        Message::Text(r#"{"type":"unit_update","unitId":"u1","efficiency":91.5}"#.to_string()),
        Message::Text("not json".to_string()),
        Message::Binary(br#"{"type":"alert","severity":"high"}"#.to_vec()),
    ])
    .await;

    let client = client_for(addr);
    let (tx, mut rx) = mpsc::unbounded_channel();
    let channel = client
        .subscribe(move |message: Value| {
            let _ = tx.send(message);
        })
        .expect("runtime is available");

    assert_eq!(channel.url().as_str(), format!("ws://{}/api", addr));
    assert_eq!(timeout(WAIT, path_rx).await.unwrap().unwrap(), "/api");

    let first = timeout(WAIT, rx.recv()).await.unwrap().unwrap();
    assert_eq!(
        first,
        json!({ "type": "unit_update", "unitId": "u1", "efficiency": 91.5 })
    );

    // The invalid frame is skipped, not delivered as a string
    let second = timeout(WAIT, rx.recv()).await.unwrap().unwrap();
    assert_eq!(second, json!({ "type": "alert", "severity": "high" }));

    channel.send(&json!({ "subscribe": "units" })).unwrap();
    let echoed = timeout(WAIT, rx.recv()).await.unwrap().unwrap();
    assert_eq!(echoed, json!({ "echo": { "subscribe": "units" } }));

    timeout(WAIT, channel.close()).await.unwrap();
}

#[tokio::test]
async fn test_server_close_ends_channel() {
    let (addr, _path_rx) = spawn_ws_server(vec![
        Message::Text(r#"{"seq":1}"#.to_string()),
        Message::Close(None),
    ])
    .await;

    let client = client_for(addr);
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut channel = client
        .subscribe(move |message: Value| {
            let _ = tx.send(message);
        })
        .unwrap();

    assert_eq!(timeout(WAIT, rx.recv()).await.unwrap().unwrap(), json!({ "seq": 1 }));

    timeout(WAIT, channel.closed()).await.unwrap();
    assert!(channel.is_closed());
    assert!(matches!(
        channel.send(&json!({ "late": true })),
        Err(ApiError::ChannelClosed)
    ));
}

#[tokio::test]
async fn test_connection_failure_is_not_retried() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = client_for(addr);
    let mut channel = client.subscribe(|_: Value| {}).unwrap();

    timeout(WAIT, channel.closed()).await.unwrap();
    assert!(channel.is_closed());
}
