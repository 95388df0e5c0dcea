//! Driver tests against a local WebSocket server.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::json;
use tether_core::reactive::ReactiveStore;
use tether_core::sync::{driver, ClientConfig, LinkStatus};
use tokio::net::TcpListener;
use tokio_tungstenite::{accept_async, tungstenite::Message};

async fn wait_for<F: Fn() -> bool>(check: F) -> bool {
    for _ in 0..200 {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}

#[tokio::test]
async fn client_requests_status_and_applies_updates() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(stream).await.unwrap();

        let request = ws.next().await.unwrap().unwrap();
        assert_eq!(request.to_text().unwrap(), r#"{"event":"get-status"}"#);

        let status = json!({"event": "status", "data": {"pause": false, "volume": 42}});
        ws.send(Message::Text(status.to_string().into())).await.unwrap();
        let update = json!({"event": "media-title", "data": "Live"});
        ws.send(Message::Text(update.to_string().into())).await.unwrap();

        // Hold the socket open until the client goes away.
        while let Some(Ok(_)) = ws.next().await {}
    });

    let ui = ReactiveStore::new();
    let state = ReactiveStore::new();
    let config = ClientConfig::for_host(addr.to_string());
    let (client, handle) = driver::spawn(config, ui.clone(), state.clone());

    assert!(wait_for(|| state.get("media-title") == Ok(json!("Live"))).await);
    assert_eq!(state.get("volume"), Ok(json!(42)));
    assert_eq!(state.get("pause"), Ok(json!(false)));
    assert_eq!(LinkStatus::from_value(&ui.get("sock-conn").unwrap()), Some(LinkStatus::Connected));
    assert_eq!(client.link_status(), LinkStatus::Connected);

    handle.abort();
    server.abort();
}

#[tokio::test]
async fn unreachable_server_exhausts_retries() {
    // Bind then drop to get a port nobody listens on.
    let addr = TcpListener::bind("127.0.0.1:0").await.unwrap().local_addr().unwrap();

    let ui = ReactiveStore::new();
    let config = ClientConfig {
        max_attempts: 2,
        retry_delay_ms: 5,
        ..ClientConfig::for_host(addr.to_string())
    };
    let (client, handle) = driver::spawn(config, ui.clone(), ReactiveStore::new());

    assert!(wait_for(|| ui.get("sock-conn") == Ok(json!(-1)) && client.attempts() == 2).await);
    assert_eq!(client.link_status(), LinkStatus::Exhausted);

    handle.abort();
}
