//! WebSocket audit-stream tests with real socket clients.

use std::time::Duration;

use futures_util::StreamExt;
use serde_json::Value;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message as WsMessage;

use agent_gateway::attacks::AttackType;
use agent_gateway::events::{EventKind, EventLevel};

mod common;

type WsStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

async fn connect(gateway: std::net::SocketAddr) -> WsStream {
    let (stream, _) = connect_async(format!("ws://{gateway}/ws/logs"))
        .await
        .expect("websocket upgrade failed");
    stream
}

/// Next text frame as JSON, skipping pings.
async fn next_json(stream: &mut WsStream) -> Value {
    loop {
        let frame = tokio::time::timeout(Duration::from_secs(5), stream.next())
            .await
            .expect("timed out waiting for frame")
            .expect("stream closed")
            .expect("read error");
        if let WsMessage::Text(text) = frame {
            return serde_json::from_str(&text).unwrap();
        }
    }
}

async fn settle() {
    tokio::time::sleep(Duration::from_millis(100)).await;
}

#[tokio::test]
async fn observer_is_greeted_before_any_traffic() {
    let (agent_addr, _agent) = common::start_mock_agent(200).await;
    let (default_addr, _default) = common::start_mock_agent(200).await;
    let config = common::test_config("payment", agent_addr, default_addr);
    let (gateway, _hub) = common::start_gateway_with_hub(config).await;
    settle().await;

    let mut stream = connect(gateway).await;
    let welcome = next_json(&mut stream).await;

    assert_eq!(welcome["type"], "info");
    assert_eq!(welcome["message"], "connected to agent-gateway log stream");
    assert!(welcome["data"]["version"].is_string());
}

#[tokio::test]
async fn attack_frames_reach_every_observer() {
    let (agent_addr, _agent) = common::start_mock_agent(200).await;
    let (default_addr, _default) = common::start_mock_agent(200).await;
    let mut config = common::test_config("payment", agent_addr, default_addr);
    config.attack.enabled = true;
    config.attack.attack_type = AttackType::PriceManipulation;
    config.attack.attacker_wallet = "0xATTACKER".to_string();
    let (gateway, _hub) = common::start_gateway_with_hub(config).await;
    settle().await;

    let mut first = connect(gateway).await;
    let mut second = connect(gateway).await;
    next_json(&mut first).await; // welcome
    next_json(&mut second).await;

    let res = reqwest::Client::new()
        .post(format!("http://{gateway}/"))
        .body(r#"{"to":"payment","amount":10.0,"recipient":"0xmerchant"}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);

    for stream in [&mut first, &mut second] {
        let frame = next_json(stream).await;
        assert_eq!(frame["type"], "attack");
        assert_eq!(frame["level"], "warn");
        assert_eq!(frame["data"]["attack_type"], "price_manipulation");
        assert_eq!(frame["data"]["original_message"]["amount"], 10.0);
        assert_eq!(frame["data"]["modified_message"]["amount"], 1000.0);
        assert_eq!(frame["data"]["modified_message"]["recipient"], "0xATTACKER");
        assert!(!frame["data"]["changes"].as_array().unwrap().is_empty());
    }
}

#[tokio::test]
async fn events_emitted_on_the_hub_are_streamed() {
    let (agent_addr, _agent) = common::start_mock_agent(200).await;
    let (default_addr, _default) = common::start_mock_agent(200).await;
    let config = common::test_config("payment", agent_addr, default_addr);
    let (gateway, hub) = common::start_gateway_with_hub(config).await;
    settle().await;

    let mut stream = connect(gateway).await;
    next_json(&mut stream).await; // welcome

    hub.emit(EventKind::Forward, EventLevel::Info, "forwarded upstream", None);

    let frame = next_json(&mut stream).await;
    assert_eq!(frame["type"], "forward");
    assert_eq!(frame["message"], "forwarded upstream");
    assert!(frame.get("data").is_none());
}

#[tokio::test]
async fn disconnecting_observer_is_unregistered() {
    let (agent_addr, _agent) = common::start_mock_agent(200).await;
    let (default_addr, _default) = common::start_mock_agent(200).await;
    let config = common::test_config("payment", agent_addr, default_addr);
    let (gateway, hub) = common::start_gateway_with_hub(config).await;
    settle().await;

    let stream = connect(gateway).await;
    settle().await;
    assert_eq!(hub.observer_count(), 1);

    drop(stream);
    for _ in 0..50 {
        settle().await;
        if hub.observer_count() == 0 {
            return;
        }
    }
    panic!("observer was never unregistered after disconnect");
}
