mod fixtures;

use fixtures::{host, profile};
use plaza_capabilities::{CapabilityBridge, CapabilityRegistry};
use plaza_kernel::domain::scene::SceneId;
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::sync::Notify;

fn registry() -> CapabilityRegistry {
    let host = host();
    host.profiles.insert(profile("0xabc", "Ada"));
    let registry = CapabilityRegistry::new();
    plaza_capabilities::init(&host.ctx, &registry).unwrap();
    registry
}

#[tokio::test]
async fn requests_round_trip_through_the_bridge() {
    let (_bridge, client) = CapabilityBridge::open(registry(), SceneId::from("scene-1"), 8);

    let first = client.call("Players.getPlayerData", json!({ "userId": "0xabc" })).await;
    let second = client.call("Players.getPlayerData", json!({ "userId": "0xnone" })).await;

    assert_eq!(first.id, 1);
    assert_eq!(second.id, 2);
    assert_eq!(first.into_result().unwrap()["userId"], json!("0xabc"));
    assert_eq!(second.into_result().unwrap(), Value::Null);
}

#[tokio::test]
async fn calls_after_close_report_sandbox_gone() {
    let (bridge, client) = CapabilityBridge::open(registry(), SceneId::from("scene-2"), 8);
    bridge.close();
    tokio::task::yield_now().await;

    let response = client.call("Players.getConnectedPlayers", Value::Null).await;
    assert_eq!(response.error_kind(), Some("sandbox_gone"));
    assert!(client.is_closed());
}

#[tokio::test]
async fn dropping_the_bridge_tears_down_the_channel() {
    let (bridge, client) = CapabilityBridge::open(registry(), SceneId::from("scene-3"), 8);
    drop(bridge);

    let response = client.call("Players.getConnectedPlayers", Value::Null).await;
    assert_eq!(response.error_kind(), Some("sandbox_gone"));
}

#[tokio::test]
async fn in_flight_invocation_completes_after_close() {
    let registry = CapabilityRegistry::new();
    let release = Arc::new(Notify::new());
    let gate = Arc::clone(&release);
    registry
        .register("Slow.wait", move |_| {
            let gate = Arc::clone(&gate);
            async move {
                gate.notified().await;
                Ok(json!("done"))
            }
        })
        .unwrap();

    let (bridge, client) = CapabilityBridge::open(registry, SceneId::from("scene-4"), 8);
    let call = tokio::spawn(async move { client.call("Slow.wait", Value::Null).await });

    // Let the request reach the operation before tearing the bridge down.
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
    bridge.close();
    release.notify_one();

    let response = call.await.unwrap();
    assert_eq!(response.into_result().unwrap(), json!("done"));
}
