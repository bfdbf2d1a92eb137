use plaza_capabilities::{CapabilityError, CapabilityRegistry, CapabilityRequest};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Barrier;

async fn boom(_: Value) -> Result<Value, CapabilityError> {
    panic!("boom")
}

#[tokio::test]
async fn unknown_capability_is_rejected() {
    let registry = CapabilityRegistry::new();

    let err = registry.invoke("Nope.nothing", Value::Null).await.unwrap_err();
    assert!(matches!(err, CapabilityError::UnknownCapability { .. }));

    let response = registry.dispatch(CapabilityRequest::new(4, "Nope.nothing", Value::Null)).await;
    assert_eq!(response.id, 4);
    assert_eq!(response.error_kind(), Some("unknown_capability"));
}

#[tokio::test]
async fn duplicate_registration_keeps_first_binding() {
    let registry = CapabilityRegistry::new();
    registry.register("Echo.first", |_| async { Ok(json!("first")) }).unwrap();

    let err = registry.register("Echo.first", |_| async { Ok(json!("second")) }).unwrap_err();
    assert!(matches!(err, CapabilityError::DuplicateCapability { .. }));

    let value = registry.invoke("Echo.first", Value::Null).await.unwrap();
    assert_eq!(value, json!("first"));
    assert_eq!(registry.len(), 1);
}

#[tokio::test]
async fn operation_failures_become_execution_errors() {
    let registry = CapabilityRegistry::new();
    registry
        .register("Store.fail", |_| async {
            Err(CapabilityError::UnknownCapability { message: "inner".into(), context: None })
        })
        .unwrap();

    let err = registry.invoke("Store.fail", Value::Null).await.unwrap_err();
    assert!(matches!(err, CapabilityError::Execution { .. }));

    let response = registry.dispatch(CapabilityRequest::new(1, "Store.fail", Value::Null)).await;
    let wire = response.into_result().unwrap_err();
    assert_eq!(wire.kind, "execution");
    assert!(!wire.message.contains("inner"));
}

#[tokio::test]
async fn panicking_operation_still_gets_a_response() {
    let registry = CapabilityRegistry::new();
    registry.register("Crash.now", boom).unwrap();

    let response = registry.dispatch(CapabilityRequest::new(9, "Crash.now", Value::Null)).await;
    assert_eq!(response.id, 9);
    assert_eq!(response.error_kind(), Some("execution"));
}

#[tokio::test]
async fn concurrent_invocations_do_not_block_each_other() {
    let registry = CapabilityRegistry::new();
    let barrier = Arc::new(Barrier::new(2));
    registry
        .register("Sync.meet", move |_| {
            let barrier = Arc::clone(&barrier);
            async move {
                barrier.wait().await;
                Ok(Value::Bool(true))
            }
        })
        .unwrap();

    let first = registry.dispatch(CapabilityRequest::new(1, "Sync.meet", Value::Null));
    let second = registry.dispatch(CapabilityRequest::new(2, "Sync.meet", Value::Null));
    let (first, second) =
        tokio::time::timeout(Duration::from_secs(5), async { tokio::join!(first, second) })
            .await
            .expect("invocations blocked each other");

    assert!(first.is_ok());
    assert!(second.is_ok());
}
