use crate::error::CapabilityError;
use crate::protocol::{CapabilityRequest, CapabilityResponse};
use crate::registry::CapabilityRegistry;
use plaza_domain::scene::SceneId;
use serde_json::Value;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, trace};

#[derive(Debug)]
struct BridgeMessage {
    request: CapabilityRequest,
    reply: oneshot::Sender<CapabilityResponse>,
}

/// Sandbox side of a capability channel.
#[derive(Debug, Clone)]
pub struct CapabilityClient {
    scene: SceneId,
    tx: mpsc::Sender<BridgeMessage>,
    next_id: Arc<AtomicU64>,
}

impl CapabilityClient {
    /// Calls `method` with a fresh request id.
    pub async fn call(&self, method: impl Into<String>, params: Value) -> CapabilityResponse {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        self.request(CapabilityRequest::new(id, method, params)).await
    }

    /// Sends a prepared request and waits for its response.
    ///
    /// Once the bridge is torn down the response carries a `sandbox_gone` error.
    pub async fn request(&self, request: CapabilityRequest) -> CapabilityResponse {
        let id = request.id;
        let (reply, rx) = oneshot::channel();

        if self.tx.send(BridgeMessage { request, reply }).await.is_err() {
            return self.gone(id);
        }
        rx.await.unwrap_or_else(|_| self.gone(id))
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    fn gone(&self, id: u64) -> CapabilityResponse {
        trace!(scene = %self.scene, id, "Capability call after sandbox teardown");
        let err = CapabilityError::SandboxGone {
            message: self.scene.to_string().into(),
            context: None,
        };
        CapabilityResponse::error(id, &err)
    }
}

/// Host side of a capability channel; tears the channel down when closed or dropped.
#[derive(Debug)]
pub struct CapabilityBridge {
    scene: SceneId,
    task: JoinHandle<()>,
}

impl CapabilityBridge {
    /// Opens a channel serving `scene` from `registry`.
    ///
    /// Each request is dispatched on its own task, so slow calls never block each other.
    #[must_use]
    pub fn open(
        registry: CapabilityRegistry,
        scene: SceneId,
        capacity: usize,
    ) -> (Self, CapabilityClient) {
        let (tx, mut rx) = mpsc::channel::<BridgeMessage>(capacity.max(1));

        let task_scene = scene.clone();
        let task = tokio::spawn(async move {
            while let Some(BridgeMessage { request, reply }) = rx.recv().await {
                let registry = registry.clone();
                let scene = task_scene.clone();
                tokio::spawn(async move {
                    let id = request.id;
                    let response = registry.dispatch(request).await;
                    if reply.send(response).is_err() {
                        trace!(scene = %scene, id, "Capability response discarded");
                    }
                });
            }
        });

        let client = CapabilityClient { scene: scene.clone(), tx, next_id: Arc::new(AtomicU64::new(0)) };
        (Self { scene, task }, client)
    }

    /// Stops serving new requests. In-flight invocations still complete.
    pub fn close(&self) {
        if !self.task.is_finished() {
            debug!(scene = %self.scene, "Capability bridge closed");
        }
        self.task.abort();
    }
}

impl Drop for CapabilityBridge {
    fn drop(&mut self) {
        self.task.abort();
    }
}
