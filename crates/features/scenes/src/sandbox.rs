//! One isolated execution context per running scene.
//!
//! A sandbox is a tokio task owning its [`SceneWorker`]. The host talks to it through an
//! ordered command channel; the worker talks to the host only through its capability client.

use crate::error::ScenesError;
use plaza_capabilities::{CapabilityBridge, CapabilityClient, CapabilityRegistry};
use plaza_domain::scene::{SceneDescriptor, SceneId};
use serde_json::Value;
use std::any::Any;
use std::collections::VecDeque;
use std::fmt::Debug;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

pub type WorkerFut<'a> = Pin<Box<dyn Future<Output = Result<(), ScenesError>> + Send + 'a>>;

/// What a worker gets to run its scene.
#[derive(Debug, Clone)]
pub struct SandboxContext {
    pub scene: Arc<SceneDescriptor>,
    pub capabilities: CapabilityClient,
}

/// The logic running inside a sandbox.
pub trait SceneWorker: Send + 'static {
    /// Boots the scene. The sandbox reports readiness once this resolves.
    fn start(&mut self, ctx: SandboxContext) -> WorkerFut<'_>;

    /// Host event delivered in issuance order.
    fn on_event(&mut self, _name: &str, _payload: Value) -> WorkerFut<'_> {
        Box::pin(async { Ok(()) })
    }

    fn stop(&mut self) -> WorkerFut<'_> {
        Box::pin(async { Ok(()) })
    }
}

/// Creates the worker for a scene.
pub trait WorkerFactory: Send + Sync + Debug {
    /// # Errors
    /// Returns [`ScenesError::SceneLoadFailure`] if the scene cannot be run.
    fn create(&self, scene: &Arc<SceneDescriptor>) -> Result<Box<dyn SceneWorker>, ScenesError>;
}

/// Worker without logic; ready as soon as it starts.
#[derive(Debug, Default, Clone, Copy)]
pub struct InertWorker;

impl SceneWorker for InertWorker {
    fn start(&mut self, ctx: SandboxContext) -> WorkerFut<'_> {
        Box::pin(async move {
            trace!(scene = %ctx.scene.id, "Inert scene started");
            Ok(())
        })
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct InertWorkerFactory;

impl WorkerFactory for InertWorkerFactory {
    fn create(&self, _scene: &Arc<SceneDescriptor>) -> Result<Box<dyn SceneWorker>, ScenesError> {
        Ok(Box::new(InertWorker))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SandboxCommand {
    Event { name: String, payload: Value },
    Stop,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SandboxEventKind {
    Ready,
    Failed { reason: String },
    Stopped,
}

/// Report from a sandbox to its owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SandboxEvent {
    pub scene: SceneId,
    pub kind: SandboxEventKind,
}

/// Sandbox limits.
#[derive(Debug, Clone, Copy)]
pub struct SandboxLimits {
    pub command_capacity: usize,
    pub capability_capacity: usize,
}

/// Owner side of a running sandbox.
#[derive(Debug)]
pub struct SandboxHandle {
    scene: SceneId,
    commands: mpsc::Sender<SandboxCommand>,
}

impl SandboxHandle {
    /// Spawns the sandbox task for `scene`.
    ///
    /// Reports go to `events`; the sandbox never blocks on them. A worker that panics is
    /// reported as [`SandboxEventKind::Failed`].
    #[must_use]
    pub fn spawn(
        scene: Arc<SceneDescriptor>,
        worker: Box<dyn SceneWorker>,
        registry: CapabilityRegistry,
        limits: SandboxLimits,
        events: mpsc::UnboundedSender<SandboxEvent>,
    ) -> Self {
        let id = scene.id.clone();
        let (commands, rx) = mpsc::channel(limits.command_capacity.max(1));
        let (bridge, capabilities) =
            CapabilityBridge::open(registry, id.clone(), limits.capability_capacity);

        let task =
            tokio::spawn(run(SandboxContext { scene, capabilities }, worker, bridge, rx, events.clone()));
        tokio::spawn(supervise(id.clone(), task, events));
        debug!(scene = %id, "Sandbox spawned");
        Self { scene: id, commands }
    }

    #[must_use]
    pub const fn scene(&self) -> &SceneId {
        &self.scene
    }

    /// Queues an event for the worker.
    ///
    /// # Errors
    /// Returns [`ScenesError::Internal`] if the queue is full or the sandbox is gone.
    pub fn send_event(&self, name: impl Into<String>, payload: Value) -> Result<(), ScenesError> {
        self.commands
            .try_send(SandboxCommand::Event { name: name.into(), payload })
            .map_err(|err| ScenesError::Internal {
                message: err.to_string().into(),
                context: Some(self.scene.to_string().into()),
            })
    }

    /// Asks the sandbox to stop after the commands already queued. Never blocks.
    pub fn stop(&self) {
        match self.commands.try_send(SandboxCommand::Stop) {
            Ok(()) => {},
            Err(mpsc::error::TrySendError::Full(command)) => {
                let commands = self.commands.clone();
                tokio::spawn(async move {
                    let _ = commands.send(command).await;
                });
            },
            Err(mpsc::error::TrySendError::Closed(_)) => {
                trace!(scene = %self.scene, "Stop sent to finished sandbox");
            },
        }
    }
}

/// Turns a panicked sandbox task into a failure report.
async fn supervise(
    scene: SceneId,
    task: JoinHandle<()>,
    events: mpsc::UnboundedSender<SandboxEvent>,
) {
    let Err(err) = task.await else { return };
    if !err.is_panic() {
        trace!(scene = %scene, "Sandbox task cancelled");
        return;
    }

    let payload = err.into_panic();
    let reason = match panic_message(&*payload) {
        Some(message) => format!("worker panicked: {message}"),
        None => "worker panicked".to_owned(),
    };
    warn!(scene = %scene, %reason, "Sandbox crashed");
    let _ = events.send(SandboxEvent { scene, kind: SandboxEventKind::Failed { reason } });
}

fn panic_message(payload: &(dyn Any + Send)) -> Option<&str> {
    payload
        .downcast_ref::<&'static str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
}

async fn run(
    ctx: SandboxContext,
    mut worker: Box<dyn SceneWorker>,
    bridge: CapabilityBridge,
    mut commands: mpsc::Receiver<SandboxCommand>,
    events: mpsc::UnboundedSender<SandboxEvent>,
) {
    let scene = ctx.scene.id.clone();
    let report = |kind: SandboxEventKind| {
        if events.send(SandboxEvent { scene: scene.clone(), kind }).is_err() {
            trace!(scene = %scene, "Sandbox report dropped: owner gone");
        }
    };

    // Events issued while the worker boots are replayed once it is ready.
    let mut pending = VecDeque::new();
    let started = {
        let mut start = worker.start(ctx);
        loop {
            tokio::select! {
                result = &mut start => break Some(result),
                command = commands.recv() => match command {
                    Some(SandboxCommand::Event { name, payload }) => pending.push_back((name, payload)),
                    Some(SandboxCommand::Stop) | None => break None,
                },
            }
        }
    };

    match started {
        Some(Ok(())) => report(SandboxEventKind::Ready),
        Some(Err(err)) => {
            bridge.close();
            report(SandboxEventKind::Failed { reason: err.to_string() });
            return;
        },
        None => {
            debug!(scene = %scene, dropped = pending.len(), "Sandbox stopped while starting");
            stop_worker(&scene, worker.as_mut()).await;
            bridge.close();
            report(SandboxEventKind::Stopped);
            return;
        },
    }

    for (name, payload) in pending {
        deliver(&scene, worker.as_mut(), &name, payload).await;
    }

    while let Some(command) = commands.recv().await {
        match command {
            SandboxCommand::Event { name, payload } => {
                deliver(&scene, worker.as_mut(), &name, payload).await;
            },
            SandboxCommand::Stop => break,
        }
    }

    stop_worker(&scene, worker.as_mut()).await;
    bridge.close();
    report(SandboxEventKind::Stopped);
}

async fn deliver(scene: &SceneId, worker: &mut dyn SceneWorker, name: &str, payload: Value) {
    if let Err(err) = worker.on_event(name, payload).await {
        warn!(scene = %scene, event = %name, error = %err, "Scene event failed");
    }
}

async fn stop_worker(scene: &SceneId, worker: &mut dyn SceneWorker) {
    if let Err(err) = worker.stop().await {
        warn!(scene = %scene, error = %err, "Scene worker did not stop cleanly");
    }
}
