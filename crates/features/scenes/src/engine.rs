//! The scene engine: a single task reacting to position updates, sandbox reports and control
//! requests, one at a time.

use crate::catalog::SceneCatalog;
use crate::error::ScenesError;
use crate::orchestrator::{TrackedEntry, plan};
use crate::sandbox::{
    SandboxEvent, SandboxEventKind, SandboxHandle, SandboxLimits, SceneWorker, WorkerFactory,
};
use crate::spatial::parcels_in_range;
use fxhash::{FxHashMap, FxHashSet};
use plaza_capabilities::CapabilityRegistry;
use plaza_domain::renderer::{GlobalSceneSpec, LoadableScene};
use plaza_domain::scene::{Parcel, SceneDescriptor, SceneId, SceneLifecycle};
use plaza_kernel::state::{RendererState, SceneFailure, SceneSnapshot};
use plaza_kernel::{HostContext, PositionEvent};
use plaza_settlement::SettlementGate;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, error, info, trace, warn};

#[derive(Debug)]
enum Control {
    StartGlobal { scene: Arc<SceneDescriptor>, reply: oneshot::Sender<Result<(), ScenesError>> },
    Shutdown { reply: oneshot::Sender<()> },
}

#[derive(Debug)]
struct Tracked {
    descriptor: Arc<SceneDescriptor>,
    state: SceneLifecycle,
    sandbox: SandboxHandle,
}

/// Owns every sandbox and the tracked scene set.
///
/// Built on the caller's side, then moved into its own task by [`SceneEngine::spawn`].
#[derive(Debug)]
pub struct SceneEngine {
    ctx: HostContext,
    catalog: Arc<dyn SceneCatalog>,
    factory: Arc<dyn WorkerFactory>,
    registry: CapabilityRegistry,
    gate: SettlementGate,
    limits: SandboxLimits,
    load_radius: u32,
    center: Option<Parcel>,
    desired: Vec<Arc<SceneDescriptor>>,
    tracked: FxHashMap<SceneId, Tracked>,
    failures: FxHashMap<SceneId, String>,
}

impl SceneEngine {
    #[must_use]
    pub fn new(
        ctx: &HostContext,
        catalog: Arc<dyn SceneCatalog>,
        factory: Arc<dyn WorkerFactory>,
        registry: CapabilityRegistry,
    ) -> Self {
        Self {
            gate: SettlementGate::from_context(ctx),
            limits: SandboxLimits {
                command_capacity: ctx.config.sandbox.command_capacity,
                capability_capacity: ctx.config.sandbox.capability_capacity,
            },
            load_radius: ctx.config.scenes.load_radius,
            ctx: ctx.clone(),
            catalog,
            factory,
            registry,
            center: None,
            desired: Vec::new(),
            tracked: FxHashMap::default(),
            failures: FxHashMap::default(),
        }
    }

    /// Starts the engine task, consuming position updates from `positions`.
    ///
    /// Parcel scene loading is announced as started right away.
    #[must_use]
    pub fn spawn(self, positions: mpsc::Receiver<PositionEvent>) -> EngineHandle {
        let (control, control_rx) = mpsc::channel(8);
        let task = tokio::spawn(self.run(positions, control_rx));
        EngineHandle { control, task }
    }

    async fn run(
        mut self,
        mut positions: mpsc::Receiver<PositionEvent>,
        mut control: mpsc::Receiver<Control>,
    ) {
        let (events_tx, mut events) = mpsc::unbounded_channel();
        self.announce_parcel_loading();
        self.publish_snapshot();
        info!(radius = self.load_radius, "Scene engine started");

        let mut positions_open = true;
        loop {
            let deadline = self.gate.deadline();
            tokio::select! {
                event = positions.recv(), if positions_open => match event {
                    Some(event) => self.on_position(&event),
                    None => {
                        debug!("Position source closed");
                        positions_open = false;
                    },
                },
                Some(event) = events.recv() => self.on_sandbox(event),
                command = control.recv() => match command {
                    Some(Control::StartGlobal { scene, reply }) => {
                        let result = self.start_global(scene, &events_tx);
                        let _ = reply.send(result);
                    },
                    Some(Control::Shutdown { reply }) => {
                        self.shutdown();
                        let _ = reply.send(());
                        break;
                    },
                    None => {
                        self.shutdown();
                        break;
                    },
                },
                () = deadline_elapsed(deadline) => {
                    if let Err(err) = self.gate.on_deadline(Instant::now()) {
                        warn!(error = %err, "Settlement on timeout failed");
                    }
                },
            }

            self.reconcile(&events_tx);
            self.check_settlement();
            self.publish_snapshot();
        }

        info!("Scene engine stopped");
    }

    fn announce_parcel_loading(&self) {
        let result = self
            .ctx
            .world
            .update::<RendererState, _>(|renderer| renderer.parcel_loading_started = true);
        if let Err(err) = result {
            warn!(error = %err, "Parcel loading signal not published");
        }
    }

    fn on_position(&mut self, event: &PositionEvent) {
        trace!(?event, "Position event");
        let result = match event {
            PositionEvent::Moved { .. } => Ok(()),
            PositionEvent::TeleportRequested { target, .. } => {
                let message = event.teleport_message().unwrap_or_default();
                self.gate.request_teleport(*target, &message)
            },
            PositionEvent::Unsettled { target } => self.gate.unsettle(*target),
            // The source's final position replaces a pending target.
            PositionEvent::Settled { position } if self.gate.state().is_unsettled() => {
                self.gate.unsettle(*position)
            },
            PositionEvent::Settled { .. } => Ok(()),
        };
        if let Err(err) = result {
            warn!(error = %err, "Settlement transition rolled back");
        }

        self.move_to(event.position().parcel());
    }

    fn move_to(&mut self, parcel: Parcel) {
        if self.center == Some(parcel) {
            return;
        }
        self.center = Some(parcel);
        self.desired = self.catalog.scenes_at(&parcels_in_range(parcel, self.load_radius));

        let desired: FxHashSet<&SceneId> = self.desired.iter().map(|scene| &scene.id).collect();
        self.failures.retain(|id, _| desired.contains(id) || self.tracked.contains_key(id));
        debug!(parcel = %parcel, desired = self.desired.len(), "Desired scene set updated");
    }

    fn reconcile(&mut self, events: &mpsc::UnboundedSender<SandboxEvent>) {
        let view: FxHashMap<SceneId, TrackedEntry> = self
            .tracked
            .iter()
            .map(|(id, tracked)| {
                let entry =
                    TrackedEntry { state: tracked.state, is_global: tracked.descriptor.is_global };
                (id.clone(), entry)
            })
            .collect();
        let failed: FxHashSet<SceneId> = self.failures.keys().cloned().collect();

        let plan = plan(&self.desired, &view, &failed);
        if plan.is_empty() {
            return;
        }

        for id in &plan.unload {
            self.unload(id);
        }
        if !plan.load.is_empty() {
            self.load(plan.load, events);
        }
    }

    /// Creates the workers of a batch, then announces the scenes that got one in a single
    /// renderer batch. Scenes whose worker is refused fail without reaching the renderer.
    fn load(&mut self, batch: Vec<Arc<SceneDescriptor>>, events: &mpsc::UnboundedSender<SandboxEvent>) {
        let mut created = Vec::with_capacity(batch.len());
        for scene in batch {
            match self.factory.create(&scene) {
                Ok(worker) => created.push((scene, worker)),
                Err(err) => self.record_failure(&scene, &err.to_string()),
            }
        }
        if created.is_empty() {
            return;
        }

        let scenes: Vec<LoadableScene> =
            created.iter().map(|(scene, _)| scene.as_ref().into()).collect();
        if let Err(err) = self.ctx.renderer.load_scenes(&scenes) {
            warn!(count = scenes.len(), error = %err, "Renderer rejected scene batch, scenes stay unloaded");
            return;
        }

        for (scene, worker) in created {
            self.spawn_sandbox(scene, worker, events);
        }
    }

    fn spawn_sandbox(
        &mut self,
        scene: Arc<SceneDescriptor>,
        worker: Box<dyn SceneWorker>,
        events: &mpsc::UnboundedSender<SandboxEvent>,
    ) {
        let sandbox = SandboxHandle::spawn(
            Arc::clone(&scene),
            worker,
            self.registry.clone(),
            self.limits,
            events.clone(),
        );

        debug!(scene = %scene.id, global = scene.is_global, "Scene loading");
        self.tracked.insert(
            scene.id.clone(),
            Tracked { descriptor: scene, state: SceneLifecycle::Loading, sandbox },
        );
    }

    fn unload(&mut self, id: &SceneId) {
        let Some(tracked) = self.tracked.get_mut(id) else {
            return;
        };
        if let Err(err) = self.ctx.renderer.unload_scene(id) {
            warn!(scene = %id, state = ?tracked.state, error = %err, "Renderer rejected unload, scene kept");
            return;
        }

        debug!(scene = %id, from = ?tracked.state, "Scene unloading");
        tracked.state = SceneLifecycle::Unloading;
        tracked.sandbox.stop();
    }

    fn start_global(
        &mut self,
        scene: Arc<SceneDescriptor>,
        events: &mpsc::UnboundedSender<SandboxEvent>,
    ) -> Result<(), ScenesError> {
        if !scene.is_global {
            return Err(ScenesError::SceneLoadFailure {
                message: format!("{} is not a global scene", scene.id).into(),
                context: None,
            });
        }
        if self.tracked.contains_key(&scene.id) {
            debug!(scene = %scene.id, "Global scene already running");
            return Ok(());
        }

        match self.factory.create(&scene) {
            Ok(worker) => {
                self.spawn_sandbox(scene, worker, events);
                Ok(())
            },
            Err(err) => {
                self.record_failure(&scene, &err.to_string());
                Err(err)
            },
        }
    }

    fn on_sandbox(&mut self, event: SandboxEvent) {
        let SandboxEvent { scene: id, kind } = event;
        match kind {
            SandboxEventKind::Ready => self.on_ready(&id),
            SandboxEventKind::Failed { reason } => {
                let Some(tracked) = self.tracked.remove(&id) else {
                    return;
                };
                if tracked.state == SceneLifecycle::Unloading {
                    debug!(scene = %id, "Scene failed while unloading");
                    return;
                }
                self.record_failure(&tracked.descriptor, &reason);
                if !tracked.descriptor.is_global {
                    self.unload_from_renderer(&id);
                }
            },
            SandboxEventKind::Stopped => {
                let Some(tracked) = self.tracked.remove(&id) else {
                    return;
                };
                if tracked.state.is_running() && !tracked.descriptor.is_global {
                    warn!(scene = %id, state = ?tracked.state, "Scene stopped on its own");
                    self.unload_from_renderer(&id);
                }
                debug!(scene = %id, "Scene unloaded");
            },
        }
    }

    fn on_ready(&mut self, id: &SceneId) {
        let Some(tracked) = self.tracked.get_mut(id) else {
            return;
        };
        if tracked.state != SceneLifecycle::Loading {
            trace!(scene = %id, state = ?tracked.state, "Late readiness ignored");
            return;
        }
        tracked.state = SceneLifecycle::Active;
        info!(scene = %id, "Scene active");

        if !tracked.descriptor.is_global {
            return;
        }
        let spec = GlobalSceneSpec::from(tracked.descriptor.as_ref());
        if let Err(err) = self.ctx.renderer.create_global_scene(&spec) {
            warn!(scene = %id, error = %err, "Renderer rejected global scene");
            tracked.state = SceneLifecycle::Unloading;
            tracked.sandbox.stop();
            let descriptor = Arc::clone(&tracked.descriptor);
            self.record_failure(&descriptor, &err.to_string());
        }
    }

    fn record_failure(&mut self, scene: &SceneDescriptor, reason: &str) {
        error!(scene = %scene.id, reason, "Scene failed to load");
        self.failures.insert(scene.id.clone(), reason.to_owned());
    }

    fn unload_from_renderer(&self, id: &SceneId) {
        if let Err(err) = self.ctx.renderer.unload_scene(id) {
            warn!(scene = %id, error = %err, "Renderer rejected unload of failed scene");
        }
    }

    /// Settles once every scene on the target parcel is active or failed.
    fn check_settlement(&mut self) {
        let Some(target) = self.gate.target() else {
            return;
        };

        let scenes = self.catalog.scenes_at(&[target.parcel()]);
        let ready = scenes.iter().all(|scene| {
            self.failures.contains_key(&scene.id)
                || self.tracked.get(&scene.id).is_some_and(|t| t.state == SceneLifecycle::Active)
        });
        if !ready {
            return;
        }
        if let Err(err) = self.gate.settle() {
            warn!(error = %err, "Settlement failed, rendering stays deactivated");
        }
    }

    fn publish_snapshot(&self) {
        let mut failures: Vec<SceneFailure> = self
            .failures
            .iter()
            .map(|(id, reason)| SceneFailure { id: id.clone(), reason: reason.clone() })
            .collect();
        failures.sort_by(|a, b| a.id.cmp(&b.id));

        let snapshot = SceneSnapshot {
            scenes: self.tracked.iter().map(|(id, t)| (id.clone(), t.state)).collect(),
            failures,
        };
        if let Err(err) = self.ctx.world.publish(snapshot) {
            trace!(error = %err, "Scene snapshot not published");
        }
    }

    fn shutdown(&mut self) {
        for tracked in self.tracked.values() {
            tracked.sandbox.stop();
        }
        info!(scenes = self.tracked.len(), "Stopping every sandbox");
        self.tracked.clear();
        self.publish_snapshot();
    }
}

async fn deadline_elapsed(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

/// Control side of a running [`SceneEngine`].
#[derive(Debug)]
pub struct EngineHandle {
    control: mpsc::Sender<Control>,
    task: JoinHandle<()>,
}

impl EngineHandle {
    /// Starts a global scene. Its renderer counterpart is created once the sandbox is ready.
    ///
    /// # Errors
    /// Returns [`ScenesError::SceneLoadFailure`] if the scene is not global or its worker
    /// could not be created, [`ScenesError::EngineStopped`] if the engine is gone.
    pub async fn start_global(&self, scene: Arc<SceneDescriptor>) -> Result<(), ScenesError> {
        let (reply, rx) = oneshot::channel();
        self.control
            .send(Control::StartGlobal { scene, reply })
            .await
            .map_err(|_| stopped())?;
        rx.await.map_err(|_| stopped())?
    }

    /// Stops every sandbox and the engine task.
    ///
    /// # Errors
    /// Returns [`ScenesError::EngineStopped`] if the engine was already gone.
    pub async fn shutdown(self) -> Result<(), ScenesError> {
        let (reply, rx) = oneshot::channel();
        self.control.send(Control::Shutdown { reply }).await.map_err(|_| stopped())?;
        rx.await.map_err(|_| stopped())?;
        // The task ends right after replying.
        let _ = self.task.await;
        Ok(())
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

fn stopped() -> ScenesError {
    ScenesError::EngineStopped { message: "scene engine task is not running".into(), context: None }
}
