#![allow(dead_code)]

use parking_lot::Mutex;
use plaza_capabilities::CapabilityRegistry;
use plaza_kernel::HostContext;
use plaza_kernel::domain::config::ClientConfig;
use plaza_kernel::domain::scene::{Parcel, SceneDescriptor, SceneId};
use plaza_kernel::players::MemoryPresence;
use plaza_kernel::state::SceneSnapshot;
use plaza_kernel::testing::RecordingRenderer;
use plaza_kernel::{PositionEvent, domain::scene::Position};
use plaza_scenes::{
    EngineHandle, SandboxContext, SceneEngine, SceneWorker, ScenesError, StaticCatalog,
    WorkerFactory, WorkerFut,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};

pub fn scene(id: &str, parcels: &[(i32, i32)]) -> SceneDescriptor {
    SceneDescriptor {
        id: id.into(),
        parcels: parcels.iter().map(|(x, y)| Parcel::new(*x, *y)).collect(),
        main: "bin/game.js".into(),
        name: id.into(),
        base_url: "https://content.example/".into(),
        mappings: Vec::new(),
        is_global: false,
    }
}

pub fn at(x: i32, y: i32) -> Position {
    Parcel::new(x, y).origin()
}

/// How a scripted worker behaves.
#[derive(Debug, Clone)]
pub enum Script {
    Ready,
    FailStart(String),
    /// Ready once the sender publishes `true`.
    Hold(watch::Receiver<bool>),
    /// Calls a capability while starting and records the response.
    Call(String),
    Panic(String),
}

#[derive(Debug, Default)]
pub struct ScriptedFactory {
    scripts: Mutex<HashMap<String, Script>>,
    refused: Mutex<Vec<String>>,
    pub created: Mutex<Vec<SceneId>>,
    pub started: Arc<Mutex<Vec<SceneId>>>,
    pub stopped: Arc<Mutex<Vec<SceneId>>>,
    pub responses: Arc<Mutex<Vec<serde_json::Value>>>,
}

impl ScriptedFactory {
    pub fn script(&self, id: &str, script: Script) {
        self.scripts.lock().insert(id.to_owned(), script);
    }

    pub fn refuse(&self, id: &str) {
        self.refused.lock().push(id.to_owned());
    }

    pub fn created_count(&self, id: &str) -> usize {
        self.created.lock().iter().filter(|s| s.as_str() == id).count()
    }
}

struct ScriptedWorker {
    id: SceneId,
    script: Script,
    started: Arc<Mutex<Vec<SceneId>>>,
    stopped: Arc<Mutex<Vec<SceneId>>>,
    responses: Arc<Mutex<Vec<serde_json::Value>>>,
}

impl SceneWorker for ScriptedWorker {
    fn start(&mut self, ctx: SandboxContext) -> WorkerFut<'_> {
        Box::pin(async move {
            self.started.lock().push(self.id.clone());
            match &mut self.script {
                Script::Ready => Ok(()),
                Script::Panic(message) => panic!("{message}"),
                Script::FailStart(reason) => Err(ScenesError::SceneLoadFailure {
                    message: reason.clone().into(),
                    context: None,
                }),
                Script::Hold(release) => {
                    let _ = release.wait_for(|released| *released).await;
                    Ok(())
                },
                Script::Call(method) => {
                    let response = ctx.capabilities.call(method.clone(), serde_json::Value::Null).await;
                    self.responses.lock().push(serde_json::to_value(&response).unwrap_or_default());
                    Ok(())
                },
            }
        })
    }

    fn stop(&mut self) -> WorkerFut<'_> {
        Box::pin(async move {
            self.stopped.lock().push(self.id.clone());
            Ok(())
        })
    }
}

impl WorkerFactory for ScriptedFactory {
    fn create(&self, scene: &Arc<SceneDescriptor>) -> Result<Box<dyn SceneWorker>, ScenesError> {
        if self.refused.lock().iter().any(|id| id == scene.id.as_str()) {
            return Err(ScenesError::SceneLoadFailure {
                message: "worker refused".into(),
                context: Some(scene.id.to_string().into()),
            });
        }
        self.created.lock().push(scene.id.clone());
        let script = self.scripts.lock().get(scene.id.as_str()).cloned().unwrap_or(Script::Ready);
        Ok(Box::new(ScriptedWorker {
            id: scene.id.clone(),
            script,
            started: Arc::clone(&self.started),
            stopped: Arc::clone(&self.stopped),
            responses: Arc::clone(&self.responses),
        }))
    }
}

pub struct Harness {
    pub ctx: HostContext,
    pub renderer: Arc<RecordingRenderer>,
    pub factory: Arc<ScriptedFactory>,
    pub presence: Arc<MemoryPresence>,
    pub positions: mpsc::Sender<PositionEvent>,
    pub engine: EngineHandle,
}

pub fn harness(scenes: Vec<SceneDescriptor>, configure: impl FnOnce(&mut ClientConfig)) -> Harness {
    let mut config = ClientConfig::default();
    config.scenes.load_radius = 1;
    configure(&mut config);

    let renderer = Arc::new(RecordingRenderer::new());
    let presence = Arc::new(MemoryPresence::new());
    let ctx = HostContext::builder()
        .config(config)
        .renderer(renderer.clone())
        .presence(presence.clone())
        .build()
        .expect("host context");

    let registry = CapabilityRegistry::new();
    plaza_capabilities::init(&ctx, &registry).expect("capabilities");

    let factory = Arc::new(ScriptedFactory::default());
    let catalog = Arc::new(StaticCatalog::new(scenes));
    let (positions, rx) = mpsc::channel(16);
    let engine = SceneEngine::new(&ctx, catalog, factory.clone(), registry).spawn(rx);

    Harness { ctx, renderer, factory, presence, positions, engine }
}

impl Harness {
    pub async fn send(&self, event: PositionEvent) {
        self.positions.send(event).await.expect("engine running");
    }

    pub fn snapshot(&self) -> Arc<SceneSnapshot> {
        self.ctx.world.current::<SceneSnapshot>().unwrap_or_default()
    }

    /// Waits until the published scene snapshot satisfies `condition`.
    pub async fn until(&self, mut condition: impl FnMut(&SceneSnapshot) -> bool) {
        until(|| condition(&self.snapshot())).await;
    }
}

pub async fn until(mut condition: impl FnMut() -> bool) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !condition() {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("condition not reached in time");
}

pub async fn idle() {
    for _ in 0..32 {
        tokio::task::yield_now().await;
    }
}
