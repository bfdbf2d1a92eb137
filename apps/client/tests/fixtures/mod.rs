#![allow(dead_code)]

use plaza::domain::config::ClientConfig;
use plaza::domain::scene::{Parcel, Position, SceneDescriptor};
use plaza::features::scenes::{
    SandboxContext, SceneWorker, ScenesError, WorkerFactory, WorkerFut,
};
use plaza::kernel::HostContext;
use plaza::kernel::state::SettlementState;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

pub fn scene(id: &str, x: i32, y: i32) -> SceneDescriptor {
    SceneDescriptor {
        id: id.into(),
        parcels: vec![Parcel::new(x, y)],
        main: "bin/game.js".into(),
        name: id.into(),
        base_url: "https://content.example/".into(),
        mappings: Vec::new(),
        is_global: false,
    }
}

/// Spawn scene at the origin and a `home` scene out of load range.
pub fn config() -> ClientConfig {
    let mut config = ClientConfig::default();
    config.scenes.load_radius = 1;
    config.catalog.scenes = vec![scene("spawn", 0, 0), scene("home", 6, 6)];
    config
}

pub fn at(x: i32, y: i32) -> Position {
    Parcel::new(x, y).origin()
}

pub fn settled_at(ctx: &HostContext) -> Option<Position> {
    match ctx.world.current::<SettlementState>().as_deref() {
        Some(SettlementState::SettledAt { position }) => Some(*position),
        _ => None,
    }
}

/// Workers for the listed scenes become ready only once the gate opens.
#[derive(Debug)]
pub struct GatedFactory {
    gated: Vec<String>,
    open: watch::Receiver<bool>,
}

impl GatedFactory {
    pub fn new(gated: &[&str], open: watch::Receiver<bool>) -> Self {
        Self { gated: gated.iter().map(|id| (*id).to_owned()).collect(), open }
    }
}

impl WorkerFactory for GatedFactory {
    fn create(&self, scene: &Arc<SceneDescriptor>) -> Result<Box<dyn SceneWorker>, ScenesError> {
        let gated = self.gated.iter().any(|id| id == scene.id.as_str());
        Ok(Box::new(GatedWorker { open: gated.then(|| self.open.clone()) }))
    }
}

struct GatedWorker {
    open: Option<watch::Receiver<bool>>,
}

impl SceneWorker for GatedWorker {
    fn start(&mut self, _ctx: SandboxContext) -> WorkerFut<'_> {
        Box::pin(async move {
            if let Some(open) = self.open.as_mut() {
                open.wait_for(|open| *open).await.map_err(|err| ScenesError::Internal {
                    message: err.to_string().into(),
                    context: None,
                })?;
            }
            Ok(())
        })
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
