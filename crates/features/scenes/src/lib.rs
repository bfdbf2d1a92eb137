//! Scene lifecycle orchestration.
//!
//! The [`SceneEngine`] keeps one sandbox running per scene near the player, plus the global
//! scenes started at initialization. Position updates drive a diff of the desired scene set
//! against the tracked one; the settlement gate holds rendering until the destination is ready.

mod catalog;
mod engine;
mod error;
mod orchestrator;
mod sandbox;
mod spatial;

pub use catalog::{SceneCatalog, StaticCatalog};
pub use engine::{EngineHandle, SceneEngine};
pub use error::{ScenesError, ScenesErrorExt};
pub use orchestrator::{Plan, TrackedEntry, plan};
pub use sandbox::{
    InertWorker, InertWorkerFactory, SandboxCommand, SandboxContext, SandboxEvent,
    SandboxEventKind, SandboxHandle, SandboxLimits, SceneWorker, WorkerFactory, WorkerFut,
};
pub use spatial::parcels_in_range;
