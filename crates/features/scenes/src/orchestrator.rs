//! Diffing of the desired scene set against the tracked one.

use fxhash::{FxHashMap, FxHashSet};
use plaza_domain::scene::{SceneDescriptor, SceneId, SceneLifecycle};
use std::sync::Arc;

/// What the planner needs to know about a tracked scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackedEntry {
    pub state: SceneLifecycle,
    pub is_global: bool,
}

/// One reconciliation step.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Plan {
    /// Scenes to start, in desired order. Dispatched as one batch.
    pub load: Vec<Arc<SceneDescriptor>>,
    /// Running scenes to stop.
    pub unload: Vec<SceneId>,
}

impl Plan {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.load.is_empty() && self.unload.is_empty()
    }
}

/// Computes which scenes to start and stop.
///
/// * Loads desired spatial scenes that are neither tracked nor excluded by a failure.
/// * Unloads running spatial scenes that left the desired set.
///
/// A scene is loaded only when untracked and unloaded only when tracked, so a plan never
/// both loads and unloads the same id. Global scenes are never part of a plan.
#[must_use]
pub fn plan(
    desired: &[Arc<SceneDescriptor>],
    tracked: &FxHashMap<SceneId, TrackedEntry>,
    failed: &FxHashSet<SceneId>,
) -> Plan {
    let mut wanted = FxHashSet::default();
    let mut load = Vec::new();

    for scene in desired.iter().filter(|scene| !scene.is_global) {
        if !wanted.insert(&scene.id) {
            continue;
        }
        if !tracked.contains_key(&scene.id) && !failed.contains(&scene.id) {
            load.push(Arc::clone(scene));
        }
    }

    let mut unload: Vec<SceneId> = tracked
        .iter()
        .filter(|(id, entry)| !entry.is_global && entry.state.is_running() && !wanted.contains(id))
        .map(|(id, _)| id.clone())
        .collect();
    unload.sort();

    Plan { load, unload }
}
