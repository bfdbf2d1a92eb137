//! Client state slices published through the world-state store.

use fxhash::FxHashMap;
use plaza_domain::scene::{Position, SceneId, SceneLifecycle};
use plaza_world_state::StateSlice;

/// Loading progress as reported by the loading subsystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadingState {
    pub status: String,
    pub message: String,
    /// True until the first settlement ever.
    pub initial_load: bool,
    pub show_loading_screen: bool,
}

impl Default for LoadingState {
    fn default() -> Self {
        Self {
            status: String::new(),
            message: String::new(),
            initial_load: true,
            show_loading_screen: false,
        }
    }
}

impl LoadingState {
    /// Whether a load is in progress and the screen must cover the world.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.initial_load || self.show_loading_screen
    }

    /// Message to display, falling back to the status.
    #[must_use]
    pub fn display_message(&self) -> &str {
        if self.message.is_empty() { &self.status } else { &self.message }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionStatus {
    #[default]
    Initializing,
    Ready,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionState {
    pub status: SessionStatus,
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RendererState {
    pub initialized: bool,
    pub parcel_loading_started: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderState {
    pub rendering_active: bool,
}

/// Position settlement, owned by the settlement gate.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum SettlementState {
    /// Nothing in flight and no position known yet.
    #[default]
    Settled,
    Unsettling { target: Position },
    SettledAt { position: Position },
}

impl SettlementState {
    #[must_use]
    pub const fn target(&self) -> Option<Position> {
        match self {
            Self::Unsettling { target } => Some(*target),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_unsettled(&self) -> bool {
        matches!(self, Self::Unsettling { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneFailure {
    pub id: SceneId,
    pub reason: String,
}

/// Read-only view of the scenes tracked by the engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SceneSnapshot {
    pub scenes: FxHashMap<SceneId, SceneLifecycle>,
    pub failures: Vec<SceneFailure>,
}

impl SceneSnapshot {
    #[must_use]
    pub fn state_of(&self, id: &str) -> SceneLifecycle {
        self.scenes.get(id).copied().unwrap_or_default()
    }

    #[must_use]
    pub fn failed(&self, id: &str) -> bool {
        self.failures.iter().any(|failure| failure.id.as_str() == id)
    }

    /// Number of scenes in the given state.
    #[must_use]
    pub fn count(&self, state: SceneLifecycle) -> usize {
        self.scenes.values().filter(|s| **s == state).count()
    }
}

impl StateSlice for LoadingState {
    const NAME: &'static str = "loading";
}

impl StateSlice for SessionState {
    const NAME: &'static str = "session";
}

impl StateSlice for RendererState {
    const NAME: &'static str = "renderer";
}

impl StateSlice for RenderState {
    const NAME: &'static str = "render";
}

impl StateSlice for SettlementState {
    const NAME: &'static str = "settlement";
}

impl StateSlice for SceneSnapshot {
    const NAME: &'static str = "scenes";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loading_message_falls_back_to_status() {
        let mut loading =
            LoadingState { status: "Fetching".into(), ..LoadingState::default() };
        assert_eq!(loading.display_message(), "Fetching");
        loading.message = "Teleporting to 1, 2".into();
        assert_eq!(loading.display_message(), "Teleporting to 1, 2");
    }

    #[test]
    fn loading_activity() {
        let mut loading = LoadingState::default();
        assert!(loading.is_active());
        loading.initial_load = false;
        assert!(!loading.is_active());
        loading.show_loading_screen = true;
        assert!(loading.is_active());
    }

    #[test]
    fn unknown_scenes_are_unloaded() {
        let snapshot = SceneSnapshot::default();
        assert_eq!(snapshot.state_of("nowhere"), SceneLifecycle::Unloaded);
        assert!(!snapshot.failed("nowhere"));
    }
}
