use plaza_domain::renderer::LoadingScreen;
use plaza_kernel::state::{LoadingState, RenderState, RendererState, SessionState};
use plaza_world_state::{StateChange, StateSlice, WorldState};
use std::sync::Arc;

/// Slices the loading screen is recomputed on.
pub const WATCHED_SLICES: [&str; 4] =
    [LoadingState::NAME, SessionState::NAME, RendererState::NAME, RenderState::NAME];

/// Cached copies of the aggregator inputs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadingInputs {
    pub loading: Option<Arc<LoadingState>>,
    pub session: Option<Arc<SessionState>>,
    pub renderer: Option<Arc<RendererState>>,
    pub render: Option<Arc<RenderState>>,
}

impl LoadingInputs {
    /// Reads every input from the store.
    #[must_use]
    pub fn read(world: &WorldState) -> Self {
        Self {
            loading: world.current(),
            session: world.current(),
            renderer: world.current(),
            render: world.current(),
        }
    }

    /// Refreshes the input named by `change`. Returns false for unrelated slices.
    pub fn refresh(&mut self, world: &WorldState, change: &StateChange) -> bool {
        let slice = change.slice;
        if slice == LoadingState::NAME {
            self.loading = world.current();
        } else if slice == SessionState::NAME {
            self.session = world.current();
        } else if slice == RendererState::NAME {
            self.renderer = world.current();
        } else if slice == RenderState::NAME {
            self.render = world.current();
        } else {
            return false;
        }
        true
    }

    /// True while none of the inputs was ever published.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.loading.is_none()
            && self.session.is_none()
            && self.renderer.is_none()
            && self.render.is_none()
    }
}

/// Derives the loading screen from the cached inputs. Pure.
#[must_use]
pub fn compute(inputs: &LoadingInputs) -> LoadingScreen {
    if inputs.is_empty() {
        return LoadingScreen::initial();
    }

    let loading = inputs.loading.as_deref().cloned().unwrap_or_default();
    let parcel_loading_started = inputs.renderer.as_deref().is_some_and(|r| r.parcel_loading_started);

    LoadingScreen {
        is_visible: loading.is_active(),
        message: loading.display_message().to_owned(),
        show_tips: loading.initial_load || !parcel_loading_started,
    }
}
