use crate::compute::{LoadingInputs, WATCHED_SLICES, compute};
use crate::error::LoadingScreenError;
use plaza_domain::renderer::LoadingScreen;
use plaza_kernel::{HostContext, Renderer};
use plaza_world_state::{ChangeReceiverExt, StateChange, WorldState};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

struct Aggregator {
    world: WorldState,
    renderer: Arc<dyn Renderer>,
    inputs: LoadingInputs,
    last_revision: u64,
    screen: watch::Sender<LoadingScreen>,
}

impl Aggregator {
    fn on_change(&mut self, change: StateChange) {
        if change.revision <= self.last_revision {
            return;
        }
        let lagged = change.revision > self.last_revision + 1;
        self.last_revision = change.revision;

        if lagged {
            self.inputs = LoadingInputs::read(&self.world);
        } else if change.concerns(&WATCHED_SLICES) {
            self.inputs.refresh(&self.world, &change);
        } else {
            return;
        }
        self.recompute();
    }

    fn recompute(&mut self) {
        let screen = compute(&self.inputs);
        trace!(visible = screen.is_visible, message = %screen.message, "Loading screen recomputed");

        if let Err(err) = self.renderer.set_loading_screen(&screen) {
            warn!(error = %err, "Renderer rejected loading screen");
        }
        self.screen.send_replace(screen);
    }
}

/// Keeps the renderer's loading screen in sync with the client state.
///
/// The subscription to the change stream is released when the aggregator is stopped or dropped.
#[derive(Debug)]
pub struct LoadingScreenAggregator {
    task: JoinHandle<()>,
    screen: watch::Receiver<LoadingScreen>,
}

impl LoadingScreenAggregator {
    /// Subscribes to the world state, pushes the current decision once, then follows changes.
    ///
    /// # Errors
    /// Returns [`LoadingScreenError::State`] if the world state was already shut down.
    pub fn start(
        world: WorldState,
        renderer: Arc<dyn Renderer>,
    ) -> Result<Self, LoadingScreenError> {
        let mut changes = world.changes()?;
        let last_revision = world.revision();
        let inputs = LoadingInputs::read(&world);
        let (tx, screen) = watch::channel(LoadingScreen::initial());

        let mut aggregator = Aggregator { world, renderer, inputs, last_revision, screen: tx };
        aggregator.recompute();

        let task = tokio::spawn(async move {
            while let Some(change) = changes.next_change().await {
                aggregator.on_change(change);
            }
            debug!("Loading screen aggregator finished: world state closed");
        });

        debug!("Loading screen aggregator started");
        Ok(Self { task, screen })
    }

    /// # Errors
    /// Returns [`LoadingScreenError::State`] if the world state was already shut down.
    pub fn from_context(ctx: &HostContext) -> Result<Self, LoadingScreenError> {
        Self::start(ctx.world.clone(), Arc::clone(&ctx.renderer))
    }

    /// The last decision pushed to the renderer.
    #[must_use]
    pub fn current(&self) -> LoadingScreen {
        self.screen.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<LoadingScreen> {
        self.screen.clone()
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    pub fn stop(&self) {
        self.task.abort();
    }
}

impl Drop for LoadingScreenAggregator {
    fn drop(&mut self) {
        self.task.abort();
    }
}
