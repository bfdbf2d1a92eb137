use crate::players::{MemoryPresence, MemoryProfiles, PresenceTracker, ProfileStore};
use crate::renderer::Renderer;
use plaza_domain::config::ClientConfig;
use plaza_domain::renderer::GameInstance;
use plaza_world_state::WorldState;
use std::borrow::Cow;
use std::ops::Deref;
use std::sync::Arc;

#[plaza_derive::plaza_error]
pub enum HostContextError {
    #[error("Host context validation error{}: {message}", format_context(.context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

/// Shared handles every host component is built from.
#[derive(Debug)]
pub struct HostContextInner {
    /// Identifies this host process in logs; fresh for every context.
    pub session_id: String,
    pub config: ClientConfig,
    pub game: GameInstance,
    pub renderer: Arc<dyn Renderer>,
    pub profiles: Arc<dyn ProfileStore>,
    pub presence: Arc<dyn PresenceTracker>,
    pub world: WorldState,
}

/// Cheaply cloneable host context.
#[derive(Debug, Clone)]
pub struct HostContext {
    inner: Arc<HostContextInner>,
}

impl HostContext {
    #[must_use]
    pub fn builder() -> HostContextBuilder {
        HostContextBuilder::default()
    }
}

impl Deref for HostContext {
    type Target = HostContextInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

#[derive(Debug, Default)]
pub struct HostContextBuilder {
    config: Option<ClientConfig>,
    game: Option<GameInstance>,
    renderer: Option<Arc<dyn Renderer>>,
    profiles: Option<Arc<dyn ProfileStore>>,
    presence: Option<Arc<dyn PresenceTracker>>,
    world: Option<WorldState>,
}

impl HostContextBuilder {
    #[must_use]
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = Some(config);
        self
    }

    #[must_use]
    pub fn game(mut self, game: GameInstance) -> Self {
        self.game = Some(game);
        self
    }

    #[must_use]
    pub fn renderer(mut self, renderer: Arc<dyn Renderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    #[must_use]
    pub fn profiles(mut self, profiles: Arc<dyn ProfileStore>) -> Self {
        self.profiles = Some(profiles);
        self
    }

    #[must_use]
    pub fn presence(mut self, presence: Arc<dyn PresenceTracker>) -> Self {
        self.presence = Some(presence);
        self
    }

    #[must_use]
    pub fn world(mut self, world: WorldState) -> Self {
        self.world = Some(world);
        self
    }

    /// Builds the context. Profile and presence stores default to empty in-memory ones.
    ///
    /// # Errors
    /// Returns [`HostContextError::Validation`] without a renderer or with a zero
    /// `loading.change_capacity`.
    pub fn build(self) -> Result<HostContext, HostContextError> {
        let renderer = self.renderer.ok_or_else(|| HostContextError::Validation {
            message: "Renderer not provided".into(),
            context: None,
        })?;
        let config = self.config.unwrap_or_default();
        let world = match self.world {
            Some(world) => world,
            None => WorldState::with_capacity(config.loading.change_capacity).map_err(|e| {
                HostContextError::Validation {
                    message: e.to_string().into(),
                    context: Some("loading.change_capacity".into()),
                }
            })?,
        };

        Ok(HostContext {
            inner: Arc::new(HostContextInner {
                session_id: crate::safe_nanoid!(),
                config,
                game: self.game.unwrap_or_default(),
                renderer,
                profiles: self.profiles.unwrap_or_else(|| Arc::new(MemoryProfiles::new())),
                presence: self.presence.unwrap_or_else(|| Arc::new(MemoryPresence::new())),
                world,
            }),
        })
    }
}
