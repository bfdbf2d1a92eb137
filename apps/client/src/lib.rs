//! # Plaza Client
//!
//! Headless scene host: wires the renderer, the player stores and the scene catalog into a
//! running [`plaza::Host`] and feeds it the player position.
//!
//! ## Example
//! ```no_run
//! use plaza::kernel::LoggingRenderer;
//! use plaza_client::Client;
//! use std::sync::Arc;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     Client::builder()
//!         .renderer(Arc::new(LoggingRenderer))
//!         .build()
//!         .await?
//!         .run()
//!         .await
//! }
//! ```

use anyhow::{Context, Result, anyhow};
use plaza::Host;
use plaza::domain::config::ClientConfig;
use plaza::domain::renderer::GameInstance;
use plaza::domain::scene::Position;
use plaza::features::scenes::{InertWorkerFactory, SceneCatalog, StaticCatalog, WorkerFactory};
use plaza::kernel::players::{PresenceTracker, ProfileStore};
use plaza::kernel::state::{SessionState, SessionStatus};
use plaza::kernel::{HostContext, PositionEvent, Renderer};
use std::sync::Arc;
use tokio::signal;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Position updates buffered between the position source and the scene engine.
const POSITION_CAPACITY: usize = 64;

/// A fluent builder for configuring and initializing the [`Client`].
#[must_use = "builders do nothing unless you call .build()"]
#[derive(Debug, Default)]
pub struct ClientBuilder {
    cfg: ClientConfig,
    game: GameInstance,
    user_id: Option<String>,
    renderer: Option<Arc<dyn Renderer>>,
    profiles: Option<Arc<dyn ProfileStore>>,
    presence: Option<Arc<dyn PresenceTracker>>,
    catalog: Option<Arc<dyn SceneCatalog>>,
    factory: Option<Arc<dyn WorkerFactory>>,
}

impl ClientBuilder {
    /// Set up the client's configuration.
    pub fn config(mut self, cfg: ClientConfig) -> Self {
        self.cfg = cfg;
        self
    }

    pub fn game(mut self, game: GameInstance) -> Self {
        self.game = game;
        self
    }

    /// The signed-in user, reported in the session state.
    pub fn user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn renderer(mut self, renderer: Arc<dyn Renderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    pub fn profiles(mut self, profiles: Arc<dyn ProfileStore>) -> Self {
        self.profiles = Some(profiles);
        self
    }

    pub fn presence(mut self, presence: Arc<dyn PresenceTracker>) -> Self {
        self.presence = Some(presence);
        self
    }

    /// Scene source. Defaults to the scenes listed under `[catalog]`.
    pub fn catalog(mut self, catalog: Arc<dyn SceneCatalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Sandbox worker source. Defaults to workers that are ready immediately.
    pub fn factory(mut self, factory: Arc<dyn WorkerFactory>) -> Self {
        self.factory = Some(factory);
        self
    }

    fn context(mut self) -> Result<(HostContext, Parts)> {
        if self.cfg.renderer.kernel_version.is_none() {
            self.cfg.renderer.kernel_version = Some(env!("CARGO_PKG_VERSION").to_owned());
        }

        let catalog = self.catalog.unwrap_or_else(|| {
            let scenes = self.cfg.catalog.scenes.iter().cloned().map(Arc::new);
            Arc::new(scenes.collect::<StaticCatalog>())
        });
        let factory = self.factory.unwrap_or_else(|| Arc::new(InertWorkerFactory));

        let renderer = self.renderer.ok_or_else(|| anyhow!("A renderer is required"))?;
        let mut builder =
            HostContext::builder().config(self.cfg).game(self.game).renderer(renderer);
        if let Some(profiles) = self.profiles {
            builder = builder.profiles(profiles);
        }
        if let Some(presence) = self.presence {
            builder = builder.presence(presence);
        }

        let ctx = builder.build().context("Invalid host configuration")?;
        Ok((ctx, Parts { catalog, factory, user_id: self.user_id }))
    }

    /// Consumes the builder and starts the host.
    ///
    /// # Process
    /// 1. Fills in the kernel version and the default catalog and worker factory
    /// 2. Builds the [`HostContext`]
    /// 3. Initializes the renderer and every feature through [`plaza::init`]
    /// 4. Marks the session ready and sends the spawn position
    ///
    /// # Errors
    /// Returns an error if no renderer was provided, the configuration is invalid, or the
    /// renderer rejects an initialization command.
    pub async fn build(self) -> Result<Client> {
        let (ctx, parts) = self.context()?;
        let spawn = ctx.config.spawn.parcel;

        info!(game = %ctx.game.name, spawn = %spawn, "Initializing client");

        let (positions, rx) = mpsc::channel(POSITION_CAPACITY);
        let host = plaza::init(&ctx, parts.catalog, parts.factory, rx)
            .await
            .context("Host bootstrap failed")?;

        ctx.world
            .publish(SessionState { status: SessionStatus::Ready, user_id: parts.user_id })
            .context("Failed to publish session state")?;

        let client = Client { ctx, host, positions };
        client.unsettle(spawn.origin()).await?;
        Ok(client)
    }
}

#[derive(Debug)]
struct Parts {
    catalog: Arc<dyn SceneCatalog>,
    factory: Arc<dyn WorkerFactory>,
    user_id: Option<String>,
}

/// A running scene host.
#[must_use = "call .run().await to keep the host alive"]
#[derive(Debug)]
pub struct Client {
    ctx: HostContext,
    host: Host,
    positions: mpsc::Sender<PositionEvent>,
}

impl Client {
    /// Returns a new [`ClientBuilder`] to configure the client.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    #[must_use]
    pub const fn context(&self) -> &HostContext {
        &self.ctx
    }

    #[must_use]
    pub const fn host(&self) -> &Host {
        &self.host
    }

    /// Feeds a position update to the scene engine.
    ///
    /// # Errors
    /// Returns an error if the scene engine has stopped.
    pub async fn send(&self, event: PositionEvent) -> Result<()> {
        self.positions.send(event).await.map_err(|_| anyhow!("Scene engine is not running"))
    }

    /// Requests a teleport; `label` replaces the default loading message.
    ///
    /// # Errors
    /// Returns an error if the scene engine has stopped.
    pub async fn teleport(&self, target: Position, label: Option<String>) -> Result<()> {
        self.send(PositionEvent::TeleportRequested { target, label }).await
    }

    /// # Errors
    /// Returns an error if the scene engine has stopped.
    pub async fn unsettle(&self, target: Position) -> Result<()> {
        self.send(PositionEvent::Unsettled { target }).await
    }

    /// Runs until the shutdown signal is received, then stops the host.
    ///
    /// # Errors
    /// Returns an error if the host fails to stop cleanly.
    pub async fn run(self) -> Result<()> {
        info!("Client running");
        shutdown_signal().await;
        self.shutdown().await
    }

    /// Stops the scene engine and closes the world state.
    ///
    /// # Errors
    /// Returns an error if the scene engine was already gone.
    pub async fn shutdown(self) -> Result<()> {
        let Self { ctx, host, positions } = self;
        drop(positions);

        host.shutdown().await.context("Host shutdown failed")?;
        let closed = ctx.world.shutdown();
        info!(slices = closed, "Client stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            },
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutdown signal received, stopping host");
}
