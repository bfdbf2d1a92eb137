//! Facade crate for the scene host.
//! Re-exports domain/kernel primitives and aggregates feature initialization.
//! Keep this crate thin: it should compose other crates, not implement business logic.
//!
//! ## Usage
//! - Build a [`kernel::HostContext`] with the renderer and the profile/presence stores.
//! - Call [`init`] with a scene catalog, a worker factory and the position stream.

mod error;

pub use error::{PlazaError, PlazaErrorExt};
pub use plaza_domain as domain;
pub use plaza_kernel as kernel;

use plaza_capabilities::{ApiManifest, CapabilityRegistry};
use plaza_domain::renderer::DebugConfigForRenderer;
use plaza_kernel::state::RendererState;
use plaza_kernel::{HostContext, PositionEvent};
use plaza_loading_screen::LoadingScreenAggregator;
use plaza_scenes::{EngineHandle, SceneCatalog, SceneEngine, WorkerFactory};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Feature registry for runtime introspection.
pub mod features {
    pub use plaza_capabilities as capabilities;
    pub use plaza_loading_screen as loading_screen;
    pub use plaza_scenes as scenes;
    pub use plaza_settlement as settlement;

    /// Feature slices composed by [`crate::init`].
    pub const ENABLED: &[&str] = &["capabilities", "loading_screen", "scenes", "settlement"];

    #[must_use]
    pub fn is_enabled(name: &str) -> bool {
        ENABLED.contains(&name)
    }
}

/// The running host: capability surface, loading screen and scene engine.
#[derive(Debug)]
pub struct Host {
    pub registry: CapabilityRegistry,
    pub manifests: Vec<ApiManifest>,
    pub loading_screen: LoadingScreenAggregator,
    pub engine: EngineHandle,
}

impl Host {
    /// Stops the scene engine and the loading screen aggregator.
    ///
    /// # Errors
    /// Returns [`PlazaError::Scenes`] if the engine was already gone.
    pub async fn shutdown(self) -> Result<(), PlazaError> {
        self.loading_screen.stop();
        self.engine.shutdown().await?;
        info!("Host stopped");
        Ok(())
    }
}

/// Initializes the renderer and starts every feature.
///
/// # Process
/// 1. `init` (marks the renderer initialized), `deactivate_rendering`, kernel configuration
/// 2. Debug toggles enabled in `[debug]`
/// 3. Host APIs exposed on a fresh capability registry
/// 4. Loading screen aggregation, with one initial recomputation
/// 5. Scene engine, the catalog's global scenes, then the avatars global scene unless
///    `debug.editor` is set
///
/// # Errors
/// Fails on the first rejected renderer command or feature initialization error.
pub async fn init(
    ctx: &HostContext,
    catalog: Arc<dyn SceneCatalog>,
    factory: Arc<dyn WorkerFactory>,
    positions: mpsc::Receiver<PositionEvent>,
) -> Result<Host, PlazaError> {
    init_renderer(ctx)?;

    let registry = CapabilityRegistry::new();
    let manifests = plaza_capabilities::init(ctx, &registry)?;
    let loading_screen = plaza_loading_screen::init(ctx)?;
    let globals = catalog.globals();
    let engine = SceneEngine::new(ctx, catalog, factory, registry.clone()).spawn(positions);

    for scene in globals {
        debug!(scene = %scene.id, "Starting catalog global scene");
        engine.start_global(scene).await?;
    }
    if ctx.config.debug.editor {
        debug!("Editor mode, avatars scene skipped");
    } else {
        engine.start_global(Arc::new(ctx.config.avatars_scene())).await?;
    }

    info!(session = %ctx.session_id, apis = manifests.len(), "Host initialized");
    Ok(Host { registry, manifests, loading_screen, engine })
}

fn init_renderer(ctx: &HostContext) -> Result<(), PlazaError> {
    let renderer = &ctx.renderer;
    let debug = &ctx.config.debug;
    let kernel_config = ctx.config.kernel_config(&ctx.game);

    renderer.init(&ctx.game).context("init")?;
    if let Err(err) = ctx.world.update::<RendererState, _>(|state| state.initialized = true) {
        warn!(error = %err, "Renderer state not published");
    }
    renderer.deactivate_rendering().context("deactivate_rendering")?;
    renderer.set_kernel_configuration(&kernel_config).context("set_kernel_configuration")?;

    if debug.debug {
        renderer.set_debug().context("set_debug")?;
    }
    if debug.scene_debug_panel {
        let mut with_panel = kernel_config;
        with_panel.debug_config = Some(DebugConfigForRenderer { scene_debug_panel_enabled: true });
        renderer.set_kernel_configuration(&with_panel).context("set_kernel_configuration")?;
        renderer.set_scene_debug_panel().context("set_scene_debug_panel")?;
    }
    if debug.show_fps {
        renderer.show_fps_panel().context("show_fps_panel")?;
    }
    if debug.engine_debug_panel {
        renderer.set_engine_debug_panel().context("set_engine_debug_panel")?;
    }

    debug!(game = %ctx.game.name, "Renderer initialized");
    Ok(())
}
