//! The renderer collaborator: a command sink the host drives.

use plaza_domain::renderer::{
    GameInstance, GlobalSceneSpec, KernelConfigForRenderer, LoadableScene, LoadingScreen,
};
use plaza_domain::scene::{Position, SceneId};
use std::borrow::Cow;
use std::fmt::Debug;
use tracing::{debug, info};

#[plaza_derive::plaza_error]
pub enum RendererError {
    /// The renderer refused the command.
    #[error("Renderer rejected command{}: {message}", format_context(.context))]
    Rejected { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The renderer is not connected.
    #[error("Renderer unavailable{}: {message}", format_context(.context))]
    Unavailable { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

/// Commands the host issues to the 3D renderer.
///
/// Implementations must be cheap and non-blocking; they are called from the scene engine task.
pub trait Renderer: Send + Sync + Debug {
    fn init(&self, game: &GameInstance) -> Result<(), RendererError>;
    fn set_kernel_configuration(&self, config: &KernelConfigForRenderer)
    -> Result<(), RendererError>;
    fn set_loading_screen(&self, screen: &LoadingScreen) -> Result<(), RendererError>;
    fn load_scenes(&self, scenes: &[LoadableScene]) -> Result<(), RendererError>;
    fn unload_scene(&self, id: &SceneId) -> Result<(), RendererError>;
    fn teleport(&self, position: Position) -> Result<(), RendererError>;
    fn activate_rendering(&self) -> Result<(), RendererError>;
    fn deactivate_rendering(&self) -> Result<(), RendererError>;
    fn create_global_scene(&self, spec: &GlobalSceneSpec) -> Result<(), RendererError>;
    fn set_debug(&self) -> Result<(), RendererError>;
    fn set_scene_debug_panel(&self) -> Result<(), RendererError>;
    fn show_fps_panel(&self) -> Result<(), RendererError>;
    fn set_engine_debug_panel(&self) -> Result<(), RendererError>;
}

/// Headless renderer that accepts every command and logs it.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingRenderer;

impl Renderer for LoggingRenderer {
    fn init(&self, game: &GameInstance) -> Result<(), RendererError> {
        info!(game = %game.name, version = ?game.version, "Renderer initialized");
        Ok(())
    }

    fn set_kernel_configuration(
        &self,
        config: &KernelConfigForRenderer,
    ) -> Result<(), RendererError> {
        debug!(network = %config.network, kernel = %config.kernel_version, "Kernel configuration");
        Ok(())
    }

    fn set_loading_screen(&self, screen: &LoadingScreen) -> Result<(), RendererError> {
        debug!(
            visible = screen.is_visible,
            message = %screen.message,
            tips = screen.show_tips,
            "Loading screen"
        );
        Ok(())
    }

    fn load_scenes(&self, scenes: &[LoadableScene]) -> Result<(), RendererError> {
        for scene in scenes {
            info!(scene = %scene.id, name = %scene.name, "Load scene");
        }
        Ok(())
    }

    fn unload_scene(&self, id: &SceneId) -> Result<(), RendererError> {
        info!(scene = %id, "Unload scene");
        Ok(())
    }

    fn teleport(&self, position: Position) -> Result<(), RendererError> {
        info!(x = position.x, y = position.y, z = position.z, "Teleport");
        Ok(())
    }

    fn activate_rendering(&self) -> Result<(), RendererError> {
        info!("Rendering activated");
        Ok(())
    }

    fn deactivate_rendering(&self) -> Result<(), RendererError> {
        info!("Rendering deactivated");
        Ok(())
    }

    fn create_global_scene(&self, spec: &GlobalSceneSpec) -> Result<(), RendererError> {
        info!(scene = %spec.id, name = %spec.name, "Global scene created");
        Ok(())
    }

    fn set_debug(&self) -> Result<(), RendererError> {
        debug!("Debug mode");
        Ok(())
    }

    fn set_scene_debug_panel(&self) -> Result<(), RendererError> {
        debug!("Scene debug panel");
        Ok(())
    }

    fn show_fps_panel(&self) -> Result<(), RendererError> {
        debug!("FPS panel");
        Ok(())
    }

    fn set_engine_debug_panel(&self) -> Result<(), RendererError> {
        debug!("Engine debug panel");
        Ok(())
    }
}
