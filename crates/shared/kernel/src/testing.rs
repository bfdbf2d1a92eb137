//! Test doubles for crates built on the kernel.

use crate::renderer::{Renderer, RendererError};
use parking_lot::Mutex;
use plaza_domain::renderer::{
    GameInstance, GlobalSceneSpec, KernelConfigForRenderer, LoadableScene, LoadingScreen,
};
use plaza_domain::scene::{Position, SceneId};
use strum_macros::{EnumDiscriminants, IntoStaticStr};

/// A renderer command as it was received.
#[derive(Debug, Clone, PartialEq, EnumDiscriminants)]
#[strum_discriminants(name(CommandKind), derive(Hash, IntoStaticStr))]
pub enum RendererCommand {
    Init(GameInstance),
    SetKernelConfiguration(Box<KernelConfigForRenderer>),
    SetLoadingScreen(LoadingScreen),
    LoadScenes(Vec<SceneId>),
    UnloadScene(SceneId),
    Teleport(Position),
    ActivateRendering,
    DeactivateRendering,
    CreateGlobalScene(GlobalSceneSpec),
    SetDebug,
    SetSceneDebugPanel,
    ShowFpsPanel,
    SetEngineDebugPanel,
}

/// Records every accepted command; rejections can be scripted per command kind.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    commands: Mutex<Vec<RendererCommand>>,
    rejections: Mutex<Vec<CommandKind>>,
}

impl RecordingRenderer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects the next command of `kind` once.
    pub fn reject_next(&self, kind: CommandKind) {
        self.rejections.lock().push(kind);
    }

    #[must_use]
    pub fn commands(&self) -> Vec<RendererCommand> {
        self.commands.lock().clone()
    }

    /// Commands of one kind, in order.
    #[must_use]
    pub fn commands_of(&self, kind: CommandKind) -> Vec<RendererCommand> {
        self.commands.lock().iter().filter(|c| CommandKind::from(*c) == kind).cloned().collect()
    }

    /// Kinds of all recorded commands, in order.
    #[must_use]
    pub fn kinds(&self) -> Vec<CommandKind> {
        self.commands.lock().iter().map(CommandKind::from).collect()
    }

    #[must_use]
    pub fn loading_screens(&self) -> Vec<LoadingScreen> {
        self.commands
            .lock()
            .iter()
            .filter_map(|c| match c {
                RendererCommand::SetLoadingScreen(screen) => Some(screen.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.commands.lock().clear();
    }

    fn record(&self, command: RendererCommand) -> Result<(), RendererError> {
        let kind = CommandKind::from(&command);
        {
            let mut rejections = self.rejections.lock();
            if let Some(index) = rejections.iter().position(|k| *k == kind) {
                rejections.remove(index);
                let name: &'static str = kind.into();
                return Err(RendererError::Rejected {
                    message: format!("scripted rejection of {name}").into(),
                    context: None,
                });
            }
        }
        self.commands.lock().push(command);
        Ok(())
    }
}

impl Renderer for RecordingRenderer {
    fn init(&self, game: &GameInstance) -> Result<(), RendererError> {
        self.record(RendererCommand::Init(game.clone()))
    }

    fn set_kernel_configuration(
        &self,
        config: &KernelConfigForRenderer,
    ) -> Result<(), RendererError> {
        self.record(RendererCommand::SetKernelConfiguration(Box::new(config.clone())))
    }

    fn set_loading_screen(&self, screen: &LoadingScreen) -> Result<(), RendererError> {
        self.record(RendererCommand::SetLoadingScreen(screen.clone()))
    }

    fn load_scenes(&self, scenes: &[LoadableScene]) -> Result<(), RendererError> {
        self.record(RendererCommand::LoadScenes(scenes.iter().map(|s| s.id.clone()).collect()))
    }

    fn unload_scene(&self, id: &SceneId) -> Result<(), RendererError> {
        self.record(RendererCommand::UnloadScene(id.clone()))
    }

    fn teleport(&self, position: Position) -> Result<(), RendererError> {
        self.record(RendererCommand::Teleport(position))
    }

    fn activate_rendering(&self) -> Result<(), RendererError> {
        self.record(RendererCommand::ActivateRendering)
    }

    fn deactivate_rendering(&self) -> Result<(), RendererError> {
        self.record(RendererCommand::DeactivateRendering)
    }

    fn create_global_scene(&self, spec: &GlobalSceneSpec) -> Result<(), RendererError> {
        self.record(RendererCommand::CreateGlobalScene(spec.clone()))
    }

    fn set_debug(&self) -> Result<(), RendererError> {
        self.record(RendererCommand::SetDebug)
    }

    fn set_scene_debug_panel(&self) -> Result<(), RendererError> {
        self.record(RendererCommand::SetSceneDebugPanel)
    }

    fn show_fps_panel(&self) -> Result<(), RendererError> {
        self.record(RendererCommand::ShowFpsPanel)
    }

    fn set_engine_debug_panel(&self) -> Result<(), RendererError> {
        self.record(RendererCommand::SetEngineDebugPanel)
    }
}
