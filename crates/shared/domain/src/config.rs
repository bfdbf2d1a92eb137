use crate::constants::{
    AVATARS_SCENE_ID, AVATARS_SCENE_NAME, NAME_VALID_CHARACTER_REGEX, NAME_VALID_REGEX,
};
use crate::features::KernelFeatures;
use crate::renderer::{
    CommsConfigForRenderer, GameInstance, KernelConfigForRenderer, ProfilesConfigForRenderer,
    WorldRange, default_world_ranges,
};
use crate::scene::{Parcel, SceneDescriptor};
use serde::Deserialize;
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;
use std::sync::Arc;

/// Top-level client configuration.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClientConfigInner {
    pub scenes: ScenesConfig,
    pub settlement: SettlementConfig,
    pub sandbox: SandboxConfig,
    pub loading: LoadingConfig,
    pub comms: CommsConfig,
    pub debug: DebugConfig,
    pub features: KernelFeatures,
    pub renderer: RendererConfig,
    pub logging: LoggingConfig,
    pub spawn: SpawnConfig,
    pub catalog: CatalogConfig,
}

/// Thin Arc-wrapped config for inexpensive cloning into subsystems.
#[derive(Default, Debug, Clone, Deserialize)]
pub struct ClientConfig {
    #[serde(flatten, default)]
    inner: Arc<ClientConfigInner>,
}

impl Deref for ClientConfig {
    type Target = ClientConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for ClientConfig {
    fn deref_mut(&mut self) -> &mut ClientConfigInner {
        Arc::make_mut(&mut self.inner)
    }
}

impl ClientConfigInner {
    /// Kernel configuration pushed to the renderer at initialization.
    #[must_use]
    pub fn kernel_config(&self, game: &GameInstance) -> KernelConfigForRenderer {
        KernelConfigForRenderer {
            comms: CommsConfigForRenderer {
                comm_radius: self.comms.comm_radius,
                voice_chat_enabled: false,
            },
            profiles: ProfilesConfigForRenderer {
                name_valid_character_regex: NAME_VALID_CHARACTER_REGEX.to_owned(),
                name_valid_regex: NAME_VALID_REGEX.to_owned(),
            },
            features: self.features.into(),
            debug_config: None,
            gif_supported: self.renderer.gif_supported,
            network: self.renderer.network.clone(),
            valid_world_ranges: self.renderer.valid_world_ranges.clone(),
            kernel_version: String::new(),
            renderer_version: String::new(),
        }
        .with_versions(
            self.renderer.kernel_version.as_deref(),
            game.version.as_deref().or(self.renderer.renderer_version.as_deref()),
        )
    }

    /// The persistent avatars scene started at initialization.
    #[must_use]
    pub fn avatars_scene(&self) -> SceneDescriptor {
        SceneDescriptor {
            id: AVATARS_SCENE_ID.into(),
            parcels: Vec::new(),
            main: self.renderer.hud_worker_url.clone(),
            name: AVATARS_SCENE_NAME.to_owned(),
            base_url: self.renderer.base_url.clone(),
            mappings: Vec::new(),
            is_global: true,
        }
    }
}

/// Spatial scene loading.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScenesConfig {
    /// Radius in parcels around the (settling) position whose scenes should run.
    pub load_radius: u32,
}

/// What the settlement gate does once `max_wait_ms` elapses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeoutPolicy {
    /// Settle even though destination scenes are not all active.
    #[default]
    Settle,
    /// Keep waiting for the destination scenes.
    Wait,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SettlementConfig {
    pub max_wait_ms: u64,
    pub on_timeout: TimeoutPolicy,
}

/// Channel capacities of every scene sandbox.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SandboxConfig {
    pub command_capacity: usize,
    pub capability_capacity: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoadingConfig {
    /// Change notifications buffered for the loading screen aggregator.
    pub change_capacity: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CommsConfig {
    pub comm_radius: u32,
}

/// Renderer debug toggles applied at startup.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    pub debug: bool,
    /// Editor mode skips the avatars global scene.
    pub editor: bool,
    pub scene_debug_panel: bool,
    pub show_fps: bool,
    pub engine_debug_panel: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    pub network: String,
    pub gif_supported: bool,
    pub kernel_version: Option<String>,
    pub renderer_version: Option<String>,
    pub valid_world_ranges: Vec<WorldRange>,
    /// Base url of the global scenes shipped with the client.
    pub base_url: String,
    /// Entry point of the avatars global scene.
    pub hud_worker_url: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub console: bool,
    pub level: String,
    pub env_filter: Option<String>,
    pub json: bool,
    pub path: Option<PathBuf>,
    pub rotation: String,
    pub max_files: usize,
}

/// Initial position of the player.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    pub parcel: Parcel,
}

/// Scenes known to the static catalog.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub scenes: Vec<SceneDescriptor>,
}

// --- Default ---

impl Default for ScenesConfig {
    fn default() -> Self {
        Self { load_radius: 4 }
    }
}

impl Default for SettlementConfig {
    fn default() -> Self {
        Self { max_wait_ms: 15_000, on_timeout: TimeoutPolicy::Settle }
    }
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self { command_capacity: 16, capability_capacity: 64 }
    }
}

impl Default for LoadingConfig {
    fn default() -> Self {
        Self { change_capacity: 64 }
    }
}

impl Default for CommsConfig {
    fn default() -> Self {
        Self { comm_radius: 4 }
    }
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            network: "mainnet".to_owned(),
            gif_supported: false,
            kernel_version: None,
            renderer_version: None,
            valid_world_ranges: default_world_ranges(),
            base_url: "http://localhost".to_owned(),
            hud_worker_url: "hud.js".to_owned(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            console: true,
            level: "info".to_owned(),
            env_filter: None,
            json: false,
            path: None,
            rotation: "daily".to_owned(),
            max_files: 10,
        }
    }
}
