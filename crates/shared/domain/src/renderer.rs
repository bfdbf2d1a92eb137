//! Payloads exchanged with the renderer collaborator.

use crate::constants::{DEFAULT_LOADING_MESSAGE, UNKNOWN_KERNEL_VERSION, UNKNOWN_RENDERER_VERSION};
use crate::features::KernelFeatures;
use crate::scene::{ContentMapping, Parcel, SceneDescriptor, SceneId};
use serde::{Deserialize, Serialize};

/// Aggregate loading screen visibility decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadingScreen {
    pub is_visible: bool,
    pub message: String,
    pub show_tips: bool,
}

impl LoadingScreen {
    /// Screen shown before any client state exists.
    #[must_use]
    pub fn initial() -> Self {
        Self { is_visible: true, message: DEFAULT_LOADING_MESSAGE.to_owned(), show_tips: true }
    }
}

/// Handle to the renderer instance the host was started with.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameInstance {
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
}

/// Scene as the renderer loads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadableScene {
    pub id: SceneId,
    pub name: String,
    pub base_position: Parcel,
    pub parcels: Vec<Parcel>,
    pub base_url: String,
    pub main: String,
    pub contents: Vec<ContentMapping>,
}

impl From<&SceneDescriptor> for LoadableScene {
    fn from(scene: &SceneDescriptor) -> Self {
        Self {
            id: scene.id.clone(),
            name: scene.name.clone(),
            base_position: scene.base_parcel().unwrap_or_default(),
            parcels: scene.parcels.clone(),
            base_url: scene.base_url.clone(),
            main: scene.main.clone(),
            contents: scene.mappings.clone(),
        }
    }
}

/// Request to create a persistent global scene.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalSceneSpec {
    pub id: SceneId,
    pub name: String,
    pub base_url: String,
    pub is_portable_experience: bool,
    pub contents: Vec<ContentMapping>,
}

impl From<&SceneDescriptor> for GlobalSceneSpec {
    fn from(scene: &SceneDescriptor) -> Self {
        Self {
            id: scene.id.clone(),
            name: scene.name.clone(),
            base_url: scene.base_url.clone(),
            is_portable_experience: false,
            contents: Vec::new(),
        }
    }
}

/// Rectangular range of valid parcels, inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldRange {
    pub x_min: i32,
    pub x_max: i32,
    pub y_min: i32,
    pub y_max: i32,
}

impl WorldRange {
    #[must_use]
    pub const fn contains(&self, parcel: Parcel) -> bool {
        parcel.x >= self.x_min
            && parcel.x <= self.x_max
            && parcel.y >= self.y_min
            && parcel.y <= self.y_max
    }
}

/// Default Genesis-city ranges.
#[must_use]
pub fn default_world_ranges() -> Vec<WorldRange> {
    vec![
        WorldRange { x_min: -150, x_max: 150, y_min: -150, y_max: 150 },
        WorldRange { x_min: 62, x_max: 162, y_min: 151, y_max: 158 },
        WorldRange { x_min: 151, x_max: 163, y_min: 144, y_max: 150 },
        WorldRange { x_min: 151, x_max: 162, y_min: 59, y_max: 143 },
    ]
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommsConfigForRenderer {
    pub comm_radius: u32,
    pub voice_chat_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilesConfigForRenderer {
    pub name_valid_character_regex: String,
    pub name_valid_regex: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeaturesConfigForRenderer {
    pub enable_builder_in_world: bool,
    #[serde(rename = "enableAvatarLODs")]
    pub enable_avatar_lods: bool,
    pub enable_explore_v2: bool,
}

impl From<KernelFeatures> for FeaturesConfigForRenderer {
    fn from(features: KernelFeatures) -> Self {
        Self {
            enable_builder_in_world: features.contains(KernelFeatures::BUILDER_IN_WORLD),
            enable_avatar_lods: features.contains(KernelFeatures::AVATAR_LODS),
            enable_explore_v2: features.contains(KernelFeatures::EXPLORE_V2),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugConfigForRenderer {
    pub scene_debug_panel_enabled: bool,
}

/// Kernel configuration pushed to the renderer during initialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KernelConfigForRenderer {
    pub comms: CommsConfigForRenderer,
    pub profiles: ProfilesConfigForRenderer,
    pub features: FeaturesConfigForRenderer,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug_config: Option<DebugConfigForRenderer>,
    pub gif_supported: bool,
    pub network: String,
    pub valid_world_ranges: Vec<WorldRange>,
    pub kernel_version: String,
    pub renderer_version: String,
}

impl KernelConfigForRenderer {
    /// Version strings default to well-known placeholders when unknown.
    #[must_use]
    pub fn with_versions(mut self, kernel: Option<&str>, renderer: Option<&str>) -> Self {
        self.kernel_version = kernel.unwrap_or(UNKNOWN_KERNEL_VERSION).to_owned();
        self.renderer_version = renderer.unwrap_or(UNKNOWN_RENDERER_VERSION).to_owned();
        self
    }
}
