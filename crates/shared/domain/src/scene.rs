use crate::constants::PARCEL_SIZE;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

/// A unit of world addressing occupied by scenes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Parcel {
    pub x: i32,
    pub y: i32,
}

impl Parcel {
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Chebyshev distance in parcels.
    #[must_use]
    pub const fn distance(self, other: Self) -> u32 {
        let dx = self.x.abs_diff(other.x);
        let dy = self.y.abs_diff(other.y);
        if dx > dy { dx } else { dy }
    }

    /// World position of the parcel's south-west corner at ground level.
    #[must_use]
    pub fn origin(self) -> Position {
        #[allow(clippy::cast_precision_loss)]
        Position::new(self.x as f32 * PARCEL_SIZE, 0.0, self.y as f32 * PARCEL_SIZE)
    }
}

impl fmt::Display for Parcel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.x, self.y)
    }
}

/// A position in world units; `y` is up, parcels lie on the `x`/`z` plane.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Position {
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Parcel containing this position.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn parcel(&self) -> Parcel {
        Parcel::new((self.x / PARCEL_SIZE).floor() as i32, (self.z / PARCEL_SIZE).floor() as i32)
    }
}

/// Stable scene identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SceneId(Arc<str>);

impl SceneId {
    #[must_use]
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(Arc::from(id.as_ref()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SceneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SceneId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for SceneId {
    fn from(value: String) -> Self {
        Self(Arc::from(value))
    }
}

impl Borrow<str> for SceneId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Maps a content file path to its content hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentMapping {
    pub file: String,
    pub hash: String,
}

/// Immutable description of a scene; shared as `Arc<SceneDescriptor>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneDescriptor {
    pub id: SceneId,
    #[serde(default)]
    pub parcels: Vec<Parcel>,
    /// Content entry point reference (the scene's main script).
    pub main: String,
    pub name: String,
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub mappings: Vec<ContentMapping>,
    /// Global scenes bypass spatial diffing and are never unloaded.
    #[serde(default)]
    pub is_global: bool,
}

impl SceneDescriptor {
    /// Base parcel, the first declared one.
    #[must_use]
    pub fn base_parcel(&self) -> Option<Parcel> {
        self.parcels.first().copied()
    }

    #[must_use]
    pub fn covers(&self, parcel: Parcel) -> bool {
        self.parcels.contains(&parcel)
    }
}

/// Lifecycle of a tracked scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SceneLifecycle {
    #[default]
    Unloaded,
    Loading,
    Active,
    Unloading,
}

impl SceneLifecycle {
    /// States from which a scene may be asked to unload.
    #[must_use]
    pub const fn is_running(self) -> bool {
        matches!(self, Self::Loading | Self::Active)
    }
}
