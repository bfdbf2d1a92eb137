//! Well-known identifiers and literals shared by the host and the renderer.

/// Id of the persistent avatars global scene.
pub const AVATARS_SCENE_ID: &str = "dcl-gs-avatars";
pub const AVATARS_SCENE_NAME: &str = "Avatars";

/// Loading screen message shown before any client state exists.
pub const DEFAULT_LOADING_MESSAGE: &str = "Loading...";

pub const UNKNOWN_KERNEL_VERSION: &str = "unknown-kernel-version";
pub const UNKNOWN_RENDERER_VERSION: &str = "unknown-renderer-version";

pub const NAME_VALID_CHARACTER_REGEX: &str = "[a-zA-Z0-9]";
pub const NAME_VALID_REGEX: &str = "^[a-zA-Z0-9]{2,15}$";

/// Side length of a parcel in world units.
pub const PARCEL_SIZE: f32 = 16.0;

/// Suffix length of the user id appended to unclaimed display names.
pub const DISPLAY_NAME_SUFFIX_LEN: usize = 4;

// Kernel feature names
pub const BUILDER_IN_WORLD: &str = "builder_in_world";
pub const AVATAR_LODS: &str = "avatar_lods";
pub const EXPLORE_V2: &str = "explore_v2";
