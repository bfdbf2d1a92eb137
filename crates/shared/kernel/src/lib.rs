//! Seams between the scene host features and the outside world: the renderer, the player
//! stores, the position stream, the client state slices and configuration loading.
//!
//! ## Session ids
//! Every [`HostContext`] carries a `session_id` made with `safe_nanoid!`, which avoids
//! characters that are easy to misread in log excerpts:
//! ```rust
//! # use plaza_kernel::safe_nanoid;
//! let id = safe_nanoid!();
//! assert_eq!(id.len(), 12);
//! ```
//!
//! ## Config loading
//! ```rust,ignore
//! use plaza_kernel::config::load_config;
//! use plaza_kernel::domain::config::ClientConfig;
//!
//! let cfg: ClientConfig = load_config(Some("plaza.toml"))?;
//! ```
pub mod config;
pub mod context;
pub mod players;
pub mod position;
pub mod renderer;
pub mod state;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

// Alphabet excludes visually ambiguous characters (I, O, l, 0, 1).
pub const SAFE_ALPHABET: &[char; 55] = &[
    '2', '3', '4', '5', '6', '7', '8', '9', 'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'J', 'K', 'L',
    'M', 'N', 'P', 'Q', 'R', 'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z', 'a', 'b', 'c', 'd', 'e', 'f',
    'g', 'h', 'j', 'k', 'm', 'n', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z',
];

pub use context::{HostContext, HostContextBuilder, HostContextError};
pub use nanoid::nanoid;
pub use plaza_domain as domain;
pub use plaza_world_state as world;
pub use position::PositionEvent;
pub use renderer::{LoggingRenderer, Renderer, RendererError};

/// `nanoid!` over [`SAFE_ALPHABET`], 12 characters unless a size is given.
#[macro_export]
macro_rules! safe_nanoid {
    () => {
        $crate::nanoid!(12, $crate::SAFE_ALPHABET)
    };
    ($size:expr) => {
        $crate::nanoid!($size, $crate::SAFE_ALPHABET)
    };
}
