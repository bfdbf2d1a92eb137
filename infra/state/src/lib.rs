//! # World State
//!
//! A latest-value store for the independent state slices of the client (loading progress,
//! session, renderer readiness, scene snapshots...).
//!
//! ## Overview
//!
//! Every slice type owns one `tokio::sync::watch` channel holding its newest value. Each
//! publication also fans out a lightweight [`StateChange`] notification on a single broadcast
//! channel, so a consumer that derives something from several slices can subscribe once and
//! re-read whatever it needs.
//!
//! * **Type-Safe**: Slices are identified by their Rust type.
//! * **Latest value wins**: Readers never see stale data, only the newest publication.
//! * **Single signal**: One change stream for all slices, lag tolerant.
//!
//! # Example
//!
//! ```rust
//! use plaza_world_state::{ChangeReceiverExt, StateSlice, WorldState};
//!
//! #[derive(Debug, Clone, Default, PartialEq)]
//! struct Loading { message: String }
//!
//! impl StateSlice for Loading {
//!     const NAME: &'static str = "loading";
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), plaza_world_state::WorldStateError> {
//!     let state = WorldState::new();
//!     let mut changes = state.changes()?;
//!
//!     state.publish(Loading { message: "Loading...".into() })?;
//!
//!     let change = changes.next_change().await.unwrap();
//!     assert_eq!(change.slice, "loading");
//!     assert_eq!(state.current::<Loading>().unwrap().message, "Loading...");
//!     Ok(())
//! }
//! ```

mod error;
mod receiver;
mod store;

pub use error::{WorldStateError, WorldStateErrorExt};
pub use receiver::ChangeReceiverExt;
pub use store::{StateChange, StateSlice, WorldState};
