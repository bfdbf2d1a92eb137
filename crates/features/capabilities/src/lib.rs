//! Host capabilities exposed to scene sandboxes.
//!
//! A [`CapabilityRegistry`] binds capability names to async operations. Sandboxes reach it
//! through a [`CapabilityBridge`], which turns every request into exactly one
//! [`CapabilityResponse`], whatever the operation does.

mod bridge;
mod error;
mod players;
mod protocol;
mod registry;

pub use bridge::{CapabilityBridge, CapabilityClient};
pub use error::{CapabilityError, CapabilityErrorExt};
pub use players::{ConnectedPlayer, GetPlayerDataParams, Players, UserData};
pub use protocol::{
    ApiManifest, CapabilityOutcome, CapabilityRequest, CapabilityResponse, ResponseError,
};
pub use registry::{ApiExposer, CapabilityFut, CapabilityRegistry, ExposableApi, Operation};

use plaza_kernel::HostContext;
use std::sync::Arc;

/// Exposes the host APIs backed by `ctx` on `registry`.
///
/// # Errors
/// Returns [`CapabilityError::DuplicateCapability`] if an API was already exposed.
pub fn init(
    ctx: &HostContext,
    registry: &CapabilityRegistry,
) -> Result<Vec<ApiManifest>, CapabilityError> {
    let players = registry.register_api(Arc::new(Players::from_context(ctx)))?;
    tracing::info!(apis = registry.manifests().len(), "Host capabilities exposed");
    Ok(vec![players])
}
