//! Loading screen aggregation.
//!
//! The loading screen is never stored. It is derived from the newest loading, session and
//! renderer slices every time one of them changes, and pushed to the renderer.

mod aggregator;
mod compute;
mod error;

pub use aggregator::LoadingScreenAggregator;
pub use compute::{LoadingInputs, WATCHED_SLICES, compute};
pub use error::{LoadingScreenError, LoadingScreenErrorExt};

use plaza_kernel::HostContext;

/// Starts the aggregator for the host and runs the first recomputation.
///
/// # Errors
/// Returns [`LoadingScreenError::State`] if the world state was already shut down.
pub fn init(ctx: &HostContext) -> Result<LoadingScreenAggregator, LoadingScreenError> {
    let aggregator = LoadingScreenAggregator::from_context(ctx)?;
    tracing::info!(visible = aggregator.current().is_visible, "Loading screen initialized");
    Ok(aggregator)
}
