use crate::store::StateChange;
use std::future::Future;
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Lag-tolerant consumption of the change stream.
///
/// Consumers recompute from the newest slice values, so skipped notifications are
/// harmless: the receiver simply continues with the next retained one.
pub trait ChangeReceiverExt {
    /// Receive the next change, returning `None` when the store is shut down.
    fn next_change(&mut self) -> impl Future<Output = Option<StateChange>> + Send;
}

impl ChangeReceiverExt for broadcast::Receiver<StateChange> {
    async fn next_change(&mut self) -> Option<StateChange> {
        let mut skipped = 0u64;

        loop {
            match self.recv().await {
                Ok(change) => {
                    if skipped > 0 {
                        warn!(skipped, slice = change.slice, "State change receiver lagged");
                    }
                    return Some(change);
                },
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    skipped = skipped.saturating_add(n);
                    debug!(skipped = n, total_skipped = skipped, "Skipping lagged state changes");
                },
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}
