use crate::error::WorldStateError;
use fxhash::FxHashMap;
use parking_lot::RwLock;
use std::any::{Any, TypeId};
use std::fmt::Debug;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{broadcast, watch};
use tracing::trace;

/// Change notifications buffered per subscriber before it starts lagging.
const DEFAULT_CAPACITY: usize = 64;
const MIN_CAPACITY: usize = 1;

/// A piece of client state that is published as a whole.
pub trait StateSlice: Any + Debug + Send + Sync + 'static {
    /// Name reported in [`StateChange`] notifications.
    const NAME: &'static str;
}

/// Emitted after every publication.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateChange {
    pub slice: &'static str,
    pub revision: u64,
}

impl StateChange {
    /// Whether the change concerns one of the given slice names.
    #[must_use]
    pub fn concerns(&self, slices: &[&str]) -> bool {
        slices.contains(&self.slice)
    }
}

#[derive(Debug)]
struct SliceEntry {
    name: &'static str,
    sender: Box<dyn Any + Send + Sync>,
}

impl SliceEntry {
    fn new<S: StateSlice>() -> Self {
        let (tx, _) = watch::channel::<Option<Arc<S>>>(None);
        Self { name: S::NAME, sender: Box::new(tx) }
    }

    fn sender<S: StateSlice>(&self) -> Result<&watch::Sender<Option<Arc<S>>>, WorldStateError> {
        self.sender.downcast_ref::<watch::Sender<Option<Arc<S>>>>().ok_or_else(|| {
            WorldStateError::TypeMismatch {
                message: std::any::type_name::<S>().into(),
                context: Some(format!("Slice '{}' registered with another type", self.name).into()),
            }
        })
    }
}

#[derive(Debug)]
struct WorldStateInner {
    slices: RwLock<FxHashMap<TypeId, SliceEntry>>,
    changes: RwLock<Option<broadcast::Sender<StateChange>>>,
    revision: AtomicU64,
}

/// Thread-safe store of the newest value of every state slice.
///
/// Cloning is cheap and every clone observes the same slices.
#[derive(Debug, Clone)]
pub struct WorldState {
    inner: Arc<WorldStateInner>,
}

impl Default for WorldState {
    fn default() -> Self {
        Self::build(DEFAULT_CAPACITY)
    }
}

impl WorldState {
    /// Creates an empty store with the default change-stream capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store with a specific change-stream capacity.
    ///
    /// # Errors
    /// Returns [`WorldStateError::InvalidCapacity`] if `capacity` is zero.
    pub fn with_capacity(capacity: usize) -> Result<Self, WorldStateError> {
        if capacity < MIN_CAPACITY {
            return Err(WorldStateError::InvalidCapacity {
                message: format!("capacity must be >= {MIN_CAPACITY}").into(),
                context: None,
            });
        }
        Ok(Self::build(capacity))
    }

    fn build(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self {
            inner: Arc::new(WorldStateInner {
                slices: RwLock::new(FxHashMap::default()),
                changes: RwLock::new(Some(tx)),
                revision: AtomicU64::new(0),
            }),
        }
    }

    /// Replaces the value of slice `S` and notifies change subscribers.
    ///
    /// Returns the store revision assigned to this publication.
    ///
    /// # Errors
    /// Returns [`WorldStateError::Closed`] after [`WorldState::shutdown`].
    pub fn publish<S: StateSlice>(&self, value: S) -> Result<u64, WorldStateError> {
        self.publish_arc(Arc::new(value))
    }

    /// Same as [`WorldState::publish`] without re-wrapping a shared value.
    ///
    /// # Errors
    /// Returns [`WorldStateError::Closed`] after [`WorldState::shutdown`].
    pub fn publish_arc<S: StateSlice>(&self, value: Arc<S>) -> Result<u64, WorldStateError> {
        let changes = self.change_sender()?;

        {
            let mut slices = self.inner.slices.write();
            let entry = slices.entry(TypeId::of::<S>()).or_insert_with(|| {
                trace!(slice = S::NAME, "Initializing state slice");
                SliceEntry::new::<S>()
            });
            entry.sender::<S>()?.send_replace(Some(value));
        }

        let revision = self.inner.revision.fetch_add(1, Ordering::AcqRel) + 1;
        let change = StateChange { slice: S::NAME, revision };
        match changes.send(change) {
            Ok(count) => trace!(slice = S::NAME, revision, count, "State change dispatched"),
            Err(_) => trace!(slice = S::NAME, revision, "State change dropped: no subscribers"),
        }

        Ok(revision)
    }

    /// Applies `update` to a copy of the current value (or the default) and publishes it.
    ///
    /// # Errors
    /// Returns [`WorldStateError::Closed`] after [`WorldState::shutdown`].
    pub fn update<S, F>(&self, update: F) -> Result<u64, WorldStateError>
    where
        S: StateSlice + Clone + Default,
        F: FnOnce(&mut S),
    {
        let mut next = self.current::<S>().map(|current| (*current).clone()).unwrap_or_default();
        update(&mut next);
        self.publish(next)
    }

    /// Returns the newest value of slice `S`, if it was ever published.
    #[must_use]
    pub fn current<S: StateSlice>(&self) -> Option<Arc<S>> {
        let slices = self.inner.slices.read();
        let entry = slices.get(&TypeId::of::<S>())?;
        entry.sender::<S>().ok().and_then(|tx| tx.borrow().clone())
    }

    /// Subscribes to the newest value of slice `S`.
    ///
    /// The receiver holds `None` until the slice is published for the first time.
    ///
    /// # Errors
    /// Returns [`WorldStateError::Closed`] after [`WorldState::shutdown`].
    pub fn watch<S: StateSlice>(&self) -> Result<watch::Receiver<Option<Arc<S>>>, WorldStateError> {
        self.change_sender()?;

        let mut slices = self.inner.slices.write();
        let entry = slices.entry(TypeId::of::<S>()).or_insert_with(SliceEntry::new::<S>);
        Ok(entry.sender::<S>()?.subscribe())
    }

    /// Subscribes to change notifications for all slices.
    ///
    /// # Errors
    /// Returns [`WorldStateError::Closed`] after [`WorldState::shutdown`].
    pub fn changes(&self) -> Result<broadcast::Receiver<StateChange>, WorldStateError> {
        Ok(self.change_sender()?.subscribe())
    }

    /// Number of publications so far. Zero means no state exists yet.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.inner.revision.load(Ordering::Acquire)
    }

    /// Whether nothing was ever published.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.revision() == 0
    }

    /// Closes the change stream and drops every slice channel.
    ///
    /// Returns the number of slice channels that were closed.
    #[must_use]
    pub fn shutdown(&self) -> usize {
        self.inner.changes.write().take();
        let mut slices = self.inner.slices.write();
        let count = slices.len();
        slices.clear();
        count
    }

    fn change_sender(&self) -> Result<broadcast::Sender<StateChange>, WorldStateError> {
        self.inner.changes.read().clone().ok_or_else(|| WorldStateError::Closed {
            message: "world state was shut down".into(),
            context: None,
        })
    }
}
