//! Read-only profile and presence collaborators.

use fxhash::{FxHashMap, FxHashSet};
use parking_lot::RwLock;
use plaza_domain::profile::Profile;
use std::fmt::Debug;
use std::sync::Arc;

/// Cached profiles of users known to the client.
pub trait ProfileStore: Send + Sync + Debug {
    /// Returns the cached profile without fetching it.
    fn profile_if_exists(&self, user_id: &str) -> Option<Arc<Profile>>;

    /// Whether the user signed in with a verified external identity (wallet).
    fn has_connected_external_identity(&self, user_id: &str) -> bool;
}

/// Tracks which avatars are currently visible to the local player.
pub trait PresenceTracker: Send + Sync + Debug {
    fn visible_user_ids(&self) -> Vec<String>;
}

/// In-memory [`ProfileStore`] fed by the comms layer.
#[derive(Debug, Default)]
pub struct MemoryProfiles {
    profiles: RwLock<FxHashMap<String, Arc<Profile>>>,
    connected: RwLock<FxHashSet<String>>,
}

impl MemoryProfiles {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Caches a profile, replacing an older version.
    pub fn insert(&self, profile: Profile) {
        self.profiles.write().insert(profile.user_id.clone(), Arc::new(profile));
    }

    pub fn set_connected_identity(&self, user_id: impl Into<String>, connected: bool) {
        let user_id = user_id.into();
        let mut set = self.connected.write();
        if connected {
            set.insert(user_id);
        } else {
            set.remove(&user_id);
        }
    }

    pub fn remove(&self, user_id: &str) -> Option<Arc<Profile>> {
        self.connected.write().remove(user_id);
        self.profiles.write().remove(user_id)
    }
}

impl ProfileStore for MemoryProfiles {
    fn profile_if_exists(&self, user_id: &str) -> Option<Arc<Profile>> {
        self.profiles.read().get(user_id).cloned()
    }

    fn has_connected_external_identity(&self, user_id: &str) -> bool {
        self.connected.read().contains(user_id)
    }
}

/// In-memory [`PresenceTracker`]; keeps insertion order for stable listings.
#[derive(Debug, Default)]
pub struct MemoryPresence {
    visible: RwLock<Vec<String>>,
}

impl MemoryPresence {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&self, user_id: impl Into<String>) {
        let user_id = user_id.into();
        let mut visible = self.visible.write();
        if !visible.contains(&user_id) {
            visible.push(user_id);
        }
    }

    pub fn hide(&self, user_id: &str) {
        self.visible.write().retain(|id| id != user_id);
    }
}

impl PresenceTracker for MemoryPresence {
    fn visible_user_ids(&self) -> Vec<String> {
        self.visible.read().clone()
    }
}
