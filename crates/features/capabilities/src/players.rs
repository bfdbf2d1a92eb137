//! The `Players` API: read-only access to cached profiles and avatar presence.

use crate::error::CapabilityError;
use crate::registry::{ApiExposer, ExposableApi};
use plaza_derive::wire_model;
use plaza_domain::profile::{Avatar, Profile};
use plaza_kernel::HostContext;
use plaza_kernel::players::{PresenceTracker, ProfileStore};
use std::sync::Arc;

/// Player data as seen from inside a scene.
#[wire_model]
#[derive(PartialEq)]
pub struct UserData {
    pub display_name: String,
    /// Only set for users with a verified external identity.
    pub public_key: Option<String>,
    pub has_connected_web3: bool,
    pub user_id: String,
    pub version: u64,
    pub avatar: Avatar,
}

#[wire_model]
#[derive(PartialEq, Eq)]
pub struct ConnectedPlayer {
    pub user_id: String,
}

#[wire_model]
pub struct GetPlayerDataParams {
    pub user_id: String,
}

#[wire_model]
#[derive(Default)]
pub struct NoParams {}

#[derive(Debug, Clone)]
pub struct Players {
    profiles: Arc<dyn ProfileStore>,
    presence: Arc<dyn PresenceTracker>,
}

impl Players {
    #[must_use]
    pub fn new(profiles: Arc<dyn ProfileStore>, presence: Arc<dyn PresenceTracker>) -> Self {
        Self { profiles, presence }
    }

    #[must_use]
    pub fn from_context(ctx: &HostContext) -> Self {
        Self::new(Arc::clone(&ctx.profiles), Arc::clone(&ctx.presence))
    }

    /// Looks up a cached profile. Unknown users yield `None`, never an error.
    #[must_use]
    pub fn get_player_data(&self, user_id: &str) -> Option<UserData> {
        let profile = self.profiles.profile_if_exists(user_id)?;
        let connected = self.profiles.has_connected_external_identity(user_id);
        Some(user_data(&profile, connected))
    }

    #[must_use]
    pub fn get_connected_players(&self) -> Vec<ConnectedPlayer> {
        self.presence
            .visible_user_ids()
            .into_iter()
            .map(|user_id| ConnectedPlayer { user_id })
            .collect()
    }
}

fn user_data(profile: &Profile, connected: bool) -> UserData {
    UserData {
        display_name: profile.display_name(),
        public_key: connected.then(|| profile.eth_address.clone()),
        has_connected_web3: connected,
        user_id: profile.user_id.clone(),
        version: profile.version,
        avatar: profile.avatar.clone(),
    }
}

impl ExposableApi for Players {
    const NAME: &'static str = "Players";
    const VERSION: u32 = 1;

    fn expose(self: Arc<Self>, api: &mut ApiExposer) {
        let players = Arc::clone(&self);
        api.method("getPlayerData", move |params: GetPlayerDataParams| {
            let players = Arc::clone(&players);
            async move { Ok::<_, CapabilityError>(players.get_player_data(&params.user_id)) }
        });

        api.method("getConnectedPlayers", move |_: NoParams| {
            let players = Arc::clone(&self);
            async move { Ok::<_, CapabilityError>(players.get_connected_players()) }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plaza_kernel::players::{MemoryPresence, MemoryProfiles};
    use serde_json::json;

    fn profile() -> Profile {
        Profile {
            user_id: "0xabc123".into(),
            name: "Ada Lovelace".into(),
            eth_address: "0xabc123".into(),
            version: 3,
            ..Profile::default()
        }
    }

    #[test]
    fn public_key_requires_external_identity() {
        let profiles = Arc::new(MemoryProfiles::new());
        profiles.insert(profile());
        let players = Players::new(profiles.clone(), Arc::new(MemoryPresence::new()));

        let data = players.get_player_data("0xabc123").unwrap();
        assert_eq!(data.public_key, None);
        assert!(!data.has_connected_web3);
        assert_eq!(data.display_name, "AdaLovelace#c123");

        profiles.set_connected_identity("0xabc123", true);
        let data = players.get_player_data("0xabc123").unwrap();
        assert_eq!(data.public_key.as_deref(), Some("0xabc123"));
    }

    #[test]
    fn user_data_wire_shape() {
        let value = serde_json::to_value(user_data(&profile(), false)).unwrap();
        assert_eq!(value["publicKey"], json!(null));
        assert_eq!(value["hasConnectedWeb3"], json!(false));
        assert_eq!(value["userId"], json!("0xabc123"));
        assert_eq!(value["version"], json!(3));
        assert!(value["avatar"].is_object());
    }
}
