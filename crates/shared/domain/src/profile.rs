use crate::constants::DISPLAY_NAME_SUFFIX_LEN;
use serde::{Deserialize, Serialize};

/// Cached user profile as provided by the profile store.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub user_id: String,
    pub name: String,
    #[serde(default)]
    pub has_claimed_name: bool,
    pub eth_address: String,
    #[serde(default)]
    pub version: u64,
    #[serde(default)]
    pub avatar: Avatar,
}

impl Profile {
    /// Name shown to other players.
    ///
    /// Claimed names are used verbatim. Otherwise non alphanumeric characters are dropped
    /// and `#` plus the tail of the user id is appended, e.g. `guest#c0ff`.
    #[must_use]
    pub fn display_name(&self) -> String {
        if self.has_claimed_name {
            return self.name.clone();
        }

        let mut name: String = self.name.chars().filter(char::is_ascii_alphanumeric).collect();
        let skip = self.user_id.chars().count().saturating_sub(DISPLAY_NAME_SUFFIX_LEN);
        name.push('#');
        name.extend(self.user_id.chars().skip(skip));
        name
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Avatar {
    pub body_shape: String,
    #[serde(default)]
    pub wearables: Vec<String>,
    #[serde(default)]
    pub skin_color: Option<String>,
    #[serde(default)]
    pub hair_color: Option<String>,
    #[serde(default)]
    pub eye_color: Option<String>,
    #[serde(default)]
    pub snapshots: Option<AvatarSnapshots>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvatarSnapshots {
    pub face: String,
    pub body: String,
}
