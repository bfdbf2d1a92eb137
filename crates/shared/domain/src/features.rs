use crate::constants::{AVATAR_LODS, BUILDER_IN_WORLD, EXPLORE_V2};
use bitflags::bitflags;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::Debug;

bitflags! {
    /// Renderer-facing kernel features.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct KernelFeatures: u32 {
        const BUILDER_IN_WORLD = 1 << 0;
        const AVATAR_LODS = 1 << 1;
        const EXPLORE_V2 = 1 << 2;

        const ALL = Self::BUILDER_IN_WORLD.bits() | Self::AVATAR_LODS.bits() | Self::EXPLORE_V2.bits();
    }
}

impl Default for KernelFeatures {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<&str> for KernelFeatures {
    fn from(s: &str) -> Self {
        match s {
            BUILDER_IN_WORLD => Self::BUILDER_IN_WORLD,
            AVATAR_LODS => Self::AVATAR_LODS,
            EXPLORE_V2 => Self::EXPLORE_V2,
            "all" | "*" => Self::ALL,
            _ => Self::empty(),
        }
    }
}

impl From<u32> for KernelFeatures {
    fn from(bits: u32) -> Self {
        Self::from_bits_truncate(bits)
    }
}

impl FromIterator<String> for KernelFeatures {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        iter.into_iter().fold(Self::empty(), |acc, name| acc | Self::from(name.as_str()))
    }
}

/// Serialized as a list of feature names so config files stay readable.
impl Serialize for KernelFeatures {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let names: Vec<&str> = [
            (Self::BUILDER_IN_WORLD, BUILDER_IN_WORLD),
            (Self::AVATAR_LODS, AVATAR_LODS),
            (Self::EXPLORE_V2, EXPLORE_V2),
        ]
        .into_iter()
        .filter(|(flag, _)| self.contains(*flag))
        .map(|(_, name)| name)
        .collect();
        names.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for KernelFeatures {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let names = Vec::<String>::deserialize(deserializer)?;
        Ok(names.into_iter().collect())
    }
}
