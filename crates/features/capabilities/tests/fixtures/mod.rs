#![allow(dead_code)]

use plaza_kernel::HostContext;
use plaza_kernel::domain::profile::Profile;
use plaza_kernel::players::{MemoryPresence, MemoryProfiles};
use plaza_kernel::testing::RecordingRenderer;
use std::sync::Arc;

pub struct Host {
    pub ctx: HostContext,
    pub profiles: Arc<MemoryProfiles>,
    pub presence: Arc<MemoryPresence>,
}

pub fn host() -> Host {
    let profiles = Arc::new(MemoryProfiles::new());
    let presence = Arc::new(MemoryPresence::new());
    let ctx = HostContext::builder()
        .renderer(Arc::new(RecordingRenderer::new()))
        .profiles(profiles.clone())
        .presence(presence.clone())
        .build()
        .expect("host context");
    Host { ctx, profiles, presence }
}

pub fn profile(user_id: &str, name: &str) -> Profile {
    Profile {
        user_id: user_id.into(),
        name: name.into(),
        eth_address: user_id.into(),
        version: 1,
        ..Profile::default()
    }
}
