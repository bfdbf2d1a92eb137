mod fixtures;

use fixtures::{GatedFactory, at, config, idle, settled_at, until};
use plaza::domain::scene::SceneId;
use plaza::kernel::state::{SessionState, SessionStatus, SettlementState};
use plaza::kernel::testing::{CommandKind, RecordingRenderer, RendererCommand};
use plaza_client::Client;
use std::sync::Arc;
use tokio::sync::watch;

#[tokio::test]
async fn spawn_settles_once_the_spawn_scene_is_ready() {
    let (open, gate) = watch::channel(false);
    let renderer = Arc::new(RecordingRenderer::new());
    let client = Client::builder()
        .config(config())
        .renderer(renderer.clone())
        .factory(Arc::new(GatedFactory::new(&["spawn"], gate)))
        .user("0xme")
        .build()
        .await
        .unwrap();
    let ctx = client.context().clone();

    until(|| ctx.world.current::<SettlementState>().is_some_and(|s| s.is_unsettled())).await;
    idle().await;
    let screen = renderer.loading_screens().last().cloned().unwrap();
    assert!(screen.is_visible);
    assert!(screen.show_tips);
    assert!(!renderer.kinds().contains(&CommandKind::ActivateRendering));

    open.send_replace(true);
    until(|| settled_at(&ctx) == Some(at(0, 0))).await;
    until(|| renderer.loading_screens().last().is_some_and(|s| !s.is_visible)).await;

    let session = ctx.world.current::<SessionState>().unwrap();
    assert_eq!(session.status, SessionStatus::Ready);
    assert_eq!(session.user_id.as_deref(), Some("0xme"));
    assert_eq!(
        renderer.commands_of(CommandKind::LoadScenes),
        vec![RendererCommand::LoadScenes(vec![SceneId::from("spawn")])]
    );

    client.shutdown().await.unwrap();
}

#[tokio::test]
async fn teleport_shows_its_label_until_the_destination_is_ready() {
    let (open, gate) = watch::channel(false);
    let renderer = Arc::new(RecordingRenderer::new());
    let client = Client::builder()
        .config(config())
        .renderer(renderer.clone())
        .factory(Arc::new(GatedFactory::new(&["home"], gate)))
        .build()
        .await
        .unwrap();
    let ctx = client.context().clone();
    until(|| settled_at(&ctx) == Some(at(0, 0))).await;

    client.teleport(at(6, 6), Some("Going home".into())).await.unwrap();
    until(|| {
        renderer.loading_screens().last().is_some_and(|s| s.is_visible && s.message == "Going home")
    })
    .await;
    let screen = renderer.loading_screens().last().cloned().unwrap();
    assert!(!screen.show_tips);
    assert_eq!(settled_at(&ctx), None);

    open.send_replace(true);
    until(|| settled_at(&ctx) == Some(at(6, 6))).await;
    until(|| renderer.loading_screens().last().is_some_and(|s| !s.is_visible)).await;
    assert!(
        renderer
            .commands_of(CommandKind::UnloadScene)
            .contains(&RendererCommand::UnloadScene("spawn".into()))
    );

    client.shutdown().await.unwrap();
}

#[tokio::test]
async fn kernel_version_defaults_to_the_client_version() {
    let renderer = Arc::new(RecordingRenderer::new());
    let client = Client::builder().config(config()).renderer(renderer.clone()).build().await.unwrap();

    let configs = renderer.commands_of(CommandKind::SetKernelConfiguration);
    let [RendererCommand::SetKernelConfiguration(kernel)] = configs.as_slice() else {
        panic!("expected one kernel configuration, got {configs:?}");
    };
    assert_eq!(kernel.kernel_version, env!("CARGO_PKG_VERSION"));
    client.shutdown().await.unwrap();

    let mut pinned = config();
    pinned.renderer.kernel_version = Some("7.1.0".into());
    let renderer = Arc::new(RecordingRenderer::new());
    let client = Client::builder().config(pinned).renderer(renderer.clone()).build().await.unwrap();
    let configs = renderer.commands_of(CommandKind::SetKernelConfiguration);
    assert!(
        matches!(configs.as_slice(), [RendererCommand::SetKernelConfiguration(k)] if k.kernel_version == "7.1.0")
    );
    client.shutdown().await.unwrap();
}

#[tokio::test]
async fn build_requires_a_renderer() {
    let err = Client::builder().config(config()).build().await.unwrap_err();
    assert!(err.to_string().contains("renderer"));
}

#[tokio::test]
async fn rejected_renderer_init_fails_the_build() {
    let renderer = Arc::new(RecordingRenderer::new());
    renderer.reject_next(CommandKind::Init);

    let err = Client::builder().config(config()).renderer(renderer).build().await.unwrap_err();
    assert!(format!("{err:#}").contains("init"));
}

#[tokio::test]
async fn shutdown_closes_the_world_state() {
    let renderer = Arc::new(RecordingRenderer::new());
    let client = Client::builder().config(config()).renderer(renderer).build().await.unwrap();
    let ctx = client.context().clone();
    until(|| settled_at(&ctx).is_some()).await;

    client.shutdown().await.unwrap();
    assert!(ctx.world.changes().is_err());
    assert!(ctx.world.current::<SettlementState>().is_none());
}
