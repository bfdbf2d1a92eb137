use plaza_kernel::domain::renderer::LoadingScreen;
use plaza_kernel::state::{LoadingState, RendererState, SettlementState};
use plaza_kernel::testing::RecordingRenderer;
use plaza_kernel::world::WorldState;
use plaza_loading_screen::LoadingScreenAggregator;
use std::sync::Arc;
use std::time::Duration;

async fn until(mut condition: impl FnMut() -> bool) {
    tokio::time::timeout(Duration::from_secs(2), async {
        while !condition() {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("condition not reached");
}

fn setup() -> (WorldState, Arc<RecordingRenderer>, LoadingScreenAggregator) {
    let world = WorldState::new();
    let renderer = Arc::new(RecordingRenderer::new());
    let aggregator = LoadingScreenAggregator::start(world.clone(), renderer.clone()).unwrap();
    (world, renderer, aggregator)
}

#[tokio::test]
async fn start_pushes_the_initial_screen_once() {
    let (_world, renderer, aggregator) = setup();

    assert_eq!(renderer.loading_screens(), vec![LoadingScreen::initial()]);
    assert_eq!(aggregator.current(), LoadingScreen::initial());
    assert!(aggregator.is_running());
}

#[tokio::test]
async fn first_load_shows_tips_until_parcels_load() {
    let (world, renderer, _aggregator) = setup();

    world.publish(LoadingState::default()).unwrap();
    until(|| renderer.loading_screens().len() == 2).await;
    assert_eq!(
        renderer.loading_screens()[1],
        LoadingScreen { is_visible: true, message: String::new(), show_tips: true }
    );

    world
        .publish(LoadingState { initial_load: false, ..LoadingState::default() })
        .unwrap();
    world
        .publish(RendererState { initialized: true, parcel_loading_started: true })
        .unwrap();
    until(|| renderer.loading_screens().len() == 4).await;

    let last = renderer.loading_screens().pop().unwrap();
    assert_eq!(last, LoadingScreen { is_visible: false, message: String::new(), show_tips: false });
}

#[tokio::test]
async fn unrelated_slices_do_not_recompute() {
    let (world, renderer, aggregator) = setup();
    let mut screens = aggregator.subscribe();

    world.publish(SettlementState::Settled).unwrap();
    world.publish(LoadingState { status: "Fetching".into(), ..LoadingState::default() }).unwrap();

    tokio::time::timeout(Duration::from_secs(2), screens.changed()).await.unwrap().unwrap();
    until(|| renderer.loading_screens().len() == 2).await;
    assert_eq!(aggregator.current().message, "Fetching");

    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
    assert_eq!(renderer.loading_screens().len(), 2);
}

#[tokio::test]
async fn lagging_aggregator_catches_up_with_latest_values() {
    let world = WorldState::with_capacity(1).unwrap();
    let renderer = Arc::new(RecordingRenderer::new());
    let aggregator = LoadingScreenAggregator::start(world.clone(), renderer.clone()).unwrap();

    for step in 0..8 {
        world
            .publish(LoadingState { status: format!("step {step}"), ..LoadingState::default() })
            .unwrap();
    }
    world.publish(RendererState { initialized: true, parcel_loading_started: true }).unwrap();

    until(|| aggregator.current().message == "step 7").await;
    assert!(aggregator.current().show_tips);
}

#[tokio::test]
async fn stopping_releases_the_subscription() {
    let (world, renderer, aggregator) = setup();
    aggregator.stop();
    until(|| !aggregator.is_running()).await;

    world.publish(LoadingState::default()).unwrap();
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
    assert_eq!(renderer.loading_screens().len(), 1);
}

#[tokio::test]
async fn shutdown_ends_the_aggregator() {
    let (world, _renderer, aggregator) = setup();
    let _ = world.shutdown();
    until(|| !aggregator.is_running()).await;
}

#[tokio::test]
async fn rejected_screens_are_not_fatal() {
    let (world, renderer, aggregator) = setup();
    renderer.reject_next(plaza_kernel::testing::CommandKind::SetLoadingScreen);

    world.publish(LoadingState { status: "one".into(), ..LoadingState::default() }).unwrap();
    until(|| aggregator.current().message == "one").await;
    world.publish(LoadingState { status: "two".into(), ..LoadingState::default() }).unwrap();
    until(|| renderer.loading_screens().len() == 2).await;

    assert_eq!(renderer.loading_screens()[1].message, "two");
    assert!(aggregator.is_running());
}
