use plaza_kernel::domain::config::{SettlementConfig, TimeoutPolicy};
use plaza_kernel::domain::scene::{Parcel, Position};
use plaza_kernel::state::{LoadingState, RenderState, SettlementState};
use plaza_kernel::testing::{CommandKind, RecordingRenderer, RendererCommand};
use plaza_kernel::world::WorldState;
use plaza_settlement::{DeadlineOutcome, SettlementError, SettlementGate};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

fn gate(policy: TimeoutPolicy) -> (SettlementGate, WorldState, Arc<RecordingRenderer>) {
    let world = WorldState::new();
    let renderer = Arc::new(RecordingRenderer::new());
    let config = SettlementConfig { max_wait_ms: 1_000, on_timeout: policy };
    (SettlementGate::new(world.clone(), renderer.clone(), &config), world, renderer)
}

fn at(x: i32, y: i32) -> Position {
    Parcel::new(x, y).origin()
}

#[tokio::test]
async fn settle_teleports_before_activating() {
    let (mut gate, world, renderer) = gate(TimeoutPolicy::Settle);

    gate.unsettle(at(1, 1)).unwrap();
    assert!(gate.settle().unwrap());

    assert_eq!(
        renderer.kinds(),
        vec![CommandKind::DeactivateRendering, CommandKind::Teleport, CommandKind::ActivateRendering]
    );
    assert_eq!(gate.state(), SettlementState::SettledAt { position: at(1, 1) });
    assert_eq!(*world.current::<SettlementState>().unwrap(), gate.state());
    assert!(world.current::<RenderState>().unwrap().rendering_active);
}

#[tokio::test]
async fn repeated_teleports_settle_only_the_last_target() {
    let (mut gate, world, renderer) = gate(TimeoutPolicy::Settle);

    gate.request_teleport(at(10, -4), "Teleporting to 10, -4").unwrap();
    gate.request_teleport(at(-20, 3), "Teleporting to -20, 3").unwrap();
    assert_eq!(world.current::<LoadingState>().unwrap().message, "Teleporting to -20, 3");
    assert!(world.current::<LoadingState>().unwrap().show_loading_screen);
    assert!(!world.current::<RenderState>().unwrap().rendering_active);

    gate.settle().unwrap();

    assert_eq!(renderer.commands_of(CommandKind::DeactivateRendering).len(), 1);
    assert_eq!(renderer.commands_of(CommandKind::Teleport), vec![RendererCommand::Teleport(at(-20, 3))]);
    assert_eq!(renderer.commands_of(CommandKind::ActivateRendering).len(), 1);

    let loading = world.current::<LoadingState>().unwrap();
    assert!(!loading.show_loading_screen);
    assert!(!loading.initial_load);
}

#[tokio::test]
async fn settle_without_pending_target_is_a_no_op() {
    let (mut gate, _world, renderer) = gate(TimeoutPolicy::Settle);

    assert!(!gate.settle().unwrap());
    assert!(renderer.commands().is_empty());
    assert_eq!(gate.state(), SettlementState::Settled);
}

#[tokio::test]
async fn rejected_teleport_keeps_rendering_held() {
    let (mut gate, world, renderer) = gate(TimeoutPolicy::Settle);
    gate.unsettle(at(2, 2)).unwrap();
    renderer.reject_next(CommandKind::Teleport);

    let err = gate.settle().unwrap_err();
    assert!(matches!(err, SettlementError::Renderer { .. }));
    assert!(gate.state().is_unsettled());
    assert!(renderer.commands_of(CommandKind::ActivateRendering).is_empty());
    assert!(!world.current::<RenderState>().unwrap().rendering_active);

    assert!(gate.settle().unwrap());
    assert_eq!(
        renderer.kinds()[1..],
        [CommandKind::Teleport, CommandKind::ActivateRendering]
    );
}

#[tokio::test]
async fn rejected_deactivation_keeps_previous_state() {
    let (mut gate, _world, renderer) = gate(TimeoutPolicy::Settle);
    renderer.reject_next(CommandKind::DeactivateRendering);

    assert!(gate.unsettle(at(0, 0)).is_err());
    assert_eq!(gate.state(), SettlementState::Settled);
    assert!(gate.deadline().is_none());
}

#[tokio::test(start_paused = true)]
async fn timeout_settles_by_default() {
    let (mut gate, _world, renderer) = gate(TimeoutPolicy::Settle);
    gate.unsettle(at(5, 5)).unwrap();

    assert_eq!(gate.on_deadline(Instant::now()).unwrap(), DeadlineOutcome::Idle);

    tokio::time::advance(Duration::from_millis(1_001)).await;
    assert_eq!(gate.on_deadline(Instant::now()).unwrap(), DeadlineOutcome::Settled);
    assert_eq!(renderer.commands_of(CommandKind::Teleport), vec![RendererCommand::Teleport(at(5, 5))]);
}

#[tokio::test(start_paused = true)]
async fn failed_timeout_settlement_does_not_fire_again() {
    let (mut gate, _world, renderer) = gate(TimeoutPolicy::Settle);
    gate.unsettle(at(5, 5)).unwrap();
    renderer.reject_next(CommandKind::Teleport);

    tokio::time::advance(Duration::from_millis(1_001)).await;
    assert!(matches!(gate.on_deadline(Instant::now()), Err(SettlementError::Renderer { .. })));
    assert!(gate.state().is_unsettled());
    assert!(gate.deadline().is_none());
    assert_eq!(gate.on_deadline(Instant::now()).unwrap(), DeadlineOutcome::Idle);
}

#[tokio::test(start_paused = true)]
async fn wait_policy_keeps_rendering_held() {
    let (mut gate, _world, renderer) = gate(TimeoutPolicy::Wait);
    gate.unsettle(at(5, 5)).unwrap();

    tokio::time::advance(Duration::from_secs(2)).await;
    assert_eq!(gate.on_deadline(Instant::now()).unwrap(), DeadlineOutcome::Waiting);
    assert!(gate.state().is_unsettled());
    assert!(gate.deadline().is_none());
    assert!(renderer.commands_of(CommandKind::Teleport).is_empty());
}

#[tokio::test(start_paused = true)]
async fn retargeting_restarts_the_deadline() {
    let (mut gate, _world, _renderer) = gate(TimeoutPolicy::Settle);
    gate.unsettle(at(0, 0)).unwrap();
    let first = gate.deadline().unwrap();

    tokio::time::advance(Duration::from_millis(600)).await;
    gate.unsettle(at(1, 0)).unwrap();

    assert!(gate.deadline().unwrap() > first);
    assert_eq!(gate.target(), Some(at(1, 0)));
}
