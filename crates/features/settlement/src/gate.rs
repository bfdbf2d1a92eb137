use crate::error::{SettlementError, SettlementErrorExt};
use plaza_domain::config::{SettlementConfig, TimeoutPolicy};
use plaza_domain::scene::Position;
use plaza_kernel::state::{LoadingState, RenderState, SettlementState};
use plaza_kernel::{HostContext, Renderer};
use plaza_world_state::WorldState;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// What a fired deadline led to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeadlineOutcome {
    /// The gate settled on its target anyway.
    Settled,
    /// The gate keeps waiting for the destination scenes.
    Waiting,
    /// Nothing was pending.
    Idle,
}

/// Holds rendering while the player position is unsettled.
///
/// The gate is the only writer of [`SettlementState`] and [`RenderState`]. It is driven
/// synchronously by its owner, one reaction at a time.
#[derive(Debug)]
pub struct SettlementGate {
    world: WorldState,
    renderer: Arc<dyn Renderer>,
    max_wait: Duration,
    on_timeout: TimeoutPolicy,
    state: SettlementState,
    deadline: Option<Instant>,
}

impl SettlementGate {
    #[must_use]
    pub fn new(world: WorldState, renderer: Arc<dyn Renderer>, config: &SettlementConfig) -> Self {
        Self {
            world,
            renderer,
            max_wait: Duration::from_millis(config.max_wait_ms),
            on_timeout: config.on_timeout,
            state: SettlementState::default(),
            deadline: None,
        }
    }

    #[must_use]
    pub fn from_context(ctx: &HostContext) -> Self {
        Self::new(ctx.world.clone(), Arc::clone(&ctx.renderer), &ctx.config.settlement)
    }

    #[must_use]
    pub const fn state(&self) -> SettlementState {
        self.state
    }

    /// Target of the settlement in flight.
    #[must_use]
    pub const fn target(&self) -> Option<Position> {
        self.state.target()
    }

    #[must_use]
    pub const fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Shows the teleport message and unsettles towards `target`.
    ///
    /// # Errors
    /// Fails if rendering could not be deactivated or the world state is closed.
    pub fn request_teleport(&mut self, target: Position, message: &str) -> Result<(), SettlementError> {
        self.world
            .update::<LoadingState, _>(|loading| {
                loading.show_loading_screen = true;
                message.clone_into(&mut loading.message);
            })
            .context("Publishing teleport message")?;
        self.unsettle(target)
    }

    /// Deactivates rendering until `target` is settled.
    ///
    /// Repeated calls before settlement only move the target and restart the deadline.
    ///
    /// # Errors
    /// Returns [`SettlementError::Renderer`] if rendering could not be deactivated; the gate
    /// then keeps its previous state.
    pub fn unsettle(&mut self, target: Position) -> Result<(), SettlementError> {
        if self.state.is_unsettled() {
            debug!(target = ?target, "Settlement retargeted");
        } else {
            self.renderer.deactivate_rendering().map_err(|err| rejected("deactivate_rendering", err))?;
            self.world.publish(RenderState { rendering_active: false })?;
            debug!(target = ?target, "Position unsettled");
        }

        self.state = SettlementState::Unsettling { target };
        self.deadline = Some(Instant::now() + self.max_wait);
        self.world.publish(self.state)?;
        Ok(())
    }

    /// Settles on the current target. Returns false if nothing was pending.
    ///
    /// # Errors
    /// Returns [`SettlementError::Renderer`] if the teleport or the activation was rejected;
    /// the gate then stays unsettled.
    pub fn settle(&mut self) -> Result<bool, SettlementError> {
        let Some(target) = self.state.target() else {
            return Ok(false);
        };

        self.renderer.teleport(target).map_err(|err| rejected("teleport", err))?;
        self.renderer.activate_rendering().map_err(|err| rejected("activate_rendering", err))?;

        self.state = SettlementState::SettledAt { position: target };
        self.deadline = None;
        self.world.publish(self.state)?;
        self.world.publish(RenderState { rendering_active: true })?;
        self.world
            .update::<LoadingState, _>(|loading| {
                loading.show_loading_screen = false;
                loading.initial_load = false;
            })
            .context("Publishing settled loading state")?;

        info!(position = ?target, "Position settled");
        Ok(true)
    }

    /// Applies the timeout policy if the deadline has passed at `now`.
    ///
    /// A deadline fires once. If settling fails the gate stays unsettled without a deadline.
    ///
    /// # Errors
    /// Propagates [`SettlementGate::settle`] failures.
    pub fn on_deadline(&mut self, now: Instant) -> Result<DeadlineOutcome, SettlementError> {
        match self.deadline {
            Some(deadline) if deadline <= now => self.deadline = None,
            _ => return Ok(DeadlineOutcome::Idle),
        }

        match self.on_timeout {
            TimeoutPolicy::Settle => {
                warn!(target = ?self.target(), waited_ms = self.max_wait.as_millis(), "Settlement timed out, settling anyway");
                self.settle()?;
                Ok(DeadlineOutcome::Settled)
            },
            TimeoutPolicy::Wait => {
                warn!(target = ?self.target(), waited_ms = self.max_wait.as_millis(), "Settlement timed out, still waiting");
                Ok(DeadlineOutcome::Waiting)
            },
        }
    }
}

fn rejected(command: &'static str, err: plaza_kernel::RendererError) -> SettlementError {
    warn!(command, error = %err, "Renderer rejected settlement command");
    SettlementError::Renderer { source: err, context: Some(command.into()) }
}
