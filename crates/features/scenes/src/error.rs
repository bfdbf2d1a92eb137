use plaza_capabilities::CapabilityError;
use plaza_kernel::RendererError;
use plaza_settlement::SettlementError;
use plaza_world_state::WorldStateError;
use std::borrow::Cow;

#[plaza_derive::plaza_error]
pub enum ScenesError {
    /// A scene sandbox could not be created or failed to start.
    #[error("Scene load failure{}: {message}", format_context(.context))]
    SceneLoadFailure { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The engine task is no longer running.
    #[error("Scene engine stopped{}: {message}", format_context(.context))]
    EngineStopped { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Renderer error{}: {source}", format_context(.context))]
    Renderer { source: RendererError, context: Option<Cow<'static, str>> },

    #[error("Settlement error{}: {source}", format_context(.context))]
    Settlement { source: SettlementError, context: Option<Cow<'static, str>> },

    #[error("World state error{}: {source}", format_context(.context))]
    State { source: WorldStateError, context: Option<Cow<'static, str>> },

    #[error("Capability error{}: {source}", format_context(.context))]
    Capability { source: CapabilityError, context: Option<Cow<'static, str>> },

    #[error("Internal scenes error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
