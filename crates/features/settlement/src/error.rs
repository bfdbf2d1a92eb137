use plaza_kernel::RendererError;
use plaza_world_state::WorldStateError;
use std::borrow::Cow;

#[plaza_derive::plaza_error]
pub enum SettlementError {
    /// A renderer command was rejected; the gate kept its previous state.
    #[error("Renderer error{}: {source}", format_context(.context))]
    Renderer { source: RendererError, context: Option<Cow<'static, str>> },

    #[error("World state error{}: {source}", format_context(.context))]
    State { source: WorldStateError, context: Option<Cow<'static, str>> },
}
