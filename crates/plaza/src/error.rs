use plaza_capabilities::CapabilityError;
use plaza_kernel::RendererError;
use plaza_loading_screen::LoadingScreenError;
use plaza_scenes::ScenesError;
use std::borrow::Cow;

#[plaza_derive::plaza_error]
pub enum PlazaError {
    #[error("Renderer error{}: {source}", format_context(.context))]
    Renderer { source: RendererError, context: Option<Cow<'static, str>> },

    #[error("Capability error{}: {source}", format_context(.context))]
    Capability { source: CapabilityError, context: Option<Cow<'static, str>> },

    #[error("Loading screen error{}: {source}", format_context(.context))]
    LoadingScreen { source: LoadingScreenError, context: Option<Cow<'static, str>> },

    #[error("Scenes error{}: {source}", format_context(.context))]
    Scenes { source: ScenesError, context: Option<Cow<'static, str>> },
}
