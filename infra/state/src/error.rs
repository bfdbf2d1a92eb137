use std::borrow::Cow;

/// Errors that can occur while publishing or observing world state.
#[plaza_derive::plaza_error]
pub enum WorldStateError {
    /// An internal dynamic cast failed; the slice registry invariant is broken.
    #[error("Type mismatch{}: {message}", format_context(.context))]
    TypeMismatch { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The store was shut down and no longer accepts publications or subscriptions.
    #[error("World state closed{}: {message}", format_context(.context))]
    Closed { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Capacity must be greater than zero for the change stream.
    #[error("Invalid capacity{}: {message}", format_context(.context))]
    InvalidCapacity { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
