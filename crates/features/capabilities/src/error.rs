use std::borrow::Cow;

/// Errors raised while registering, resolving or running capabilities.
#[plaza_derive::plaza_error]
pub enum CapabilityError {
    /// A binding with this name already exists; the first one stays active.
    #[error("Duplicate capability{}: {message}", format_context(.context))]
    DuplicateCapability { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Unknown capability{}: {message}", format_context(.context))]
    UnknownCapability { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The request pinned an API version the registry does not expose.
    #[error("Unsupported API version{}: {message}", format_context(.context))]
    UnsupportedVersion { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The caller sent params the operation cannot decode.
    #[error("Invalid params{}: {message}", format_context(.context))]
    InvalidParams { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The operation failed or panicked.
    #[error("Capability execution failed{}: {message}", format_context(.context))]
    Execution { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The sandbox channel was torn down before a response was produced.
    #[error("Sandbox gone{}: {message}", format_context(.context))]
    SandboxGone { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Invalid payload{}: {source}", format_context(.context))]
    Payload { source: serde_json::Error, context: Option<Cow<'static, str>> },
}
