use std::borrow::Cow;

/// Errors raised by registry operations.
///
/// Validation always happens before mutation, so a failed call leaves the
/// registry untouched.
#[strata_derive::strata_error]
pub enum RegistryError {
    /// Malformed identifier, unknown group or out-of-range bound.
    #[error("Invalid argument{}: {message}", format_context(.context))]
    InvalidArgument { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Illegal lifecycle transition, e.g. attaching a node twice.
    #[error("Invalid state{}: {message}", format_context(.context))]
    InvalidState { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Duplicate region, group or definition name.
    #[error("Registration conflict{}: {message}", format_context(.context))]
    RegistrationConflict { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl RegistryError {
    pub(crate) fn invalid_argument(message: impl Into<Cow<'static, str>>) -> Self {
        Self::InvalidArgument { message: message.into(), context: None }
    }

    pub(crate) fn invalid_state(message: impl Into<Cow<'static, str>>) -> Self {
        Self::InvalidState { message: message.into(), context: None }
    }

    pub(crate) fn conflict(message: impl Into<Cow<'static, str>>) -> Self {
        Self::RegistrationConflict { message: message.into(), context: None }
    }
}
