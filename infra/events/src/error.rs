use std::borrow::Cow;

/// Errors that can occur while wiring event sources.
#[strata_derive::strata_error]
pub enum EventError {
    /// Out-of-range listener position or a relay onto itself.
    #[error("Invalid argument{}: {message}", format_context(.context))]
    InvalidArgument { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
