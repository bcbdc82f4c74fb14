use std::borrow::Cow;

/// Errors raised while bootstrapping Strata from configuration.
#[strata_derive::strata_error]
pub enum StrataError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },

    #[error("Logger error{}: {source}", format_context(.context))]
    Logger { source: strata_logger::LoggerError, context: Option<Cow<'static, str>> },
}
