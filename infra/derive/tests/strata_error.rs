use std::borrow::Cow;
use strata_derive::strata_error;

#[strata_error]
pub enum SampleError {
    #[error("Invalid argument{}: {message}", format_context(.context))]
    InvalidArgument { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Parse failure{}: {source}", format_context(.context))]
    Parse { source: std::num::ParseIntError, context: Option<Cow<'static, str>> },

    #[error("Internal fault{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn parse(raw: &str) -> Result<i32, SampleError> {
    Ok(raw.parse::<i32>()?)
}

#[test]
fn strata_error_ui() {
    let t = trybuild::TestCases::new();
    t.pass("tests/ui/strata_error_pass.rs");
}

#[test]
fn kind_reports_variant_name() {
    let err = SampleError::InvalidArgument { message: "bad".into(), context: None };
    assert_eq!(err.kind(), "InvalidArgument");
    assert_eq!(err.to_string(), "Invalid argument: bad");
}

#[test]
fn context_is_rendered_in_display() {
    let result: Result<(), SampleError> =
        Err(SampleError::InvalidArgument { message: "bad".into(), context: None });
    let err = result.context("checking input").unwrap_err();
    assert_eq!(err.to_string(), "Invalid argument (checking input): bad");
}

#[test]
fn source_errors_convert_with_question_mark() {
    let err = parse("nope").unwrap_err();
    assert_eq!(err.kind(), "Parse");
    assert!(matches!(err, SampleError::Parse { context: None, .. }));
}

#[test]
fn source_results_accept_context() {
    let err = "x".parse::<i32>().context("reading port").unwrap_err();
    assert!(matches!(err, SampleError::Parse { context: Some(ref c), .. } if c == "reading port"));
}

#[test]
fn internal_converts_from_strings() {
    let from_static = SampleError::from("static");
    let from_owned = SampleError::from(String::from("owned"));
    assert_eq!(from_static.kind(), "Internal");
    assert_eq!(from_owned.to_string(), "Internal fault: owned");
}
