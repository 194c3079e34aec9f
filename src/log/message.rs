use super::Error;
use std::fmt::Display;

pub const UNEXPECTED_TOKEN: &str = "unexpected token";
pub const UNEXPECTED_BLOCK: &str = "unexpected block";
pub const UNEXPECTED_EOF: &str = "unexpected eof";
pub const INVALID_SYNTAX: &str = "invalid syntax";
pub const INVALID_FILTER: &str = "invalid filter";
pub const INCOMPATIBLE_TYPES: &str = "incompatible types";
pub const EMPTY_SOURCE: &str = "empty source";
pub const UNDEFINED_VARIABLE: &str = "undefined variable";
pub const INVALID_ITERABLE: &str = "invalid iterable";
pub const MISSING_TEMPLATE: &str = "missing template";
pub const CYCLIC_TEMPLATE: &str = "cyclic template reference";
pub const RECURSION_LIMIT: &str = "template recursion limit";
pub const STRAY_SIGNAL: &str = "stray loop control";

/// Return an [`Error`] explaining that the end of source was not expected.
pub fn error_eof(source: &str) -> Error {
    let source_len = source.len();
    Error::parse(UNEXPECTED_EOF)
        .with_pointer(source, source_len..source_len)
        .with_help("expected additional tokens, did you close all blocks and expressions?")
}

/// Return an [`Error`] explaining that the write operation failed.
///
/// This is likely caused by a failure during a `write!` macro operation.
pub fn error_write() -> Error {
    Error::render("write failure")
        .with_help("failed to write result of render, are you low on memory?")
}

/// Return an [`Error`] describing a missing template.
pub fn error_missing_template(name: &str) -> Error {
    Error::render(MISSING_TEMPLATE).with_help(format!(
        "template `{}` not found in engine, add it with `.add_template`",
        name
    ))
}

/// Return a string describing an unexpected operator.
pub fn expected_operator<T>(received: T) -> String
where
    T: Display,
{
    format!(
        "expected operator like `+`, `-`, `*`, `/`, `==`, `!=`, `>=`, `<=`, found `{}`",
        received
    )
}

/// Return a string describing an unexpected keyword.
pub fn expected_keyword<T>(received: T) -> String
where
    T: Display,
{
    format!(
        "expected keyword like `if`, `for`, `set`, `with`, `include`, `extends` \
        or `block`, found `{}`",
        received
    )
}
