//! Contains the [`Filter`] trait, and types useful for creating and using
//! filters.
//!
//! A `Filter` is a function that can be used to modify a [`Value`] before
//! it is rendered. Any struct that implements the [`Filter`] trait, or
//! function matching the [`apply`][`Filter::apply`] method, can be
//! registered as a `Filter` on an [`Engine`][`crate::Engine`].
//!
//! A `Filter` registered with an `Engine` is available for use in any
//! [`Template`][`crate::Template`] rendered by that `Engine`.
//!
//! ## Examples
//!
//! This expression attempts to render a "name" variable from the
//! [`Store`][`crate::Store`], but you can also pass in literal values
//! like strings and numbers.
//!
//! ```html
//! {{ name | append("!") | upper }}
//! ```
//!
//! Upon rendering this expression, Vellum will search the `Store` for
//! "name" and use that value as the input for `append`, the first filter
//! in the call chain.
//!
//! Filter arguments are positional, comma separated, and appear in
//! parentheses after the filter name. Here `append` receives one
//! argument, the string "!". A filter that takes no arguments, like
//! `upper`, is written without parentheses.
//!
//! We'll create a filter that allows us to access the
//! [`repeat`](https://doc.rust-lang.org/std/primitive.str.html#method.repeat)
//! function available in the standard library.
//!
//! You can either create a struct and implement the trait on it, or just
//! create a function matching the trait signature:
//!
//! ```
//! use vellum::{
//!     filter::{
//!         serde::{json, Value},
//!         Error,
//!     },
//!     Store,
//! };
//!
//! fn repeat(value: &Value, args: &[Value]) -> Result<Value, Error> {
//!     let count = match args {
//!         [Value::Number(n)] if n.is_u64() => n.as_u64().unwrap(),
//!         _ => return Err(Error::build("filter `repeat` expects one integer argument")),
//!     };
//!     match value {
//!         Value::String(string) => Ok(json!(string.repeat(count as usize))),
//!         _ => Err(Error::build("filter `repeat` requires string input")
//!             .with_help("use quotes to coerce data to string")),
//!     }
//! }
//!
//! let engine = vellum::default().with_filter_must("repeat", repeat);
//! let template = engine.compile("{{ word | repeat(2) }}").unwrap();
//! let result = engine.render(&template, &Store::new().with_must("word", "ha"));
//!
//! assert_eq!(result.unwrap(), "haha");
//! ```
//!
//! If you return an [`Error`] from your filter, Vellum will generate a
//! visualization that points to the filter in the template source. Print
//! the error with `{:#}` to see it:
//!
//! ```text
//! render error: filter `repeat` requires string input
//!  --> ?:1:10
//!   |
//! 1 | {{ word | repeat(2) }}
//!   |           ^^^^^^
//!   |
//!  = help: use quotes to coerce data to string
//! ```

pub mod serde {
    //! Contains types from `serde_json`.
    pub use serde_json::*;
}
pub mod visual {
    //! Contains the `Visual` trait and different types which implement
    //! `Visual`.
    pub use crate::log::{Pointer, Visual};
}

pub use crate::{log::Error, region::Region};

use serde_json::{json, Value};

/// Describes a type which can be used to transform input in an expression.
pub trait Filter: Sync + Send {
    /// Execute the filter with the given input and arguments, and return
    /// a new Value as output.
    fn apply(&self, input: &Value, args: &[Value]) -> Result<Value, Error>;
}

/// Allows assignment of any function matching the signature of `apply`
/// as a `Filter` to `Engine`, instead of requiring a struct be created.
impl<F> Filter for F
where
    F: Fn(&Value, &[Value]) -> Result<Value, Error> + Sync + Send,
{
    fn apply(&self, value: &Value, args: &[Value]) -> Result<Value, Error> {
        self(value, args)
    }
}

/// Uppercase the given value.
///
/// # Errors
///
/// Returns an Error if the Value is not of type String, or any
/// arguments are passed.
pub(crate) fn upper(value: &Value, args: &[Value]) -> Result<Value, Error> {
    require_no_arguments("upper", args)?;
    match value {
        Value::String(string) => Ok(json!(string.to_uppercase())),
        _ => Err(Error::build("filter `upper` requires string input")),
    }
}

/// Lowercase the given value.
///
/// # Errors
///
/// Returns an Error if the Value is not of type String, or any
/// arguments are passed.
pub(crate) fn lower(value: &Value, args: &[Value]) -> Result<Value, Error> {
    require_no_arguments("lower", args)?;
    match value {
        Value::String(string) => Ok(json!(string.to_lowercase())),
        _ => Err(Error::build("filter `lower` requires string input")),
    }
}

/// Remove leading and trailing whitespace from the given value.
///
/// Strips spaces, tabs, carriage returns and newlines.
///
/// # Errors
///
/// Returns an Error if the Value is not of type String, or any
/// arguments are passed.
pub(crate) fn trim(value: &Value, args: &[Value]) -> Result<Value, Error> {
    require_no_arguments("trim", args)?;
    match value {
        Value::String(string) => Ok(json!(string
            .trim_matches(|c| matches!(c, ' ' | '\t' | '\r' | '\n')))),
        _ => Err(Error::build("filter `trim` requires string input")),
    }
}

/// Return an Error if any arguments are present.
fn require_no_arguments(name: &str, args: &[Value]) -> Result<(), Error> {
    if !args.is_empty() {
        return Err(Error::build(format!(
            "filter `{name}` expects no arguments, received `{}`",
            args.len()
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::{engine::Engine, log::Error, store::Store};
    use serde_json::{json, Value};

    #[test]
    fn test_call_chain() {
        let engine = get_test_engine();
        let result = engine.render(
            &engine
                .compile("{{ name | lower | left(3) }}")
                .unwrap(),
            &Store::new().with_must("name", "TAYLOR"),
        );

        assert_eq!(result.unwrap(), "tay");
    }

    #[test]
    fn test_call_chain_error() {
        let engine = get_test_engine();
        let result = engine.render(
            &engine
                .compile("{{ name | lower | left(\"10\") }}")
                .unwrap(),
            &Store::new().with_must("name", "TAYLOR"),
        );

        assert!(result.is_err());
    }

    #[test]
    fn test_builtin_upper() {
        let engine = Engine::default();
        let result = engine.render(
            &engine.compile("{{ name | upper }}").unwrap(),
            &Store::new().with_must("name", "taylor"),
        );

        assert_eq!(result.unwrap(), "TAYLOR");
    }

    #[test]
    fn test_builtin_trim() {
        let engine = Engine::default();
        let result = engine.render(
            &engine.compile("{{ name | trim }}").unwrap(),
            &Store::new().with_must("name", "\t taylor \n"),
        );

        assert_eq!(result.unwrap(), "taylor");
    }

    #[test]
    fn test_builtin_rejects_arguments() {
        let engine = Engine::default();
        let result = engine.render(
            &engine.compile("{{ name | upper(1) }}").unwrap(),
            &Store::new().with_must("name", "taylor"),
        );

        assert!(result.is_err());
    }

    #[test]
    fn test_missing_filter() {
        let engine = Engine::default();
        let result = engine.render(
            &engine.compile("{{ name | sparkle }}").unwrap(),
            &Store::new().with_must("name", "taylor"),
        );

        assert!(result.is_err());
    }

    /// Return a new Engine equipped with test filters.
    fn get_test_engine() -> Engine {
        Engine::default().with_filter_must("left", left)
    }

    /// Return the first n characters of the input Value from the left,
    /// where n is the value of the argument.
    ///
    /// Similar to TSQL `LEFT`.
    ///
    /// # Errors
    ///
    /// Returns an Error if the input is not a string, or the argument is
    /// not a single integer.
    fn left(value: &Value, args: &[Value]) -> Result<Value, Error> {
        let n = match args {
            [Value::Number(number)] if number.is_u64() => number.as_u64().unwrap(),
            _ => {
                return Err(Error::build(
                    "filter `left` expects one integer argument",
                ))
            }
        };

        match value {
            Value::String(string) => {
                Ok(json!(string.chars().take(n as usize).collect::<String>()))
            }
            _ => Err(Error::build("filter `left` requires string input")),
        }
    }
}
