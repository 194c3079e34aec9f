//! Vellum - Template Engine
//!
//! A small text templating language. Templates mix raw text with
//! expressions, blocks and comments:
//!
//! ```html
//! <h1>{{ title | upper }}</h1>
//! {# rendered for each person #}
//! <ul>
//! {% for person in people %}
//!     <li>{{ person.name }}</li>
//! {% endfor %}
//! </ul>
//! ```
//!
//! Expressions (`{{ ... }}`) render values from the [`Store`], passed
//! through optional filters. Blocks (`{% ... %}`) provide control flow:
//! `if`/`else`, `for` loops with `break` and `continue`, `set` and
//! `with` assignments, `include`, and template inheritance with
//! `extends`/`block`. Comments (`{# ... #}`) are discarded. A `-`
//! against either edge of a tag, as in `{{- name -}}`, trims the
//! whitespace next to it.
//!
//! # Usage
//!
//! Compile and render a one-off template:
//!
//! ```
//! use vellum::{compile, render, Store};
//!
//! let template = compile("hello, {{ name }}!").unwrap();
//! let result = render(&template, &Store::new().with_must("name", "taylor"));
//!
//! assert_eq!(result.unwrap(), "hello, taylor!");
//! ```
//!
//! Or create an [`Engine`] to register named templates and custom
//! filters, and to control HTML escaping:
//!
//! ```
//! use vellum::{Engine, Escape, Store};
//!
//! let mut engine = Engine::default().with_escape(Escape::Html);
//! engine.add_template_must("base", "{% block body %}{% endblock %}");
//! engine.add_template_must(
//!     "page",
//!     r#"{% extends "base" %}{% block body %}{{ content }}{% endblock %}"#,
//! );
//!
//! let store = Store::new().with_must("content", "<script>");
//! let result = engine.render_named("page", &store);
//!
//! assert_eq!(result.unwrap(), "&lt;script&gt;");
//! ```
//!
//! When escaping is enabled, the `safe` pseudo-filter marks a value as
//! trusted, and `escape` forces escaping for a single expression when
//! the engine default is off.
mod compile;
mod engine;
mod log;
mod pipe;
mod region;
mod render;
mod store;
mod syntax;

pub mod filter;

pub use compile::{compile, Scope, Template};
pub use engine::Engine;
pub use log::{Error, ErrorKind, Pointer, Visual};
pub use pipe::Escape;
pub use region::Region;
pub use render::{render, render_with};
pub use store::Store;
pub use syntax::{Builder, Marker};

/// Create a new [`Engine`] with the default configuration.
///
/// # Examples
///
/// ```
/// let engine = vellum::default();
/// let template = engine.compile_must("hello, {{ name }}!");
/// ```
#[inline]
pub fn default() -> Engine {
    Engine::default()
}
