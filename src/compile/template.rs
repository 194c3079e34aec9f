use crate::{compile::parse::scope::Scope, region::Region};
use std::collections::HashMap;

/// A compiled [`Scope`] and the source text it refers to.
///
/// Obtained from [`compile`][`crate::compile()`] or
/// [`Engine::compile`][`crate::Engine::compile`], and rendered by passing
/// it to [`Engine::render`][`crate::Engine::render`] along with a
/// [`Store`][`crate::Store`].
#[derive(Debug, Clone)]
pub struct Template {
    /// The Abstract Syntax Tree of the Template.
    pub(crate) scope: Scope,
    /// Name of the Template, usually the name it was registered to an
    /// [`Engine`][`crate::Engine`] with.
    pub(crate) name: Option<String>,
    /// The source text the [`Scope`] refers to.
    pub(crate) source: String,
    /// Present when the Template extends another.
    pub(crate) inheritance: Option<Inheritance>,
}

impl Template {
    /// Get the name of the Template, if one is set.
    #[inline]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Get the source text of the Template.
    #[inline]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Get the name of the parent Template, if this Template extends one.
    #[inline]
    pub fn extends(&self) -> Option<&str> {
        self.inheritance
            .as_ref()
            .map(|inheritance| inheritance.parent.as_str())
    }

    /// Get the override for the named block, if this Template defines one.
    pub(crate) fn get_block(&self, name: &str) -> Option<&Scope> {
        self.inheritance
            .as_ref()
            .and_then(|inheritance| inheritance.blocks.get(name))
    }
}

/// Link between an extending [`Template`] and its parent.
#[derive(Debug, Clone)]
pub struct Inheritance {
    /// Name of the parent Template.
    pub(crate) parent: String,
    /// Block overrides defined by the extending Template.
    pub(crate) blocks: HashMap<String, Scope>,
    /// Location of the "extends" tag.
    pub(crate) region: Region,
}
