use crate::{
    compile::{Parser, Template},
    filter::{self, Filter},
    log::{error_missing_template, Error, INVALID_FILTER},
    pipe::Escape,
    render::Renderer,
    Store,
};
use std::collections::HashMap;

/// Facilitates compiling and rendering templates, and provides storage
/// for filters and named templates.
pub struct Engine {
    /// Filters that this Engine is aware of.
    filters: HashMap<String, Box<dyn Filter>>,
    /// Templates that this Engine is aware of.
    templates: HashMap<String, Template>,
    /// Default escape mode for rendered expressions.
    escape: Escape,
}

impl Engine {
    /// Create a new instance of [`Engine`].
    ///
    /// The `Engine` starts with the built-in `upper`, `lower` and `trim`
    /// filters registered, and escaping disabled.
    pub fn new() -> Self {
        let mut engine = Self {
            filters: HashMap::new(),
            templates: HashMap::new(),
            escape: Escape::default(),
        };
        engine.add_filter_must("upper", filter::upper);
        engine.add_filter_must("lower", filter::lower);
        engine.add_filter_must("trim", filter::trim);

        engine
    }

    /// Set the default [`Escape`] mode for rendered expressions.
    ///
    /// Returns the [`Engine`], so additional methods may be chained.
    ///
    /// # Examples
    ///
    /// ```
    /// use vellum::{Engine, Escape, Store};
    ///
    /// let engine = Engine::default().with_escape(Escape::Html);
    /// let template = engine.compile_must("{{ markup }}");
    /// let result = engine.render(&template, &Store::new().with_must("markup", "<b>"));
    ///
    /// assert_eq!(result.unwrap(), "&lt;b&gt;");
    /// ```
    #[inline]
    pub fn with_escape(mut self, escape: Escape) -> Self {
        self.escape = escape;

        self
    }

    /// Set the default [`Escape`] mode for rendered expressions.
    #[inline]
    pub fn set_escape(&mut self, escape: Escape) {
        self.escape = escape;
    }

    /// Compile a new [`Template`].
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when compilation fails, which most likely
    /// means the source contains invalid syntax.
    ///
    /// # Examples
    ///
    /// ```
    /// use vellum::Engine;
    ///
    /// let engine = Engine::default();
    /// let template = engine.compile("hello, {{ name }}!");
    /// assert!(template.is_ok());
    /// ```
    #[inline]
    pub fn compile(&self, text: &str) -> Result<Template, Error> {
        Parser::new(text).compile(None)
    }

    /// Compile a new [`Template`].
    ///
    /// # Panics
    ///
    /// Panics when compilation fails, which most likely means the source
    /// contains invalid syntax.
    ///
    /// # Examples
    ///
    /// ```
    /// use vellum::Engine;
    ///
    /// let engine = Engine::default();
    /// let template = engine.compile_must("hello, {{ name }}!");
    /// ```
    #[inline]
    pub fn compile_must(&self, text: &str) -> Template {
        self.compile(text).unwrap()
    }

    /// Render a [`Template`] with the given [`Store`].
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if rendering fails, which may happen when a
    /// [`Filter`] returns an `Error` itself, or the template cannot be
    /// rendered for a reason that will be described by the `Error`.
    ///
    /// # Examples
    ///
    /// ```
    /// use vellum::{Store, Engine};
    ///
    /// let engine = Engine::default();
    /// let template = engine.compile_must("hello, {{ name }}!");
    /// let result = engine.render(&template, &Store::new().with_must("name", "taylor"));
    ///
    /// assert_eq!(result.unwrap(), "hello, taylor!")
    /// ```
    #[inline]
    pub fn render(&self, template: &Template, store: &Store) -> Result<String, Error> {
        Renderer::new(self, template, store, self.escape).render()
    }

    /// Render the [`Template`] registered under the given name.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when no template with the given name exists
    /// in the engine, or rendering it fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use vellum::{Store, Engine};
    ///
    /// let mut engine = Engine::default();
    /// engine.add_template_must("greet", "hello, {{ name }}!");
    /// let result = engine.render_named("greet", &Store::new().with_must("name", "taylor"));
    ///
    /// assert_eq!(result.unwrap(), "hello, taylor!")
    /// ```
    pub fn render_named(&self, name: &str, store: &Store) -> Result<String, Error> {
        let template = self
            .get_template(name)
            .ok_or_else(|| error_missing_template(name))?;

        self.render(template, store)
            .map_err(|error| error.with_name_if_empty(name))
    }

    /// Compile and store a new [`Template`] with the given name.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when a `Template` with the given name already
    /// exists, or when compilation fails, which most likely means the
    /// source contains invalid syntax.
    ///
    /// # Examples
    ///
    /// ```
    /// use vellum::Engine;
    ///
    /// let mut engine = Engine::default();
    /// let result = engine.add_template("template_name", "hello, {{ name }}!");
    /// assert!(result.is_ok());
    ///
    /// let second = engine.add_template("template_name", "hello again");
    /// assert!(second.is_err());
    /// ```
    pub fn add_template(&mut self, name: &str, text: &str) -> Result<(), Error> {
        if self.templates.contains_key(name) {
            return Err(Error::parse(format!(
                "template with name `{name}` already exists in engine, \
                overwrite it with `.add_template_must`"
            )));
        }

        let template = Parser::new(text)
            .compile(Some(name))
            .map_err(|error| error.with_name_if_empty(name))?;

        self.templates.insert(name.to_owned(), template);
        Ok(())
    }

    /// Compile and store a new [`Template`] with the given name.
    ///
    /// If a `Template` with the given name already exists in the
    /// [`Engine`], it is overwritten.
    ///
    /// # Panics
    ///
    /// Panics when compilation fails, which most likely means the source
    /// contains invalid syntax.
    ///
    /// # Examples
    ///
    /// ```
    /// use vellum::Engine;
    ///
    /// let mut engine = Engine::default();
    /// engine.add_template_must("template_name", "hello, {{ name }}!");
    /// ```
    pub fn add_template_must(&mut self, name: &str, text: &str) {
        let template = Parser::new(text)
            .compile(Some(name))
            .map_err(|error| error.with_name_if_empty(name))
            .unwrap();

        self.templates.insert(name.to_owned(), template);
    }

    /// Return the named [`Template`].
    ///
    /// # Examples
    ///
    /// ```
    /// use vellum::Engine;
    ///
    /// let mut engine = Engine::default();
    /// engine.add_template_must("template_name", "hello, {{ name }}!");
    ///
    /// let template = engine.get_template("template_name");
    /// assert!(template.is_some());
    /// ```
    pub fn get_template(&self, name: &str) -> Option<&Template> {
        self.templates.get(name)
    }

    /// Add a [`Filter`].
    ///
    /// # Errors
    ///
    /// If a `Filter` with the given name already exists in the engine, an
    /// [`Error`] is returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use vellum::{
    ///     filter::{
    ///         serde::{json, Value},
    ///         Error,
    ///     },
    ///     Engine, Store,
    /// };
    ///
    /// fn reverse(value: &Value, _: &[Value]) -> Result<Value, Error> {
    ///     match value {
    ///         Value::String(string) => Ok(json!(string.chars().rev().collect::<String>())),
    ///         _ => Err(Error::build("filter `reverse` requires string input")),
    ///     }
    /// }
    ///
    /// let mut engine = Engine::default();
    /// let result = engine.add_filter("reverse", reverse);
    ///
    /// assert!(result.is_ok());
    /// ```
    pub fn add_filter<T>(&mut self, name: &str, filter: T) -> Result<(), Error>
    where
        T: Filter + 'static,
    {
        if self.filters.contains_key(name) {
            return Err(Error::render(INVALID_FILTER).with_help(format!(
                "filter with name `{name}` already exists in engine, \
                overwrite it with `.add_filter_must`"
            )));
        }
        self.filters.insert(name.to_owned(), Box::new(filter));
        Ok(())
    }

    /// Add a [`Filter`].
    ///
    /// If a `Filter` with the given name already exists in the
    /// [`Engine`], it is overwritten.
    #[inline]
    pub fn add_filter_must<T>(&mut self, name: &str, filter: T)
    where
        T: Filter + 'static,
    {
        self.filters.insert(name.to_owned(), Box::new(filter));
    }

    /// Add a [`Filter`].
    ///
    /// Returns the [`Engine`], so additional methods may be chained.
    ///
    /// # Errors
    ///
    /// If a `Filter` with the given name already exists in the engine, an
    /// [`Error`] is returned.
    #[inline]
    pub fn with_filter<T>(mut self, name: &str, filter: T) -> Result<Self, Error>
    where
        T: Filter + 'static,
    {
        self.add_filter(name, filter)?;

        Ok(self)
    }

    /// Add a [`Filter`].
    ///
    /// Returns the [`Engine`], so additional methods may be chained.
    ///
    /// If a `Filter` with the given name already exists in the
    /// [`Engine`], it is overwritten.
    #[inline]
    pub fn with_filter_must<T>(mut self, name: &str, filter: T) -> Self
    where
        T: Filter + 'static,
    {
        self.add_filter_must(name, filter);

        self
    }

    /// Return the named [`Filter`].
    pub(crate) fn get_filter(&self, name: &str) -> Option<&dyn Filter> {
        self.filters.get(name).map(|filter| filter.as_ref())
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::Engine;
    use crate::Store;

    #[test]
    fn test_add_template_duplicate() {
        let mut engine = Engine::default();
        assert!(engine.add_template("one", "a").is_ok());
        assert!(engine.add_template("one", "b").is_err());
    }

    #[test]
    fn test_add_template_must_overwrites() {
        let mut engine = Engine::default();
        engine.add_template_must("one", "a");
        engine.add_template_must("one", "b");

        let result = engine.render_named("one", &Store::new());
        assert_eq!(result.unwrap(), "b");
    }

    #[test]
    fn test_add_template_invalid_syntax() {
        let mut engine = Engine::default();
        assert!(engine.add_template("bad", "{{ name").is_err());
    }

    #[test]
    fn test_render_named_missing() {
        let engine = Engine::default();
        assert!(engine.render_named("ghost", &Store::new()).is_err());
    }

    #[test]
    fn test_named_error_carries_template_name() {
        let mut engine = Engine::default();
        engine.add_template_must("broken", "{{ missing }}");

        let error = engine.render_named("broken", &Store::new()).unwrap_err();
        assert_eq!(error.name(), Some("broken"));
    }
}
