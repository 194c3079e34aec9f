mod value;

use crate::{
    compile::{
        tree::{Arguments, Base, Binary, Call, Expression, For, Key, LoopVariables, Output, Tree},
        Scope, Template,
    },
    log::{
        error_missing_template, error_write, Error, CYCLIC_TEMPLATE, INVALID_FILTER,
        INVALID_ITERABLE, RECURSION_LIMIT, STRAY_SIGNAL, UNDEFINED_VARIABLE,
    },
    pipe::{Escape, Pipe},
    store::Shadow,
    Engine, Store,
};
use serde_json::Value;
use std::{borrow::Cow, collections::HashMap, fmt::Write};

use self::value::{apply_operator, is_truthy};
use crate::compile::Operator;

/// Upper bound on nested template rendering, shared by includes and
/// inheritance chains.
const MAX_DEPTH: usize = 64;

/// Render a [`Template`].
///
/// Provides a shortcut to quickly render a `Template` when no custom
/// filters, named templates or escaping are needed.
///
/// You may prefer to create an [`Engine`][`crate::Engine`] if you intend
/// to use custom filters, template inheritance or includes.
///
/// # Examples
///
/// ```
/// use vellum::{compile, render, Store};
///
/// let template = compile("hello, {{ name }}!");
/// assert!(template.is_ok());
///
/// let output = render(&template.unwrap(), &Store::new().with_must("name", "taylor"));
/// assert_eq!(output.unwrap(), "hello, taylor!");
/// ```
pub fn render(template: &Template, store: &Store) -> Result<String, Error> {
    Renderer::new(&Engine::default(), template, store, Escape::None).render()
}

/// Render a [`Template`] with the given [`Escape`] mode.
///
/// Behaves like [`render`], but string values written by expressions are
/// escaped according to `escape`.
///
/// # Examples
///
/// ```
/// use vellum::{compile, render_with, Escape, Store};
///
/// let template = compile("{{ markup }}").unwrap();
/// let store = Store::new().with_must("markup", "<b>hi</b>");
///
/// let output = render_with(&template, &store, Escape::Html);
/// assert_eq!(output.unwrap(), "&lt;b&gt;hi&lt;/b&gt;");
/// ```
pub fn render_with(template: &Template, store: &Store, escape: Escape) -> Result<String, Error> {
    Renderer::new(&Engine::default(), template, store, escape).render()
}

/// Signal produced while rendering a [`Scope`].
///
/// Break and Continue unwind until the nearest enclosing loop consumes
/// them.
enum Flow {
    Normal,
    Break,
    Continue,
}

/// Block overrides gathered from an inheritance chain.
///
/// Maps a block name to the overriding [`Scope`] and the [`Template`]
/// that scope belongs to, so regions resolve against the right source.
type Overrides<'render> = HashMap<&'render str, (&'render Scope, &'render Template)>;

pub struct Renderer<'render> {
    /// An engine containing registered filters and templates.
    engine: &'render Engine,
    /// The template being rendered.
    template: &'render Template,
    /// Layered storage over the Store the Template is rendered with.
    shadow: Shadow<'render>,
    /// Default escape mode for rendered expressions.
    escape: Escape,
    /// Names of templates currently being rendered, outermost first.
    chain: Vec<&'render str>,
}

impl<'render> Renderer<'render> {
    /// Create a new Renderer.
    pub fn new(
        engine: &'render Engine,
        template: &'render Template,
        store: &'render Store,
        escape: Escape,
    ) -> Self {
        Renderer {
            engine,
            template,
            shadow: Shadow::new(store),
            escape,
            chain: vec![],
        }
    }

    /// Render the [`Template`] stored inside the [`Renderer`].
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if rendering any of the [`Tree`] instances
    /// within the `Template` fails, or writing the rendered `Tree` to the
    /// buffer fails.
    pub fn render(mut self) -> Result<String, Error> {
        let template = self.template;
        if let Some(name) = template.name() {
            self.chain.push(name);
        }

        let mut buffer = String::with_capacity(template.source().len());
        let mut pipe = Pipe::new(&mut buffer);
        self.render_template(template, &mut pipe)
            .map_err(|error| match template.name() {
                Some(name) => error.with_name_if_empty(name),
                None => error,
            })?;

        Ok(buffer)
    }

    /// Render the given [`Template`], resolving its inheritance chain.
    ///
    /// When the template extends another, the root of the chain is
    /// rendered instead, with block overrides collected along the way.
    /// The deepest child's override of a block wins.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when a parent template is missing from the
    /// engine, the chain is cyclic, or rendering the resolved scope fails.
    fn render_template(
        &mut self,
        template: &'render Template,
        pipe: &mut Pipe,
    ) -> Result<(), Error> {
        if self.chain.len() > MAX_DEPTH {
            return Err(Error::render(RECURSION_LIMIT).with_help(format!(
                "template nesting is limited to {MAX_DEPTH} levels"
            )));
        }

        let mut overrides: Overrides<'render> = HashMap::new();
        let mut visited: Vec<&str> = template.name().into_iter().collect();
        let mut current = template;

        while let Some(inheritance) = current.inheritance.as_ref() {
            let parent_name = inheritance.parent.as_str();
            if visited.contains(&parent_name) {
                return Err(Error::render(CYCLIC_TEMPLATE)
                    .with_pointer(current.source(), inheritance.region)
                    .with_help(format!(
                        "template `{parent_name}` appears in its own inheritance chain"
                    )));
            }
            if visited.len() > MAX_DEPTH {
                return Err(Error::render(RECURSION_LIMIT).with_help(format!(
                    "template nesting is limited to {MAX_DEPTH} levels"
                )));
            }
            visited.push(parent_name);

            let parent = self.engine.get_template(parent_name).ok_or_else(|| {
                error_missing_template(parent_name)
                    .with_pointer(current.source(), inheritance.region)
            })?;

            for (name, scope) in &inheritance.blocks {
                overrides.entry(name.as_str()).or_insert((scope, current));
            }
            current = parent;
        }

        match self.render_scope(&current.scope, current, &overrides, pipe)? {
            Flow::Normal => Ok(()),
            _ => Err(Error::render(STRAY_SIGNAL)
                .with_help("`break` and `continue` cannot cross template boundaries")),
        }
    }

    /// Render the given [`Scope`].
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if any of the [`Tree`] instances in the
    /// `Scope` cannot be rendered.
    fn render_scope(
        &mut self,
        scope: &'render Scope,
        template: &'render Template,
        overrides: &Overrides<'render>,
        pipe: &mut Pipe,
    ) -> Result<Flow, Error> {
        for tree in &scope.data {
            match tree {
                Tree::Raw(region) => pipe
                    .write_str(&template.source()[*region])
                    .map_err(|_| error_write())?,
                Tree::Output(output) => {
                    let (value, escape) = self.evaluate_output(output, template)?;
                    pipe.write_value(&value, escape).map_err(|_| error_write())?
                }
                Tree::If(r#if) => {
                    let mut escape = self.escape;
                    let condition =
                        self.evaluate_expression(&r#if.condition, template, &mut escape)?;
                    let truthy = is_truthy(&condition);

                    let flow = if truthy {
                        self.render_scope(&r#if.then_branch, template, overrides, pipe)?
                    } else if let Some(else_branch) = &r#if.else_branch {
                        self.render_scope(else_branch, template, overrides, pipe)?
                    } else {
                        Flow::Normal
                    };
                    if !matches!(flow, Flow::Normal) {
                        return Ok(flow);
                    }
                }
                Tree::For(r#for) => {
                    let mut escape = self.escape;
                    let iterable = self
                        .evaluate_expression(&r#for.iterable, template, &mut escape)?
                        .into_owned();

                    self.render_loop(r#for, iterable, template, overrides, pipe)?;
                }
                Tree::Set(set) => {
                    let mut escape = self.escape;
                    let value = self
                        .evaluate_expression(&set.value, template, &mut escape)?
                        .into_owned();
                    let name = template.source()[set.name.region].to_owned();

                    self.shadow.insert_value(name, value);
                }
                Tree::With(with) => {
                    // Values are evaluated against the outer scope before
                    // the new frame exists.
                    let mut assignments = Vec::with_capacity(with.assignments.len());
                    for (name, expression) in &with.assignments {
                        let mut escape = self.escape;
                        let value = self
                            .evaluate_expression(expression, template, &mut escape)?
                            .into_owned();
                        assignments.push((template.source()[name.region].to_owned(), value));
                    }

                    self.shadow.push();
                    for (name, value) in assignments {
                        self.shadow.insert_value(name, value);
                    }
                    let flow = self.render_scope(&with.body, template, overrides, pipe);
                    self.shadow.pop();

                    let flow = flow?;
                    if !matches!(flow, Flow::Normal) {
                        return Ok(flow);
                    }
                }
                Tree::Include(include) => {
                    let target = self.engine.get_template(&include.name).ok_or_else(|| {
                        error_missing_template(&include.name)
                            .with_pointer(template.source(), include.region)
                    })?;
                    if self.chain.iter().any(|name| *name == include.name) {
                        return Err(Error::render(CYCLIC_TEMPLATE)
                            .with_pointer(template.source(), include.region)
                            .with_help(format!(
                                "template `{}` is already being rendered",
                                include.name
                            )));
                    }

                    self.chain.push(&include.name);
                    let result = self.render_template(target, pipe);
                    self.chain.pop();
                    result?;
                }
                Tree::Block(block) => {
                    let flow = match overrides.get(block.name.as_str()) {
                        Some(&(scope, owner)) => {
                            self.render_scope(scope, owner, overrides, pipe)?
                        }
                        None => self.render_scope(&block.body, template, overrides, pipe)?,
                    };
                    if !matches!(flow, Flow::Normal) {
                        return Ok(flow);
                    }
                }
                Tree::Break(_) => return Ok(Flow::Break),
                Tree::Continue(_) => return Ok(Flow::Continue),
            }
        }

        Ok(Flow::Normal)
    }

    /// Render the body of the loop once per element of the iterable.
    ///
    /// Arrays bind each element, objects bind each entry, and strings
    /// bind each character. The key/value form receives the index for
    /// arrays and strings, and the key for objects.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when the value is not iterable, or rendering
    /// the body fails.
    fn render_loop(
        &mut self,
        r#for: &'render For,
        iterable: Value,
        template: &'render Template,
        overrides: &Overrides<'render>,
        pipe: &mut Pipe,
    ) -> Result<(), Error> {
        match iterable {
            Value::Array(array) => {
                for (index, item) in array.into_iter().enumerate() {
                    let flow = self.render_iteration(
                        r#for,
                        Value::from(index),
                        item,
                        template,
                        overrides,
                        pipe,
                    )?;
                    if matches!(flow, Flow::Break) {
                        break;
                    }
                }
            }
            Value::Object(object) => {
                for (key, item) in object {
                    let flow = self.render_iteration(
                        r#for,
                        Value::String(key),
                        item,
                        template,
                        overrides,
                        pipe,
                    )?;
                    if matches!(flow, Flow::Break) {
                        break;
                    }
                }
            }
            Value::String(string) => {
                for (index, character) in string.chars().enumerate() {
                    let flow = self.render_iteration(
                        r#for,
                        Value::from(index),
                        Value::String(character.to_string()),
                        template,
                        overrides,
                        pipe,
                    )?;
                    if matches!(flow, Flow::Break) {
                        break;
                    }
                }
            }
            _ => {
                return Err(Error::render(INVALID_ITERABLE)
                    .with_pointer(template.source(), r#for.iterable.get_region())
                    .with_help("`for` accepts arrays, objects and strings"))
            }
        }

        Ok(())
    }

    /// Render one iteration of a loop body with the loop variables bound
    /// in a fresh frame.
    ///
    /// The returned [`Flow`] is Break when the body requests the loop to
    /// stop, Normal otherwise.
    fn render_iteration(
        &mut self,
        r#for: &'render For,
        key: Value,
        item: Value,
        template: &'render Template,
        overrides: &Overrides<'render>,
        pipe: &mut Pipe,
    ) -> Result<Flow, Error> {
        self.shadow.push();
        match &r#for.variables {
            LoopVariables::Item(identifier) => {
                let name = template.source()[identifier.region].to_owned();
                self.shadow.insert_value(name, item);
            }
            LoopVariables::KeyValue(pair) => {
                let key_name = template.source()[pair.key.region].to_owned();
                let value_name = template.source()[pair.value.region].to_owned();
                self.shadow.insert_value(key_name, key);
                self.shadow.insert_value(value_name, item);
            }
        }
        let flow = self.render_scope(&r#for.body, template, overrides, pipe);
        self.shadow.pop();

        match flow? {
            Flow::Break => Ok(Flow::Break),
            _ => Ok(Flow::Normal),
        }
    }

    /// Evaluate an [`Output`] to return a [`Value`] and the [`Escape`]
    /// mode it should be written with.
    ///
    /// The mode starts at the renderer default, and the `safe` and
    /// `escape` pseudo-filters within the expression may override it.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering the `Output` fails.
    fn evaluate_output(
        &self,
        output: &'render Output,
        template: &'render Template,
    ) -> Result<(Cow<'_, Value>, Escape), Error> {
        let mut escape = self.escape;
        let value = self.evaluate_expression(&output.expression, template, &mut escape)?;

        Ok((value, escape))
    }

    /// Evaluate an [`Expression`] to return a [`Value`].
    ///
    /// # Errors
    ///
    /// Returns an error if rendering the `Expression` fails.
    fn evaluate_expression(
        &self,
        expression: &'render Expression,
        template: &'render Template,
        escape: &mut Escape,
    ) -> Result<Cow<'_, Value>, Error> {
        match expression {
            Expression::Base(base) => self.evaluate_base(base, template),
            Expression::Negate(negate) => {
                let value = self.evaluate_expression(&negate.expression, template, escape)?;

                Ok(Cow::Owned(Value::Bool(!is_truthy(&value))))
            }
            Expression::Binary(binary) => self.evaluate_binary(binary, template, escape),
            Expression::Call(call) => self.evaluate_call(call, template, escape),
        }
    }

    /// Evaluate a [`Binary`] to return a [`Value`].
    ///
    /// The logical operators short-circuit, everything else is delegated
    /// to [`apply_operator`].
    ///
    /// # Errors
    ///
    /// Returns an error if evaluating either side fails, or the operator
    /// cannot be applied to the values.
    fn evaluate_binary(
        &self,
        binary: &'render Binary,
        template: &'render Template,
        escape: &mut Escape,
    ) -> Result<Cow<'_, Value>, Error> {
        let left = self.evaluate_expression(&binary.left, template, escape)?;

        match binary.operator {
            Operator::And => {
                if !is_truthy(&left) {
                    return Ok(Cow::Owned(Value::Bool(false)));
                }
                let right = self.evaluate_expression(&binary.right, template, escape)?;

                Ok(Cow::Owned(Value::Bool(is_truthy(&right))))
            }
            Operator::Or => {
                if is_truthy(&left) {
                    return Ok(Cow::Owned(Value::Bool(true)));
                }
                let right = self.evaluate_expression(&binary.right, template, escape)?;

                Ok(Cow::Owned(Value::Bool(is_truthy(&right))))
            }
            operator => {
                let right = self.evaluate_expression(&binary.right, template, escape)?;

                apply_operator(&left, operator, &right)
                    .map(Cow::Owned)
                    .map_err(|error| {
                        error.with_pointer(template.source(), binary.region)
                    })
            }
        }
    }

    /// Evaluate a [`Base`] to return a [`Value`].
    ///
    /// # Errors
    ///
    /// Returns an error if rendering the `Base` fails, which may happen
    /// when a variable is not defined.
    fn evaluate_base(
        &self,
        base: &'render Base,
        template: &'render Template,
    ) -> Result<Cow<'_, Value>, Error> {
        match base {
            Base::Variable(variable) => self.evaluate_keys(&variable.path, template),
            Base::Literal(literal) => Ok(Cow::Borrowed(&literal.value)),
        }
    }

    /// Evaluate a [`Call`] to return a [`Value`].
    ///
    /// Follows the receiver until a non-call Expression is reached, the
    /// beginning input is derived from that Expression.
    ///
    /// From there, we work in the opposite direction, calling each filter
    /// one by one until we get back to the end of the `Call`.
    ///
    /// The `safe` and `escape` names are recognized before filter lookup,
    /// they adjust the [`Escape`] mode and pass the value through.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] in these cases:
    ///
    /// - Rendering the receiver of the `Call` chain fails.
    /// - A filter is not registered in the engine.
    /// - Executing a [`Filter`][`crate::filter::Filter`] returns an
    ///   `Error`.
    fn evaluate_call(
        &self,
        call: &'render Call,
        template: &'render Template,
        escape: &mut Escape,
    ) -> Result<Cow<'_, Value>, Error> {
        let mut call_stack = vec![call];
        let mut begin: &Expression = &call.receiver;

        while let Expression::Call(call) = begin {
            call_stack.push(call);
            begin = &call.receiver;
        }
        let mut value = self.evaluate_expression(begin, template, escape)?;

        for call in call_stack.iter().rev() {
            let name = &template.source()[call.name.region];

            if name == "safe" || name == "escape" {
                if call.arguments.is_some() {
                    return Err(Error::render(INVALID_FILTER)
                        .with_pointer(template.source(), call.name.region)
                        .with_help(format!("`{name}` takes no arguments")));
                }
                *escape = if name == "safe" {
                    Escape::None
                } else {
                    Escape::Html
                };
                continue;
            }

            let filter = self.engine.get_filter(name).ok_or_else(|| {
                Error::render(INVALID_FILTER)
                    .with_pointer(template.source(), call.name.region)
                    .with_help(format!(
                        "template wants to use the `{name}` filter, but a filter with \
                        that name was not found in this engine, did you add it with \
                        `.add_filter` or `.add_filter_must`?"
                    ))
            })?;

            let arguments = match &call.arguments {
                Some(arguments) => self.evaluate_arguments(arguments, template)?,
                None => vec![],
            };

            let returned = filter
                .apply(&value, &arguments)
                .map_err(|error| error.with_pointer(template.source(), call.name.region))?;

            value = Cow::Owned(returned);
        }

        Ok(value)
    }

    /// Evaluate a set of [`Key`] instances to return a [`Value`] from the
    /// [`Shadow`].
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when the first key is not defined anywhere,
    /// or a later key does not exist on the value before it.
    fn evaluate_keys(
        &self,
        keys: &'render [Key],
        template: &'render Template,
    ) -> Result<Cow<'_, Value>, Error> {
        let first = keys
            .first()
            .expect("key vector should always have at least one key");
        let first_name = &template.source()[first.get_region()];

        let mut value = match self.shadow.get(first_name) {
            Some(value) => value,
            None => {
                return Err(Error::render(UNDEFINED_VARIABLE)
                    .with_pointer(template.source(), first.get_region())
                    .with_help(format!(
                        "`{first_name}` is not in the store and was not assigned \
                        earlier in the template"
                    )))
            }
        };

        for key in keys.iter().skip(1) {
            let key_name = &template.source()[key.get_region()];
            value = match value.as_object().and_then(|object| object.get(key_name)) {
                Some(next) => next,
                None => {
                    return Err(Error::render(UNDEFINED_VARIABLE)
                        .with_pointer(template.source(), key.get_region())
                        .with_help(format!("`{key_name}` does not exist on the value")))
                }
            };
        }

        Ok(Cow::Borrowed(value))
    }

    /// Evaluate an [`Arguments`] instance to return the argument values
    /// in order.
    ///
    /// # Errors
    ///
    /// Propagates an [`Error`] if rendering a [`Base`] fails.
    fn evaluate_arguments(
        &self,
        arguments: &'render Arguments,
        template: &'render Template,
    ) -> Result<Vec<Value>, Error> {
        let mut values = Vec::with_capacity(arguments.values.len());
        for base in &arguments.values {
            values.push(self.evaluate_base(base, template)?.into_owned());
        }

        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::{render, render_with, Renderer};
    use crate::{compile, pipe::Escape, Engine, Store};
    use serde_json::json;

    #[test]
    fn test_render_raw() {
        let result = render(&compile("hello there").unwrap(), &Store::new());
        assert_eq!(result.unwrap(), "hello there");
    }

    #[test]
    fn test_render_output() {
        let result = render(
            &compile("hello there, {{ name }}!").unwrap(),
            &Store::new().with_must("name", "taylor"),
        );
        assert_eq!(result.unwrap(), "hello there, taylor!");
    }

    #[test]
    fn test_render_nested_keys() {
        let result = render(
            &compile("{{ person.name }}").unwrap(),
            &Store::new().with_must("person", json!({"name": "taylor"})),
        );
        assert_eq!(result.unwrap(), "taylor");
    }

    #[test]
    fn test_render_undefined_variable() {
        let result = render(&compile("{{ missing }}").unwrap(), &Store::new());
        assert!(result.is_err());
    }

    #[test]
    fn test_render_arithmetic() {
        let result = render(&compile("{{ 1 + 2 }}").unwrap(), &Store::new());
        assert_eq!(result.unwrap(), "3");
    }

    #[test]
    fn test_render_precedence() {
        let result = render(&compile("{{ 1 + 2 * 3 }}").unwrap(), &Store::new());
        assert_eq!(result.unwrap(), "7");

        let result = render(&compile("{{ (1 + 2) * 3 }}").unwrap(), &Store::new());
        assert_eq!(result.unwrap(), "9");
    }

    #[test]
    fn test_render_if() {
        let result = render(
            &compile(
                "{% if left > 300 %}a\
                {% else %}b\
                {% endif %}",
            )
            .unwrap(),
            &Store::new().with_must("left", 101),
        );
        assert_eq!(result.unwrap(), "b");
    }

    #[test]
    fn test_render_if_logic() {
        let result = render(
            &compile("{% if a and not b %}yes{% endif %}").unwrap(),
            &Store::new().with_must("a", true).with_must("b", false),
        );
        assert_eq!(result.unwrap(), "yes");
    }

    #[test]
    fn test_render_for_array() {
        let result = render(
            &compile("{% for item in items %}{{ item }},{% endfor %}").unwrap(),
            &Store::new().with_must("items", json!(["a", "b", "c"])),
        );
        assert_eq!(result.unwrap(), "a,b,c,");
    }

    #[test]
    fn test_render_for_key_value() {
        let result = render(
            &compile("{% for index, item in items %}{{ index }}:{{ item }} {% endfor %}")
                .unwrap(),
            &Store::new().with_must("items", json!(["a", "b"])),
        );
        assert_eq!(result.unwrap(), "0:a 1:b ");
    }

    #[test]
    fn test_render_for_object() {
        let result = render(
            &compile("{% for key, value in pair %}{{ key }}={{ value }}{% endfor %}").unwrap(),
            &Store::new().with_must("pair", json!({"one": 1})),
        );
        assert_eq!(result.unwrap(), "one=1");
    }

    #[test]
    fn test_render_for_invalid_iterable() {
        let result = render(
            &compile("{% for item in items %}x{% endfor %}").unwrap(),
            &Store::new().with_must("items", 10),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_render_break_continue() {
        let result = render(
            &compile(
                "{% for item in items %}\
                {% if item == 2 %}{% continue %}{% endif %}\
                {% if item == 4 %}{% break %}{% endif %}\
                {{ item }}\
                {% endfor %}",
            )
            .unwrap(),
            &Store::new().with_must("items", json!([1, 2, 3, 4, 5])),
        );
        assert_eq!(result.unwrap(), "13");
    }

    #[test]
    fn test_render_loop_variable_scoped() {
        let result = render(
            &compile("{% for item in items %}{% endfor %}{{ item }}").unwrap(),
            &Store::new().with_must("items", json!([1])),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_render_set() {
        let result = render(
            &compile("{% set greeting = \"hi\" %}{{ greeting }}").unwrap(),
            &Store::new(),
        );
        assert_eq!(result.unwrap(), "hi");
    }

    #[test]
    fn test_render_set_shadows_store() {
        let result = render(
            &compile("{{ name }}{% set name = \"new\" %}{{ name }}").unwrap(),
            &Store::new().with_must("name", "old"),
        );
        assert_eq!(result.unwrap(), "oldnew");
    }

    #[test]
    fn test_render_with_scope_ends() {
        let result = render(
            &compile("{% with a = 1 %}{{ a }}{% endwith %}{{ a }}").unwrap(),
            &Store::new(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_render_with_sees_outer() {
        let result = render(
            &compile("{% with b = a + 1 %}{{ b }}{% endwith %}").unwrap(),
            &Store::new().with_must("a", 1),
        );
        assert_eq!(result.unwrap(), "2");
    }

    #[test]
    fn test_render_escape_default_off() {
        let result = render(
            &compile("{{ markup }}").unwrap(),
            &Store::new().with_must("markup", "<b>hi</b>"),
        );
        assert_eq!(result.unwrap(), "<b>hi</b>");
    }

    #[test]
    fn test_render_escape_html() {
        let result = render_with(
            &compile("{{ markup }}").unwrap(),
            &Store::new().with_must("markup", "<b>hi</b>"),
            Escape::Html,
        );
        assert_eq!(result.unwrap(), "&lt;b&gt;hi&lt;/b&gt;");
    }

    #[test]
    fn test_render_escape_raw_untouched() {
        let result = render_with(
            &compile("<p>{{ markup }}</p>").unwrap(),
            &Store::new().with_must("markup", "<b>"),
            Escape::Html,
        );
        assert_eq!(result.unwrap(), "<p>&lt;b&gt;</p>");
    }

    #[test]
    fn test_render_safe_filter() {
        let result = render_with(
            &compile("{{ markup | safe }}").unwrap(),
            &Store::new().with_must("markup", "<b>"),
            Escape::Html,
        );
        assert_eq!(result.unwrap(), "<b>");
    }

    #[test]
    fn test_render_escape_filter() {
        let result = render(
            &compile("{{ markup | escape }}").unwrap(),
            &Store::new().with_must("markup", "<b>"),
        );
        assert_eq!(result.unwrap(), "&lt;b&gt;");
    }

    #[test]
    fn test_render_trim_between_blocks() {
        let result = render(
            &compile("A {%- if true -%} B {%- endif -%} C").unwrap(),
            &Store::new(),
        );
        assert_eq!(result.unwrap(), "ABC");
    }

    #[test]
    fn test_render_for_empty_array() {
        let result = render(
            &compile("[{% for item in items %}{{ item }}{% endfor %}]").unwrap(),
            &Store::new().with_must("items", json!([])),
        );
        assert_eq!(result.unwrap(), "[]");
    }

    #[test]
    fn test_render_whitespace_trim() {
        let result = render(
            &compile("hello   {{- name -}}   !").unwrap(),
            &Store::new().with_must("name", " world"),
        );
        assert_eq!(result.unwrap(), "hello world!");
    }

    #[test]
    fn test_render_include() {
        let mut engine = Engine::default();
        engine.add_template_must("header", "hi, {{ name }}");
        engine.add_template_must("page", "{% include \"header\" %}!");

        let result = engine.render_named("page", &Store::new().with_must("name", "taylor"));
        assert_eq!(result.unwrap(), "hi, taylor!");
    }

    #[test]
    fn test_render_include_set_shared() {
        let mut engine = Engine::default();
        engine.add_template_must("setter", "{% set flag = \"on\" %}");
        engine.add_template_must("page", "{% include \"setter\" %}{{ flag }}");

        let result = engine.render_named("page", &Store::new());
        assert_eq!(result.unwrap(), "on");
    }

    #[test]
    fn test_render_include_cyclic() {
        let mut engine = Engine::default();
        engine.add_template_must("a", "{% include \"b\" %}");
        engine.add_template_must("b", "{% include \"a\" %}");

        let result = engine.render_named("a", &Store::new());
        assert!(result.is_err());
    }

    #[test]
    fn test_render_include_missing() {
        let engine = Engine::default();
        let template = engine.compile("{% include \"ghost\" %}").unwrap();

        assert!(engine.render(&template, &Store::new()).is_err());
    }

    #[test]
    fn test_render_inheritance() {
        let mut engine = Engine::default();
        engine.add_template_must(
            "base",
            "<title>{% block title %}default{% endblock %}</title>",
        );
        engine.add_template_must(
            "child",
            "{% extends \"base\" %}{% block title %}{{ name }}{% endblock %}",
        );

        let result = engine.render_named("child", &Store::new().with_must("name", "home"));
        assert_eq!(result.unwrap(), "<title>home</title>");
    }

    #[test]
    fn test_render_inheritance_default_block() {
        let mut engine = Engine::default();
        engine.add_template_must(
            "base",
            "<title>{% block title %}default{% endblock %}</title>",
        );
        engine.add_template_must("child", "{% extends \"base\" %}");

        let result = engine.render_named("child", &Store::new());
        assert_eq!(result.unwrap(), "<title>default</title>");
    }

    #[test]
    fn test_render_inheritance_deepest_child_wins() {
        let mut engine = Engine::default();
        engine.add_template_must("base", "{% block body %}base{% endblock %}");
        engine.add_template_must(
            "middle",
            "{% extends \"base\" %}{% block body %}middle{% endblock %}",
        );
        engine.add_template_must("leaf", "{% extends \"middle\" %}");

        let result = engine.render_named("leaf", &Store::new());
        assert_eq!(result.unwrap(), "middle");
    }

    #[test]
    fn test_render_inheritance_cyclic() {
        let mut engine = Engine::default();
        engine.add_template_must("a", "{% extends \"b\" %}");
        engine.add_template_must("b", "{% extends \"a\" %}");

        let result = engine.render_named("a", &Store::new());
        assert!(result.is_err());
    }

    #[test]
    fn test_render_comment_discarded() {
        let result = render(&compile("a{# hidden #}b").unwrap(), &Store::new());
        assert_eq!(result.unwrap(), "ab");
    }

    #[test]
    fn test_renderer_direct() {
        let engine = Engine::default();
        let template = compile("hello, {{ name }}").unwrap();
        let store = Store::new().with_must("name", "taylor");
        let result = Renderer::new(&engine, &template, &store, Escape::None).render();

        assert_eq!(result.unwrap(), "hello, taylor");
    }
}
