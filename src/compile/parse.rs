//! Vellum parser.
//!
//! Utilizes a Lexer to receive instances of Token, which it uses to
//! construct a new Template containing the Abstract Syntax Tree.
//!
//! The Template can be combined with some Store data to produce output.
pub mod scope;
pub mod tree;

mod block;
mod state;

use crate::{
    compile::{
        lex::{token::Token, LexResult, LexResultMust, Lexer},
        parse::{
            block::Fragment,
            state::BlockState,
            tree::{
                Arguments, Base, Binary, Block, Call, Expression, For, Identifier, If, Include,
                Key, KeyValue, Literal, LoopVariables, Negate, Output, Set, Tree, Variable, With,
            },
        },
        template::Inheritance,
        Keyword, Operator,
    },
    log::{
        error_eof, expected_keyword, Error, INVALID_SYNTAX, STRAY_SIGNAL, UNEXPECTED_BLOCK,
        UNEXPECTED_TOKEN,
    },
    region::Region,
    Scope, Template,
};
use serde_json::{Number, Value};
use std::collections::HashMap;

pub struct Parser<'source> {
    /// Lexer used to pull from source as tokens instead of raw text.
    lexer: Lexer<'source>,
    /// Store peeked tokens.
    ///
    /// Double option is used to remember when the next token is None.
    buffer: Option<Option<(Token, Region)>>,
}

impl<'source> Parser<'source> {
    /// Create a new Parser from the given string.
    #[inline]
    pub fn new(source: &'source str) -> Self {
        Self {
            lexer: Lexer::new(source),
            buffer: None,
        }
    }

    /// Compile the template.
    ///
    /// Returns a new Template, which can be executed with some Store
    /// data to receive output.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when the source cannot be lexed, or the tokens
    /// do not describe a valid template.
    pub fn compile(mut self, name: Option<&str>) -> Result<Template, Error> {
        // Temporary storage for fragments of unclosed blocks.
        let mut states: Vec<BlockState> = vec![];

        // Contains the distinct Tree instances within a specific area of
        // the source.
        //
        // Used to remember what belongs to the then branch and what belongs
        // to the else branch in an "if" block, for example.
        let mut scopes: Vec<Scope> = vec![Scope::new()];

        // Set when an "extends" tag is found.
        let mut extends: Option<(String, Region)> = None;

        while let Some(next) = self.next()? {
            match next {
                (Token::Raw, region) => scopes.last_mut().unwrap().data.push(Tree::Raw(region)),
                (Token::BeginExpression, region) => {
                    let expression = self.parse_expression()?;
                    let (_, end_region) = self.next_must(Token::EndExpression)?;
                    let merge = region.combine(end_region);

                    scopes
                        .last_mut()
                        .unwrap()
                        .data
                        .push(Tree::Output(Output::from((expression, merge))));
                }
                (Token::BeginBlock, begin_region) => {
                    let fragment = self.parse_fragment()?;
                    let (_, end_region) = self.next_must(Token::EndBlock)?;
                    let region = begin_region.combine(end_region);

                    self.apply_fragment(
                        fragment,
                        region,
                        &mut states,
                        &mut scopes,
                        &mut extends,
                    )?;
                }
                (_, region) => {
                    return Err(Error::parse(UNEXPECTED_TOKEN)
                        .with_pointer(self.lexer.source, region));
                }
            }
        }

        if let Some(block) = states.first() {
            let (block, close, region) = match block {
                BlockState::If { region, .. } => ("if", "endif", region),
                BlockState::For { region, .. } => ("for", "endfor", region),
                BlockState::With { region, .. } => ("with", "endwith", region),
                BlockState::Block { region, .. } => ("block", "endblock", region),
            };

            return Err(Error::parse(INVALID_SYNTAX)
                .with_pointer(self.lexer.source, *region)
                .with_help(format!(
                    "did you close the `{block}` block with a `{close}` block?"
                )));
        }

        assert!(
            scopes.len() == 1,
            "parser should never have >1 scope after compilation"
        );
        let scope = scopes.remove(0);

        let inheritance = match extends {
            Some((parent, region)) => {
                Some(self.collect_inheritance(parent, region, &scope)?)
            }
            None => None,
        };

        Ok(Template {
            scope,
            name: name.map(str::to_owned),
            source: self.lexer.source.to_owned(),
            inheritance,
        })
    }

    /// Fold the given Fragment into the in-progress Scope stack.
    ///
    /// Opening fragments push a [`BlockState`] and a new [`Scope`], while
    /// closing fragments pop them and produce a finished [`Tree`].
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when the Fragment does not fit the enclosing
    /// block, such as an `endif` with no unclosed `if` above it.
    fn apply_fragment(
        &mut self,
        fragment: Fragment,
        region: Region,
        states: &mut Vec<BlockState>,
        scopes: &mut Vec<Scope>,
        extends: &mut Option<(String, Region)>,
    ) -> Result<(), Error> {
        match fragment {
            Fragment::If(condition) => {
                states.push(BlockState::If {
                    condition,
                    region,
                    has_else: false,
                });
                scopes.push(Scope::new());
            }
            Fragment::Else => match states.last_mut() {
                Some(BlockState::If { has_else, .. }) if !*has_else => {
                    *has_else = true;
                    scopes.push(Scope::new());
                }
                _ => {
                    return Err(Error::parse(UNEXPECTED_BLOCK)
                        .with_pointer(self.lexer.source, region)
                        .with_help("`else` must appear within an unclosed `if` block"));
                }
            },
            Fragment::EndIf => match states.pop() {
                Some(BlockState::If {
                    condition,
                    region: begin,
                    has_else,
                }) => {
                    let else_branch = if has_else { scopes.pop() } else { None };
                    let then_branch = scopes.pop().unwrap();

                    scopes.last_mut().unwrap().data.push(Tree::If(If {
                        condition,
                        then_branch,
                        else_branch,
                        region: begin.combine(region),
                    }));
                }
                _ => {
                    return Err(Error::parse(UNEXPECTED_BLOCK)
                        .with_pointer(self.lexer.source, region)
                        .with_help("`endif` must close an `if` block"));
                }
            },
            Fragment::For(variables, iterable) => {
                states.push(BlockState::For {
                    variables,
                    iterable,
                    region,
                });
                scopes.push(Scope::new());
            }
            Fragment::EndFor => match states.pop() {
                Some(BlockState::For {
                    variables,
                    iterable,
                    region: begin,
                }) => {
                    let body = scopes.pop().unwrap();

                    scopes.last_mut().unwrap().data.push(Tree::For(For {
                        variables,
                        iterable,
                        body,
                        region: begin.combine(region),
                    }));
                }
                _ => {
                    return Err(Error::parse(UNEXPECTED_BLOCK)
                        .with_pointer(self.lexer.source, region)
                        .with_help("`endfor` must close a `for` block"));
                }
            },
            Fragment::Break | Fragment::Continue => {
                let in_loop = states
                    .iter()
                    .any(|state| matches!(state, BlockState::For { .. }));
                if !in_loop {
                    return Err(Error::parse(STRAY_SIGNAL)
                        .with_pointer(self.lexer.source, region)
                        .with_help("`break` and `continue` must appear within a `for` block"));
                }

                let tree = match fragment {
                    Fragment::Break => Tree::Break(region),
                    _ => Tree::Continue(region),
                };
                scopes.last_mut().unwrap().data.push(tree);
            }
            Fragment::Set(name, value) => {
                scopes
                    .last_mut()
                    .unwrap()
                    .data
                    .push(Tree::Set(Set {
                        name,
                        value,
                        region,
                    }));
            }
            Fragment::With(assignments) => {
                states.push(BlockState::With {
                    assignments,
                    region,
                });
                scopes.push(Scope::new());
            }
            Fragment::EndWith => match states.pop() {
                Some(BlockState::With {
                    assignments,
                    region: begin,
                }) => {
                    let body = scopes.pop().unwrap();

                    scopes.last_mut().unwrap().data.push(Tree::With(With {
                        assignments,
                        body,
                        region: begin.combine(region),
                    }));
                }
                _ => {
                    return Err(Error::parse(UNEXPECTED_BLOCK)
                        .with_pointer(self.lexer.source, region)
                        .with_help("`endwith` must close a `with` block"));
                }
            },
            Fragment::Include(name) => {
                scopes
                    .last_mut()
                    .unwrap()
                    .data
                    .push(Tree::Include(Include { name, region }));
            }
            Fragment::Extends(parent) => {
                if extends.is_some() {
                    return Err(Error::parse(UNEXPECTED_BLOCK)
                        .with_pointer(self.lexer.source, region)
                        .with_help("a template may extend only one parent"));
                }

                let head_is_blank = states.is_empty()
                    && scopes.first().unwrap().data.iter().all(|tree| match tree {
                        Tree::Raw(raw) => self.lexer.source[*raw].trim().is_empty(),
                        _ => false,
                    });
                if !head_is_blank {
                    return Err(Error::parse(UNEXPECTED_BLOCK)
                        .with_pointer(self.lexer.source, region)
                        .with_help("`extends` must be the first block in the template"));
                }

                *extends = Some((parent, region));
            }
            Fragment::Block(name) => {
                states.push(BlockState::Block { name, region });
                scopes.push(Scope::new());
            }
            Fragment::EndBlock => match states.pop() {
                Some(BlockState::Block {
                    name,
                    region: begin,
                }) => {
                    let body = scopes.pop().unwrap();

                    scopes.last_mut().unwrap().data.push(Tree::Block(Block {
                        name,
                        body,
                        region: begin.combine(region),
                    }));
                }
                _ => {
                    return Err(Error::parse(UNEXPECTED_BLOCK)
                        .with_pointer(self.lexer.source, region)
                        .with_help("`endblock` must close a `block` block"));
                }
            },
        }

        Ok(())
    }

    /// Collect the block overrides of an extending template.
    ///
    /// The top level of an extending template may contain only named
    /// blocks and whitespace.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when other content appears at the top level,
    /// or two blocks share a name.
    fn collect_inheritance(
        &self,
        parent: String,
        region: Region,
        scope: &Scope,
    ) -> Result<Inheritance, Error> {
        let mut blocks = HashMap::new();

        for tree in &scope.data {
            match tree {
                Tree::Block(block) => {
                    if blocks
                        .insert(block.name.clone(), block.body.clone())
                        .is_some()
                    {
                        return Err(Error::parse(UNEXPECTED_BLOCK)
                            .with_pointer(self.lexer.source, block.region)
                            .with_help(format!("block `{}` is already defined", block.name)));
                    }
                }
                Tree::Raw(raw) if self.lexer.source[*raw].trim().is_empty() => continue,
                tree => {
                    return Err(Error::parse(UNEXPECTED_BLOCK)
                        .with_pointer(self.lexer.source, get_tree_region(tree))
                        .with_help(
                            "only `block` blocks may appear at the top level \
                            of an extending template",
                        ));
                }
            }
        }

        Ok(Inheritance {
            parent,
            blocks,
            region,
        })
    }

    /// Parse a Fragment.
    ///
    /// A Fragment is the content of a single block tag, such as the
    /// `if name` within `{% if name %}`.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when the content is not a valid block.
    fn parse_fragment(&mut self) -> Result<Fragment, Error> {
        let (keyword, region) = self.parse_keyword()?;

        match keyword {
            Keyword::If => Ok(Fragment::If(self.parse_expression()?)),
            Keyword::Else => Ok(Fragment::Else),
            Keyword::EndIf => Ok(Fragment::EndIf),
            Keyword::For => {
                let variables = self.parse_loop_variables()?;
                self.next_must_keyword(Keyword::In)?;
                let iterable = self.parse_expression()?;

                Ok(Fragment::For(variables, iterable))
            }
            Keyword::EndFor => Ok(Fragment::EndFor),
            Keyword::Break => Ok(Fragment::Break),
            Keyword::Continue => Ok(Fragment::Continue),
            Keyword::Set => {
                let name = self.parse_ident()?;
                self.next_must(Token::Assign)?;
                let value = self.parse_expression()?;

                Ok(Fragment::Set(name, value))
            }
            Keyword::With => {
                let mut assignments = vec![];
                loop {
                    let name = self.parse_ident()?;
                    self.next_must(Token::Assign)?;
                    let value = self.parse_expression()?;
                    assignments.push((name, value));

                    if self.next_is(Token::Comma)? {
                        self.next_must(Token::Comma)?;
                    } else {
                        break;
                    }
                }

                Ok(Fragment::With(assignments))
            }
            Keyword::EndWith => Ok(Fragment::EndWith),
            Keyword::Include => {
                let (_, name_region) = self.next_must(Token::String)?;

                Ok(Fragment::Include(self.parse_string(name_region)?))
            }
            Keyword::Extends => {
                let (_, name_region) = self.next_must(Token::String)?;

                Ok(Fragment::Extends(self.parse_string(name_region)?))
            }
            Keyword::Block => {
                let name = self.parse_ident()?;

                Ok(Fragment::Block(self.lexer.source[name.region].to_owned()))
            }
            Keyword::EndBlock => Ok(Fragment::EndBlock),
            Keyword::In | Keyword::Not => Err(Error::parse(UNEXPECTED_TOKEN)
                .with_pointer(self.lexer.source, region)
                .with_help(expected_keyword(keyword))),
        }
    }

    /// Parse a LoopVariables.
    ///
    /// Recognizes both `item` and `key, value` forms.
    fn parse_loop_variables(&mut self) -> Result<LoopVariables, Error> {
        let key = self.parse_ident()?;

        if !self.next_is(Token::Comma)? {
            return Ok(LoopVariables::Item(key));
        }
        self.next_must(Token::Comma)?;
        let value = self.parse_ident()?;

        Ok(LoopVariables::KeyValue(KeyValue {
            key,
            value,
            region: key.region.combine(value.region),
        }))
    }

    /// Parse an Expression.
    ///
    /// An Expression is a full evaluatable unit: a Base, optionally
    /// passed through filters, negated, and combined with other
    /// Expressions by operators.
    fn parse_expression(&mut self) -> Result<Expression, Error> {
        let left = self.parse_unary()?;

        self.parse_binary(left, 0)
    }

    /// Combine parsed Expressions by precedence climbing.
    ///
    /// Only operators with a binding power of at least `minimum` are
    /// consumed, the rest are left for an enclosing call.
    fn parse_binary(&mut self, mut left: Expression, minimum: u8) -> Result<Expression, Error> {
        while let Some((Token::Operator(operator), _)) = self.peek()? {
            if operator.precedence() < minimum {
                break;
            }
            let (_, operator_region) = self.next_any_must()?;
            let mut right = self.parse_unary()?;

            // Let a tighter-binding operator on the right claim the
            // operand first, so `1 + 2 * 3` becomes `1 + (2 * 3)`.
            while let Some((Token::Operator(next), _)) = self.peek()? {
                if next.precedence() <= operator.precedence() {
                    break;
                }
                right = self.parse_binary(right, operator.precedence() + 1)?;
            }

            let region = left.get_region().combine(right.get_region());
            left = Expression::Binary(Binary {
                left: Box::new(left),
                operator,
                operator_region,
                right: Box::new(right),
                region,
            });
        }

        Ok(left)
    }

    /// Parse an Expression which may be negated with `not` or `!`.
    fn parse_unary(&mut self) -> Result<Expression, Error> {
        match self.peek()? {
            Some((Token::Exclamation, _)) | Some((Token::Keyword(Keyword::Not), _)) => {
                let (_, region) = self.next_any_must()?;
                let expression = self.parse_unary()?;
                let merge = region.combine(expression.get_region());

                Ok(Expression::Negate(Negate {
                    expression: Box::new(expression),
                    region: merge,
                }))
            }
            _ => self.parse_filtered(),
        }
    }

    /// Parse an Expression which may be piped through filters.
    ///
    /// ```text
    /// {{ name | append("!") | upper }}
    /// ```
    fn parse_filtered(&mut self) -> Result<Expression, Error> {
        let mut expression = self.parse_primary()?;

        while self.next_is(Token::Pipe)? {
            self.next_must(Token::Pipe)?;
            let name = self.parse_ident()?;
            let arguments = self.parse_arguments()?;

            let end_as = match arguments.as_ref() {
                Some(arguments) => arguments.region,
                None => name.region,
            };
            let region = expression.get_region().combine(end_as);

            expression = Expression::Call(Call {
                name,
                arguments,
                receiver: Box::new(expression),
                region,
            })
        }

        Ok(expression)
    }

    /// Parse a primary Expression.
    ///
    /// Either a parenthesized Expression, or a plain Base.
    fn parse_primary(&mut self) -> Result<Expression, Error> {
        if self.next_is(Token::LeftParen)? {
            self.next_must(Token::LeftParen)?;
            let expression = self.parse_expression()?;
            self.next_must(Token::RightParen)?;

            return Ok(expression);
        }

        Ok(Expression::Base(self.parse_base()?))
    }

    /// Parse an Arguments.
    ///
    /// Filter arguments are positional, comma separated, and wrapped in
    /// parentheses:
    ///
    /// ```text
    /// {{ text | truncate(20, "...") }}
    /// ```
    ///
    /// Returns None when the filter has no parenthesized arguments.
    fn parse_arguments(&mut self) -> Result<Option<Arguments>, Error> {
        if !self.next_is(Token::LeftParen)? {
            return Ok(None);
        }
        let (_, begin) = self.next_must(Token::LeftParen)?;

        let mut values = vec![];
        if !self.next_is(Token::RightParen)? {
            loop {
                values.push(self.parse_base()?);

                if self.next_is(Token::Comma)? {
                    self.next_must(Token::Comma)?;
                } else {
                    break;
                }
            }
        }
        let (_, end) = self.next_must(Token::RightParen)?;

        Ok(Some(Arguments {
            values,
            region: begin.combine(end),
        }))
    }

    /// Parse a Keyword.
    ///
    /// # Errors
    ///
    /// Returns an error if the next token is not a Keyword.
    fn parse_keyword(&mut self) -> Result<(Keyword, Region), Error> {
        match self.next_any_must()? {
            (Token::Keyword(keyword), region) => Ok((keyword, region)),
            (token, region) => Err(Error::parse(UNEXPECTED_TOKEN)
                .with_pointer(self.lexer.source, region)
                .with_help(expected_keyword(token))),
        }
    }

    /// Parse an Identifier.
    ///
    /// # Errors
    ///
    /// Propagates an error from next_must if the next token is not an
    /// Identifier.
    fn parse_ident(&mut self) -> Result<Identifier, Error> {
        let (_, region) = self.next_must(Token::Identifier)?;

        Ok(Identifier { region })
    }

    /// Parse a Base.
    ///
    /// A Base may be returned as a Literal or Variable based on the value.
    ///
    /// ## Literal
    ///
    /// "hello world"
    ///
    /// -1000
    ///
    /// 10.2
    ///
    /// true
    ///
    /// ## Variable
    ///
    /// person.name
    fn parse_base(&mut self) -> Result<Base, Error> {
        let expression = match self.next_any_must()? {
            (Token::True, region) => Base::Literal(Literal {
                value: Value::Bool(true),
                region,
            }),
            (Token::False, region) => Base::Literal(Literal {
                value: Value::Bool(false),
                region,
            }),
            (Token::Operator(operator), region) => match operator {
                Operator::Add | Operator::Subtract => {
                    let (_, next_region) = self.next_must(Token::Number)?;

                    // -1000 | +1000  <- valid, negative/positive numbers
                    // - 1000 | + 1000 <- invalid
                    if !region.is_neighbor(next_region) {
                        return Err(Error::parse(UNEXPECTED_TOKEN)
                            .with_pointer(self.lexer.source, region)
                            .with_help(format!(
                                "if you want to indicate that {} is a positive or negative \
                                number try removing the separating whitespace",
                                &self.lexer.source[next_region]
                            )));
                    }

                    let merge = region.combine(next_region);
                    let literal = self.parse_number_literal(&self.lexer.source[merge], merge)?;
                    Base::Literal(literal)
                }
                _ => {
                    return Err(Error::parse(UNEXPECTED_TOKEN)
                        .with_pointer(self.lexer.source, region)
                        .with_help(format!(
                            "only `{}` or `{}` operators to indicate positive or negative \
                            numbers are valid here",
                            Operator::Add,
                            Operator::Subtract
                        )));
                }
            },
            (Token::Number, region) => {
                let literal = self.parse_number_literal(&self.lexer.source[region], region)?;
                Base::Literal(literal)
            }
            (Token::String, region) => {
                let literal = self.parse_string_literal(region)?;
                Base::Literal(literal)
            }
            (Token::Identifier, region) => {
                let mut path = vec![Key::from(Identifier { region })];

                // Keep chaining keys as long as we see a period.
                while self.next_is(Token::Period)? {
                    self.next_must(Token::Period)?;
                    path.push(self.parse_key()?);
                }
                Base::Variable(Variable { path })
            }
            (_, region) => {
                return Err(
                    Error::parse(UNEXPECTED_TOKEN).with_pointer(self.lexer.source, region)
                )
            }
        };

        Ok(expression)
    }

    /// Parse a Literal containing a Value::String from the literal value
    /// of the given Region.
    ///
    /// # Errors
    ///
    /// Propagates an error from parse_string if an unrecognized escape
    /// character is found.
    fn parse_string_literal(&mut self, region: Region) -> Result<Literal, Error> {
        let value = Value::String(self.parse_string(region)?);

        Ok(Literal { value, region })
    }

    /// Parse a Key.
    ///
    /// # Errors
    ///
    /// Returns an error if the next token is not a valid Identifier such
    /// as "one.two".
    fn parse_key(&mut self) -> Result<Key, Error> {
        match self.next_any_must()? {
            (Token::Identifier, region) => Ok(Key::from(Identifier { region })),
            (_, region) => Err(Error::parse(UNEXPECTED_TOKEN)
                .with_pointer(self.lexer.source, region)
                .with_help("expected an unquoted identifier such as `one.two`")),
        }
    }

    /// Parse a String from the literal value of the given Region.
    ///
    /// The Region must include the surrounding quotes.
    ///
    /// # Errors
    ///
    /// Returns an error if an unrecognized escape character is found.
    fn parse_string(&self, region: Region) -> Result<String, Error> {
        let window = region.literal(self.lexer.source);

        let string = if window.contains('\\') {
            let mut iter = window.char_indices().map(|(i, c)| (region.begin + i, c));
            let mut string = String::new();

            while let Some((index, c)) = iter.next() {
                match c {
                    '"' if index == region.begin || index == region.end - 1 => continue,
                    '\\' => {
                        let (_, esc) = iter.next().unwrap();
                        let c = match esc {
                            'n' => '\n',
                            'r' => '\r',
                            't' => '\t',
                            '\\' => '\\',
                            '"' => '"',
                            _ => {
                                return Err(Error::parse("unexpected escape character")
                                    .with_pointer(self.lexer.source, region))
                            }
                        };
                        string.push(c);
                    }
                    c => string.push(c),
                }
            }
            string
        } else {
            window[1..window.len() - 1].to_owned()
        };

        Ok(string)
    }

    /// Parse a Literal containing a Value::Number from the given Region.
    ///
    /// # Errors
    ///
    /// Returns an error if the literal value of the Region cannot be
    /// converted to a Value::Number.
    fn parse_number_literal(&self, window: &str, region: Region) -> Result<Literal, Error> {
        let as_number: Number = window.parse().map_err(|_| {
            Error::parse("unrecognizable number")
                .with_pointer(self.lexer.source, region)
                .with_help(format!(
                    "numbers may begin with `{}` to indicate a negative \
                    number and must not end with a decimal",
                    Operator::Subtract
                ))
        })?;

        Ok(Literal {
            value: Value::Number(as_number),
            region,
        })
    }

    /// Peek the next token.
    ///
    /// # Errors
    ///
    /// Propagates any error reported by the underlying Lexer.
    fn peek(&mut self) -> LexResult {
        if let o @ None = &mut self.buffer {
            *o = Some(self.lexer.next()?);
        }

        Ok(self.buffer.unwrap())
    }

    /// Get the next token.
    ///
    /// Prefers to pull a token from the internal buffer first, but will
    /// pull from the lexer when the buffer is empty.
    fn next(&mut self) -> LexResult {
        match self.buffer.take() {
            Some(t) => Ok(t),
            None => self.lexer.next(),
        }
    }

    /// Returns true if the given token matches the upcoming token.
    ///
    /// # Errors
    ///
    /// Propagates any errors reported by the underlying Lexer.
    fn next_is(&mut self, expect: Token) -> Result<bool, Error> {
        Ok(self
            .peek()?
            .map(|(token, _)| token == expect)
            .unwrap_or(false))
    }

    /// Get the next token, and compare it to the given token.
    ///
    /// # Errors
    ///
    /// An error is returned if the next token does not match the given
    /// token, or when no tokens are left.
    fn next_must(&mut self, expect: Token) -> LexResultMust {
        match self.next()? {
            Some((token, region)) => {
                if token == expect {
                    Ok((token, region))
                } else {
                    Err(Error::parse(UNEXPECTED_TOKEN)
                        .with_pointer(self.lexer.source, region)
                        .with_help(format!("expected `{expect}`")))
                }
            }
            None => Err(error_eof(self.lexer.source).with_help(format!("expected `{expect}`"))),
        }
    }

    /// Get the next token, and compare it to the given Keyword.
    ///
    /// # Errors
    ///
    /// An error is returned if the next token is not the given Keyword,
    /// or when no tokens are left.
    fn next_must_keyword(&mut self, expect: Keyword) -> Result<(Keyword, Region), Error> {
        match self.next_any_must()? {
            (Token::Keyword(keyword), region) if keyword == expect => Ok((keyword, region)),
            (token, region) => Err(Error::parse(UNEXPECTED_TOKEN)
                .with_pointer(self.lexer.source, region)
                .with_help(format!("expected keyword `{expect}`, found `{token}`"))),
        }
    }

    /// Get the next token.
    ///
    /// Similar to next, but requires that a token is returned.
    ///
    /// # Errors
    ///
    /// An error is returned if no more tokens are left.
    fn next_any_must(&mut self) -> LexResultMust {
        match self.next()? {
            Some((token, region)) => Ok((token, region)),
            None => Err(error_eof(self.lexer.source).with_help(
                "expected additional tokens, did you make sure all blocks \
                and expressions are closed?",
            )),
        }
    }
}

/// Get the Region of any Tree variant.
fn get_tree_region(tree: &Tree) -> Region {
    match tree {
        Tree::Raw(region) => *region,
        Tree::Output(output) => output.region,
        Tree::If(r#if) => r#if.region,
        Tree::For(r#for) => r#for.region,
        Tree::Set(set) => set.region,
        Tree::With(with) => with.region,
        Tree::Include(include) => include.region,
        Tree::Block(block) => block.region,
        Tree::Break(region) => *region,
        Tree::Continue(region) => *region,
    }
}

#[cfg(test)]
mod tests {
    use super::Parser;
    use crate::compile::{
        lex::token::Token,
        tree::{Expression, LoopVariables, Tree},
        Operator,
    };

    #[test]
    fn test_parser_lexer_integration() {
        let mut parser = Parser::new("hello");
        assert_eq!(parser.next(), Ok(Some((Token::Raw, (0..5).into()))));
        assert_eq!(parser.next(), Ok(None));
    }

    #[test]
    fn test_peek_multiple() {
        let mut parser = Parser::new("{{ one two");
        assert!(parser.next().is_ok());
        assert_eq!(parser.peek(), Ok(Some((Token::Identifier, (3..6).into()))));
        assert_eq!(parser.peek(), Ok(Some((Token::Identifier, (3..6).into()))));
        assert_eq!(parser.peek(), Ok(Some((Token::Identifier, (3..6).into()))));
    }

    #[test]
    fn test_parse_output() {
        let template = Parser::new("hello {{ name }}").compile(None).unwrap();
        assert_eq!(template.scope.data.len(), 2);
        assert!(matches!(template.scope.data[0], Tree::Raw(_)));
        assert!(matches!(template.scope.data[1], Tree::Output(_)));
    }

    #[test]
    fn test_raw_regions_reconstruct_source() {
        let source = "one {{ x }} two {{ y }} three";
        let template = Parser::new(source).compile(None).unwrap();

        let text: String = template
            .scope
            .data
            .iter()
            .filter_map(|tree| match tree {
                Tree::Raw(region) => Some(&template.source()[*region]),
                _ => None,
            })
            .collect();

        assert_eq!(text, "one  two  three");
    }

    #[test]
    fn test_parse_filter_chain() {
        let template = Parser::new(r#"{{ name | append("!") | upper }}"#)
            .compile(None)
            .unwrap();

        match &template.scope.data[0] {
            Tree::Output(output) => match &output.expression {
                Expression::Call(call) => {
                    assert!(call.arguments.is_none());
                    assert!(matches!(*call.receiver, Expression::Call(_)));
                }
                other => panic!("unexpected expression: {other:?}"),
            },
            other => panic!("unexpected tree: {other:?}"),
        }
    }

    #[test]
    fn test_parse_binary_precedence() {
        let template = Parser::new("{{ 1 + 2 * 3 }}").compile(None).unwrap();

        match &template.scope.data[0] {
            Tree::Output(output) => match &output.expression {
                Expression::Binary(binary) => {
                    assert_eq!(binary.operator, Operator::Add);
                    assert!(matches!(*binary.right, Expression::Binary(_)));
                }
                other => panic!("unexpected expression: {other:?}"),
            },
            other => panic!("unexpected tree: {other:?}"),
        }
    }

    #[test]
    fn test_parse_grouping() {
        let template = Parser::new("{{ (1 + 2) * 3 }}").compile(None).unwrap();

        match &template.scope.data[0] {
            Tree::Output(output) => match &output.expression {
                Expression::Binary(binary) => {
                    assert_eq!(binary.operator, Operator::Multiply);
                    assert!(matches!(*binary.left, Expression::Binary(_)));
                }
                other => panic!("unexpected expression: {other:?}"),
            },
            other => panic!("unexpected tree: {other:?}"),
        }
    }

    #[test]
    fn test_parse_if_else() {
        let template = Parser::new("{% if a %}x{% else %}y{% endif %}")
            .compile(None)
            .unwrap();

        match &template.scope.data[0] {
            Tree::If(r#if) => {
                assert_eq!(r#if.then_branch.data.len(), 1);
                assert!(r#if.else_branch.is_some());
            }
            other => panic!("unexpected tree: {other:?}"),
        }
    }

    #[test]
    fn test_parse_unclosed_if() {
        assert!(Parser::new("{% if a %}x").compile(None).is_err());
    }

    #[test]
    fn test_parse_stray_else() {
        assert!(Parser::new("{% else %}").compile(None).is_err());
    }

    #[test]
    fn test_parse_for_key_value() {
        let template = Parser::new("{% for k, v in map %}{{ k }}{% endfor %}")
            .compile(None)
            .unwrap();

        match &template.scope.data[0] {
            Tree::For(r#for) => {
                assert!(matches!(r#for.variables, LoopVariables::KeyValue(_)));
                assert_eq!(r#for.body.data.len(), 1);
            }
            other => panic!("unexpected tree: {other:?}"),
        }
    }

    #[test]
    fn test_parse_break_outside_loop() {
        assert!(Parser::new("{% break %}").compile(None).is_err());
    }

    #[test]
    fn test_parse_set() {
        let template = Parser::new("{% set x = 1 + 2 %}").compile(None).unwrap();
        assert!(matches!(template.scope.data[0], Tree::Set(_)));
    }

    #[test]
    fn test_parse_with() {
        let template = Parser::new(r#"{% with a = 1, b = "x" %}{{ a }}{% endwith %}"#)
            .compile(None)
            .unwrap();

        match &template.scope.data[0] {
            Tree::With(with) => {
                assert_eq!(with.assignments.len(), 2);
                assert_eq!(with.body.data.len(), 1);
            }
            other => panic!("unexpected tree: {other:?}"),
        }
    }

    #[test]
    fn test_parse_include() {
        let template = Parser::new(r#"{% include "header" %}"#).compile(None).unwrap();

        match &template.scope.data[0] {
            Tree::Include(include) => assert_eq!(include.name, "header"),
            other => panic!("unexpected tree: {other:?}"),
        }
    }

    #[test]
    fn test_parse_extends() {
        let template = Parser::new(
            r#"{% extends "base" %}
            {% block body %}hello{% endblock %}"#,
        )
        .compile(None)
        .unwrap();

        assert_eq!(template.extends(), Some("base"));
        assert!(template.get_block("body").is_some());
    }

    #[test]
    fn test_parse_extends_content_err() {
        assert!(Parser::new(r#"{% extends "base" %}stray text"#)
            .compile(None)
            .is_err());
    }

    #[test]
    fn test_parse_extends_not_first_err() {
        assert!(Parser::new(r#"hello {% extends "base" %}"#)
            .compile(None)
            .is_err());
    }

    #[test]
    fn test_parse_negative_num_err() {
        assert!(Parser::new("balance: {{ - 1000 }}").compile(None).is_err());
    }

    #[test]
    fn test_parse_string_escape() {
        let template = Parser::new(r#"{{ "say \"hi\"" }}"#).compile(None).unwrap();
        assert!(matches!(template.scope.data[0], Tree::Output(_)));
    }
}
