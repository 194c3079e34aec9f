pub mod lex;
pub mod parse;

mod template;

pub use crate::compile::{
    lex::Lexer,
    parse::{scope::Scope, tree, Parser},
    template::{Inheritance, Template},
};

use crate::log::Error;
use std::fmt::Display;

/// Compile a [`Template`] from the given text.
///
/// Provides a shortcut to quickly compile a `Template` without creating
/// an [`Engine`][`crate::Engine`].
///
/// # Examples
///
/// ```
/// use vellum::compile;
///
/// let template = compile("{{ name }}");
/// assert!(template.is_ok())
/// ```
pub fn compile(text: &str) -> Result<Template, Error> {
    Parser::new(text).compile(None)
}

/// Keywords recognized by the Lexer and Parser.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum Keyword {
    /// Enables negation of a condition.
    Not,
    /// Beginning of an "if" block.
    If,
    /// Marks the beginning of the else branch in an "if" block.
    Else,
    /// End of an "if" block.
    EndIf,
    /// Beginning of a loop.
    For,
    /// Divides the loop variable from the iterable in a loop.
    ///
    /// In "for person in people", the loop variable is "person" while
    /// the iterable is "people".
    In,
    /// End of a loop.
    EndFor,
    /// Exits the nearest enclosing loop.
    Break,
    /// Skips to the next iteration of the nearest enclosing loop.
    Continue,
    /// Beginning of an assignment.
    Set,
    /// Beginning of a scoped assignment block.
    With,
    /// End of a scoped assignment block.
    EndWith,
    /// Renders another template in place.
    Include,
    /// Declares the parent of the current template.
    Extends,
    /// Beginning of a named, overridable block.
    Block,
    /// End of a named block.
    EndBlock,
}

impl Display for Keyword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Keyword::Not => write!(f, "not"),
            Keyword::If => write!(f, "if"),
            Keyword::Else => write!(f, "else"),
            Keyword::EndIf => write!(f, "endif"),
            Keyword::For => write!(f, "for"),
            Keyword::In => write!(f, "in"),
            Keyword::EndFor => write!(f, "endfor"),
            Keyword::Break => write!(f, "break"),
            Keyword::Continue => write!(f, "continue"),
            Keyword::Set => write!(f, "set"),
            Keyword::With => write!(f, "with"),
            Keyword::EndWith => write!(f, "endwith"),
            Keyword::Include => write!(f, "include"),
            Keyword::Extends => write!(f, "extends"),
            Keyword::Block => write!(f, "block"),
            Keyword::EndBlock => write!(f, "endblock"),
        }
    }
}

/// Operators recognized by the Lexer and Parser.
#[derive(Debug, PartialEq, Copy, Clone)]
pub enum Operator {
    /// +
    Add,
    /// -
    Subtract,
    /// *
    Multiply,
    /// /
    Divide,
    /// >
    Greater,
    /// <
    Lesser,
    /// ==
    Equal,
    /// !=
    NotEqual,
    /// >=
    GreaterOrEqual,
    /// <=
    LesserOrEqual,
    /// and / &&
    And,
    /// or / ||
    Or,
}

impl Operator {
    /// Return the binding power of the [`Operator`].
    ///
    /// A higher number binds tighter during precedence climbing.
    pub fn precedence(&self) -> u8 {
        match self {
            Operator::Or => 1,
            Operator::And => 2,
            Operator::Greater
            | Operator::Lesser
            | Operator::Equal
            | Operator::NotEqual
            | Operator::GreaterOrEqual
            | Operator::LesserOrEqual => 3,
            Operator::Add | Operator::Subtract => 4,
            Operator::Multiply | Operator::Divide => 5,
        }
    }
}

impl Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operator::Add => write!(f, "+"),
            Operator::Subtract => write!(f, "-"),
            Operator::Multiply => write!(f, "*"),
            Operator::Divide => write!(f, "/"),
            Operator::Greater => write!(f, ">"),
            Operator::Lesser => write!(f, "<"),
            Operator::Equal => write!(f, "=="),
            Operator::NotEqual => write!(f, "!="),
            Operator::GreaterOrEqual => write!(f, ">="),
            Operator::LesserOrEqual => write!(f, "<="),
            Operator::And => write!(f, "and"),
            Operator::Or => write!(f, "or"),
        }
    }
}
