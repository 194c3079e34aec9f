use crate::{
    compile::{Keyword, Operator},
    syntax::Marker,
};
use std::fmt::Display;

/// Types emitted by the Lexer.
///
/// An abstraction over raw text to make construction of Tree types easier.
/// The text behind a [`Token`] is addressed by the [`Region`][`crate::Region`]
/// returned alongside it.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum Token {
    /// Raw text outside of any tag.
    Raw,
    /// String literal within a tag.
    String,
    /// Number within a tag.
    Number,
    /// Identifier (unquoted string) within a tag.
    Identifier,
    /// Whitespace within a tag.
    Whitespace,
    /// Beginning of an expression - {{ by default.
    BeginExpression,
    /// End of an expression - }} by default.
    EndExpression,
    /// Beginning of a block - {% by default.
    BeginBlock,
    /// End of a block - %} by default.
    EndBlock,
    /// Beginning of a comment - {# by default.
    BeginComment,
    /// End of a comment - #} by default.
    EndComment,
    /// .
    Period,
    /// ,
    Comma,
    /// :
    Colon,
    /// (
    LeftParen,
    /// )
    RightParen,
    /// |
    Pipe,
    /// =
    Assign,
    /// !
    Exclamation,
    /// A boolean true.
    True,
    /// A boolean false.
    False,
    /// A keyword that begins or ends a certain type of block.
    Keyword(Keyword),
    /// Describes an action taken on two values.
    Operator(Operator),
}

impl Token {
    /// Convert a [`Marker`] id into a Token.
    ///
    /// Return value includes the resulting Token and a boolean which is true
    /// when the marker is whitespace trimmed.
    pub(crate) fn from_usize_trim(id: usize) -> (Self, bool) {
        match Marker::from(id) {
            Marker::BeginExpression => (Self::BeginExpression, false),
            Marker::EndExpression => (Self::EndExpression, false),
            Marker::BeginExpressionTrim => (Self::BeginExpression, true),
            Marker::EndExpressionTrim => (Self::EndExpression, true),
            Marker::BeginBlock => (Self::BeginBlock, false),
            Marker::EndBlock => (Self::EndBlock, false),
            Marker::BeginBlockTrim => (Self::BeginBlock, true),
            Marker::EndBlockTrim => (Self::EndBlock, true),
            Marker::BeginComment => (Self::BeginComment, false),
            Marker::EndComment => (Self::EndComment, false),
        }
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Raw => write!(f, "raw"),
            Token::String => write!(f, "string"),
            Token::Number => write!(f, "number"),
            Token::Identifier => write!(f, "identifier"),
            Token::Whitespace => write!(f, "whitespace"),
            Token::BeginExpression => write!(f, "begin expression"),
            Token::EndExpression => write!(f, "end expression"),
            Token::BeginBlock => write!(f, "begin block"),
            Token::EndBlock => write!(f, "end block"),
            Token::BeginComment => write!(f, "begin comment"),
            Token::EndComment => write!(f, "end comment"),
            Token::Period => write!(f, "period (.)"),
            Token::Comma => write!(f, "comma (,)"),
            Token::Colon => write!(f, "colon (:)"),
            Token::LeftParen => write!(f, "left paren"),
            Token::RightParen => write!(f, "right paren"),
            Token::Pipe => write!(f, "pipe (|)"),
            Token::Assign => write!(f, "assign (=)"),
            Token::Exclamation => write!(f, "exclamation (!)"),
            Token::True => write!(f, "true"),
            Token::False => write!(f, "false"),
            Token::Keyword(keyword) => write!(f, "keyword {keyword}"),
            Token::Operator(operator) => write!(f, "operator {operator}"),
        }
    }
}
