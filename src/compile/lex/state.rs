use crate::compile::lex::Token;

/// Describes the internal state of a [`Lexer`][`super::Lexer`].
#[derive(Debug, PartialEq)]
pub enum CursorState {
    /// The [`Lexer`][`super::Lexer`] is outside of any tag.
    Default,
    /// The [`Lexer`][`super::Lexer`] is inside of a block or expression.
    Inside {
        /// The expected ending [`Token`].
        end_token: Token,
    },
    /// The [`Lexer`][`super::Lexer`] is inside of a comment, which is
    /// discarded without producing tokens.
    Comment,
}
