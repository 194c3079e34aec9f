pub mod token;

mod state;

use crate::{
    log::{expected_operator, Error, EMPTY_SOURCE, INVALID_SYNTAX, UNEXPECTED_TOKEN},
    region::Region,
    syntax::{Builder, Marker},
};

use self::{state::CursorState, token::Token};

use morel::{Finder, Syntax};

pub(crate) type LexResult = Result<Option<(Token, Region)>, Error>;
pub(crate) type LexResultMust = Result<(Token, Region), Error>;

/// Provides methods to read a source string as [`Token`] instances.
pub struct Lexer<'source> {
    /// Reference to the source text.
    pub source: &'source str,
    /// Position within source.
    pub cursor: usize,
    /// Compiled [`Finder`] used to search for markers in the source text.
    finder: Finder<&'source str>,
    /// Tracks the [`Lexer`] state and determines the action taken when
    /// `.next` is called.
    state: CursorState,
    /// When true, the following [`Token::Raw`] read while in
    /// [`CursorState::Default`] state will be left trimmed.
    left_trim: bool,
    /// Temporary storage for a [`Token`] that will be read on the following
    /// call to `.next`.
    buffer: Option<(Token, Region)>,
}

impl<'source> Lexer<'source> {
    /// Create a new [`Lexer`] over the given source with default markers.
    #[inline]
    pub fn new(source: &'source str) -> Self {
        Self::with_syntax(source, Builder::new().to_syntax())
    }

    /// Create a new [`Lexer`] over the given source and [`Syntax`].
    #[inline]
    pub fn with_syntax(source: &'source str, syntax: Syntax) -> Self {
        Self {
            source,
            cursor: 0,
            finder: Finder::new(syntax),
            state: CursorState::Default,
            left_trim: false,
            buffer: None,
        }
    }

    /// Return the next [`Token`] and [`Region`].
    ///
    /// Any instance of [`Token::Whitespace`] is skipped, and comments are
    /// discarded entirely.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when the source is empty, a tag, string or
    /// comment is left unterminated, or an unrecognized character appears
    /// inside a tag.
    pub fn next(&mut self) -> LexResult {
        if self.source.is_empty() {
            return Err(Error::lex(EMPTY_SOURCE)
                .with_help("a template must contain at least one character"));
        }

        loop {
            // Always prefer taking from the buffer when possible.
            if let Some(next) = self.buffer.take() {
                return Ok(Some(next));
            }
            if self.source[self.cursor..].is_empty() {
                return match self.state {
                    CursorState::Default => Ok(None),
                    _ => Err(Error::lex(INVALID_SYNTAX)
                        .with_pointer(self.source, self.cursor..self.cursor)
                        .with_help("did you close the tag?")),
                };
            }

            let c = self.cursor;
            let result = match self.state {
                CursorState::Default => self.lex_default(c),
                CursorState::Inside { .. } => self.lex_tag(c),
                CursorState::Comment => self.lex_comment(c),
            }?;

            return match result {
                Some((token, region)) => match token {
                    Token::Whitespace => continue,
                    _ => Ok(Some((token, region))),
                },
                None => Ok(None),
            };
        }
    }

    /// Return the next [`Token`] and [`Region`] in [`CursorState::Inside`]
    /// configuration.
    ///
    /// Assumes the cursor is inside of a tag.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when an unexpected [`Token`] is found.
    fn lex_tag(&mut self, from: usize) -> LexResult {
        match self.finder.starts(self.source, from) {
            Some((id, length)) => {
                let (token, is_trimmed) = Token::from_usize_trim(id);

                match self.state {
                    CursorState::Inside { ref end_token } => {
                        if token == *end_token {
                            self.state = CursorState::Default;
                            self.left_trim = is_trimmed;
                            self.cursor = length;

                            Ok(Some((token, (from..length).into())))
                        } else {
                            let which = if *end_token == Token::EndExpression {
                                "expression"
                            } else {
                                "block"
                            };

                            Err(Error::lex(UNEXPECTED_TOKEN)
                                .with_pointer(self.source, from..length)
                                .with_help(format!("did you close the previous {which}?")))
                        }
                    }
                    _ => panic!("lexer must be in tag state"),
                }
            }
            None => {
                let mut advance = |length: usize, data: Token| {
                    self.cursor += length;

                    Ok(Some((data, (from..from + length).into())))
                };

                let mut iterator = self.source[from..]
                    .char_indices()
                    .map(|(d, c)| (from + d, c));
                let (index, char) = iterator.next().unwrap();

                match char {
                    '*' => advance(1, Token::Operator(crate::compile::Operator::Multiply)),
                    '+' => advance(1, Token::Operator(crate::compile::Operator::Add)),
                    '/' => advance(1, Token::Operator(crate::compile::Operator::Divide)),
                    '-' => advance(1, Token::Operator(crate::compile::Operator::Subtract)),
                    '.' => advance(1, Token::Period),
                    ',' => advance(1, Token::Comma),
                    ':' => advance(1, Token::Colon),
                    '(' => advance(1, Token::LeftParen),
                    ')' => advance(1, Token::RightParen),
                    '"' => self.lex_string(iterator, index),
                    '=' | '!' | '>' | '<' | '|' | '&' => self.lex_operator(iterator, index, char),
                    c if c.is_whitespace() => Ok(Some(self.lex_whitespace(iterator, index))),
                    c if c.is_ascii_digit() => Ok(Some(self.lex_digit(iterator, index))),
                    c if is_ident_start(c) => Ok(Some(self.lex_ident_or_keyword(iterator, index))),
                    _ => Err(Error::lex(UNEXPECTED_TOKEN)
                        .with_pointer(self.source, index..index + char.len_utf8())
                        .with_help(
                            "expected one of `*`, `+`, `/`, `-`, `.`, `,`, `:`, `(`, `)`, \
                            an identifier, an ascii digit, or beginning of a string literal \
                            marked with `\"`",
                        )),
                }
            }
        }
    }

    /// Skip over a comment and return a [`Token::Whitespace`] covering it,
    /// which the caller discards.
    ///
    /// Assumes the cursor is immediately after a begin comment marker.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when the comment is not terminated.
    fn lex_comment(&mut self, from: usize) -> LexResult {
        let mut position = from;

        while let Some((id, _, marker_end)) = self.finder.next(self.source, position) {
            if matches!(Marker::from(id), Marker::EndComment) {
                self.state = CursorState::Default;
                self.cursor = marker_end;

                return Ok(Some((Token::Whitespace, (from..marker_end).into())));
            }
            // Any other marker is just comment text.
            position = marker_end;
        }

        Err(Error::lex(INVALID_SYNTAX)
            .with_pointer(self.source, from..from)
            .with_help("this comment is not closed, try closing it with `#}`"))
    }

    /// Return a [`Token`] and [`Region`] based on the previous character.
    ///
    /// Checks the next character via `.next` to ensure the correct `Token`
    /// is returned. All of these are recognized:
    ///
    /// `==`, `!=`, `>=`, `<=`, `||`, `&&`, `=`, `|`, `!`, `>`, `<`
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when an unexpected [`Token`] is found.
    fn lex_operator<T>(&mut self, mut iter: T, from: usize, previous: char) -> LexResult
    where
        T: Iterator<Item = (usize, char)>,
    {
        use crate::compile::Operator;

        let (position, token) = match (previous, iter.next()) {
            // Double:
            ('=', Some((usize, '='))) => (usize, Token::Operator(Operator::Equal)),
            ('!', Some((usize, '='))) => (usize, Token::Operator(Operator::NotEqual)),
            ('>', Some((usize, '='))) => (usize, Token::Operator(Operator::GreaterOrEqual)),
            ('<', Some((usize, '='))) => (usize, Token::Operator(Operator::LesserOrEqual)),
            ('|', Some((usize, '|'))) => (usize, Token::Operator(Operator::Or)),
            ('&', Some((usize, '&'))) => (usize, Token::Operator(Operator::And)),
            // Single:
            ('=', _) => (from, Token::Assign),
            ('|', _) => (from, Token::Pipe),
            ('!', _) => (from, Token::Exclamation),
            ('>', _) => (from, Token::Operator(Operator::Greater)),
            ('<', _) => (from, Token::Operator(Operator::Lesser)),
            _ => {
                return Err(Error::lex(UNEXPECTED_TOKEN)
                    .with_pointer(self.source, from..from + 1)
                    .with_help(expected_operator(previous)));
            }
        };
        let position = position + 1;
        self.cursor = position;

        Ok(Some((token, (from..position).into())))
    }

    /// Return a [`Token`] and [`Region`] containing [`Token::Number`].
    fn lex_digit<T>(&mut self, mut iter: T, from: usize) -> (Token, Region)
    where
        T: Iterator<Item = (usize, char)>,
    {
        loop {
            match iter.next() {
                Some((index, char)) if !is_number(char) => {
                    self.cursor = index;

                    break (Token::Number, (from..index).into());
                }
                Some((_, _)) => continue,
                None => return (Token::Number, (from..self.source.len()).into()),
            }
        }
    }

    /// Return a [`Token`] and [`Region`] containing [`Token::Whitespace`].
    fn lex_whitespace<T>(&mut self, mut iter: T, from: usize) -> (Token, Region)
    where
        T: Iterator<Item = (usize, char)>,
    {
        loop {
            match iter.next() {
                Some((index, char)) if !char.is_whitespace() => {
                    self.cursor = index;

                    break (Token::Whitespace, (from..index).into());
                }
                Some((_, _)) => continue,
                None => return (Token::Whitespace, (from..self.source.len()).into()),
            }
        }
    }

    /// Return a [`Token`] and [`Region`] containing [`Token::String`] using
    /// the given iterator.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when the string is not terminated.
    fn lex_string<T>(&mut self, mut iter: T, from: usize) -> LexResult
    where
        T: Iterator<Item = (usize, char)>,
    {
        let mut previous = (from, '"');
        loop {
            match iter.next() {
                Some((index, '"')) if previous.1 != '\\' => {
                    // Accept a double quote as a signal to end the string,
                    // unless the previous character was an escape.
                    let to = index + 1;
                    self.cursor = to;

                    return Ok(Some((Token::String, (from..to).into())));
                }
                Some((index, char)) => {
                    previous = (index, char);
                }
                None => {
                    let take = if previous.0 - from > 10 {
                        10
                    } else {
                        previous.0
                    };

                    return Err(Error::lex(INVALID_SYNTAX)
                        .with_pointer(self.source, from..take)
                        .with_help(
                            "this might be an undelimited string, try closing it with `\"`",
                        ));
                }
            }
        }
    }

    /// Return a [`Token`] and [`Region`] from the given iterator.
    ///
    /// The `Token` will be [`Token::Identifier`] unless the text matches a
    /// keyword, boolean or word operator.
    fn lex_ident_or_keyword<T>(&mut self, mut iter: T, from: usize) -> (Token, Region)
    where
        T: Iterator<Item = (usize, char)>,
    {
        use crate::compile::{Keyword, Operator};

        let mut check_keyword = |to: usize| {
            let range_text = self
                .source
                .get(from..to)
                .expect("valid range is required to check keyword");

            let token = match range_text {
                "not" => Token::Keyword(Keyword::Not),
                "if" => Token::Keyword(Keyword::If),
                "else" => Token::Keyword(Keyword::Else),
                "endif" => Token::Keyword(Keyword::EndIf),
                "for" => Token::Keyword(Keyword::For),
                "in" => Token::Keyword(Keyword::In),
                "endfor" => Token::Keyword(Keyword::EndFor),
                "break" => Token::Keyword(Keyword::Break),
                "continue" => Token::Keyword(Keyword::Continue),
                "set" => Token::Keyword(Keyword::Set),
                "with" => Token::Keyword(Keyword::With),
                "endwith" => Token::Keyword(Keyword::EndWith),
                "include" => Token::Keyword(Keyword::Include),
                "extends" => Token::Keyword(Keyword::Extends),
                "block" => Token::Keyword(Keyword::Block),
                "endblock" => Token::Keyword(Keyword::EndBlock),
                "and" => Token::Operator(Operator::And),
                "or" => Token::Operator(Operator::Or),
                "true" => Token::True,
                "false" => Token::False,
                _ => Token::Identifier,
            };
            self.cursor = to;

            (token, (from..to).into())
        };

        loop {
            match iter.next() {
                Some((index, char)) if !is_ident_continue(char) => {
                    break check_keyword(index);
                }
                Some((_, _)) => continue,
                None => break check_keyword(self.source.len()),
            }
        }
    }

    /// Return the next [`Token`] and [`Region`] in [`CursorState::Default`]
    /// configuration.
    ///
    /// Assumes the cursor is outside of any tag.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when an unexpected [`Token`] is found.
    fn lex_default(&mut self, from: usize) -> LexResult {
        let mut trim_region = |mut region_begin, mut region_end, right_trim| {
            if right_trim {
                region_end = self.source[..region_end].trim_end().len();
            }
            if self.left_trim {
                self.left_trim = false;
                let s = &self.source[region_begin..region_end];
                region_begin = region_begin + s.len() - s.trim_start().len()
            }

            Ok(Some((Token::Raw, (region_begin..region_end).into())))
        };

        match self.finder.next(self.source, from) {
            Some((id, marker_begin, marker_end)) => {
                let (token, is_trimmed) = Token::from_usize_trim(id);

                match &token {
                    Token::BeginExpression => {
                        self.state = CursorState::Inside {
                            end_token: Token::EndExpression,
                        }
                    }
                    Token::BeginBlock => {
                        self.state = CursorState::Inside {
                            end_token: Token::EndBlock,
                        }
                    }
                    Token::BeginComment => {
                        self.state = CursorState::Comment;
                        self.cursor = marker_end;

                        return if from == marker_begin {
                            // The comment itself is skipped by the caller.
                            Ok(Some((Token::Whitespace, (marker_begin..marker_end).into())))
                        } else {
                            trim_region(from, marker_begin, is_trimmed)
                        };
                    }
                    _ => {
                        return Err(Error::lex(UNEXPECTED_TOKEN)
                            .with_pointer(self.source, marker_begin..marker_end)
                            .with_help(
                                "expected beginning expression, beginning block \
                                or beginning comment",
                            ));
                    }
                }

                if from == marker_begin {
                    self.cursor = marker_end;

                    Ok(Some((token, (marker_begin..marker_end).into())))
                } else {
                    self.cursor = marker_end;
                    self.buffer = Some((token, (marker_begin..marker_end).into()));

                    trim_region(from, marker_begin, is_trimmed)
                }
            }
            None => {
                let remaining = self.cursor..self.source.len();
                self.cursor = self.source.len();

                trim_region(from, remaining.end, false)
            }
        }
    }
}

/// Return true if the given character is a recognized beginning identifier,
/// meaning '_' or an `xid_start`.
fn is_ident_start(c: char) -> bool {
    c == '_' || unicode_ident::is_xid_start(c)
}

/// Return true if the given character is a recognized continue identifier,
/// meaning an `xid_continue`.
fn is_ident_continue(c: char) -> bool {
    unicode_ident::is_xid_continue(c)
}

/// Return true if the given character is a number (0-9) or a period.
fn is_number(c: char) -> bool {
    matches!(c, '0'..='9' | '.')
}

#[cfg(test)]
mod tests {
    use super::Lexer;
    use crate::{
        compile::{lex::state::CursorState, lex::token::Token, Keyword, Operator},
        region::Region,
        syntax::Builder,
    };

    #[test]
    fn test_lex_default_no_match() {
        let expect = vec![(Token::Raw, 0..11)];

        helper_lex_next_auto("lorem ipsum", expect)
    }

    #[test]
    fn test_lex_default_match_no_trim() {
        let expect = vec![
            (Token::Raw, 0..12),
            (Token::BeginExpression, 12..14),
            (Token::Identifier, 15..20),
        ];

        helper_lex_next_auto("lorem ipsum {{ dolor", expect);
    }

    #[test]
    fn test_lex_default_match_trim() {
        let expect = vec![
            (Token::Raw, 0..11),
            (Token::BeginExpression, 12..15),
            (Token::Identifier, 16..21),
        ];

        helper_lex_next_auto("lorem ipsum {{- dolor", expect);
    }

    #[test]
    fn test_lex_state_change() {
        let mut block_lexer = Lexer::new("lorem {%");
        let mut expression_lexer = Lexer::new("lorem {{");
        block_lexer.next().unwrap();
        expression_lexer.next().unwrap();

        assert_eq!(
            block_lexer.state,
            CursorState::Inside {
                end_token: Token::EndBlock
            }
        );
        assert_eq!(
            expression_lexer.state,
            CursorState::Inside {
                end_token: Token::EndExpression
            }
        );
    }

    #[test]
    fn test_lex_digit() {
        let expect = vec![
            (Token::BeginExpression, 0..2),
            (Token::Number, 3..5),
            (Token::EndExpression, 6..8),
        ];

        helper_lex_next_auto("{{ 10 }}", expect);
    }

    #[test]
    fn test_lex_ident() {
        let expect = vec![
            (Token::BeginExpression, 0..2),
            (Token::Identifier, 3..8),
            (Token::EndExpression, 9..11),
        ];

        helper_lex_next_auto("{{ hello }}", expect);
    }

    #[test]
    fn test_lex_keyword() {
        let expect = vec![
            (Token::BeginBlock, 0..2),
            (Token::Keyword(Keyword::If), 3..5),
            (Token::Identifier, 6..10),
            (Token::EndBlock, 11..13),
        ];

        helper_lex_next_auto("{% if show %}", expect);
    }

    #[test]
    fn test_lex_end_keywords() {
        let expect = vec![
            (Token::BeginBlock, 0..2),
            (Token::Keyword(Keyword::EndFor), 3..9),
            (Token::EndBlock, 10..12),
        ];

        helper_lex_next_auto("{% endfor %}", expect);
    }

    #[test]
    fn test_lex_word_operator() {
        let expect = vec![
            (Token::BeginBlock, 0..2),
            (Token::Keyword(Keyword::If), 3..5),
            (Token::Identifier, 6..7),
            (Token::Operator(Operator::And), 8..11),
            (Token::Identifier, 12..13),
            (Token::EndBlock, 14..16),
        ];

        helper_lex_next_auto("{% if a and b %}", expect);
    }

    #[test]
    fn test_lex_comparison() {
        let expect = vec![
            (Token::BeginBlock, 0..2),
            (Token::Keyword(Keyword::If), 3..5),
            (Token::Identifier, 6..10),
            (Token::Operator(Operator::Equal), 11..13),
            (Token::String, 14..22),
            (Token::EndBlock, 23..25),
        ];

        helper_lex_next_auto(r#"{% if name == "taylor" %}"#, expect);
    }

    #[test]
    fn test_lex_string_escape() {
        let expect = vec![
            (Token::BeginExpression, 0..2),
            (Token::String, 3..13),
            (Token::EndExpression, 14..16),
        ];

        helper_lex_next_auto(r#"{{ "\"name\"" }}"#, expect);
    }

    #[test]
    fn test_lex_string() {
        let expect = vec![
            (Token::BeginExpression, 0..2),
            (Token::String, 3..9),
            (Token::EndExpression, 10..12),
        ];

        helper_lex_next_auto("{{ \"name\" }}", expect);
    }

    #[test]
    fn test_lex_filter_call() {
        let expect = vec![
            (Token::BeginExpression, 0..2),
            (Token::Identifier, 3..7),
            (Token::Pipe, 8..9),
            (Token::Identifier, 10..15),
            (Token::LeftParen, 15..16),
            (Token::String, 16..19),
            (Token::RightParen, 19..20),
            (Token::EndExpression, 21..23),
        ];

        helper_lex_next_auto(r#"{{ name | split(",") }}"#, expect);
    }

    #[test]
    fn test_lex_comment_skipped() {
        let expect = vec![(Token::Raw, 0..2), (Token::Raw, 12..14)];

        helper_lex_next_auto("a {# note #} b", expect);
    }

    #[test]
    fn test_lex_comment_unterminated() {
        let mut lexer = Lexer::new("a {# note");
        assert_eq!(lexer.next(), Ok(Some((Token::Raw, (0..2).into()))));
        assert!(lexer.next().is_err());
    }

    #[test]
    fn test_lex_empty_source() {
        assert!(Lexer::new("").next().is_err());
    }

    #[test]
    fn test_lex_unterminated_tag() {
        let mut lexer = Lexer::new("{{ name");
        assert_eq!(
            lexer.next(),
            Ok(Some((Token::BeginExpression, (0..2).into())))
        );
        assert_eq!(lexer.next(), Ok(Some((Token::Identifier, (3..7).into()))));
        assert!(lexer.next().is_err());
    }

    #[test]
    fn test_error_multiple_opening_tags() {
        let expect = vec![
            (Token::Raw, 0..6),
            (Token::BeginExpression, 6..8),
            (Token::Identifier, 9..13),
        ];

        let mut lexer = Lexer::new("hello {{ name {{ }}");
        for (token, range) in expect {
            assert_eq!(lexer.next(), Ok(Some((token, range.into()))))
        }

        assert!(lexer.next().is_err())
    }

    #[test]
    fn test_lex_custom_syntax() {
        let syntax = Builder::new()
            .with_expression("((", "))")
            .with_block("(*", "*)")
            .to_syntax();
        let mut lexer = Lexer::with_syntax("(( name ))", syntax);

        assert_eq!(
            lexer.next(),
            Ok(Some((Token::BeginExpression, (0..2).into())))
        );
        assert_eq!(lexer.next(), Ok(Some((Token::Identifier, (3..7).into()))));
        assert_eq!(
            lexer.next(),
            Ok(Some((Token::EndExpression, (8..10).into())))
        );
    }

    /// Helper function which takes in a source string, creates a lexer on
    /// that string and compares [expect.len()] results against
    /// [lexer.next()].
    fn helper_lex_next_auto<T>(source: &str, expect: Vec<(Token, T)>)
    where
        T: Into<Region>,
    {
        let mut lexer = Lexer::new(source);
        for (token, region) in expect {
            assert_eq!(lexer.next(), Ok(Some((token, region.into()))))
        }

        assert_eq!(lexer.next(), Ok(None));
        assert_eq!(lexer.next(), Ok(None));
        assert_eq!(lexer.next(), Ok(None));
    }
}
