use morel::Syntax;

/// Markers that identify expressions, blocks and comments within text.
pub enum Marker {
    /// Beginning of an expression, which renders content and may pass it
    /// through filters.
    BeginExpression = 0,
    /// End of an expression.
    EndExpression = 1,
    /// Same as BeginExpression, but trims the trailing whitespace of the
    /// preceding raw text.
    BeginExpressionTrim = 2,
    /// Same as EndExpression, but trims the leading whitespace of the
    /// following raw text.
    EndExpressionTrim = 3,
    /// Beginning of a block, which introduces constructs such as "if",
    /// "for" and "set".
    BeginBlock = 4,
    /// End of a block.
    EndBlock = 5,
    /// Same as BeginBlock, but trims the trailing whitespace of the
    /// preceding raw text.
    BeginBlockTrim = 6,
    /// Same as EndBlock, but trims the leading whitespace of the
    /// following raw text.
    EndBlockTrim = 7,
    /// Beginning of a comment, which is discarded entirely.
    BeginComment = 8,
    /// End of a comment.
    EndComment = 9,
}

impl From<usize> for Marker {
    fn from(value: usize) -> Self {
        match value {
            0 => Self::BeginExpression,
            1 => Self::EndExpression,
            2 => Self::BeginExpressionTrim,
            3 => Self::EndExpressionTrim,
            4 => Self::BeginBlock,
            5 => Self::EndBlock,
            6 => Self::BeginBlockTrim,
            7 => Self::EndBlockTrim,
            8 => Self::BeginComment,
            9 => Self::EndComment,
            _ => unreachable!(),
        }
    }
}

impl From<Marker> for usize {
    fn from(k: Marker) -> Self {
        k as usize
    }
}

/// Provides methods to build a [`Syntax`].
///
/// # Example
///
/// ```
/// use vellum::Builder;
///
/// let syntax = Builder::new()
///     .with_expression("((", "))")
///     .with_block("(*", "*)")
///     .to_syntax();
/// ```
pub struct Builder<'marker> {
    expression: (&'marker str, &'marker str),
    block: (&'marker str, &'marker str),
    comment: (&'marker str, &'marker str),
    whitespace: &'marker char,
}

impl<'marker> Builder<'marker> {
    /// Create a new [`Builder`].
    ///
    /// The `Builder` has default markers:
    ///
    /// ```text
    /// Expressions: {{ name }}
    /// Blocks: {% if ... %}
    /// Comments: {# ... #}
    /// Whitespace:
    ///     Expression: {{- name -}}
    ///     Block: {%- if ... -%}
    /// ```
    ///
    /// To proceed with these defaults, immediately call `to_syntax` to
    /// receive the [`Syntax`] instance.
    #[inline]
    pub fn new() -> Self {
        Self {
            expression: ("{{", "}}"),
            block: ("{%", "%}"),
            comment: ("{#", "#}"),
            whitespace: &'-',
        }
    }

    /// Set the expression markers.
    #[inline]
    pub fn with_expression(mut self, begin: &'marker str, end: &'marker str) -> Self {
        self.expression = (begin, end);

        self
    }

    /// Set the block markers.
    #[inline]
    pub fn with_block(mut self, begin: &'marker str, end: &'marker str) -> Self {
        self.block = (begin, end);

        self
    }

    /// Set the comment markers.
    #[inline]
    pub fn with_comment(mut self, begin: &'marker str, end: &'marker str) -> Self {
        self.comment = (begin, end);

        self
    }

    /// Set the whitespace trim character.
    #[inline]
    pub fn with_whitespace(mut self, character: &'marker char) -> Self {
        self.whitespace = character;

        self
    }

    /// Return a [`Syntax`] instance from the markers in this [`Builder`].
    pub fn to_syntax(self) -> Syntax {
        let mut markers = Vec::new();
        let (left_expression, right_expression) = self.expression;
        let (left_block, right_block) = self.block;
        let (left_comment, right_comment) = self.comment;
        let whitespace = self.whitespace;

        markers.push((Marker::BeginExpression.into(), left_expression.into()));
        markers.push((Marker::EndExpression.into(), right_expression.into()));
        markers.push((
            Marker::BeginExpressionTrim.into(),
            format!("{left_expression}{whitespace}"),
        ));
        markers.push((
            Marker::EndExpressionTrim.into(),
            format!("{whitespace}{right_expression}"),
        ));
        markers.push((Marker::BeginBlock.into(), left_block.into()));
        markers.push((Marker::EndBlock.into(), right_block.into()));
        markers.push((
            Marker::BeginBlockTrim.into(),
            format!("{left_block}{whitespace}"),
        ));
        markers.push((
            Marker::EndBlockTrim.into(),
            format!("{whitespace}{right_block}"),
        ));
        markers.push((Marker::BeginComment.into(), left_comment.into()));
        markers.push((Marker::EndComment.into(), right_comment.into()));

        Syntax::new(markers)
    }
}

impl<'marker> Default for Builder<'marker> {
    fn default() -> Self {
        Self::new()
    }
}
