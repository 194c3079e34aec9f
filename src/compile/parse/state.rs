use crate::{
    compile::tree::{Expression, Identifier, LoopVariables},
    region::Region,
};

/// Describes the internal state of a `Parser`.
///
/// One of these is pushed for every block that must be closed by a
/// matching end tag, and popped when that end tag arrives.
pub enum BlockState {
    /// The `Parser` is evaluating an "if" block.
    If {
        /// The condition of the "if" block.
        condition: Expression,
        /// [`Region`] spanning the opening "if" tag.
        region: Region,
        /// True if this "if" has an associated "else".
        has_else: bool,
    },
    /// The `Parser` is evaluating a "for" block.
    For {
        /// The variables bound on each iteration.
        variables: LoopVariables,
        /// Value being iterated on.
        iterable: Expression,
        /// Region spanning the opening "for" tag.
        region: Region,
    },
    /// The `Parser` is evaluating a "with" block.
    With {
        /// The assignments of the "with" block.
        assignments: Vec<(Identifier, Expression)>,
        /// Region spanning the opening "with" tag.
        region: Region,
    },
    /// The `Parser` is evaluating a "block" block.
    Block {
        /// The name of the block.
        name: String,
        /// Region spanning the opening "block" tag.
        region: Region,
    },
}
