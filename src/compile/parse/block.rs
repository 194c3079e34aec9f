use crate::compile::tree::{Expression, Identifier, LoopVariables};
use std::fmt::Display;

/// Represents a fragment of a parsed block.
pub enum Fragment {
    /// The `{% if x > y %}` part of an "if" block.
    If(Expression),
    /// The `{% else %}` part of an "if" block.
    Else,
    /// The `{% endif %}` part of an "if" block.
    EndIf,
    /// The `{% for n in t %}` part of a "for" block.
    For(LoopVariables, Expression),
    /// The `{% endfor %}` part of a "for" block.
    EndFor,
    /// A `{% break %}` tag.
    Break,
    /// A `{% continue %}` tag.
    Continue,
    /// An assignment tag - `{% set this = that %}`.
    Set(Identifier, Expression),
    /// The `{% with a = 1, b = 2 %}` part of a "with" block.
    With(Vec<(Identifier, Expression)>),
    /// The `{% endwith %}` part of a "with" block.
    EndWith,
    /// An include tag - `{% include "header" %}`.
    Include(String),
    /// An extends tag - `{% extends "base" %}`.
    Extends(String),
    /// The `{% block name %}` part of a "block" block.
    Block(String),
    /// The `{% endblock %}` part of a "block" block.
    EndBlock,
}

impl Display for Fragment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Fragment::If(_) => write!(f, "if"),
            Fragment::Else => write!(f, "else"),
            Fragment::EndIf => write!(f, "endif"),
            Fragment::For(_, _) => write!(f, "for"),
            Fragment::EndFor => write!(f, "endfor"),
            Fragment::Break => write!(f, "break"),
            Fragment::Continue => write!(f, "continue"),
            Fragment::Set(_, _) => write!(f, "set"),
            Fragment::With(_) => write!(f, "with"),
            Fragment::EndWith => write!(f, "endwith"),
            Fragment::Include(_) => write!(f, "include"),
            Fragment::Extends(_) => write!(f, "extends"),
            Fragment::Block(_) => write!(f, "block"),
            Fragment::EndBlock => write!(f, "endblock"),
        }
    }
}
