use crate::{
    compile::{parse::scope::Scope, Operator},
    region::Region,
};
use serde_json::Value;

/// The Abstract Syntax Tree.
#[derive(Debug, Clone)]
pub enum Tree {
    /// Raw text.
    Raw(Region),
    /// Render an expression.
    Output(Output),
    /// Conditional branching.
    If(If),
    /// Iteration over a value.
    For(For),
    /// Assignment to the innermost scope.
    Set(Set),
    /// A set of assignments visible within an enclosed scope.
    With(With),
    /// Render another template in place.
    Include(Include),
    /// A named area that an extending template may override.
    Block(Block),
    /// Exit the nearest enclosing loop.
    Break(Region),
    /// Skip to the next iteration of the nearest enclosing loop.
    Continue(Region),
}

/// Represents data within expression tags, "{{ }}" by default.
#[derive(Debug, Clone)]
pub enum Expression {
    /// A literal or a value located in the Store.
    Base(Base),
    /// A negation of another Expression.
    Negate(Negate),
    /// An Operator applied to two Expressions.
    Binary(Binary),
    /// A call to a registered filter, which receives the value of the
    /// underlying Expression and may modify it before rendering.
    Call(Call),
}

impl Expression {
    /// Get the Region from the underlying Expression kind.
    pub fn get_region(&self) -> Region {
        match self {
            Expression::Base(base) => base.get_region(),
            Expression::Negate(negate) => negate.region,
            Expression::Binary(binary) => binary.region,
            Expression::Call(call) => call.region,
        }
    }
}

/// Represents a call to render some kind of Expression.
#[derive(Debug, Clone)]
pub struct Output {
    /// The Expression to render.
    pub expression: Expression,
    /// Location of the Output, including the surrounding tags.
    pub region: Region,
}

impl From<(Expression, Region)> for Output {
    /// Create an Output from the given (Expression, Region).
    fn from(value: (Expression, Region)) -> Self {
        Self {
            expression: value.0,
            region: value.1,
        }
    }
}

/// Variable types.
///
/// ## Literal
///
/// A literal value is some literal data, such as a string, number
/// or boolean.
///
/// ## Variable
///
/// A variable is an identifier such as "person.name" which indicates
/// the location of the true value within the Store.
#[derive(Debug, Clone, PartialEq)]
pub enum Base {
    /// A value located in the Store.
    Variable(Variable),
    /// A literal value located directly in the template source.
    Literal(Literal),
}

impl Base {
    /// Get a Region from the underlying Base kind.
    pub fn get_region(&self) -> Region {
        match self {
            Base::Variable(variable) => variable.get_region(),
            Base::Literal(literal) => literal.region,
        }
    }
}

/// Set of Key instances that can be used to locate data within the Store.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    /// Path segments, one per identifier between periods.
    pub path: Vec<Key>,
}

impl Variable {
    /// Get a Region spanning the first and last Key instances.
    pub fn get_region(&self) -> Region {
        self.path
            .first()
            .unwrap()
            .get_region()
            .combine(self.path.last().unwrap().get_region())
    }
}

/// Path segment in a larger identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Key {
    /// The Identifier of this segment.
    pub identifier: Identifier,
}

impl Key {
    /// Get a Region from the internal Identifier.
    pub fn get_region(&self) -> Region {
        self.identifier.region
    }
}

impl From<Identifier> for Key {
    /// Create a Key from the given Identifier.
    fn from(value: Identifier) -> Self {
        Self { identifier: value }
    }
}

/// Area that contains an identifying value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Identifier {
    /// Location of the identifying value.
    pub region: Region,
}

/// Literal data that does not need to be evaluated any further.
#[derive(Debug, Clone, PartialEq)]
pub struct Literal {
    /// The actual data.
    pub value: Value,
    /// Location of the data in the source.
    pub region: Region,
}

/// Negation of an underlying Expression.
#[derive(Debug, Clone)]
pub struct Negate {
    /// The Expression being negated.
    pub expression: Box<Expression>,
    /// Location of the negation, including the `!` or `not`.
    pub region: Region,
}

/// An Operator applied to a left and right Expression.
#[derive(Debug, Clone)]
pub struct Binary {
    /// The Expression to the left of the operator.
    pub left: Box<Expression>,
    /// The action taken on the two Expressions.
    pub operator: Operator,
    /// Location of the operator itself.
    pub operator_region: Region,
    /// The Expression to the right of the operator.
    pub right: Box<Expression>,
    /// Location of the whole Binary.
    pub region: Region,
}

/// Call to some registered filter.
///
/// Refers to an underlying Expression from which the input data
/// is derived.
#[derive(Debug, Clone)]
pub struct Call {
    /// Name of the filter.
    pub name: Identifier,
    /// Arguments passed in parentheses after the name, if any.
    pub arguments: Option<Arguments>,
    /// The Expression whose value is piped into the filter.
    pub receiver: Box<Expression>,
    /// Location of the whole Call.
    pub region: Region,
}

/// Set of arguments that can be provided to a filter.
#[derive(Debug, Clone)]
pub struct Arguments {
    /// The argument values, in the order they appear.
    pub values: Vec<Base>,
    /// Location of the arguments, including the parentheses.
    pub region: Region,
}

/// Conditional rendering block.
#[derive(Debug, Clone)]
pub struct If {
    /// The Expression checked for a truthy value.
    pub condition: Expression,
    /// Scope rendered when the condition holds.
    pub then_branch: Scope,
    /// Scope rendered when the condition does not hold.
    pub else_branch: Option<Scope>,
    /// Location of the whole "if" block.
    pub region: Region,
}

/// Loop rendering block.
#[derive(Debug, Clone)]
pub struct For {
    /// The variables bound on each iteration.
    pub variables: LoopVariables,
    /// The Expression being iterated on.
    pub iterable: Expression,
    /// Scope rendered on each iteration.
    pub body: Scope,
    /// Location of the whole "for" block.
    pub region: Region,
}

/// Variable types derived from a loop.
#[derive(Debug, Clone)]
pub enum LoopVariables {
    /// A single variable receiving the value of each element.
    Item(Identifier),
    /// A pair of variables receiving the index (or key) and value
    /// of each element.
    KeyValue(KeyValue),
}

/// Key/value pair.
#[derive(Debug, Clone)]
pub struct KeyValue {
    /// The variable receiving the index or key.
    pub key: Identifier,
    /// The variable receiving the value.
    pub value: Identifier,
    /// Location of the pair.
    pub region: Region,
}

/// Assignment to the innermost scope.
#[derive(Debug, Clone)]
pub struct Set {
    /// Name the value is assigned to.
    pub name: Identifier,
    /// The Expression producing the value.
    pub value: Expression,
    /// Location of the whole "set" tag.
    pub region: Region,
}

/// A scoped set of assignments.
#[derive(Debug, Clone)]
pub struct With {
    /// The assignments, visible only within the body.
    pub assignments: Vec<(Identifier, Expression)>,
    /// Scope the assignments are visible in.
    pub body: Scope,
    /// Location of the whole "with" block.
    pub region: Region,
}

/// Command to render another template in place.
#[derive(Debug, Clone)]
pub struct Include {
    /// Name of the template to render.
    pub name: String,
    /// Location of the whole "include" tag.
    pub region: Region,
}

/// A named area that an extending template may override.
#[derive(Debug, Clone)]
pub struct Block {
    /// Name of the block.
    pub name: String,
    /// Scope rendered when no override is present.
    pub body: Scope,
    /// Location of the whole "block" block.
    pub region: Region,
}
