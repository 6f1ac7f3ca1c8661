mod operator;
mod tree;

pub use operator::{
    AssignmentOperator, InfixOperator, ListOperator, PostfixOperator, PrefixOperator,
    RangeOperator, POSTFIX_BINDING_POWER, PREFIX_BINDING_POWER,
};
pub use tree::{
    Assignment, Block, ControlKind, Expression, ExpressionKind, ForLoop, Program,
};
