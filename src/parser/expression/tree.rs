use super::{InfixOperator, PostfixOperator, PrefixOperator};
use crate::lexer::Span;
use compact_str::CompactString;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKind {
    Break,
    Continue,
}

impl std::fmt::Display for ControlKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ControlKind::Break => write!(f, "break"),
            ControlKind::Continue => write!(f, "continue"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Block {
    pub body: Vec<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct Assignment {
    pub target: Expression,
    pub value: Expression,
    /// Frame budget for the binding, `-1` when none was written.
    pub limit: Expression,
    pub is_const: bool,
    pub is_ref: bool,
}

#[derive(Debug, Clone)]
pub enum ForLoop {
    Traditional {
        initializer: Expression,
        condition: Expression,
        step: Expression,
        body: Expression,
    },
    /// `for x in e` walks the index positions of `e`.
    In {
        variable: CompactString,
        enumerable: Expression,
        body: Expression,
    },
    /// `for x of e` walks the elements of `e`.
    Of {
        variable: CompactString,
        enumerable: Expression,
        body: Expression,
    },
}

#[derive(Debug, Clone)]
pub enum ExpressionKind {
    Number(f64),
    Bool(bool),
    Null,
    StringLiteral(CompactString),
    Character(char),
    Identifier(CompactString),
    List(Vec<Expression>),
    Block(Block),
    Group(Box<Expression>),
    Control {
        kind: ControlKind,
        carry: u32,
    },
    Prefix {
        operator: PrefixOperator,
        operand: Box<Expression>,
    },
    Postfix {
        operator: PostfixOperator,
        operand: Box<Expression>,
    },
    Infix {
        operator: InfixOperator,
        lhs: Box<Expression>,
        rhs: Box<Expression>,
    },
    Assignment(Box<Assignment>),
    Call {
        callee: Box<Expression>,
        arguments: Vec<Expression>,
    },
    Function {
        parameters: Vec<CompactString>,
        body: Arc<Block>,
    },
    If {
        condition: Box<Expression>,
        success: Box<Expression>,
        failure: Option<Box<Expression>>,
    },
    While {
        condition: Box<Expression>,
        body: Box<Expression>,
    },
    For(Box<ForLoop>),
    Index {
        target: Box<Expression>,
        index: Box<Expression>,
    },
    Method {
        receiver: Box<Expression>,
        name: CompactString,
        arguments: Vec<Expression>,
    },
    Range {
        start: Box<Expression>,
        end: Box<Expression>,
        step: Box<Expression>,
        inclusive: bool,
    },
    /// `source >> target`
    Shift {
        source: Box<Expression>,
        target: Box<Expression>,
    },
    Pop {
        list: Box<Expression>,
        index: Box<Expression>,
    },
    Push {
        list: Box<Expression>,
        index: Box<Expression>,
        value: Box<Expression>,
    },
}

#[derive(Debug, Clone)]
pub struct Expression {
    pub kind: ExpressionKind,
    pub span: Span,
}

impl Expression {
    pub fn new(kind: ExpressionKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Whether the expression names a storage location.
    pub fn is_place(&self) -> bool {
        matches!(
            self.kind,
            ExpressionKind::Identifier(_) | ExpressionKind::Index { .. }
        )
    }
}

/// A parsed source file. Evaluated as one block.
#[derive(Debug, Clone)]
pub struct Program {
    pub block: Block,
}
