use crate::lexer::{LexicalError, Span, TokenKind};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParserErrorKind {
    #[error("Expected {expected} but got token {actual}.")]
    UnexpectedToken {
        actual: TokenKind,
        expected: TokenKind,
    },
    #[error("Expected an expression but got token {0}.")]
    NonExpression(TokenKind),
    #[error("Expected a non-EOF token.")]
    UnexpectedEof,
    #[error("Function parameters must be identifiers.")]
    InvalidParameter,
    #[error("Expected an assignment after `&`.")]
    ExpectedAssignment,
    #[error("Carry count `{0}` must be a non-negative integer.")]
    InvalidCarryCount(f64),
    #[error("Encountered a lexer error {0}.")]
    LexicalError(#[from] LexicalError),
}

#[derive(Debug, Error, Clone, PartialEq)]
#[error("{kind}")]
pub struct ParserError {
    #[source]
    pub kind: ParserErrorKind,
    pub span: Span,
}

impl ParserError {
    pub fn code(&self) -> &'static str {
        match self.kind {
            ParserErrorKind::UnexpectedToken { .. } => "PA001",
            ParserErrorKind::NonExpression(_) => "PA002",
            ParserErrorKind::UnexpectedEof => "PA003",
            ParserErrorKind::InvalidParameter => "PA004",
            ParserErrorKind::ExpectedAssignment => "PA005",
            ParserErrorKind::InvalidCarryCount(_) => "PA006",
            ParserErrorKind::LexicalError(ref error) => error.code(),
        }
    }
}

impl From<LexicalError> for ParserError {
    fn from(error: LexicalError) -> Self {
        let span = error.span;
        Self {
            kind: ParserErrorKind::LexicalError(error),
            span,
        }
    }
}
