use super::token::Span;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum LexicalErrorKind {
    #[error("Unrecognized character {0}")]
    Unrecognized(char),
    #[error("Unterminated string literal")]
    UnclosedString,
    #[error("Character literal is missing its character")]
    UnclosedCharacter,
    #[error("Invalid escape sequence \\{0}")]
    InvalidEscape(char),
}

#[derive(Debug, Error, Clone, PartialEq)]
#[error("{kind}")]
pub struct LexicalError {
    #[source]
    pub kind: LexicalErrorKind,
    pub span: Span,
}

impl LexicalError {
    pub fn code(&self) -> &'static str {
        match self.kind {
            LexicalErrorKind::Unrecognized(_) => "LX001",
            LexicalErrorKind::UnclosedString => "LX002",
            LexicalErrorKind::UnclosedCharacter => "LX003",
            LexicalErrorKind::InvalidEscape(_) => "LX004",
        }
    }
}
