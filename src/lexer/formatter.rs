use super::{
    decode_literal,
    token::{Token, TokenKind},
    LineBreaks,
};
use crate::lexer::{Lexer, LexicalError, LexicalErrorKind};
use crate::value::format_number;

/// Interface for creating new token formatters.
pub trait TokenFormatter {
    /// Formats a token into a string.
    fn format(&self, token: &Token) -> String;
    /// Formats a lexer error into a string.
    fn format_lexical_error(&self, error: &LexicalError) -> String;
}

pub trait ToFormatter<F>
where
    F: TokenFormatter,
{
    fn create_formatter(&self) -> F;
}

pub struct BasicFormatter<'src> {
    text: &'src str,
    line_breaks: LineBreaks,
}

impl<'src> ToFormatter<BasicFormatter<'src>> for Lexer<'src> {
    fn create_formatter(&self) -> BasicFormatter<'src> {
        BasicFormatter {
            text: self.get_source(),
            line_breaks: self.get_line_breaks(),
        }
    }
}

impl<'src> TokenFormatter for BasicFormatter<'src> {
    fn format(&self, token: &Token) -> String {
        let lexeme = &self.text[token.span.range()];
        match token.kind {
            TokenKind::Eof => "EOF  null".into(),
            TokenKind::NumericLiteral => {
                let value: f64 = lexeme
                    .parse()
                    .expect("Numeric literals are guaranteed to be parseable into f64.");
                format!("NUMBER {lexeme} {}", format_number(value))
            }
            TokenKind::StringLiteral => {
                let value = decode_literal(&lexeme[1..lexeme.len() - 1]);
                format!("STRING {lexeme} {value}")
            }
            TokenKind::CharacterLiteral => {
                let value = decode_literal(&lexeme[1..]);
                format!("CHARACTER {lexeme} {value}")
            }
            TokenKind::Ident => format!("IDENTIFIER {lexeme} null"),
            kind => format!("{kind} {lexeme} null"),
        }
    }

    fn format_lexical_error(&self, error: &LexicalError) -> String {
        let line = self.line_breaks.get_line_from_span(error.span);
        match error.kind {
            LexicalErrorKind::Unrecognized(c) => {
                format!("[line {line}] Error: Unexpected character: {c}")
            }
            LexicalErrorKind::UnclosedString => {
                format!("[line {line}] Error: Unterminated string.")
            }
            LexicalErrorKind::UnclosedCharacter => {
                format!("[line {line}] Error: Unterminated character.")
            }
            LexicalErrorKind::InvalidEscape(c) => {
                format!("[line {line}] Error: Invalid escape: \\{c}")
            }
        }
    }
}

pub struct DebugFormatter;

impl<'src> ToFormatter<DebugFormatter> for Lexer<'src> {
    fn create_formatter(&self) -> DebugFormatter {
        DebugFormatter {}
    }
}

impl TokenFormatter for DebugFormatter {
    fn format(&self, token: &Token) -> String {
        format!("{token:?}")
    }

    fn format_lexical_error(&self, error: &LexicalError) -> String {
        format!("{error:?}")
    }
}
