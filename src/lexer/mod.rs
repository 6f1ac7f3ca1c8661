mod error;
pub mod formatter;
mod token;

pub use error::{LexicalError, LexicalErrorKind};
use std::{ops::Range, rc::Rc};
pub use token::{Span, Token, TokenKind, KEYWORD_HASHMAP};

#[derive(Debug, Clone)]
pub struct LineBreaks {
    line_breaks: Rc<[Range<usize>]>,
}

impl LineBreaks {
    pub fn new(text: &str) -> Self {
        let line_breaks = if !text.is_empty() {
            let mut line_breaks = Vec::new();
            let mut cursor = 0;
            for (offset, byte) in text.bytes().enumerate() {
                let offset = offset + 1;
                if byte == b'\n' {
                    line_breaks.push(cursor..offset);
                    cursor = offset;
                }
            }
            if !text.ends_with('\n') {
                line_breaks.push(cursor..text.len() + 1);
            }
            line_breaks
        } else {
            vec![0..1]
        };
        Self {
            line_breaks: line_breaks.into(),
        }
    }

    pub fn get_max_line(&self) -> u32 {
        (self.line_breaks.len() + 1) as u32
    }

    pub fn get_line(&self, offset: usize) -> u32 {
        self.line_breaks
            .binary_search_by(|r| {
                if offset < r.start {
                    std::cmp::Ordering::Greater
                } else if offset >= r.end {
                    std::cmp::Ordering::Less
                } else {
                    std::cmp::Ordering::Equal
                }
            })
            .map(|v| (v + 1) as u32)
            .unwrap_or(self.get_max_line())
    }

    pub fn get_line_from_span(&self, span: Span) -> u32 {
        self.get_line(span.start)
    }
}

/// Maps the character after a backslash onto the character it stands for.
pub fn unescape_char(c: char) -> Option<char> {
    match c {
        'n' => Some('\n'),
        't' => Some('\t'),
        'r' => Some('\r'),
        '0' => Some('\0'),
        '\\' => Some('\\'),
        '"' => Some('"'),
        '\'' => Some('\''),
        _ => None,
    }
}

/// Decodes the body of a string or character literal that the lexer already validated.
pub fn decode_literal(body: &str) -> String {
    let mut decoded = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(escaped) = chars.next().and_then(unescape_char) {
                decoded.push(escaped);
            }
        } else {
            decoded.push(c);
        }
    }
    decoded
}

#[derive(Debug)]
pub struct Lexer<'src> {
    source: &'src str,
    offset: usize,
    line_breaks: LineBreaks,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            offset: 0,
            line_breaks: LineBreaks::new(source),
        }
    }

    pub fn get_source(&self) -> &'src str {
        self.source
    }

    pub fn get_line_breaks(&self) -> LineBreaks {
        self.line_breaks.clone()
    }

    pub fn get_lexeme(&self, span: &Span) -> Option<&'src str> {
        self.source.get(span.range())
    }
}

impl<'src> Lexer<'src> {
    fn peek(&self) -> Option<char> {
        self.source[self.offset..].chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        let mut chars = self.source[self.offset..].chars();
        chars.next();
        chars.next()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.offset += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.offset += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.advance();
                }
                Some('/') if self.peek_second() == Some('/') => {
                    while let Some(c) = self.advance() {
                        if c == '\n' {
                            break;
                        }
                    }
                }
                _ => return,
            }
        }
    }

    fn error(&self, kind: LexicalErrorKind, start: usize) -> LexicalError {
        LexicalError {
            kind,
            span: Span::new(start, self.offset - start),
        }
    }

    fn lex_escape(&mut self, start: usize) -> Result<(), LexicalError> {
        match self.advance() {
            Some(c) if unescape_char(c).is_some() => Ok(()),
            Some(c) => Err(self.error(LexicalErrorKind::InvalidEscape(c), start)),
            None => Err(self.error(LexicalErrorKind::UnclosedString, start)),
        }
    }

    fn lex_string(&mut self, start: usize) -> Result<TokenKind, LexicalError> {
        loop {
            match self.advance() {
                Some('"') => return Ok(TokenKind::StringLiteral),
                Some('\\') => self.lex_escape(start)?,
                Some(_) => {}
                None => return Err(self.error(LexicalErrorKind::UnclosedString, start)),
            }
        }
    }

    fn lex_character(&mut self, start: usize) -> Result<TokenKind, LexicalError> {
        match self.advance() {
            Some('\\') => match self.advance() {
                Some(c) if unescape_char(c).is_some() => Ok(TokenKind::CharacterLiteral),
                Some(c) => Err(self.error(LexicalErrorKind::InvalidEscape(c), start)),
                None => Err(self.error(LexicalErrorKind::UnclosedCharacter, start)),
            },
            Some(_) => Ok(TokenKind::CharacterLiteral),
            None => Err(self.error(LexicalErrorKind::UnclosedCharacter, start)),
        }
    }

    fn lex_number(&mut self) -> TokenKind {
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.advance();
        }
        if self.peek() == Some('.') && matches!(self.peek_second(), Some(c) if c.is_ascii_digit())
        {
            self.advance();
            while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                self.advance();
            }
        }
        TokenKind::NumericLiteral
    }

    fn lex_ident_or_keyword(&mut self, start: usize) -> TokenKind {
        while matches!(self.peek(), Some(c) if c.is_ascii_alphanumeric() || c == '_') {
            self.advance();
        }
        let lexeme = &self.source[start..self.offset];
        KEYWORD_HASHMAP
            .get(lexeme)
            .cloned()
            .unwrap_or(TokenKind::Ident)
    }

    pub fn next_token(&mut self) -> Result<Token, LexicalError> {
        self.skip_trivia();
        let start = self.offset;
        let Some(c) = self.advance() else {
            return Ok(Token {
                kind: TokenKind::Eof,
                span: Span::new(self.source.len(), 0),
            });
        };

        let kind = match c {
            '(' => TokenKind::LeftParenthesis,
            ')' => TokenKind::RightParenthesis,
            '{' => TokenKind::LeftBrace,
            '}' => TokenKind::RightBrace,
            '[' => TokenKind::LeftBracket,
            ']' => TokenKind::RightBracket,
            ',' => TokenKind::Comma,
            ';' => TokenKind::Semicolon,
            '.' => {
                if self.eat('.') {
                    if self.eat('=') {
                        TokenKind::DoubleDotEqual
                    } else {
                        TokenKind::DoubleDot
                    }
                } else {
                    TokenKind::Dot
                }
            }
            '+' => {
                if self.eat('+') {
                    TokenKind::PlusPlus
                } else if self.eat('=') {
                    TokenKind::PlusEqual
                } else {
                    TokenKind::Plus
                }
            }
            '-' => {
                if self.eat('-') {
                    TokenKind::MinusMinus
                } else if self.eat('=') {
                    TokenKind::MinusEqual
                } else if self.eat('>') {
                    TokenKind::Arrow
                } else {
                    TokenKind::Minus
                }
            }
            '*' => {
                if self.eat('=') {
                    TokenKind::StarEqual
                } else {
                    TokenKind::Star
                }
            }
            '/' => {
                if self.eat('=') {
                    TokenKind::SlashEqual
                } else {
                    TokenKind::Slash
                }
            }
            '%' => {
                if self.eat('=') {
                    TokenKind::PercentEqual
                } else {
                    TokenKind::Percent
                }
            }
            '!' => TokenKind::Bang,
            '=' => {
                if self.eat('=') {
                    TokenKind::EqualEqual
                } else if self.eat('>') {
                    TokenKind::FatArrow
                } else {
                    TokenKind::Equal
                }
            }
            '<' => {
                if self.eat('=') {
                    TokenKind::LessThanEqual
                } else if self.eat('<') {
                    TokenKind::LeftShift
                } else {
                    TokenKind::LessThan
                }
            }
            '>' => {
                if self.eat('=') {
                    TokenKind::GreaterThanEqual
                } else if self.eat('>') {
                    TokenKind::RightShift
                } else {
                    TokenKind::GreaterThan
                }
            }
            ':' => {
                if self.eat('=') {
                    TokenKind::ColonEqual
                } else if self.eat(':') {
                    TokenKind::DoubleColon
                } else {
                    return Err(self.error(LexicalErrorKind::Unrecognized(c), start));
                }
            }
            '&' => {
                if self.eat('&') {
                    TokenKind::AndAnd
                } else {
                    TokenKind::Ampersand
                }
            }
            '|' => {
                if self.eat('|') {
                    TokenKind::OrOr
                } else {
                    return Err(self.error(LexicalErrorKind::Unrecognized(c), start));
                }
            }
            '"' => self.lex_string(start)?,
            '@' => self.lex_character(start)?,
            '0'..='9' => self.lex_number(),
            'a'..='z' | 'A'..='Z' | '_' => self.lex_ident_or_keyword(start),
            _ => return Err(self.error(LexicalErrorKind::Unrecognized(c), start)),
        };

        Ok(Token {
            kind,
            span: Span::new(start, self.offset - start),
        })
    }
}
