use std::collections::HashMap;
use std::fmt::Display;
use std::ops::Range;
use std::sync::LazyLock;

/// The hashmap for keywords
pub static KEYWORD_HASHMAP: LazyLock<HashMap<&'static str, TokenKind>> = LazyLock::new(|| {
    let mut map = HashMap::new();
    map.insert("null", TokenKind::KeywordNull);
    map.insert("true", TokenKind::KeywordTrue);
    map.insert("false", TokenKind::KeywordFalse);
    map.insert("if", TokenKind::KeywordIf);
    map.insert("else", TokenKind::KeywordElse);
    map.insert("while", TokenKind::KeywordWhile);
    map.insert("for", TokenKind::KeywordFor);
    map.insert("in", TokenKind::KeywordIn);
    map.insert("of", TokenKind::KeywordOf);
    map.insert("break", TokenKind::KeywordBreak);
    map.insert("continue", TokenKind::KeywordContinue);
    map
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    /// The byte position of the start of the token.
    pub start: usize,
    /// The length of the token in bytes.
    pub length: usize,
}

impl Span {
    pub fn new(start: usize, length: usize) -> Self {
        Self { start, length }
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end()
    }

    pub fn end(&self) -> usize {
        self.start + self.length
    }

    pub fn merge(&self, other: &Span) -> Span {
        let start = self.start.min(other.start);
        let end = self.end().max(other.end());
        Span {
            start,
            length: end - start,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TokenKind {
    // Delimiters
    LeftParenthesis,
    RightParenthesis,
    LeftBrace,
    RightBrace,
    LeftBracket,
    RightBracket,
    Comma,
    Semicolon,
    Dot,
    // Arithmetic
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    PlusPlus,
    MinusMinus,
    // Logic and comparison
    Bang,
    AndAnd,
    OrOr,
    EqualEqual,
    LessThan,
    LessThanEqual,
    GreaterThan,
    GreaterThanEqual,
    // Assignment
    Equal,
    ColonEqual,
    PlusEqual,
    MinusEqual,
    StarEqual,
    SlashEqual,
    PercentEqual,
    Arrow,
    Ampersand,
    // Functions, ranges and list mutation
    FatArrow,
    DoubleDot,
    DoubleDotEqual,
    DoubleColon,
    LeftShift,
    RightShift,

    // Literals
    NumericLiteral,
    StringLiteral,
    CharacterLiteral,
    Ident,

    // Keywords
    KeywordNull,
    KeywordTrue,
    KeywordFalse,
    KeywordIf,
    KeywordElse,
    KeywordWhile,
    KeywordFor,
    KeywordIn,
    KeywordOf,
    KeywordBreak,
    KeywordContinue,

    // End of file.
    Eof,
}

impl TokenKind {
    /// The fixed spelling of symbol and keyword tokens.
    pub fn symbol(&self) -> Option<&'static str> {
        let symbol = match self {
            TokenKind::LeftParenthesis => "(",
            TokenKind::RightParenthesis => ")",
            TokenKind::LeftBrace => "{",
            TokenKind::RightBrace => "}",
            TokenKind::LeftBracket => "[",
            TokenKind::RightBracket => "]",
            TokenKind::Comma => ",",
            TokenKind::Semicolon => ";",
            TokenKind::Dot => ".",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Percent => "%",
            TokenKind::PlusPlus => "++",
            TokenKind::MinusMinus => "--",
            TokenKind::Bang => "!",
            TokenKind::AndAnd => "&&",
            TokenKind::OrOr => "||",
            TokenKind::EqualEqual => "==",
            TokenKind::LessThan => "<",
            TokenKind::LessThanEqual => "<=",
            TokenKind::GreaterThan => ">",
            TokenKind::GreaterThanEqual => ">=",
            TokenKind::Equal => "=",
            TokenKind::ColonEqual => ":=",
            TokenKind::PlusEqual => "+=",
            TokenKind::MinusEqual => "-=",
            TokenKind::StarEqual => "*=",
            TokenKind::SlashEqual => "/=",
            TokenKind::PercentEqual => "%=",
            TokenKind::Arrow => "->",
            TokenKind::Ampersand => "&",
            TokenKind::FatArrow => "=>",
            TokenKind::DoubleDot => "..",
            TokenKind::DoubleDotEqual => "..=",
            TokenKind::DoubleColon => "::",
            TokenKind::LeftShift => "<<",
            TokenKind::RightShift => ">>",
            TokenKind::KeywordNull => "null",
            TokenKind::KeywordTrue => "true",
            TokenKind::KeywordFalse => "false",
            TokenKind::KeywordIf => "if",
            TokenKind::KeywordElse => "else",
            TokenKind::KeywordWhile => "while",
            TokenKind::KeywordFor => "for",
            TokenKind::KeywordIn => "in",
            TokenKind::KeywordOf => "of",
            TokenKind::KeywordBreak => "break",
            TokenKind::KeywordContinue => "continue",
            TokenKind::NumericLiteral
            | TokenKind::StringLiteral
            | TokenKind::CharacterLiteral
            | TokenKind::Ident
            | TokenKind::Eof => return None,
        };
        Some(symbol)
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenKind::LeftParenthesis => write!(f, "LEFT_PAREN"),
            TokenKind::RightParenthesis => write!(f, "RIGHT_PAREN"),
            TokenKind::LeftBrace => write!(f, "LEFT_BRACE"),
            TokenKind::RightBrace => write!(f, "RIGHT_BRACE"),
            TokenKind::LeftBracket => write!(f, "LEFT_BRACKET"),
            TokenKind::RightBracket => write!(f, "RIGHT_BRACKET"),
            TokenKind::Comma => write!(f, "COMMA"),
            TokenKind::Semicolon => write!(f, "SEMICOLON"),
            TokenKind::Dot => write!(f, "DOT"),
            TokenKind::Plus => write!(f, "PLUS"),
            TokenKind::Minus => write!(f, "MINUS"),
            TokenKind::Star => write!(f, "STAR"),
            TokenKind::Slash => write!(f, "SLASH"),
            TokenKind::Percent => write!(f, "PERCENT"),
            TokenKind::PlusPlus => write!(f, "PLUS_PLUS"),
            TokenKind::MinusMinus => write!(f, "MINUS_MINUS"),
            TokenKind::Bang => write!(f, "BANG"),
            TokenKind::AndAnd => write!(f, "AND_AND"),
            TokenKind::OrOr => write!(f, "OR_OR"),
            TokenKind::EqualEqual => write!(f, "EQUAL_EQUAL"),
            TokenKind::LessThan => write!(f, "LESS"),
            TokenKind::LessThanEqual => write!(f, "LESS_EQUAL"),
            TokenKind::GreaterThan => write!(f, "GREATER"),
            TokenKind::GreaterThanEqual => write!(f, "GREATER_EQUAL"),
            TokenKind::Equal => write!(f, "EQUAL"),
            TokenKind::ColonEqual => write!(f, "COLON_EQUAL"),
            TokenKind::PlusEqual => write!(f, "PLUS_EQUAL"),
            TokenKind::MinusEqual => write!(f, "MINUS_EQUAL"),
            TokenKind::StarEqual => write!(f, "STAR_EQUAL"),
            TokenKind::SlashEqual => write!(f, "SLASH_EQUAL"),
            TokenKind::PercentEqual => write!(f, "PERCENT_EQUAL"),
            TokenKind::Arrow => write!(f, "ARROW"),
            TokenKind::Ampersand => write!(f, "AMPERSAND"),
            TokenKind::FatArrow => write!(f, "FAT_ARROW"),
            TokenKind::DoubleDot => write!(f, "DOUBLE_DOT"),
            TokenKind::DoubleDotEqual => write!(f, "DOUBLE_DOT_EQUAL"),
            TokenKind::DoubleColon => write!(f, "DOUBLE_COLON"),
            TokenKind::LeftShift => write!(f, "LEFT_SHIFT"),
            TokenKind::RightShift => write!(f, "RIGHT_SHIFT"),
            TokenKind::NumericLiteral => write!(f, "NUMBER"),
            TokenKind::StringLiteral => write!(f, "STRING"),
            TokenKind::CharacterLiteral => write!(f, "CHARACTER"),
            TokenKind::Ident => write!(f, "IDENTIFIER"),
            TokenKind::KeywordNull => write!(f, "NULL"),
            TokenKind::KeywordTrue => write!(f, "TRUE"),
            TokenKind::KeywordFalse => write!(f, "FALSE"),
            TokenKind::KeywordIf => write!(f, "IF"),
            TokenKind::KeywordElse => write!(f, "ELSE"),
            TokenKind::KeywordWhile => write!(f, "WHILE"),
            TokenKind::KeywordFor => write!(f, "FOR"),
            TokenKind::KeywordIn => write!(f, "IN"),
            TokenKind::KeywordOf => write!(f, "OF"),
            TokenKind::KeywordBreak => write!(f, "BREAK"),
            TokenKind::KeywordContinue => write!(f, "CONTINUE"),
            TokenKind::Eof => write!(f, "EOF"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}
