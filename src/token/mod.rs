pub mod formatter;
mod span;

use compact_str::CompactString;
use std::collections::HashMap;
use std::fmt::Display;
use std::sync::LazyLock;

pub use span::Span;

/// The hashmap for keywords
pub static KEYWORD_HASHMAP: LazyLock<HashMap<&'static str, TokenKind>> = LazyLock::new(|| {
    let mut map = HashMap::new();
    map.insert("fn", TokenKind::KeywordFn);
    map.insert("let", TokenKind::KeywordLet);
    map.insert("if", TokenKind::KeywordIf);
    map.insert("else", TokenKind::KeywordElse);
    map.insert("return", TokenKind::KeywordReturn);
    map.insert("true", TokenKind::KeywordTrue);
    map.insert("false", TokenKind::KeywordFalse);
    map
});

/// Classifies an identifier-shaped lexeme as either a keyword or a plain identifier.
pub fn lookup_identifier(lexeme: &str) -> TokenKind {
    KEYWORD_HASHMAP
        .get(lexeme)
        .copied()
        .unwrap_or(TokenKind::Ident)
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Illegal,
    Eof,

    // Literals
    Ident,
    IntegerLiteral,
    StringLiteral,

    // Operators
    Equal,
    Plus,
    Minus,
    Star,
    Slash,
    Bang,
    LessThan,
    GreaterThan,
    LessThanEqual,
    GreaterThanEqual,
    EqualEqual,
    BangEqual,
    AndAnd,
    OrOr,

    // Delimiters
    Comma,
    Semicolon,
    LeftParenthesis,
    RightParenthesis,
    LeftBrace,
    RightBrace,
    LeftBracket,
    RightBracket,

    // Keywords
    KeywordFn,
    KeywordLet,
    KeywordIf,
    KeywordElse,
    KeywordReturn,
    KeywordTrue,
    KeywordFalse,
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenKind::Illegal => write!(f, "Illegal"),
            TokenKind::Eof => write!(f, "Eof"),
            TokenKind::Ident => write!(f, "Identifier"),
            TokenKind::IntegerLiteral => write!(f, "Integer"),
            TokenKind::StringLiteral => write!(f, "String"),
            TokenKind::Equal => write!(f, "="),
            TokenKind::Plus => write!(f, "+"),
            TokenKind::Minus => write!(f, "-"),
            TokenKind::Star => write!(f, "*"),
            TokenKind::Slash => write!(f, "/"),
            TokenKind::Bang => write!(f, "!"),
            TokenKind::LessThan => write!(f, "<"),
            TokenKind::GreaterThan => write!(f, ">"),
            TokenKind::LessThanEqual => write!(f, "<="),
            TokenKind::GreaterThanEqual => write!(f, ">="),
            TokenKind::EqualEqual => write!(f, "=="),
            TokenKind::BangEqual => write!(f, "!="),
            TokenKind::AndAnd => write!(f, "&&"),
            TokenKind::OrOr => write!(f, "||"),
            TokenKind::Comma => write!(f, ","),
            TokenKind::Semicolon => write!(f, ";"),
            TokenKind::LeftParenthesis => write!(f, "("),
            TokenKind::RightParenthesis => write!(f, ")"),
            TokenKind::LeftBrace => write!(f, "{{"),
            TokenKind::RightBrace => write!(f, "}}"),
            TokenKind::LeftBracket => write!(f, "["),
            TokenKind::RightBracket => write!(f, "]"),
            TokenKind::KeywordFn => write!(f, "Function"),
            TokenKind::KeywordLet => write!(f, "Let"),
            TokenKind::KeywordIf => write!(f, "If"),
            TokenKind::KeywordElse => write!(f, "Else"),
            TokenKind::KeywordReturn => write!(f, "Return"),
            TokenKind::KeywordTrue => write!(f, "True"),
            TokenKind::KeywordFalse => write!(f, "False"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// The source text of the token. String literals exclude their quotes.
    pub literal: CompactString,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, literal: impl Into<CompactString>, span: Span) -> Self {
        Self {
            kind,
            literal: literal.into(),
            span,
        }
    }
}
