use super::{Token, TokenKind};

/// Interface for creating new token formatters.
pub trait TokenFormatter {
    /// Formats a token into a string.
    fn format(&self, token: &Token) -> String;
}

pub struct BasicFormatter;

impl TokenFormatter for BasicFormatter {
    fn format(&self, token: &Token) -> String {
        match token.kind {
            TokenKind::Eof => "EOF".into(),
            TokenKind::StringLiteral => format!("STRING \"{}\"", token.literal),
            TokenKind::IntegerLiteral => format!("INTEGER {}", token.literal),
            TokenKind::Ident => format!("IDENTIFIER {}", token.literal),
            TokenKind::Illegal => format!("ILLEGAL {}", token.literal),
            kind => format!("{} {}", kind.to_string().to_uppercase(), token.literal),
        }
    }
}

pub struct DebugFormatter;

impl TokenFormatter for DebugFormatter {
    fn format(&self, token: &Token) -> String {
        format!("{token:?}")
    }
}
