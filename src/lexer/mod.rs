mod cursor;

use crate::token::{lookup_identifier, Span, Token, TokenKind};
use compact_str::CompactString;
use cursor::SourceCursor;

fn is_letter(byte: u8) -> bool {
    byte.is_ascii_alphabetic() || byte == b'_'
}

fn is_whitespace(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\n' | b'\r')
}

/// On-demand scanner producing one token per call.
///
/// Lexing never fails: bytes that do not start any token become
/// [`TokenKind::Illegal`] tokens and are left for the parser to report. Once the
/// input is exhausted every further call yields [`TokenKind::Eof`].
#[derive(Debug, Clone)]
pub struct Lexer<'src> {
    source: &'src str,
    cursor: SourceCursor<'src>,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            cursor: SourceCursor::new(source),
        }
    }

    pub fn next_token(&mut self) -> Token {
        self.cursor.eat_while(is_whitespace);

        let start = self.cursor.offset();
        let Some(byte) = self.cursor.bump() else {
            return Token::new(TokenKind::Eof, "", Span::new(start, 0));
        };

        match byte {
            b'+' => self.just(TokenKind::Plus, start),
            b'-' => self.just(TokenKind::Minus, start),
            b'*' => self.just(TokenKind::Star, start),
            b'/' => self.just(TokenKind::Slash, start),
            b',' => self.just(TokenKind::Comma, start),
            b';' => self.just(TokenKind::Semicolon, start),
            b'(' => self.just(TokenKind::LeftParenthesis, start),
            b')' => self.just(TokenKind::RightParenthesis, start),
            b'{' => self.just(TokenKind::LeftBrace, start),
            b'}' => self.just(TokenKind::RightBrace, start),
            b'[' => self.just(TokenKind::LeftBracket, start),
            b']' => self.just(TokenKind::RightBracket, start),
            // One or two character tokens
            b'=' => match self.cursor.eat(b'=') {
                true => self.just(TokenKind::EqualEqual, start),
                false => self.just(TokenKind::Equal, start),
            },
            b'!' => match self.cursor.eat(b'=') {
                true => self.just(TokenKind::BangEqual, start),
                false => self.just(TokenKind::Bang, start),
            },
            b'<' => match self.cursor.eat(b'=') {
                true => self.just(TokenKind::LessThanEqual, start),
                false => self.just(TokenKind::LessThan, start),
            },
            b'>' => match self.cursor.eat(b'=') {
                true => self.just(TokenKind::GreaterThanEqual, start),
                false => self.just(TokenKind::GreaterThan, start),
            },
            // Bitwise operators are not part of the language
            b'&' => match self.cursor.eat(b'&') {
                true => self.just(TokenKind::AndAnd, start),
                false => self.just(TokenKind::Illegal, start),
            },
            b'|' => match self.cursor.eat(b'|') {
                true => self.just(TokenKind::OrOr, start),
                false => self.just(TokenKind::Illegal, start),
            },
            b'"' => self.lex_string(start),
            b if is_letter(b) => {
                self.cursor.eat_while(is_letter);
                let end = self.cursor.offset();
                let lexeme = &self.source[start..end];
                Token::new(lookup_identifier(lexeme), lexeme, Span::new(start, end - start))
            }
            b if b.is_ascii_digit() => {
                self.cursor.eat_while(|b| b.is_ascii_digit());
                self.just(TokenKind::IntegerLiteral, start)
            }
            _ => {
                let end = self.cursor.offset();
                Token::new(
                    TokenKind::Illegal,
                    CompactString::from_utf8_lossy(self.cursor.slice(start, end)),
                    Span::new(start, end - start),
                )
            }
        }
    }

    fn just(&self, kind: TokenKind, start: usize) -> Token {
        let end = self.cursor.offset();
        Token::new(kind, &self.source[start..end], Span::new(start, end - start))
    }

    /// Scans a string literal whose opening quote sits at `start`. No escape
    /// sequences are recognised and an unterminated literal runs to the end of
    /// the input.
    fn lex_string(&mut self, start: usize) -> Token {
        let content_start = self.cursor.offset();
        self.cursor.eat_while(|b| b != b'"');
        let content_end = self.cursor.offset();
        let _ = self.cursor.eat(b'"');
        let end = self.cursor.offset();

        Token::new(
            TokenKind::StringLiteral,
            &self.source[content_start..content_end],
            Span::new(start, end - start),
        )
    }
}

impl<'src> Iterator for Lexer<'src> {
    type Item = Token;

    /// Yields tokens up to, but not including, the end-of-file token.
    fn next(&mut self) -> Option<Self::Item> {
        let token = self.next_token();
        match token.kind {
            TokenKind::Eof => None,
            _ => Some(token),
        }
    }
}
