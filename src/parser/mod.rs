pub mod error;
pub mod expression;
pub mod formatter;
pub mod program;
pub mod statement;

use crate::{
    lexer::Lexer,
    token::{Token, TokenKind},
};
use error::{ParserError, ParserErrorKind};
use expression::{
    ArrayLiteral, BooleanLiteral, CallExpression, Expression, FunctionLiteral, Identifier,
    IfExpression, IndexExpression, InfixExpression, InfixOperator, IntegerLiteral, Precedence,
    PrefixExpression, PrefixOperator, StringLiteral,
};
use program::Program;
use statement::{BlockStatement, ExpressionStatement, LetStatement, ReturnStatement, Statement};
use std::collections::HashMap;
use std::rc::Rc;

type PrefixParseFn<'src> = fn(&mut Parser<'src>) -> Option<Expression>;
type InfixParseFn<'src> = fn(&mut Parser<'src>, Expression) -> Option<Expression>;

/// Pratt parser over the token stream of a [`Lexer`].
///
/// Syntax errors never abort the parse. They are collected into [`Parser::errors`]
/// and the statement that produced them is dropped from the resulting [`Program`].
pub struct Parser<'src> {
    lexer: Lexer<'src>,
    current: Token,
    peek: Token,
    errors: Vec<ParserError>,
    prefix_parse_fns: HashMap<TokenKind, PrefixParseFn<'src>>,
    infix_parse_fns: HashMap<TokenKind, InfixParseFn<'src>>,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str) -> Self {
        Self::from_lexer(Lexer::new(source))
    }

    pub fn from_lexer(mut lexer: Lexer<'src>) -> Self {
        let current = lexer.next_token();
        let peek = lexer.next_token();

        let mut prefix_parse_fns: HashMap<TokenKind, PrefixParseFn<'src>> = HashMap::new();
        prefix_parse_fns.insert(TokenKind::Ident, Self::parse_identifier);
        prefix_parse_fns.insert(TokenKind::IntegerLiteral, Self::parse_integer_literal);
        prefix_parse_fns.insert(TokenKind::StringLiteral, Self::parse_string_literal);
        prefix_parse_fns.insert(TokenKind::KeywordTrue, Self::parse_boolean);
        prefix_parse_fns.insert(TokenKind::KeywordFalse, Self::parse_boolean);
        prefix_parse_fns.insert(TokenKind::Bang, Self::parse_prefix_expression);
        prefix_parse_fns.insert(TokenKind::Minus, Self::parse_prefix_expression);
        prefix_parse_fns.insert(TokenKind::LeftParenthesis, Self::parse_grouped_expression);
        prefix_parse_fns.insert(TokenKind::KeywordIf, Self::parse_if_expression);
        prefix_parse_fns.insert(TokenKind::KeywordFn, Self::parse_function_literal);
        prefix_parse_fns.insert(TokenKind::LeftBracket, Self::parse_array_literal);

        let mut infix_parse_fns: HashMap<TokenKind, InfixParseFn<'src>> = HashMap::new();
        for kind in [
            TokenKind::Plus,
            TokenKind::Minus,
            TokenKind::Star,
            TokenKind::Slash,
            TokenKind::EqualEqual,
            TokenKind::BangEqual,
            TokenKind::LessThan,
            TokenKind::LessThanEqual,
            TokenKind::GreaterThan,
            TokenKind::GreaterThanEqual,
            TokenKind::AndAnd,
            TokenKind::OrOr,
        ] {
            infix_parse_fns.insert(kind, Self::parse_infix_expression);
        }
        infix_parse_fns.insert(TokenKind::LeftParenthesis, Self::parse_call_expression);
        infix_parse_fns.insert(TokenKind::LeftBracket, Self::parse_index_expression);

        Self {
            lexer,
            current,
            peek,
            errors: Vec::new(),
            prefix_parse_fns,
            infix_parse_fns,
        }
    }

    /// Errors recorded so far, in the order they were encountered.
    pub fn errors(&self) -> &[ParserError] {
        &self.errors
    }

    fn next_token(&mut self) {
        let next = self.lexer.next_token();
        self.current = std::mem::replace(&mut self.peek, next);
    }

    fn record(&mut self, kind: ParserErrorKind, token: &Token) {
        let error = ParserError {
            kind,
            span: token.span,
        };
        tracing::debug!(%error, "recorded parse error");
        self.errors.push(error);
    }

    /// Advances if the upcoming token is `expected`, otherwise records an error.
    fn expect_peek(&mut self, expected: TokenKind) -> Option<()> {
        if self.peek.kind == expected {
            self.next_token();
            Some(())
        } else {
            let peek = self.peek.clone();
            self.record(
                ParserErrorKind::UnexpectedToken {
                    expected,
                    actual: peek.kind,
                },
                &peek,
            );
            None
        }
    }

    fn eat_peek(&mut self, kind: TokenKind) -> bool {
        if self.peek.kind == kind {
            self.next_token();
            true
        } else {
            false
        }
    }

    /// Skips the remainder of a statement that failed to parse.
    fn synchronize(&mut self) {
        while !matches!(
            self.current.kind,
            TokenKind::Semicolon | TokenKind::RightBrace | TokenKind::Eof
        ) && !matches!(self.peek.kind, TokenKind::RightBrace | TokenKind::Eof)
        {
            self.next_token();
        }
    }
}

// Parse program/statements
impl<'src> Parser<'src> {
    pub fn parse_program(&mut self) -> Program {
        let mut statements = Vec::new();

        while self.current.kind != TokenKind::Eof {
            match self.parse_statement() {
                Some(statement) => statements.push(statement),
                None => self.synchronize(),
            }
            self.next_token();
        }

        Program::new(statements)
    }

    fn parse_statement(&mut self) -> Option<Statement> {
        match self.current.kind {
            TokenKind::KeywordLet => self.parse_let_statement(),
            TokenKind::KeywordReturn => self.parse_return_statement(),
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_let_statement(&mut self) -> Option<Statement> {
        let token = self.current.clone();

        self.expect_peek(TokenKind::Ident)?;
        let name = Identifier {
            token: self.current.clone(),
            name: self.current.literal.clone(),
        };

        self.expect_peek(TokenKind::Equal)?;
        self.next_token();

        let value = self.parse_expression(Precedence::Lowest)?;
        let _ = self.eat_peek(TokenKind::Semicolon);

        Some(Statement::Let(LetStatement { token, name, value }))
    }

    fn parse_return_statement(&mut self) -> Option<Statement> {
        let token = self.current.clone();
        self.next_token();

        let value = self.parse_expression(Precedence::Lowest)?;
        let _ = self.eat_peek(TokenKind::Semicolon);

        Some(Statement::Return(ReturnStatement { token, value }))
    }

    fn parse_expression_statement(&mut self) -> Option<Statement> {
        let token = self.current.clone();

        let expression = self.parse_expression(Precedence::Lowest)?;
        let _ = self.eat_peek(TokenKind::Semicolon);

        Some(Statement::Expression(ExpressionStatement { token, expression }))
    }

    /// Parses statements after an opening brace up to the matching closing brace.
    fn parse_block_statement(&mut self) -> BlockStatement {
        let token = self.current.clone();
        let mut statements = Vec::new();
        self.next_token();

        while !matches!(self.current.kind, TokenKind::RightBrace | TokenKind::Eof) {
            match self.parse_statement() {
                Some(statement) => statements.push(statement),
                None => {
                    self.synchronize();
                    if self.current.kind == TokenKind::RightBrace {
                        break;
                    }
                }
            }
            self.next_token();
        }

        BlockStatement { token, statements }
    }
}

// Pratt parser for expressions
impl<'src> Parser<'src> {
    pub fn parse_expression(&mut self, precedence: Precedence) -> Option<Expression> {
        let Some(prefix) = self.prefix_parse_fns.get(&self.current.kind).copied() else {
            let current = self.current.clone();
            self.record(ParserErrorKind::NoPrefixParseFunction(current.kind), &current);
            return None;
        };
        let mut lhs = prefix(self)?;

        while self.peek.kind != TokenKind::Semicolon && precedence < Precedence::of(self.peek.kind)
        {
            let Some(infix) = self.infix_parse_fns.get(&self.peek.kind).copied() else {
                return Some(lhs);
            };
            self.next_token();
            lhs = infix(self, lhs)?;
        }

        Some(lhs)
    }

    fn parse_identifier(&mut self) -> Option<Expression> {
        Some(Expression::Identifier(Identifier {
            token: self.current.clone(),
            name: self.current.literal.clone(),
        }))
    }

    fn parse_integer_literal(&mut self) -> Option<Expression> {
        let token = self.current.clone();
        match token.literal.parse::<i64>() {
            Ok(value) => Some(Expression::Integer(IntegerLiteral { token, value })),
            Err(_) => {
                self.record(ParserErrorKind::InvalidInteger(token.literal.clone()), &token);
                None
            }
        }
    }

    fn parse_string_literal(&mut self) -> Option<Expression> {
        Some(Expression::String(StringLiteral {
            token: self.current.clone(),
            value: self.current.literal.clone(),
        }))
    }

    fn parse_boolean(&mut self) -> Option<Expression> {
        Some(Expression::Boolean(BooleanLiteral {
            token: self.current.clone(),
            value: self.current.kind == TokenKind::KeywordTrue,
        }))
    }

    fn parse_prefix_expression(&mut self) -> Option<Expression> {
        let token = self.current.clone();
        let operator = PrefixOperator::from_token_kind(token.kind)?;
        self.next_token();

        let right = self.parse_expression(Precedence::Prefix)?;
        Some(Expression::Prefix(PrefixExpression {
            token,
            operator,
            right: Box::new(right),
        }))
    }

    fn parse_grouped_expression(&mut self) -> Option<Expression> {
        self.next_token();
        let inner = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(TokenKind::RightParenthesis)?;
        Some(inner)
    }

    fn parse_if_expression(&mut self) -> Option<Expression> {
        let token = self.current.clone();

        self.expect_peek(TokenKind::LeftParenthesis)?;
        self.next_token();
        let condition = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(TokenKind::RightParenthesis)?;

        self.expect_peek(TokenKind::LeftBrace)?;
        let consequence = self.parse_block_statement();

        let alternative = if self.eat_peek(TokenKind::KeywordElse) {
            self.expect_peek(TokenKind::LeftBrace)?;
            Some(self.parse_block_statement())
        } else {
            None
        };

        Some(Expression::If(IfExpression {
            token,
            condition: Box::new(condition),
            consequence,
            alternative,
        }))
    }

    fn parse_function_literal(&mut self) -> Option<Expression> {
        let token = self.current.clone();

        self.expect_peek(TokenKind::LeftParenthesis)?;
        let parameters = self.parse_function_parameters()?;
        self.expect_peek(TokenKind::LeftBrace)?;
        let body = self.parse_block_statement();

        Some(Expression::Function(FunctionLiteral {
            token,
            parameters: parameters.into(),
            body: Rc::new(body),
        }))
    }

    fn parse_function_parameters(&mut self) -> Option<Vec<Identifier>> {
        let mut parameters = Vec::new();
        if self.eat_peek(TokenKind::RightParenthesis) {
            return Some(parameters);
        }

        loop {
            self.expect_peek(TokenKind::Ident)?;
            parameters.push(Identifier {
                token: self.current.clone(),
                name: self.current.literal.clone(),
            });
            if !self.eat_peek(TokenKind::Comma) {
                break;
            }
        }
        self.expect_peek(TokenKind::RightParenthesis)?;

        Some(parameters)
    }

    fn parse_array_literal(&mut self) -> Option<Expression> {
        let token = self.current.clone();
        let elements = self.parse_expression_list(TokenKind::RightBracket)?;
        Some(Expression::Array(ArrayLiteral { token, elements }))
    }

    /// Parses comma separated expressions up to the closing `end` token.
    fn parse_expression_list(&mut self, end: TokenKind) -> Option<Vec<Expression>> {
        let mut expressions = Vec::new();
        if self.eat_peek(end) {
            return Some(expressions);
        }

        self.next_token();
        expressions.push(self.parse_expression(Precedence::Lowest)?);
        while self.eat_peek(TokenKind::Comma) {
            self.next_token();
            expressions.push(self.parse_expression(Precedence::Lowest)?);
        }
        self.expect_peek(end)?;

        Some(expressions)
    }

    fn parse_infix_expression(&mut self, left: Expression) -> Option<Expression> {
        let token = self.current.clone();
        let operator = InfixOperator::from_token_kind(token.kind)?;
        let precedence = Precedence::of(token.kind);
        self.next_token();

        let right = self.parse_expression(precedence)?;
        Some(Expression::Infix(InfixExpression {
            token,
            left: Box::new(left),
            operator,
            right: Box::new(right),
        }))
    }

    fn parse_call_expression(&mut self, function: Expression) -> Option<Expression> {
        let token = self.current.clone();
        let arguments = self.parse_expression_list(TokenKind::RightParenthesis)?;
        Some(Expression::Call(CallExpression {
            token,
            function: Box::new(function),
            arguments,
        }))
    }

    fn parse_index_expression(&mut self, left: Expression) -> Option<Expression> {
        let token = self.current.clone();
        self.next_token();
        let index = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(TokenKind::RightBracket)?;

        Some(Expression::Index(IndexExpression {
            token,
            left: Box::new(left),
            index: Box::new(index),
        }))
    }
}
