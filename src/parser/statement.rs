use super::expression::{Expression, Identifier};
use crate::token::Token;
use std::fmt::Display;

#[derive(Debug, Clone, PartialEq)]
pub struct LetStatement {
    pub token: Token,
    pub name: Identifier,
    pub value: Expression,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStatement {
    pub token: Token,
    pub value: Expression,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionStatement {
    pub token: Token,
    pub expression: Expression,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BlockStatement {
    pub token: Token,
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Let(LetStatement),
    Return(ReturnStatement),
    Expression(ExpressionStatement),
    Block(BlockStatement),
}

/// Writes a statement sequence so that re-parsing the text yields the same
/// sequence: an expression statement followed by another statement is
/// terminated with `;`.
pub(crate) fn write_statements(
    f: &mut std::fmt::Formatter<'_>,
    statements: &[Statement],
) -> std::fmt::Result {
    for (index, statement) in statements.iter().enumerate() {
        if index > 0 {
            if matches!(statements[index - 1], Statement::Expression(_)) {
                write!(f, ";")?;
            }
            write!(f, " ")?;
        }
        write!(f, "{statement}")?;
    }
    Ok(())
}

impl Display for BlockStatement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.statements.is_empty() {
            return write!(f, "{{ }}");
        }
        write!(f, "{{ ")?;
        write_statements(f, &self.statements)?;
        write!(f, " }}")
    }
}

impl Display for Statement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Statement::Let(stmt) => write!(f, "let {} = {};", stmt.name, stmt.value),
            Statement::Return(stmt) => write!(f, "return {};", stmt.value),
            Statement::Expression(stmt) => write!(f, "{}", stmt.expression),
            Statement::Block(block) => write!(f, "{block}"),
        }
    }
}
