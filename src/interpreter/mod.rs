mod tree;

use crate::parser::{expression::Expression, program::Program, statement::Statement};
pub use tree::TreeWalkInterpreter;

/// Any syntax tree node the interpreter can evaluate on its own.
#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    Program(&'a Program),
    Statement(&'a Statement),
    Expression(&'a Expression),
}

impl<'a> From<&'a Program> for Node<'a> {
    fn from(value: &'a Program) -> Self {
        Node::Program(value)
    }
}

impl<'a> From<&'a Statement> for Node<'a> {
    fn from(value: &'a Statement) -> Self {
        Node::Statement(value)
    }
}

impl<'a> From<&'a Expression> for Node<'a> {
    fn from(value: &'a Expression) -> Self {
        Node::Expression(value)
    }
}
