use super::ObjectKind;
use crate::parser::expression::{InfixOperator, PrefixOperator};
use compact_str::CompactString;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RuntimeError {
    #[error("identifier not found: {0}")]
    UnknownIdentifier(CompactString),
    #[error("unknown operator: {operator}{operand}")]
    UnknownPrefixOperator {
        operator: PrefixOperator,
        operand: ObjectKind,
    },
    #[error("unknown operator: {left} {operator} {right}")]
    UnknownInfixOperator {
        left: ObjectKind,
        operator: InfixOperator,
        right: ObjectKind,
    },
    #[error("type mismatch: {left} {operator} {right}")]
    TypeMismatch {
        left: ObjectKind,
        operator: InfixOperator,
        right: ObjectKind,
    },
    #[error("unknown operator: {left}[{index}]")]
    UnknownIndexOperator { left: ObjectKind, index: ObjectKind },
    #[error("division by zero: {0} / 0")]
    DivisionByZero(i64),
    #[error("not a function: {0}")]
    NotCallable(ObjectKind),
    #[error("wrong number of arguments. expected={expected}, actual={actual}")]
    InvalidArgumentCount { expected: usize, actual: usize },
    #[error("argument to '{name}' method is not supported. actual={actual}")]
    UnsupportedArgument {
        name: &'static str,
        actual: ObjectKind,
    },
}

impl RuntimeError {
    pub fn code(&self) -> &'static str {
        match self {
            RuntimeError::UnknownIdentifier(_) => "RT001",
            RuntimeError::UnknownPrefixOperator { .. } => "RT002",
            RuntimeError::UnknownInfixOperator { .. } => "RT003",
            RuntimeError::TypeMismatch { .. } => "RT004",
            RuntimeError::UnknownIndexOperator { .. } => "RT005",
            RuntimeError::DivisionByZero(_) => "RT006",
            RuntimeError::NotCallable(_) => "RT007",
            RuntimeError::InvalidArgumentCount { .. } => "RT008",
            RuntimeError::UnsupportedArgument { .. } => "RT009",
        }
    }
}
