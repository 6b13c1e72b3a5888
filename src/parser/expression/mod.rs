mod operator;
mod tree;

pub use operator::{InfixOperator, Precedence, PrefixOperator};
pub use tree::{
    ArrayLiteral, BooleanLiteral, CallExpression, Expression, FunctionLiteral, Identifier,
    IfExpression, IndexExpression, InfixExpression, IntegerLiteral, PrefixExpression,
    StringLiteral,
};
