use super::Node;
use crate::environment::{Builtins, SharedEnvironment};
use crate::parser::{
    expression::{Expression, InfixOperator, PrefixOperator},
    program::Program,
    statement::{BlockStatement, Statement},
};
use crate::value::{error::RuntimeError, Function, Object, NULL, TRUE};
use compact_str::CompactStringExt;
use std::rc::Rc;

/// Why evaluation of the current construct stopped early.
///
/// A `return` travels on the same channel as runtime errors so that `?` stops
/// every enclosing expression, block and argument list up to the nearest
/// function call, where [`Unwind::Return`] is caught.
#[derive(Debug)]
enum Unwind {
    Return(Object),
    Error(RuntimeError),
}

impl From<RuntimeError> for Unwind {
    fn from(error: RuntimeError) -> Self {
        Unwind::Error(error)
    }
}

/// Recursive evaluator over the syntax tree.
///
/// Early exits travel as `Err` inside the evaluator. The public entry points
/// turn a runtime error back into [`Object::Error`].
#[derive(Debug, Default)]
pub struct TreeWalkInterpreter {
    builtins: Builtins,
}

impl TreeWalkInterpreter {
    pub fn new() -> Self {
        Self::with_builtins(Builtins::new())
    }

    pub fn with_builtins(builtins: Builtins) -> Self {
        Self { builtins }
    }

    /// Evaluates any node. A `return` that escapes a statement or expression
    /// evaluated on its own is handed back as [`Object::ReturnValue`].
    pub fn eval<'a>(&self, node: impl Into<Node<'a>>, environment: &mut SharedEnvironment) -> Object {
        let result = match node.into() {
            Node::Program(program) => return self.eval_program(program, environment).unwrap_or(NULL),
            Node::Statement(statement) => self.interpret_statement(statement, environment),
            Node::Expression(expr) => self.evaluate(expr, environment),
        };
        match result {
            Ok(value) => value,
            Err(Unwind::Return(value)) => Object::ReturnValue(Box::new(value)),
            Err(Unwind::Error(error)) => Self::surface(error),
        }
    }

    /// Evaluates a whole program. Yields `None` when the program produced no
    /// value: it is empty or its last executed statement is a `let`.
    pub fn eval_program(
        &self,
        program: &Program,
        environment: &mut SharedEnvironment,
    ) -> Option<Object> {
        match self.interpret_program(program, environment) {
            Ok(value) => value,
            Err(Unwind::Return(value)) => Some(value),
            Err(Unwind::Error(error)) => Some(Self::surface(error)),
        }
    }

    fn surface(error: RuntimeError) -> Object {
        tracing::debug!(%error, code = error.code(), "evaluation failed");
        Object::Error(error)
    }
}

// Statement interpreter
impl TreeWalkInterpreter {
    fn interpret_program(
        &self,
        program: &Program,
        environment: &mut SharedEnvironment,
    ) -> Result<Option<Object>, Unwind> {
        let mut result = None;
        for statement in program.iter() {
            let value = self.interpret_statement(statement, environment)?;
            result = match statement {
                Statement::Let(_) => None,
                _ => Some(value),
            };
        }
        Ok(result)
    }

    /// Runs the statements of a block in the current scope.
    fn interpret_block(
        &self,
        block: &BlockStatement,
        environment: &mut SharedEnvironment,
    ) -> Result<Object, Unwind> {
        let mut result = NULL;
        for statement in block.statements.iter() {
            result = self.interpret_statement(statement, environment)?;
        }
        Ok(result)
    }

    fn interpret_statement(
        &self,
        statement: &Statement,
        environment: &mut SharedEnvironment,
    ) -> Result<Object, Unwind> {
        match statement {
            Statement::Let(stmt) => {
                let value = self.evaluate(&stmt.value, environment)?;
                environment.declare(&stmt.name.name, value);
                Ok(NULL)
            }
            Statement::Return(stmt) => {
                let value = self.evaluate(&stmt.value, environment)?;
                Err(Unwind::Return(value))
            }
            Statement::Expression(stmt) => self.evaluate(&stmt.expression, environment),
            Statement::Block(block) => self.interpret_block(block, environment),
        }
    }
}

// Expression evaluator
impl TreeWalkInterpreter {
    fn evaluate(
        &self,
        expr: &Expression,
        environment: &mut SharedEnvironment,
    ) -> Result<Object, Unwind> {
        match expr {
            Expression::Identifier(ident) => environment
                .access(&ident.name)
                .or_else(|| self.builtins.get(&ident.name))
                .ok_or_else(|| RuntimeError::UnknownIdentifier(ident.name.clone()).into()),
            Expression::Integer(literal) => Ok(Object::Integer(literal.value)),
            Expression::Boolean(literal) => Ok(Object::from_bool(literal.value)),
            Expression::String(literal) => Ok(Object::String(literal.value.clone())),
            Expression::Array(literal) => {
                let elements = self.evaluate_all(&literal.elements, environment)?;
                Ok(Object::Array(elements.into()))
            }
            Expression::Prefix(expr) => {
                let right = self.evaluate(&expr.right, environment)?;
                Ok(Self::evaluate_prefix(expr.operator, right)?)
            }
            Expression::Infix(expr) => {
                let left = self.evaluate(&expr.left, environment)?;
                let right = self.evaluate(&expr.right, environment)?;
                Ok(Self::evaluate_infix(expr.operator, &left, &right)?)
            }
            Expression::If(expr) => {
                if self.evaluate(&expr.condition, environment)?.is_truthy() {
                    self.interpret_block(&expr.consequence, environment)
                } else if let Some(ref alternative) = expr.alternative {
                    self.interpret_block(alternative, environment)
                } else {
                    Ok(NULL)
                }
            }
            Expression::Function(literal) => Ok(Object::Function(Rc::new(Function {
                parameters: literal.parameters.clone(),
                body: literal.body.clone(),
                closure: environment.clone(),
            }))),
            Expression::Call(expr) => {
                let callee = self.evaluate(&expr.function, environment)?;
                let arguments = self.evaluate_all(&expr.arguments, environment)?;
                self.apply_function(callee, arguments)
            }
            Expression::Index(expr) => {
                let left = self.evaluate(&expr.left, environment)?;
                let index = self.evaluate(&expr.index, environment)?;
                Ok(Self::evaluate_index(&left, &index)?)
            }
        }
    }

    /// Evaluates left to right, stopping at the first error.
    fn evaluate_all(
        &self,
        exprs: &[Expression],
        environment: &mut SharedEnvironment,
    ) -> Result<Vec<Object>, Unwind> {
        exprs
            .iter()
            .map(|expr| self.evaluate(expr, environment))
            .collect()
    }

    fn apply_function(&self, callee: Object, arguments: Vec<Object>) -> Result<Object, Unwind> {
        tracing::trace!(callee = %callee.kind(), arguments = arguments.len(), "applying function");
        match callee {
            Object::Function(function) => {
                if function.parameters.len() != arguments.len() {
                    return Err(RuntimeError::InvalidArgumentCount {
                        expected: function.parameters.len(),
                        actual: arguments.len(),
                    }
                    .into());
                }

                let mut environment = function.closure.new_scope();
                for (parameter, argument) in function.parameters.iter().zip(arguments) {
                    environment.declare(&parameter.name, argument);
                }

                match self.interpret_block(&function.body, &mut environment) {
                    Err(Unwind::Return(value)) => Ok(value),
                    result => result,
                }
            }
            Object::BuiltIn(native) => Ok(native.call(&arguments)?),
            other => Err(RuntimeError::NotCallable(other.kind()).into()),
        }
    }

    fn evaluate_prefix(operator: PrefixOperator, right: Object) -> Result<Object, RuntimeError> {
        match (operator, right) {
            (PrefixOperator::Bang, right) => Ok(Object::from_bool(!right.is_truthy())),
            (PrefixOperator::Minus, Object::Integer(value)) => {
                Ok(Object::Integer(value.wrapping_neg()))
            }
            (PrefixOperator::Minus, right) => Err(RuntimeError::UnknownPrefixOperator {
                operator,
                operand: right.kind(),
            }),
        }
    }

    fn evaluate_infix(
        operator: InfixOperator,
        left: &Object,
        right: &Object,
    ) -> Result<Object, RuntimeError> {
        match (operator, left, right) {
            (InfixOperator::And, left, right) => {
                Ok(Object::from_bool(left.is_truthy() && right.is_truthy()))
            }
            (InfixOperator::Or, left, right) => {
                Ok(Object::from_bool(left.is_truthy() || right.is_truthy()))
            }
            (operator, Object::Integer(lhs), Object::Integer(rhs)) => {
                Self::evaluate_integer_infix(operator, *lhs, *rhs)
            }
            (InfixOperator::Add, Object::String(lhs), Object::String(rhs)) => {
                Ok(Object::String([lhs, rhs].concat_compact()))
            }
            (operator, left, right) if left.kind() != right.kind() => {
                Err(RuntimeError::TypeMismatch {
                    left: left.kind(),
                    operator,
                    right: right.kind(),
                })
            }
            (InfixOperator::EqualEqual, left, right) if !matches!(left, Object::String(_)) => {
                Ok(Object::from_bool(left.is_same(right)))
            }
            (InfixOperator::BangEqual, left, right) if !matches!(left, Object::String(_)) => {
                Ok(Object::from_bool(!left.is_same(right)))
            }
            (operator, left, right) => Err(RuntimeError::UnknownInfixOperator {
                left: left.kind(),
                operator,
                right: right.kind(),
            }),
        }
    }

    fn evaluate_integer_infix(
        operator: InfixOperator,
        lhs: i64,
        rhs: i64,
    ) -> Result<Object, RuntimeError> {
        let value = match operator {
            InfixOperator::Add => Object::Integer(lhs.wrapping_add(rhs)),
            InfixOperator::Subtract => Object::Integer(lhs.wrapping_sub(rhs)),
            InfixOperator::Multiply => Object::Integer(lhs.wrapping_mul(rhs)),
            InfixOperator::Divide => {
                if rhs == 0 {
                    return Err(RuntimeError::DivisionByZero(lhs));
                }
                Object::Integer(lhs.wrapping_div(rhs))
            }
            InfixOperator::LessThan => Object::from_bool(lhs < rhs),
            InfixOperator::LessThanEqual => Object::from_bool(lhs <= rhs),
            InfixOperator::GreaterThan => Object::from_bool(lhs > rhs),
            InfixOperator::GreaterThanEqual => Object::from_bool(lhs >= rhs),
            InfixOperator::EqualEqual => Object::from_bool(lhs == rhs),
            InfixOperator::BangEqual => Object::from_bool(lhs != rhs),
            // Integers are always truthy
            InfixOperator::And | InfixOperator::Or => TRUE,
        };
        Ok(value)
    }

    /// Out of range indices yield `null`.
    fn evaluate_index(left: &Object, index: &Object) -> Result<Object, RuntimeError> {
        match (left, index) {
            (Object::Array(elements), Object::Integer(index)) => Ok(usize::try_from(*index)
                .ok()
                .and_then(|index| elements.get(index))
                .cloned()
                .unwrap_or(NULL)),
            (left, index) => Err(RuntimeError::UnknownIndexOperator {
                left: left.kind(),
                index: index.kind(),
            }),
        }
    }
}
