pub mod error;
pub mod formatter;

use crate::environment::SharedEnvironment;
use crate::parser::{expression::Identifier, statement::BlockStatement};
use compact_str::CompactString;
use error::RuntimeError;
use std::fmt::Display;
use std::rc::Rc;

pub const TRUE: Object = Object::Boolean(true);
pub const FALSE: Object = Object::Boolean(false);
pub const NULL: Object = Object::Null;

pub trait NativeFunction: std::fmt::Debug {
    fn get_name(&self) -> &'static str;
    fn call(&self, arguments: &[Object]) -> Result<Object, RuntimeError>;
}

/// A user defined function together with the environment it was defined in.
#[derive(Clone)]
pub struct Function {
    pub parameters: Rc<[Identifier]>,
    pub body: Rc<BlockStatement>,
    pub closure: SharedEnvironment,
}

// The closure is left out: it usually holds the function itself.
impl std::fmt::Debug for Function {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Function")
            .field("parameters", &self.parameters)
            .field("body", &self.body)
            .finish_non_exhaustive()
    }
}

impl Display for Function {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "fn(")?;
        for (index, parameter) in self.parameters.iter().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{parameter}")?;
        }
        write!(f, ") {}", self.body)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Integer,
    Boolean,
    String,
    Array,
    Null,
    ReturnValue,
    Error,
    Function,
    BuiltIn,
}

impl Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tag = match self {
            ObjectKind::Integer => "INTEGER",
            ObjectKind::Boolean => "BOOLEAN",
            ObjectKind::String => "STRING",
            ObjectKind::Array => "ARRAY",
            ObjectKind::Null => "NULL",
            ObjectKind::ReturnValue => "RETURN_VALUE",
            ObjectKind::Error => "ERROR",
            ObjectKind::Function => "FUNCTION",
            ObjectKind::BuiltIn => "BUILTIN",
        };
        write!(f, "{tag}")
    }
}

#[derive(Debug, Clone)]
pub enum Object {
    Integer(i64),
    Boolean(bool),
    String(CompactString),
    Array(Rc<[Object]>),
    Null,
    /// Carries a `return` value up to the nearest function call.
    ReturnValue(Box<Object>),
    Error(RuntimeError),
    Function(Rc<Function>),
    BuiltIn(&'static dyn NativeFunction),
}

impl Object {
    pub fn from_bool(value: bool) -> Self {
        if value {
            TRUE
        } else {
            FALSE
        }
    }

    pub fn kind(&self) -> ObjectKind {
        match self {
            Object::Integer(_) => ObjectKind::Integer,
            Object::Boolean(_) => ObjectKind::Boolean,
            Object::String(_) => ObjectKind::String,
            Object::Array(_) => ObjectKind::Array,
            Object::Null => ObjectKind::Null,
            Object::ReturnValue(_) => ObjectKind::ReturnValue,
            Object::Error(_) => ObjectKind::Error,
            Object::Function(_) => ObjectKind::Function,
            Object::BuiltIn(_) => ObjectKind::BuiltIn,
        }
    }

    /// Human readable rendering of the value.
    pub fn inspect(&self) -> String {
        self.to_string()
    }

    pub fn is_truthy(&self) -> bool {
        !matches!(self, Object::Null | Object::Boolean(false))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Object::Error(_))
    }

    /// Identity comparison used by `==` on values without structural equality.
    pub fn is_same(&self, other: &Object) -> bool {
        match (self, other) {
            (Object::Null, Object::Null) => true,
            (Object::Boolean(lhs), Object::Boolean(rhs)) => lhs == rhs,
            (Object::Array(lhs), Object::Array(rhs)) => Rc::ptr_eq(lhs, rhs),
            (Object::Function(lhs), Object::Function(rhs)) => Rc::ptr_eq(lhs, rhs),
            (Object::BuiltIn(lhs), Object::BuiltIn(rhs)) => lhs.get_name() == rhs.get_name(),
            _ => false,
        }
    }
}

impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Object::Integer(lhs), Object::Integer(rhs)) => lhs == rhs,
            (Object::String(lhs), Object::String(rhs)) => lhs == rhs,
            (Object::Array(lhs), Object::Array(rhs)) => lhs == rhs,
            (Object::ReturnValue(lhs), Object::ReturnValue(rhs)) => lhs == rhs,
            (Object::Error(lhs), Object::Error(rhs)) => lhs == rhs,
            (lhs, rhs) => lhs.is_same(rhs),
        }
    }
}

impl Display for Object {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Object::Integer(v) => write!(f, "{v}"),
            Object::Boolean(v) => write!(f, "{v}"),
            Object::String(v) => write!(f, "{v}"),
            Object::Array(elements) => {
                write!(f, "[")?;
                for (index, element) in elements.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{element}")?;
                }
                write!(f, "]")
            }
            Object::Null => write!(f, "null"),
            Object::ReturnValue(inner) => write!(f, "{inner}"),
            Object::Error(error) => write!(f, "ERROR: {error}"),
            Object::Function(function) => write!(f, "{function}"),
            Object::BuiltIn(function) => write!(f, "builtin function {}", function.get_name()),
        }
    }
}

impl From<RuntimeError> for Object {
    fn from(error: RuntimeError) -> Self {
        Object::Error(error)
    }
}
