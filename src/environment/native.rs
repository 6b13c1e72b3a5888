use crate::value::{error::RuntimeError, NativeFunction, Object, NULL};
use compact_str::CompactString;
use std::collections::HashMap;

fn expect_arguments(arguments: &[Object], expected: usize) -> Result<(), RuntimeError> {
    if arguments.len() != expected {
        return Err(RuntimeError::InvalidArgumentCount {
            expected,
            actual: arguments.len(),
        });
    }
    Ok(())
}

/// Strings are indexed by byte; a lone byte of a multi-byte character becomes U+FFFD.
fn byte_to_string(byte: Option<&u8>) -> Object {
    match byte {
        Some(byte) => Object::String(CompactString::from_utf8_lossy(&[*byte])),
        None => NULL,
    }
}

#[derive(Debug)]
pub struct NativeLen;

impl NativeFunction for NativeLen {
    fn get_name(&self) -> &'static str {
        "len"
    }

    fn call(&self, arguments: &[Object]) -> Result<Object, RuntimeError> {
        expect_arguments(arguments, 1)?;
        match &arguments[0] {
            Object::String(value) => Ok(Object::Integer(value.len() as i64)),
            Object::Array(elements) => Ok(Object::Integer(elements.len() as i64)),
            other => Err(RuntimeError::UnsupportedArgument {
                name: self.get_name(),
                actual: other.kind(),
            }),
        }
    }
}

#[derive(Debug)]
pub struct NativeFirst;

impl NativeFunction for NativeFirst {
    fn get_name(&self) -> &'static str {
        "first"
    }

    fn call(&self, arguments: &[Object]) -> Result<Object, RuntimeError> {
        expect_arguments(arguments, 1)?;
        match &arguments[0] {
            Object::String(value) => Ok(byte_to_string(value.as_bytes().first())),
            Object::Array(elements) => Ok(elements.first().cloned().unwrap_or(NULL)),
            other => Err(RuntimeError::UnsupportedArgument {
                name: self.get_name(),
                actual: other.kind(),
            }),
        }
    }
}

#[derive(Debug)]
pub struct NativeLast;

impl NativeFunction for NativeLast {
    fn get_name(&self) -> &'static str {
        "last"
    }

    fn call(&self, arguments: &[Object]) -> Result<Object, RuntimeError> {
        expect_arguments(arguments, 1)?;
        match &arguments[0] {
            Object::String(value) => Ok(byte_to_string(value.as_bytes().last())),
            Object::Array(elements) => Ok(elements.last().cloned().unwrap_or(NULL)),
            other => Err(RuntimeError::UnsupportedArgument {
                name: self.get_name(),
                actual: other.kind(),
            }),
        }
    }
}

/// Appends to a copy of the array; the argument itself is left untouched.
#[derive(Debug)]
pub struct NativePush;

impl NativeFunction for NativePush {
    fn get_name(&self) -> &'static str {
        "push"
    }

    fn call(&self, arguments: &[Object]) -> Result<Object, RuntimeError> {
        expect_arguments(arguments, 2)?;
        match &arguments[0] {
            Object::Array(elements) => {
                let mut pushed = Vec::with_capacity(elements.len() + 1);
                pushed.extend(elements.iter().cloned());
                pushed.push(arguments[1].clone());
                Ok(Object::Array(pushed.into()))
            }
            other => Err(RuntimeError::UnsupportedArgument {
                name: self.get_name(),
                actual: other.kind(),
            }),
        }
    }
}

/// Read-only table of the built-in functions, consulted when a name is not
/// bound in any scope.
#[derive(Debug)]
pub struct Builtins {
    functions: HashMap<&'static str, &'static dyn NativeFunction>,
}

impl Builtins {
    pub fn new() -> Self {
        let mut functions: HashMap<&'static str, &'static dyn NativeFunction> = HashMap::new();

        // Inject native functions here
        for function in [
            &NativeLen as &'static dyn NativeFunction,
            &NativeFirst,
            &NativeLast,
            &NativePush,
        ] {
            functions.insert(function.get_name(), function);
        }

        Self { functions }
    }

    pub fn get(&self, name: &str) -> Option<Object> {
        self.functions.get(name).map(|function| Object::BuiltIn(*function))
    }
}

impl Default for Builtins {
    fn default() -> Self {
        Self::new()
    }
}
