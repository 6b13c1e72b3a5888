mod native;

use crate::value::Object;
use compact_str::{CompactString, ToCompactString};
pub use native::{Builtins, NativeFirst, NativeLast, NativeLen, NativePush};
use std::{cell::RefCell, collections::HashMap, rc::Rc};

/// A variable scope shared between every closure that captured it.
///
/// Cloning is cheap and yields another handle to the same scope, so a binding
/// declared through one handle is visible through all of them.
#[derive(Clone, Default)]
pub struct SharedEnvironment {
    inner: Rc<RefCell<Environment>>,
}

#[derive(Default)]
struct Environment {
    values: HashMap<CompactString, Object>,
    parent: Option<SharedEnvironment>,
}

impl SharedEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a child scope whose failed lookups fall through to `self`.
    pub fn new_scope(&self) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Environment {
                values: HashMap::new(),
                parent: Some(self.clone()),
            })),
        }
    }

    pub fn access(&self, name: &str) -> Option<Object> {
        let inner = self.inner.borrow();
        match inner.values.get(name) {
            Some(value) => Some(value.clone()),
            None => inner.parent.as_ref()?.access(name),
        }
    }

    /// Binds `name` in this scope, shadowing any binding in a parent scope.
    pub fn declare(&mut self, name: &str, value: Object) {
        self.inner
            .borrow_mut()
            .values
            .insert(name.to_compact_string(), value);
    }
}

// Bindings may refer back to this scope through closures, so only names are shown.
impl std::fmt::Debug for SharedEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        let mut names: Vec<&CompactString> = inner.values.keys().collect();
        names.sort();
        f.debug_struct("SharedEnvironment")
            .field("names", &names)
            .field("parent", &inner.parent)
            .finish()
    }
}
