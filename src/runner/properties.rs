//! Property store
//!
//! Properties are string values keyed by case-sensitive name. The first
//! write wins unless the writer asks to overwrite, which is what lets
//! command-line values take precedence over `<property>` declarations.

use crate::error::{ExpressionError, ExpressionResult};
use crate::runner::functions::FunctionRegistry;
use crate::runner::interpolate;
use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;

/// A stored property value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    /// Expanded value, or the unexpanded text for dynamic properties
    pub value: String,
    pub read_only: bool,
    /// Re-expanded on every read
    pub dynamic: bool,
}

#[derive(Debug, Clone)]
pub struct PropertyStore {
    entries: HashMap<String, Property>,
    functions: Arc<FunctionRegistry>,
    /// Dynamic properties currently being expanded, for cycle detection
    resolving: RefCell<Vec<String>>,
}

impl PropertyStore {
    /// An empty store using the built-in function library
    pub fn new() -> Self {
        Self::with_functions(Arc::new(FunctionRegistry::with_builtins()))
    }

    pub fn with_functions(functions: Arc<FunctionRegistry>) -> Self {
        PropertyStore {
            entries: HashMap::new(),
            functions,
            resolving: RefCell::new(Vec::new()),
        }
    }

    pub fn functions(&self) -> &FunctionRegistry {
        &self.functions
    }

    pub fn set_functions(&mut self, functions: Arc<FunctionRegistry>) {
        self.functions = functions;
    }

    /// Get a property value, expanding dynamic properties
    pub fn get(&self, name: &str) -> ExpressionResult<Option<String>> {
        let Some(property) = self.entries.get(name) else {
            return Ok(None);
        };
        if !property.dynamic {
            return Ok(Some(property.value.clone()));
        }

        {
            let mut resolving = self.resolving.borrow_mut();
            if let Some(pos) = resolving.iter().position(|n| n == name) {
                let mut cycle = resolving[pos..].to_vec();
                cycle.push(name.to_string());
                return Err(ExpressionError::CircularReference { cycle });
            }
            resolving.push(name.to_string());
        }

        let result = self.expand(&property.value);
        self.resolving.borrow_mut().pop();
        result.map(Some)
    }

    /// The stored entry, without expansion
    pub fn get_raw(&self, name: &str) -> Option<&Property> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn is_read_only(&self, name: &str) -> bool {
        self.entries.get(name).map_or(false, |p| p.read_only)
    }

    pub fn is_dynamic(&self, name: &str) -> bool {
        self.entries.get(name).map_or(false, |p| p.dynamic)
    }

    /// Set a property value. Without `overwrite` an existing value is kept.
    /// Returns whether the store changed.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>, overwrite: bool) -> bool {
        self.insert(name.into(), value.into(), overwrite, false, false)
    }

    /// Set a value that later non-overwriting writes leave alone
    pub fn set_read_only(&mut self, name: impl Into<String>, value: impl Into<String>) -> bool {
        self.insert(name.into(), value.into(), false, true, false)
    }

    /// Store unexpanded text that is expanded on every read
    pub fn set_dynamic(&mut self, name: impl Into<String>, text: impl Into<String>, overwrite: bool) -> bool {
        self.insert(name.into(), text.into(), overwrite, false, true)
    }

    fn insert(&mut self, name: String, value: String, overwrite: bool, read_only: bool, dynamic: bool) -> bool {
        match self.entries.get_mut(&name) {
            Some(existing) => {
                if !overwrite {
                    tracing::trace!(property = %name, "keeping existing value");
                    return false;
                }
                existing.value = value;
                existing.dynamic = dynamic;
                existing.read_only |= read_only;
                true
            }
            None => {
                self.entries.insert(
                    name,
                    Property {
                        value,
                        read_only,
                        dynamic,
                    },
                );
                true
            }
        }
    }

    /// Flag an existing property read-only. Returns false for unknown names.
    pub fn mark_read_only(&mut self, name: &str) -> bool {
        match self.entries.get_mut(name) {
            Some(property) => {
                property.read_only = true;
                true
            }
            None => false,
        }
    }

    /// Remove a property; read-only properties stay
    pub fn remove(&mut self, name: &str) -> bool {
        if self.is_read_only(name) {
            return false;
        }
        self.entries.remove(name).is_some()
    }

    /// Expand every `${...}` region in `text`
    pub fn expand(&self, text: &str) -> ExpressionResult<String> {
        interpolate(text, self)
    }

    /// Property names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for PropertyStore {
    fn default() -> Self {
        Self::new()
    }
}
