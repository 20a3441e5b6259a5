//! Expression functions
//!
//! Functions are grouped in namespaces (`string::to-upper`) and declare a
//! fixed parameter signature. The registry checks arity and coerces
//! arguments before calling the implementation.

pub mod builtins;

use crate::error::{ExpressionError, ExpressionResult};
use crate::runner::expr::Value;
use crate::runner::PropertyStore;
use std::collections::HashMap;
use std::fmt;
use std::ops::Range;
use std::path::PathBuf;

/// Parameter and return types of a function signature
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    String,
    Number,
    Bool,
    Any,
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ParamType::String => "string",
            ParamType::Number => "number",
            ParamType::Bool => "bool",
            ParamType::Any => "value",
        };
        f.write_str(name)
    }
}

/// An evaluated call argument with the source text it came from
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionArgument {
    /// 1-based position
    pub index: usize,
    pub value: Value,
    pub source: String,
    pub span: Range<usize>,
}

/// What a function can see while it runs
pub struct FunctionContext<'a> {
    pub properties: &'a PropertyStore,
}

impl<'a> FunctionContext<'a> {
    pub fn new(properties: &'a PropertyStore) -> Self {
        FunctionContext { properties }
    }

    /// Project base directory, from the `project.basedir` property
    pub fn base_dir(&self) -> PathBuf {
        self.properties
            .get("project.basedir")
            .ok()
            .flatten()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

/// Why a function call failed
#[derive(Debug, Clone, PartialEq)]
pub enum CallError {
    /// Reported by the function itself, e.g. an unparsable argument
    Failed(String),
    /// Raised while the function read a property; passed on unchanged
    Expression(ExpressionError),
}

impl From<String> for CallError {
    fn from(message: String) -> Self {
        CallError::Failed(message)
    }
}

impl From<ExpressionError> for CallError {
    fn from(error: ExpressionError) -> Self {
        CallError::Expression(error)
    }
}

pub type FunctionResult = Result<Value, CallError>;

/// Function implementation; receives arguments already coerced to the signature
pub type FunctionImpl = fn(&FunctionContext<'_>, &[Value]) -> FunctionResult;

/// A single named function
#[derive(Clone)]
pub struct FunctionDef {
    pub name: &'static str,
    pub params: Vec<ParamType>,
    pub returns: ParamType,
    pub call: FunctionImpl,
}

impl FunctionDef {
    pub fn new(
        name: &'static str,
        params: &[ParamType],
        returns: ParamType,
        call: FunctionImpl,
    ) -> Self {
        FunctionDef {
            name,
            params: params.to_vec(),
            returns,
            call,
        }
    }
}

impl fmt::Debug for FunctionDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionDef")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("returns", &self.returns)
            .finish()
    }
}

/// Functions sharing a namespace prefix
#[derive(Debug, Clone)]
pub struct FunctionSet {
    pub namespace: &'static str,
    pub functions: Vec<FunctionDef>,
}

impl FunctionSet {
    pub fn new(namespace: &'static str) -> Self {
        FunctionSet {
            namespace,
            functions: Vec::new(),
        }
    }

    pub fn function(
        mut self,
        name: &'static str,
        params: &[ParamType],
        returns: ParamType,
        call: FunctionImpl,
    ) -> Self {
        self.functions
            .push(FunctionDef::new(name, params, returns, call));
        self
    }

    /// Fully qualified names, `namespace::name`
    pub fn qualified_names(&self) -> impl Iterator<Item = String> + '_ {
        self.functions
            .iter()
            .map(move |f| format!("{}::{}", self.namespace, f.name))
    }
}

/// Lookup table of functions by qualified name
#[derive(Clone, Default)]
pub struct FunctionRegistry {
    functions: HashMap<String, FunctionDef>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in function library
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for set in builtins::function_sets() {
            registry.register_set(set);
        }
        registry
    }

    /// Add every function of a set; later registrations replace earlier ones
    pub fn register_set(&mut self, set: FunctionSet) {
        for def in set.functions {
            self.functions
                .insert(format!("{}::{}", set.namespace, def.name), def);
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&FunctionDef> {
        self.functions.get(name)
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Sorted qualified names
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.functions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Check arity, coerce arguments and invoke a function
    pub fn call(
        &self,
        name: &str,
        ctx: &FunctionContext<'_>,
        args: &[FunctionArgument],
    ) -> ExpressionResult<Value> {
        let def = self
            .functions
            .get(name)
            .ok_or_else(|| ExpressionError::UnknownFunction(name.to_string()))?;

        if args.len() != def.params.len() {
            let index = if args.len() > def.params.len() {
                def.params.len() + 1
            } else {
                args.len() + 1
            };
            return Err(ExpressionError::FunctionArgument {
                function: name.to_string(),
                index,
                message: format!(
                    "expected {} argument(s), got {}",
                    def.params.len(),
                    args.len()
                ),
            });
        }

        let mut values = Vec::with_capacity(args.len());
        for (arg, param) in args.iter().zip(&def.params) {
            values.push(coerce(name, arg, *param)?);
        }

        (def.call)(ctx, &values).map_err(|error| match error {
            CallError::Failed(message) => ExpressionError::FunctionFailed {
                function: name.to_string(),
                message,
            },
            CallError::Expression(error) => error,
        })
    }
}

impl fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionRegistry")
            .field("functions", &self.names())
            .finish()
    }
}

fn coerce(function: &str, arg: &FunctionArgument, param: ParamType) -> ExpressionResult<Value> {
    let converted = match param {
        ParamType::Any => Some(arg.value.clone()),
        ParamType::String => match &arg.value {
            Value::Str(_) => Some(arg.value.clone()),
            other => Some(Value::Str(other.to_string())),
        },
        ParamType::Number => arg.value.to_number().map(Value::Number),
        ParamType::Bool => arg.value.to_bool().map(Value::Bool),
    };

    converted.ok_or_else(|| ExpressionError::FunctionArgument {
        function: function.to_string(),
        index: arg.index,
        message: format!(
            "expected {} but `{}` is {} '{}'",
            param,
            arg.source,
            arg.value.type_name(),
            arg.value
        ),
    })
}
