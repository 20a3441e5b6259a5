//! Error types for Antler

use crate::config::Location;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Antler operations
pub type Result<T> = std::result::Result<T, BuildError>;

/// Main error type for a build
#[derive(Error, Debug)]
pub enum BuildError {
    /// Settings and build-file discovery errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Malformed build document
    #[error(transparent)]
    Document(#[from] DocumentError),

    /// Expression parse or evaluation errors outside of any task
    #[error(transparent)]
    Expression(#[from] ExpressionError),

    /// Unknown targets or dependency cycles
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    /// Task or element configuration errors
    #[error(transparent)]
    Binding(#[from] BindingError),

    /// Task execution errors
    #[error(transparent)]
    Execution(#[from] ExecutionError),

    /// Plugin scanning errors
    #[error(transparent)]
    Scan(#[from] ScanError),

    /// A failure inside a target, carrying the target name
    #[error("target '{target}': {source}")]
    InTarget {
        target: String,
        #[source]
        source: Box<BuildError>,
    },

    /// I/O errors
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl BuildError {
    /// Wrap an error with the name of the target it escaped from
    pub fn in_target(target: impl Into<String>, source: BuildError) -> Self {
        BuildError::InTarget {
            target: target.into(),
            source: Box::new(source),
        }
    }

    /// Names of the enclosing targets, outermost first
    pub fn target_chain(&self) -> Vec<&str> {
        let mut chain = Vec::new();
        let mut current = self;
        while let BuildError::InTarget { target, source } = current {
            chain.push(target.as_str());
            current = source;
        }
        chain
    }

    /// The error underneath any target wrappers
    pub fn innermost(&self) -> &BuildError {
        match self {
            BuildError::InTarget { source, .. } => source.innermost(),
            other => other,
        }
    }
}

/// Settings parsing and build-file discovery errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to find build file (searched: {0})")]
    NotFound(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to read settings file '{path}': {error}")]
    Settings { path: PathBuf, error: String },

    #[error("Failed to load environment file '{path}': {error}")]
    EnvFile { path: PathBuf, error: String },

    #[error("Invalid property definition '{0}', expected name=value")]
    InvalidPropertyDefinition(String),
}

/// Structural problems in a build document
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("Failed to read build file '{path}': {error}")]
    Read { path: PathBuf, error: String },

    #[error("Malformed build file{}: {message}", file_suffix(.path))]
    Xml {
        path: Option<PathBuf>,
        message: String,
    },

    #[error("Root element must be <project>, found <{found}> at {location}")]
    NotAProject { found: String, location: Location },

    #[error("Target at {location} has no name")]
    MissingTargetName { location: Location },

    #[error("Duplicate target '{name}' at {location}")]
    DuplicateTarget { name: String, location: Location },

    #[error("Unknown attribute '{attribute}' on <{element}> at {location}")]
    UnknownAttribute {
        attribute: String,
        element: String,
        location: Location,
    },

    #[error("Default target '{0}' is not defined")]
    UnknownDefaultTarget(String),

    #[error("Target '{target}' depends on '{dependency}', which is not defined")]
    UnknownDependency { target: String, dependency: String },
}

fn file_suffix(path: &Option<PathBuf>) -> String {
    match path {
        Some(p) => format!(" '{}'", p.display()),
        None => String::new(),
    }
}

/// Expression parse and evaluation errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExpressionError {
    #[error("Invalid expression '{expression}' at position {position}: {message}")]
    Syntax {
        expression: String,
        position: usize,
        message: String,
    },

    #[error("Property '{0}' has not been set")]
    PropertyNotFound(String),

    #[error("Circular property reference: {}", .cycle.join(" -> "))]
    CircularReference { cycle: Vec<String> },

    #[error("Unknown function '{0}'")]
    UnknownFunction(String),

    #[error("Function '{function}', argument {index}: {message}")]
    FunctionArgument {
        function: String,
        index: usize,
        message: String,
    },

    #[error("Function '{function}' failed: {message}")]
    FunctionFailed { function: String, message: String },

    #[error("Cannot evaluate '{expression}': {message}")]
    Evaluation { expression: String, message: String },
}

/// Target graph resolution errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    #[error("Target '{0}' does not exist in this project")]
    UnknownTarget(String),

    #[error("Target '{target}' depends on '{dependency}', which does not exist")]
    UnknownDependency { target: String, dependency: String },

    #[error("Circular dependency: {}", .path.join(" -> "))]
    CircularDependency { path: Vec<String> },

    #[error("No target specified and the project has no default target")]
    NoTarget,
}

/// Failures raised by attribute validators
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("'{0}' is not a valid boolean")]
    Boolean(String),

    #[error("value must not be empty")]
    Empty,

    #[error("'{value}' does not match pattern '{pattern}'")]
    Pattern { value: String, pattern: String },

    #[error("{value} is outside the range {min}..={max}")]
    Range { value: i64, min: i64, max: i64 },
}

/// Element configuration errors
#[derive(Error, Debug)]
pub enum BindingError {
    #[error("<{element}> at {location} does not support the attribute '{attribute}'")]
    UnknownAttribute {
        attribute: String,
        element: String,
        location: Location,
    },

    #[error("<{element}> at {location} does not support the nested element <{child}>")]
    UnknownElement {
        child: String,
        element: String,
        location: Location,
    },

    #[error("<{element}> at {location} requires the attribute '{attribute}'")]
    RequiredAttributeMissing {
        attribute: String,
        element: String,
        location: Location,
    },

    #[error("<{element}> at {location} requires at least one nested <{child}>")]
    RequiredElementMissing {
        child: String,
        element: String,
        location: Location,
    },

    #[error("Invalid value for '{attribute}' on <{element}> at {location}: {source}")]
    Validation {
        attribute: String,
        element: String,
        location: Location,
        #[source]
        source: ValidationError,
    },

    #[error("'{value}' is not a valid {expected} for '{attribute}' on <{element}> at {location}")]
    TypeMismatch {
        attribute: String,
        element: String,
        expected: String,
        value: String,
        location: Location,
    },

    #[error("Failed to expand '{attribute}' on <{element}> at {location}: {source}")]
    Expression {
        attribute: String,
        element: String,
        location: Location,
        #[source]
        source: ExpressionError,
    },
}

/// Task execution errors
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Unknown task <{name}> at {location}")]
    TaskNotFound { name: String, location: Location },

    #[error("<{task}> failed at {location}: {source:#}")]
    TaskFailed {
        task: String,
        location: Location,
        #[source]
        source: anyhow::Error,
    },

    #[error("Command failed with exit code {0:?}")]
    CommandFailed(Option<i32>),

    #[error("Failed to start '{program}': {error}")]
    Spawn { program: String, error: String },
}

/// Plugin scanning errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    #[error("Extension '{extension}' registers {kind} '{name}' more than once")]
    Duplicate {
        extension: String,
        kind: &'static str,
        name: String,
    },

    #[error("Extension '{extension}' has an invalid {kind} '{name}': {reason}")]
    Invalid {
        extension: String,
        kind: &'static str,
        name: String,
        reason: String,
    },
}

/// Specialized result type for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Specialized result type for document loading
pub type DocumentResult<T> = std::result::Result<T, DocumentError>;

/// Specialized result type for expression evaluation
pub type ExpressionResult<T> = std::result::Result<T, ExpressionError>;

/// Specialized result type for element binding
pub type BindingResult<T> = std::result::Result<T, BindingError>;

/// Specialized result type for execution operations
pub type ExecutionResult<T> = std::result::Result<T, ExecutionError>;
