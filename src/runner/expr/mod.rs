//! The `${...}` expression language
//!
//! Expressions are tokenized, parsed into a small tree and evaluated against a
//! property store. Nothing survives a single expansion call.

pub mod eval;
pub mod lexer;
pub mod parser;
pub mod value;

pub use eval::Evaluator;
pub use parser::{parse, Expr};
pub use value::{format_number, parse_bool, ObjectValue, Value};
