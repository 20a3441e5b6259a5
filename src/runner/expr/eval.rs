//! Expression evaluation

use super::parser::{parse, BinaryOp, Expr, UnaryOp};
use super::value::Value;
use crate::error::{ExpressionError, ExpressionResult};
use crate::runner::functions::{FunctionArgument, FunctionContext};
use crate::runner::PropertyStore;
use std::cmp::Ordering;

/// Evaluates a single `${...}` body against a property store.
///
/// Holds no state between calls; function lookups go through the registry
/// the store was built with.
pub struct Evaluator<'a> {
    properties: &'a PropertyStore,
    expression: &'a str,
}

impl<'a> Evaluator<'a> {
    pub fn new(properties: &'a PropertyStore, expression: &'a str) -> Self {
        Evaluator {
            properties,
            expression,
        }
    }

    /// Parse and evaluate the expression
    pub fn evaluate(&self) -> ExpressionResult<Value> {
        let expr = parse(self.expression)?;
        self.eval(&expr)
    }

    fn eval(&self, expr: &Expr) -> ExpressionResult<Value> {
        match expr {
            Expr::Literal(value) => Ok(value.clone()),
            Expr::Text(text) => {
                if text.contains("${") {
                    Ok(Value::Str(self.properties.expand(text)?))
                } else {
                    Ok(Value::Str(text.clone()))
                }
            }
            Expr::Property { name, .. } => self
                .properties
                .get(name)?
                .map(Value::Str)
                .ok_or_else(|| ExpressionError::PropertyNotFound(name.clone())),
            Expr::Call { function, args, .. } => {
                let mut evaluated = Vec::with_capacity(args.len());
                for (index, (arg, span)) in args.iter().enumerate() {
                    evaluated.push(FunctionArgument {
                        index: index + 1,
                        value: self.eval(arg)?,
                        source: self.expression[span.clone()].to_string(),
                        span: span.clone(),
                    });
                }
                let ctx = FunctionContext::new(self.properties);
                self.properties
                    .functions()
                    .call(function, &ctx, &evaluated)
            }
            Expr::Unary(UnaryOp::Neg, inner) => {
                let value = self.eval(inner)?;
                let n = self.number(&value, "-")?;
                Ok(Value::Number(-n))
            }
            Expr::Unary(UnaryOp::Not, inner) => {
                let value = self.eval(inner)?;
                Ok(Value::Bool(!self.boolean(&value, "not")?))
            }
            Expr::Binary(BinaryOp::And, left, right) => {
                if !self.boolean(&self.eval(left)?, "and")? {
                    return Ok(Value::Bool(false));
                }
                Ok(Value::Bool(self.boolean(&self.eval(right)?, "and")?))
            }
            Expr::Binary(BinaryOp::Or, left, right) => {
                if self.boolean(&self.eval(left)?, "or")? {
                    return Ok(Value::Bool(true));
                }
                Ok(Value::Bool(self.boolean(&self.eval(right)?, "or")?))
            }
            Expr::Binary(op, left, right) => {
                let l = self.eval(left)?;
                let r = self.eval(right)?;
                self.binary(*op, l, r)
            }
        }
    }

    fn binary(&self, op: BinaryOp, l: Value, r: Value) -> ExpressionResult<Value> {
        match op {
            BinaryOp::Eq => Ok(Value::Bool(self.compare(&l, &r, "==")? == Ordering::Equal)),
            BinaryOp::Ne => Ok(Value::Bool(self.compare(&l, &r, "!=")? != Ordering::Equal)),
            BinaryOp::Lt => Ok(Value::Bool(self.compare(&l, &r, "<")? == Ordering::Less)),
            BinaryOp::Le => Ok(Value::Bool(self.compare(&l, &r, "<=")? != Ordering::Greater)),
            BinaryOp::Gt => Ok(Value::Bool(self.compare(&l, &r, ">")? == Ordering::Greater)),
            BinaryOp::Ge => Ok(Value::Bool(self.compare(&l, &r, ">=")? != Ordering::Less)),
            BinaryOp::Add => match (arithmetic(&l), arithmetic(&r)) {
                (Some(a), Some(b)) => Ok(Value::Number(a + b)),
                _ if matches!(l, Value::Str(_)) || matches!(r, Value::Str(_)) => {
                    Ok(Value::Str(format!("{}{}", l, r)))
                }
                _ => Err(self.mismatch("+", &l, &r)),
            },
            BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => {
                let symbol = match op {
                    BinaryOp::Sub => "-",
                    BinaryOp::Mul => "*",
                    BinaryOp::Div => "/",
                    _ => "%",
                };
                let a = self.number(&l, symbol)?;
                let b = self.number(&r, symbol)?;
                if matches!(op, BinaryOp::Div | BinaryOp::Rem) && b == 0.0 {
                    return Err(self.error("division by zero".to_string()));
                }
                Ok(Value::Number(match op {
                    BinaryOp::Sub => a - b,
                    BinaryOp::Mul => a * b,
                    BinaryOp::Div => a / b,
                    _ => a % b,
                }))
            }
            BinaryOp::And | BinaryOp::Or => unreachable!("logical operators short-circuit"),
        }
    }

    /// Compare two values; a string and a number compare numerically when the
    /// string parses
    fn compare(&self, l: &Value, r: &Value, symbol: &str) -> ExpressionResult<Ordering> {
        let ordering = match (l, r) {
            (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            (Value::Bool(a), Value::Str(_)) => r.to_bool().map(|b| a.cmp(&b)),
            (Value::Str(_), Value::Bool(b)) => l.to_bool().map(|a| a.cmp(b)),
            (Value::Number(_), _) | (_, Value::Number(_)) => match (l.to_number(), r.to_number()) {
                (Some(a), Some(b)) => a.partial_cmp(&b),
                _ => None,
            },
            (Value::Object(_), Value::Object(_)) => {
                if l.type_name() == r.type_name() {
                    Some(l.to_string().cmp(&r.to_string()))
                } else {
                    None
                }
            }
            _ => None,
        };
        ordering.ok_or_else(|| self.mismatch(symbol, l, r))
    }

    fn number(&self, value: &Value, symbol: &str) -> ExpressionResult<f64> {
        value.to_number().ok_or_else(|| {
            self.error(format!(
                "operator '{}' needs a number, got {} '{}'",
                symbol,
                value.type_name(),
                value
            ))
        })
    }

    fn boolean(&self, value: &Value, symbol: &str) -> ExpressionResult<bool> {
        value.to_bool().ok_or_else(|| {
            self.error(format!(
                "operator '{}' needs a bool, got {} '{}'",
                symbol,
                value.type_name(),
                value
            ))
        })
    }

    fn mismatch(&self, symbol: &str, l: &Value, r: &Value) -> ExpressionError {
        self.error(format!(
            "operator '{}' cannot be applied to {} and {}",
            symbol,
            l.type_name(),
            r.type_name()
        ))
    }

    fn error(&self, message: String) -> ExpressionError {
        ExpressionError::Evaluation {
            expression: self.expression.to_string(),
            message,
        }
    }
}

/// Numeric view of a value for `+`; strings count only when they hold a finite number
fn arithmetic(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => Some(*n),
        Value::Str(_) => value.to_number().filter(|n| n.is_finite()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(expression: &str, props: &PropertyStore) -> ExpressionResult<Value> {
        Evaluator::new(props, expression).evaluate()
    }

    fn store() -> PropertyStore {
        let mut props = PropertyStore::new();
        props.set("a", "x", false);
        props.set("count", "3", false);
        props.set("flag", "true", false);
        props
    }

    #[test]
    fn test_property_reference() {
        assert_eq!(eval("a", &store()).unwrap(), Value::str("x"));
    }

    #[test]
    fn test_missing_property() {
        let result = eval("nope", &store());
        assert_eq!(result, Err(ExpressionError::PropertyNotFound("nope".into())));
    }

    #[test]
    fn test_arithmetic_precedence() {
        assert_eq!(eval("1 + 2 * 3", &store()).unwrap(), Value::Number(7.0));
        assert_eq!(eval("(1 + 2) * 3", &store()).unwrap(), Value::Number(9.0));
        assert_eq!(eval("-count + 10", &store()).unwrap(), Value::Number(7.0));
        assert_eq!(eval("7 % 4", &store()).unwrap(), Value::Number(3.0));
    }

    #[test]
    fn test_string_concatenation() {
        assert_eq!(eval("a + '-' + 1", &store()).unwrap(), Value::str("x-1"));
    }

    #[test]
    fn test_numeric_strings_add_as_numbers() {
        assert_eq!(eval("count + 1", &store()).unwrap(), Value::Number(4.0));
        assert_eq!(eval("count + '2.5'", &store()).unwrap(), Value::Number(5.5));
        assert_eq!(eval("count + '-' + 1", &store()).unwrap(), Value::str("3-1"));
        assert_eq!(eval("flag + 1", &store()).unwrap(), Value::str("true1"));
    }

    #[test]
    fn test_numeric_string_comparison() {
        assert_eq!(eval("count == 3", &store()).unwrap(), Value::Bool(true));
        assert_eq!(eval("count > 2.5", &store()).unwrap(), Value::Bool(true));
        assert_eq!(eval("a == 'x'", &store()).unwrap(), Value::Bool(true));
        assert_eq!(eval("a != 'y'", &store()).unwrap(), Value::Bool(true));
    }

    #[test]
    fn test_logical_operators_short_circuit() {
        // the right-hand side would fail with PropertyNotFound if evaluated
        assert_eq!(eval("false and missing", &store()).unwrap(), Value::Bool(false));
        assert_eq!(eval("flag or missing", &store()).unwrap(), Value::Bool(true));
        assert_eq!(eval("not flag", &store()).unwrap(), Value::Bool(false));
    }

    #[test]
    fn test_division_by_zero() {
        assert!(matches!(
            eval("1 / 0", &store()),
            Err(ExpressionError::Evaluation { .. })
        ));
    }

    #[test]
    fn test_type_mismatch() {
        assert!(matches!(
            eval("a * 2", &store()),
            Err(ExpressionError::Evaluation { .. })
        ));
        assert!(matches!(
            eval("a < 2", &store()),
            Err(ExpressionError::Evaluation { .. })
        ));
    }

    #[test]
    fn test_nested_expansion_in_string_literal() {
        assert_eq!(
            eval("string::to-upper('${a}y')", &store()).unwrap(),
            Value::str("XY")
        );
    }

    #[test]
    fn test_function_argument_error_has_index() {
        let result = eval("string::substring(a, 'one', 1)", &store());
        assert!(matches!(
            result,
            Err(ExpressionError::FunctionArgument { index: 2, .. })
        ));
    }

    #[test]
    fn test_unknown_function() {
        assert_eq!(
            eval("nope::nothing()", &store()),
            Err(ExpressionError::UnknownFunction("nope::nothing".into()))
        );
    }
}
