//! Attribute validators

use super::convert::AttributeValue;
use crate::error::ValidationError;
use regex::Regex;

/// A check applied to a converted attribute value before it is assigned
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validator {
    /// Text must contain something besides whitespace
    NonEmpty,
    /// The whole text must match the regular expression
    Pattern(&'static str),
    /// Inclusive integer range
    Range { min: i64, max: i64 },
}

impl Validator {
    pub fn check(&self, value: &AttributeValue) -> Result<(), ValidationError> {
        match self {
            Validator::NonEmpty => {
                if value.to_string().trim().is_empty() {
                    return Err(ValidationError::Empty);
                }
                Ok(())
            }
            Validator::Pattern(pattern) => {
                let text = value.to_string();
                let matches = anchored(pattern)
                    .map(|re| re.is_match(&text))
                    .unwrap_or(false);
                if matches {
                    Ok(())
                } else {
                    Err(ValidationError::Pattern {
                        value: text,
                        pattern: pattern.to_string(),
                    })
                }
            }
            Validator::Range { min, max } => {
                let n = match value {
                    AttributeValue::Int(n) => *n,
                    AttributeValue::Double(d) => d.round() as i64,
                    _ => return Ok(()),
                };
                if n < *min || n > *max {
                    return Err(ValidationError::Range {
                        value: n,
                        min: *min,
                        max: *max,
                    });
                }
                Ok(())
            }
        }
    }

    /// Check the validator itself is well formed
    pub fn verify(&self) -> Result<(), String> {
        match self {
            Validator::Pattern(pattern) => anchored(pattern)
                .map(|_| ())
                .map_err(|e| format!("invalid pattern '{}': {}", pattern, e)),
            Validator::Range { min, max } if min > max => {
                Err(format!("empty range {}..={}", min, max))
            }
            _ => Ok(()),
        }
    }
}

fn anchored(pattern: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!("^(?:{})$", pattern))
}
