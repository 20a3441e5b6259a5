//! Attribute text conversion
//!
//! Turns expanded attribute text into the value type an attribute declares.

use crate::error::ValidationError;
use crate::runner::expr::parse_bool;
use std::fmt;
use std::path::{Path, PathBuf};

/// Semantic type of a declared attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeKind {
    String,
    Bool,
    Int,
    Double,
    /// Case-insensitive choice, normalized to the declared spelling
    Enum(&'static [&'static str]),
    /// Path resolved against the project base directory
    File,
    /// Path resolved against the project base directory
    Directory,
}

impl AttributeKind {
    /// Name used in type mismatch messages
    pub fn expected(&self) -> String {
        match self {
            AttributeKind::String => "string".to_string(),
            AttributeKind::Bool => "boolean".to_string(),
            AttributeKind::Int => "integer".to_string(),
            AttributeKind::Double => "number".to_string(),
            AttributeKind::Enum(choices) => format!("value (one of {})", choices.join(", ")),
            AttributeKind::File => "file path".to_string(),
            AttributeKind::Directory => "directory path".to_string(),
        }
    }
}

/// A converted attribute value
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Str(String),
    Bool(bool),
    Int(i64),
    Double(f64),
    Path(PathBuf),
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Str(s) => write!(f, "{}", s),
            AttributeValue::Bool(b) => write!(f, "{}", b),
            AttributeValue::Int(n) => write!(f, "{}", n),
            AttributeValue::Double(n) => write!(f, "{}", n),
            AttributeValue::Path(p) => write!(f, "{}", p.display()),
        }
    }
}

/// Why a conversion failed
#[derive(Debug, Clone, PartialEq)]
pub enum ConversionError {
    /// Reported as a validation failure
    Invalid(ValidationError),
    /// Reported as a type mismatch
    Mismatch,
}

/// Convert text to the declared kind
pub fn convert(kind: &AttributeKind, text: &str, base_dir: &Path) -> Result<AttributeValue, ConversionError> {
    match kind {
        AttributeKind::String => Ok(AttributeValue::Str(text.to_string())),
        AttributeKind::Bool => parse_bool(text)
            .map(AttributeValue::Bool)
            .ok_or_else(|| ConversionError::Invalid(ValidationError::Boolean(text.to_string()))),
        AttributeKind::Int => text
            .trim()
            .parse::<i64>()
            .map(AttributeValue::Int)
            .map_err(|_| ConversionError::Mismatch),
        AttributeKind::Double => text
            .trim()
            .parse::<f64>()
            .map(AttributeValue::Double)
            .map_err(|_| ConversionError::Mismatch),
        AttributeKind::Enum(choices) => choices
            .iter()
            .find(|choice| choice.eq_ignore_ascii_case(text.trim()))
            .map(|choice| AttributeValue::Str(choice.to_string()))
            .ok_or(ConversionError::Mismatch),
        AttributeKind::File | AttributeKind::Directory => {
            if text.trim().is_empty() {
                return Err(ConversionError::Invalid(ValidationError::Empty));
            }
            Ok(AttributeValue::Path(base_dir.join(text)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn convert_here(kind: AttributeKind, text: &str) -> Result<AttributeValue, ConversionError> {
        convert(&kind, text, Path::new("/work"))
    }

    #[test]
    fn test_convert_bool_spellings() {
        for text in ["true", "YES", "on", "1"] {
            assert_eq!(convert_here(AttributeKind::Bool, text), Ok(AttributeValue::Bool(true)));
        }
        assert_eq!(convert_here(AttributeKind::Bool, "Off"), Ok(AttributeValue::Bool(false)));
        assert_eq!(
            convert_here(AttributeKind::Bool, "maybe"),
            Err(ConversionError::Invalid(ValidationError::Boolean("maybe".into())))
        );
    }

    #[test]
    fn test_convert_numbers() {
        assert_eq!(convert_here(AttributeKind::Int, " 42 "), Ok(AttributeValue::Int(42)));
        assert_eq!(convert_here(AttributeKind::Int, "4.2"), Err(ConversionError::Mismatch));
        assert_eq!(convert_here(AttributeKind::Double, "4.5"), Ok(AttributeValue::Double(4.5)));
    }

    #[test]
    fn test_convert_enum_normalizes_case() {
        let kind = AttributeKind::Enum(&["Debug", "Info"]);
        assert_eq!(convert_here(kind.clone(), "info"), Ok(AttributeValue::Str("Info".into())));
        assert_eq!(convert_here(kind, "trace"), Err(ConversionError::Mismatch));
    }

    #[test]
    fn test_convert_paths_against_base_dir() {
        assert_eq!(
            convert_here(AttributeKind::File, "out/app.bin"),
            Ok(AttributeValue::Path(PathBuf::from("/work/out/app.bin")))
        );
        assert_eq!(
            convert_here(AttributeKind::Directory, "/abs"),
            Ok(AttributeValue::Path(PathBuf::from("/abs")))
        );
    }

    #[test]
    fn test_expected_names() {
        assert_eq!(AttributeKind::Int.expected(), "integer");
        assert_eq!(
            AttributeKind::Enum(&["a", "b"]).expected(),
            "value (one of a, b)"
        );
    }
}
