//! if/unless gating
//!
//! Targets and elements may carry `if` and `unless` attributes. Each is
//! expanded and read as a boolean; the element is enabled when `if` is true
//! (or absent) and `unless` is false (or absent).

use crate::config::Location;
use crate::error::{BindingError, BindingResult, ValidationError};
use crate::runner::expr::parse_bool;
use crate::runner::PropertyStore;

pub const IF_ATTRIBUTE: &str = "if";
pub const UNLESS_ATTRIBUTE: &str = "unless";

/// Evaluate an if/unless pair for an element
pub fn is_enabled(
    if_condition: Option<&str>,
    unless_condition: Option<&str>,
    element: &str,
    location: &Location,
    properties: &PropertyStore,
) -> BindingResult<bool> {
    if let Some(text) = if_condition {
        if !evaluate_flag(IF_ATTRIBUTE, text, element, location, properties)? {
            return Ok(false);
        }
    }

    if let Some(text) = unless_condition {
        if evaluate_flag(UNLESS_ATTRIBUTE, text, element, location, properties)? {
            return Ok(false);
        }
    }

    Ok(true)
}

/// Expand a boolean attribute and parse the result
pub fn evaluate_flag(
    attribute: &str,
    text: &str,
    element: &str,
    location: &Location,
    properties: &PropertyStore,
) -> BindingResult<bool> {
    let expanded = properties
        .expand(text)
        .map_err(|source| BindingError::Expression {
            attribute: attribute.to_string(),
            element: element.to_string(),
            location: location.clone(),
            source,
        })?;

    parse_bool(&expanded).ok_or_else(|| BindingError::Validation {
        attribute: attribute.to_string(),
        element: element.to_string(),
        location: location.clone(),
        source: ValidationError::Boolean(expanded),
    })
}
