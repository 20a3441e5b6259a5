//! Property expansion for strings
//!
//! Finds `${...}` regions in text and replaces each with the value of the
//! expression inside. `$${` produces a literal `${`.

use crate::error::{ExpressionError, ExpressionResult};
use crate::runner::expr::Evaluator;
use crate::runner::PropertyStore;

/// Expand every `${...}` region in `text` against `properties`
pub fn interpolate(text: &str, properties: &PropertyStore) -> ExpressionResult<String> {
    if !text.contains("${") {
        return Ok(text.to_string());
    }

    let mut result = String::with_capacity(text.len());
    let mut rest = text;
    let mut offset = 0;

    while let Some(start) = rest.find('$') {
        result.push_str(&rest[..start]);
        let tail = &rest[start..];

        if tail.starts_with("$${") {
            result.push_str("${");
            rest = &tail[3..];
            offset += start + 3;
        } else if tail.starts_with("${") {
            let body_start = 2;
            let body_len = region_length(&tail[body_start..]).ok_or_else(|| {
                ExpressionError::Syntax {
                    expression: text.to_string(),
                    position: offset + start,
                    message: "unclosed '${'".to_string(),
                }
            })?;
            let body = &tail[body_start..body_start + body_len];
            let value = Evaluator::new(properties, body).evaluate()?;
            result.push_str(&value.to_string());

            let consumed = body_start + body_len + 1;
            rest = &tail[consumed..];
            offset += start + consumed;
        } else {
            result.push('$');
            rest = &tail[1..];
            offset += start + 1;
        }
    }

    result.push_str(rest);
    Ok(result)
}

/// Length of an expression body up to its closing brace, skipping quoted
/// literals and nested braces
fn region_length(body: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut chars = body.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        match quote {
            Some(q) if c == q => {
                // a doubled quote stays inside the literal
                if chars.peek().map(|&(_, next)| next) == Some(q) {
                    chars.next();
                } else {
                    quote = None;
                }
            }
            Some(_) => {}
            None => match c {
                '\'' | '"' => quote = Some(c),
                '{' => depth += 1,
                '}' if depth == 0 => return Some(i),
                '}' => depth -= 1,
                _ => {}
            },
        }
    }
    None
}

/// Expand a list of strings
pub fn interpolate_list(list: &[String], properties: &PropertyStore) -> ExpressionResult<Vec<String>> {
    list.iter().map(|s| interpolate(s, properties)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> PropertyStore {
        let mut props = PropertyStore::new();
        props.set("a", "x", false);
        props.set("b", "y", false);
        props.set("name", "world", false);
        props
    }

    #[test]
    fn test_simple_interpolation() {
        let result = interpolate("Hello, ${name}!", &store()).unwrap();
        assert_eq!(result, "Hello, world!");
    }

    #[test]
    fn test_adjacent_regions() {
        assert_eq!(interpolate("${a}", &store()).unwrap(), "x");
        assert_eq!(interpolate("${a}${b}", &store()).unwrap(), "xy");
    }

    #[test]
    fn test_plain_text_untouched() {
        assert_eq!(interpolate("cost: $5 {ok}", &store()).unwrap(), "cost: $5 {ok}");
    }

    #[test]
    fn test_escaped_region() {
        assert_eq!(interpolate("$${a} is ${a}", &store()).unwrap(), "${a} is x");
    }

    #[test]
    fn test_undefined_property_fails() {
        let result = interpolate("Hello, ${undefined}!", &store());
        assert_eq!(
            result,
            Err(ExpressionError::PropertyNotFound("undefined".to_string()))
        );
    }

    #[test]
    fn test_brace_inside_string_literal() {
        let result = interpolate("${string::length('}}')}", &store()).unwrap();
        assert_eq!(result, "2");
    }

    #[test]
    fn test_nested_region_in_argument() {
        let result = interpolate("${string::to-upper('${a}-${b}')}", &store()).unwrap();
        assert_eq!(result, "X-Y");
    }

    #[test]
    fn test_unclosed_region() {
        let result = interpolate("abc ${a", &store());
        assert!(matches!(
            result,
            Err(ExpressionError::Syntax { position: 4, .. })
        ));
    }

    #[test]
    fn test_expression_results_are_rendered() {
        assert_eq!(interpolate("${1 + 2}", &store()).unwrap(), "3");
        assert_eq!(interpolate("${7 / 2}", &store()).unwrap(), "3.5");
        assert_eq!(interpolate("${a == 'x'}", &store()).unwrap(), "true");
    }

    #[test]
    fn test_interpolate_list() {
        let list = vec!["${a}".to_string(), "${b}!".to_string()];
        assert_eq!(interpolate_list(&list, &store()).unwrap(), vec!["x", "y!"]);
    }
}
