//! Attribute binding
//!
//! Configures an element instance from its XML element according to the
//! element type's schema.

use super::convert::{convert, ConversionError};
use super::schema::{AttributeSpec, Schema};
use super::Element;
use crate::config::XmlElement;
use crate::error::{BindingError, BindingResult};
use crate::runner::condition::{is_enabled, IF_ATTRIBUTE, UNLESS_ATTRIBUTE};
use crate::runner::PropertyStore;
use std::path::Path;

/// Attributes every task accepts besides its own schema
pub const TASK_ATTRIBUTES: &[&str] = &["failonerror"];

/// Binds XML elements to typed values, expanding properties as it goes
pub struct Binder<'a> {
    properties: &'a PropertyStore,
    base_dir: &'a Path,
}

impl<'a> Binder<'a> {
    pub fn new(properties: &'a PropertyStore, base_dir: &'a Path) -> Self {
        Binder {
            properties,
            base_dir,
        }
    }

    pub fn properties(&self) -> &PropertyStore {
        self.properties
    }

    /// Bind an element; `None` means `if`/`unless` disabled it
    pub fn bind<T: Element>(&self, element: &XmlElement) -> BindingResult<Option<T>> {
        self.bind_with(element, &T::schema(), &[])
    }

    /// Bind a task element, which also accepts the common task attributes
    pub fn bind_task<T: Element>(&self, element: &XmlElement) -> BindingResult<Option<T>> {
        self.bind_with(element, &T::schema(), TASK_ATTRIBUTES)
    }

    /// Bind against an explicit schema. `reserved` names attributes that are
    /// accepted but left for the caller to read.
    pub fn bind_with<T: Default>(
        &self,
        element: &XmlElement,
        schema: &Schema<T>,
        reserved: &[&str],
    ) -> BindingResult<Option<T>> {
        // Conditions come first: a disabled element consumes everything
        // else without complaint
        if schema.is_conditional()
            && !is_enabled(
                element.attribute(IF_ATTRIBUTE),
                element.attribute(UNLESS_ATTRIBUTE),
                &element.name,
                &element.location,
                self.properties,
            )?
        {
            tracing::trace!(element = %element.name, location = %element.location, "element disabled");
            return Ok(None);
        }

        for (name, _) in &element.attributes {
            let known = schema.attribute(name).is_some()
                || reserved.contains(&name.as_str())
                || (schema.is_conditional() && (name == IF_ATTRIBUTE || name == UNLESS_ATTRIBUTE));
            if !known {
                return Err(BindingError::UnknownAttribute {
                    attribute: name.clone(),
                    element: element.name.clone(),
                    location: element.location.clone(),
                });
            }
        }

        let mut target = T::default();

        for spec in schema.attributes() {
            match element.attribute(spec.name) {
                Some(raw) => {
                    let text = if spec.expand {
                        self.expand(raw, spec.name, element)?
                    } else {
                        raw.to_string()
                    };
                    self.assign(&mut target, spec, &text, element)?;
                }
                None if spec.required => {
                    return Err(BindingError::RequiredAttributeMissing {
                        attribute: spec.name.to_string(),
                        element: element.name.clone(),
                        location: element.location.clone(),
                    });
                }
                None => {
                    if let Some(default) = spec.default {
                        self.assign(&mut target, spec, default, element)?;
                    }
                }
            }
        }

        if let Some(text) = &element.text {
            if schema.accepts_text() {
                let expanded = self.expand(text, "#text", element)?;
                schema.set_text(&mut target, expanded);
            } else {
                tracing::trace!(element = %element.name, "ignoring text content");
            }
        }

        let mut bound_children = vec![0usize; schema.children().len()];
        for child in &element.children {
            match schema.children().iter().position(|c| c.name == child.name) {
                Some(index) => {
                    if schema.children()[index].bind(&mut target, self, child)? {
                        bound_children[index] += 1;
                    }
                }
                None if schema.accepts_nested_tasks() => {
                    schema.add_nested_task(&mut target, child.clone());
                }
                None => {
                    return Err(BindingError::UnknownElement {
                        child: child.name.clone(),
                        element: element.name.clone(),
                        location: child.location.clone(),
                    });
                }
            }
        }

        for (spec, count) in schema.children().iter().zip(&bound_children) {
            if spec.required && *count == 0 {
                return Err(BindingError::RequiredElementMissing {
                    child: spec.name.to_string(),
                    element: element.name.clone(),
                    location: element.location.clone(),
                });
            }
        }

        Ok(Some(target))
    }

    /// Expand and parse a boolean attribute outside of any schema
    pub fn flag(&self, element: &XmlElement, attribute: &str, default: bool) -> BindingResult<bool> {
        match element.attribute(attribute) {
            Some(text) => crate::runner::condition::evaluate_flag(
                attribute,
                text,
                &element.name,
                &element.location,
                self.properties,
            ),
            None => Ok(default),
        }
    }

    fn expand(&self, text: &str, attribute: &str, element: &XmlElement) -> BindingResult<String> {
        self.properties
            .expand(text)
            .map_err(|source| BindingError::Expression {
                attribute: attribute.to_string(),
                element: element.name.clone(),
                location: element.location.clone(),
                source,
            })
    }

    fn assign<T>(
        &self,
        target: &mut T,
        spec: &AttributeSpec<T>,
        text: &str,
        element: &XmlElement,
    ) -> BindingResult<()> {
        let value = convert(&spec.kind, text, self.base_dir).map_err(|e| match e {
            ConversionError::Invalid(source) => BindingError::Validation {
                attribute: spec.name.to_string(),
                element: element.name.clone(),
                location: element.location.clone(),
                source,
            },
            ConversionError::Mismatch => BindingError::TypeMismatch {
                attribute: spec.name.to_string(),
                element: element.name.clone(),
                expected: spec.kind.expected(),
                value: text.to_string(),
                location: element.location.clone(),
            },
        })?;

        for validator in &spec.validators {
            validator
                .check(&value)
                .map_err(|source| BindingError::Validation {
                    attribute: spec.name.to_string(),
                    element: element.name.clone(),
                    location: element.location.clone(),
                    source,
                })?;
        }

        spec.assign(target, value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bind::Validator;
    use crate::config::Location;
    use crate::error::ValidationError;
    use std::path::PathBuf;

    #[derive(Debug, Default, PartialEq)]
    struct Include {
        name: String,
    }

    impl Element for Include {
        fn schema() -> Schema<Self> {
            Schema::<Self>::new().string("name", |t, v| t.name = v).required()
        }
    }

    #[derive(Debug, Default)]
    struct Sample {
        message: Option<String>,
        count: i64,
        verbose: bool,
        level: String,
        out: Option<PathBuf>,
        raw: String,
        text: Option<String>,
        includes: Vec<Include>,
    }

    impl Element for Sample {
        fn schema() -> Schema<Self> {
            Schema::<Self>::new()
                .string("message", |t, v| t.message = Some(v))
                .int("count", |t, v| t.count = v)
                .default_value("1")
                .validate(Validator::Range { min: 0, max: 9 })
                .boolean("verbose", |t, v| t.verbose = v)
                .choice("level", &["debug", "info"], |t, v| t.level = v)
                .default_value("info")
                .file("out", |t, v| t.out = Some(v))
                .string("raw", |t, v| t.raw = v)
                .no_expand()
                .text(|t, v| t.text = Some(v))
                .child("include", |t, v| t.includes.push(v))
        }
    }

    fn store() -> PropertyStore {
        let mut props = PropertyStore::new();
        props.set("who", "world", false);
        props.set("n", "3", false);
        props
    }

    fn bind<T: Element>(element: &XmlElement) -> BindingResult<Option<T>> {
        let props = store();
        Binder::new(&props, Path::new("/base")).bind::<T>(element)
    }

    #[test]
    fn test_bind_typed_attributes() {
        let element = XmlElement::new("sample")
            .with_attribute("message", "hello ${who}")
            .with_attribute("count", "${n}")
            .with_attribute("verbose", "yes")
            .with_attribute("level", "DEBUG")
            .with_attribute("out", "dist/app")
            .with_attribute("raw", "${who}")
            .with_text("body ${n}");

        let sample = bind::<Sample>(&element).unwrap().unwrap();
        assert_eq!(sample.message.as_deref(), Some("hello world"));
        assert_eq!(sample.count, 3);
        assert!(sample.verbose);
        assert_eq!(sample.level, "debug");
        assert_eq!(sample.out, Some(PathBuf::from("/base/dist/app")));
        assert_eq!(sample.raw, "${who}");
        assert_eq!(sample.text.as_deref(), Some("body 3"));
    }

    #[test]
    fn test_defaults_apply() {
        let sample = bind::<Sample>(&XmlElement::new("sample")).unwrap().unwrap();
        assert_eq!(sample.count, 1);
        assert_eq!(sample.level, "info");
        assert_eq!(sample.message, None);
    }

    #[test]
    fn test_unknown_attribute_is_named() {
        let element = XmlElement::new("sample").with_attribute("foo", "bar");
        match bind::<Sample>(&element) {
            Err(BindingError::UnknownAttribute { attribute, element, .. }) => {
                assert_eq!(attribute, "foo");
                assert_eq!(element, "sample");
            }
            other => panic!("expected UnknownAttribute, got {:?}", other),
        }
    }

    #[test]
    fn test_disabled_element_suppresses_validation() {
        let element = XmlElement::new("sample")
            .with_attribute("if", "false")
            .with_attribute("foo", "bar")
            .with_attribute("count", "not a number")
            .with_child(XmlElement::new("bogus"));
        assert!(bind::<Sample>(&element).unwrap().is_none());

        let element = XmlElement::new("sample")
            .with_attribute("unless", "${n == 3}")
            .with_attribute("foo", "bar");
        assert!(bind::<Sample>(&element).unwrap().is_none());
    }

    #[test]
    fn test_enabled_condition_still_validates() {
        let element = XmlElement::new("sample")
            .with_attribute("if", "true")
            .with_attribute("foo", "bar");
        assert!(matches!(
            bind::<Sample>(&element),
            Err(BindingError::UnknownAttribute { .. })
        ));
    }

    #[test]
    fn test_required_attribute_missing() {
        let element = XmlElement::new("include");
        assert!(matches!(
            bind::<Include>(&element),
            Err(BindingError::RequiredAttributeMissing { attribute, .. }) if attribute == "name"
        ));
    }

    #[test]
    fn test_boolean_parse_failure_is_validation_error() {
        let element = XmlElement::new("sample").with_attribute("verbose", "perhaps");
        match bind::<Sample>(&element) {
            Err(BindingError::Validation { attribute, source, .. }) => {
                assert_eq!(attribute, "verbose");
                assert_eq!(source, ValidationError::Boolean("perhaps".into()));
            }
            other => panic!("expected Validation, got {:?}", other),
        }
    }

    #[test]
    fn test_type_mismatch_and_range() {
        let element = XmlElement::new("sample").with_attribute("count", "three");
        assert!(matches!(
            bind::<Sample>(&element),
            Err(BindingError::TypeMismatch { expected, .. }) if expected == "integer"
        ));

        let element = XmlElement::new("sample").with_attribute("count", "12");
        assert!(matches!(
            bind::<Sample>(&element),
            Err(BindingError::Validation { source: ValidationError::Range { .. }, .. })
        ));
    }

    #[test]
    fn test_expression_failure_names_attribute() {
        let element = XmlElement::new("sample").with_attribute("message", "${missing}");
        assert!(matches!(
            bind::<Sample>(&element),
            Err(BindingError::Expression { attribute, .. }) if attribute == "message"
        ));
    }

    #[test]
    fn test_nested_children_in_document_order() {
        let element = XmlElement::new("sample")
            .with_child(XmlElement::new("include").with_attribute("name", "a"))
            .with_child(XmlElement::new("include").with_attribute("name", "b").with_attribute("if", "false"))
            .with_child(XmlElement::new("include").with_attribute("name", "${who}"));

        let sample = bind::<Sample>(&element).unwrap().unwrap();
        let names: Vec<&str> = sample.includes.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["a", "world"]);
    }

    #[test]
    fn test_unknown_child_element() {
        let location = Location::new(Some(PathBuf::from("build.xml")), 7, 5);
        let element = XmlElement::new("sample")
            .with_child(XmlElement::new("exclude").with_location(location.clone()));
        match bind::<Sample>(&element) {
            Err(BindingError::UnknownElement { child, location: at, .. }) => {
                assert_eq!(child, "exclude");
                assert_eq!(at, location);
            }
            other => panic!("expected UnknownElement, got {:?}", other),
        }
    }

    #[test]
    fn test_required_child_counts_enabled_occurrences() {
        #[derive(Default)]
        struct Group {
            includes: Vec<Include>,
        }
        impl Element for Group {
            fn schema() -> Schema<Self> {
                Schema::<Self>::new().required_child("include", |t, v| t.includes.push(v))
            }
        }

        let element = XmlElement::new("group")
            .with_child(XmlElement::new("include").with_attribute("name", "a").with_attribute("if", "no"));
        assert!(matches!(
            bind::<Group>(&element),
            Err(BindingError::RequiredElementMissing { child, .. }) if child == "include"
        ));
    }

    #[test]
    fn test_reserved_task_attributes() {
        let props = store();
        let binder = Binder::new(&props, Path::new("."));
        let element = XmlElement::new("include")
            .with_attribute("name", "a")
            .with_attribute("failonerror", "false");

        assert!(binder.bind::<Include>(&element).is_err());
        let include = binder.bind_task::<Include>(&element).unwrap().unwrap();
        assert_eq!(include.name, "a");
        assert!(!binder.flag(&element, "failonerror", true).unwrap());
        assert!(binder.flag(&XmlElement::new("x"), "failonerror", true).unwrap());
    }
}
