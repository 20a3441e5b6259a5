//! Element schemas
//!
//! A schema is the declared configuration surface of an element type: its
//! attributes with their types, defaults and validators, the nested elements
//! it accepts and whether it takes text content. Each entry carries the
//! setter that writes the converted value into the element.
//!
//! ```ignore
//! impl Element for Mkdir {
//!     fn schema() -> Schema<Self> {
//!         Schema::<Self>::new().directory("dir", |t, v| t.dir = v).required()
//!     }
//! }
//! ```

use super::binder::Binder;
use super::convert::{convert, AttributeKind, AttributeValue};
use super::validate::Validator;
use super::Element;
use crate::config::XmlElement;
use crate::error::BindingResult;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

type Setter<T> = Box<dyn Fn(&mut T, AttributeValue)>;
type ChildBinder<T> = Box<dyn Fn(&mut T, &Binder<'_>, &XmlElement) -> BindingResult<bool>>;

/// A declared attribute
pub struct AttributeSpec<T> {
    pub name: &'static str,
    pub kind: AttributeKind,
    pub required: bool,
    /// Raw default text, converted like a present attribute but never expanded
    pub default: Option<&'static str>,
    pub validators: Vec<Validator>,
    /// Whether `${...}` regions are expanded before conversion
    pub expand: bool,
    setter: Setter<T>,
}

impl<T> AttributeSpec<T> {
    pub(crate) fn assign(&self, target: &mut T, value: AttributeValue) {
        (self.setter)(target, value)
    }
}

/// A declared nested element
pub struct ChildSpec<T> {
    pub name: &'static str,
    /// At least one enabled occurrence is needed
    pub required: bool,
    bind: ChildBinder<T>,
    verify: fn() -> Result<(), String>,
}

impl<T> ChildSpec<T> {
    /// Bind one occurrence; returns false when it was disabled
    pub(crate) fn bind(&self, target: &mut T, binder: &Binder<'_>, element: &XmlElement) -> BindingResult<bool> {
        (self.bind)(target, binder, element)
    }
}

/// The configuration surface of an element type
pub struct Schema<T> {
    attributes: Vec<AttributeSpec<T>>,
    children: Vec<ChildSpec<T>>,
    text: Option<Box<dyn Fn(&mut T, String)>>,
    nested_tasks: Option<Box<dyn Fn(&mut T, XmlElement)>>,
    conditional: bool,
}

impl<T: 'static> Schema<T> {
    /// An empty schema; elements accept `if` and `unless` unless
    /// [`Schema::unconditional`] is called
    pub fn new() -> Self {
        Schema {
            attributes: Vec::new(),
            children: Vec::new(),
            text: None,
            nested_tasks: None,
            conditional: true,
        }
    }

    fn push(mut self, name: &'static str, kind: AttributeKind, setter: Setter<T>) -> Self {
        self.attributes.push(AttributeSpec {
            name,
            kind,
            required: false,
            default: None,
            validators: Vec::new(),
            expand: true,
            setter,
        });
        self
    }

    pub fn string(self, name: &'static str, set: impl Fn(&mut T, String) + 'static) -> Self {
        self.push(
            name,
            AttributeKind::String,
            Box::new(move |t, v| {
                if let AttributeValue::Str(s) = v {
                    set(t, s)
                }
            }),
        )
    }

    pub fn boolean(self, name: &'static str, set: impl Fn(&mut T, bool) + 'static) -> Self {
        self.push(
            name,
            AttributeKind::Bool,
            Box::new(move |t, v| {
                if let AttributeValue::Bool(b) = v {
                    set(t, b)
                }
            }),
        )
    }

    pub fn int(self, name: &'static str, set: impl Fn(&mut T, i64) + 'static) -> Self {
        self.push(
            name,
            AttributeKind::Int,
            Box::new(move |t, v| {
                if let AttributeValue::Int(n) = v {
                    set(t, n)
                }
            }),
        )
    }

    pub fn double(self, name: &'static str, set: impl Fn(&mut T, f64) + 'static) -> Self {
        self.push(
            name,
            AttributeKind::Double,
            Box::new(move |t, v| {
                if let AttributeValue::Double(n) = v {
                    set(t, n)
                }
            }),
        )
    }

    /// A case-insensitive choice; the setter receives the declared spelling
    pub fn choice(
        self,
        name: &'static str,
        choices: &'static [&'static str],
        set: impl Fn(&mut T, String) + 'static,
    ) -> Self {
        self.push(
            name,
            AttributeKind::Enum(choices),
            Box::new(move |t, v| {
                if let AttributeValue::Str(s) = v {
                    set(t, s)
                }
            }),
        )
    }

    pub fn file(self, name: &'static str, set: impl Fn(&mut T, PathBuf) + 'static) -> Self {
        self.path(name, AttributeKind::File, set)
    }

    pub fn directory(self, name: &'static str, set: impl Fn(&mut T, PathBuf) + 'static) -> Self {
        self.path(name, AttributeKind::Directory, set)
    }

    fn path(self, name: &'static str, kind: AttributeKind, set: impl Fn(&mut T, PathBuf) + 'static) -> Self {
        self.push(
            name,
            kind,
            Box::new(move |t, v| {
                if let AttributeValue::Path(p) = v {
                    set(t, p)
                }
            }),
        )
    }

    fn last_attribute(&mut self) -> Option<&mut AttributeSpec<T>> {
        self.attributes.last_mut()
    }

    /// Mark the last declared attribute as required
    pub fn required(mut self) -> Self {
        if let Some(spec) = self.last_attribute() {
            spec.required = true;
        }
        self
    }

    /// Default text for the last declared attribute
    pub fn default_value(mut self, value: &'static str) -> Self {
        if let Some(spec) = self.last_attribute() {
            spec.default = Some(value);
        }
        self
    }

    /// Add a validator to the last declared attribute
    pub fn validate(mut self, validator: Validator) -> Self {
        if let Some(spec) = self.last_attribute() {
            spec.validators.push(validator);
        }
        self
    }

    /// Take the last declared attribute's text literally
    pub fn no_expand(mut self) -> Self {
        if let Some(spec) = self.last_attribute() {
            spec.expand = false;
        }
        self
    }

    /// Accept expanded text content
    pub fn text(mut self, set: impl Fn(&mut T, String) + 'static) -> Self {
        self.text = Some(Box::new(set));
        self
    }

    /// Accept any number of nested `<name>` elements bound as `C`
    pub fn child<C: Element>(self, name: &'static str, add: impl Fn(&mut T, C) + 'static) -> Self {
        self.push_child(name, false, add)
    }

    /// Like [`Schema::child`], but at least one enabled occurrence is needed
    pub fn required_child<C: Element>(self, name: &'static str, add: impl Fn(&mut T, C) + 'static) -> Self {
        self.push_child(name, true, add)
    }

    fn push_child<C: Element>(mut self, name: &'static str, required: bool, add: impl Fn(&mut T, C) + 'static) -> Self {
        self.children.push(ChildSpec {
            name,
            required,
            bind: Box::new(move |target, binder, element| match binder.bind::<C>(element)? {
                Some(child) => {
                    add(target, child);
                    Ok(true)
                }
                None => Ok(false),
            }),
            verify: || C::schema().verify(),
        });
        self
    }

    /// Collect nested elements that are not declared children, unbound, for
    /// later dispatch as tasks
    pub fn nested_tasks(mut self, add: impl Fn(&mut T, XmlElement) + 'static) -> Self {
        self.nested_tasks = Some(Box::new(add));
        self
    }

    /// Do not treat `if`/`unless` as gating attributes
    pub fn unconditional(mut self) -> Self {
        self.conditional = false;
        self
    }
}

impl<T> Schema<T> {
    pub fn attributes(&self) -> &[AttributeSpec<T>] {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeSpec<T>> {
        self.attributes.iter().find(|a| a.name == name)
    }

    pub fn children(&self) -> &[ChildSpec<T>] {
        &self.children
    }

    pub fn child_spec(&self, name: &str) -> Option<&ChildSpec<T>> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn is_conditional(&self) -> bool {
        self.conditional
    }

    pub fn accepts_text(&self) -> bool {
        self.text.is_some()
    }

    pub fn accepts_nested_tasks(&self) -> bool {
        self.nested_tasks.is_some()
    }

    pub(crate) fn set_text(&self, target: &mut T, text: String) {
        if let Some(set) = &self.text {
            set(target, text);
        }
    }

    pub(crate) fn add_nested_task(&self, target: &mut T, element: XmlElement) {
        if let Some(add) = &self.nested_tasks {
            add(target, element);
        }
    }

    /// Check the schema is usable: unique names, well-formed validators and
    /// defaults that convert, recursively for nested element types
    pub fn verify(&self) -> Result<(), String> {
        let mut seen = HashSet::new();
        for spec in &self.attributes {
            if !seen.insert(spec.name) {
                return Err(format!("attribute '{}' is declared twice", spec.name));
            }
            if self.conditional && (spec.name == "if" || spec.name == "unless") {
                return Err(format!("attribute '{}' is reserved for conditions", spec.name));
            }
            for validator in &spec.validators {
                validator
                    .verify()
                    .map_err(|e| format!("attribute '{}': {}", spec.name, e))?;
            }
            if let Some(default) = spec.default {
                if spec.required {
                    return Err(format!("required attribute '{}' has a default", spec.name));
                }
                convert(&spec.kind, default, Path::new("."))
                    .map_err(|_| format!("default '{}' of '{}' is not a valid {}", default, spec.name, spec.kind.expected()))?;
            }
        }

        let mut seen = HashSet::new();
        for child in &self.children {
            if !seen.insert(child.name) {
                return Err(format!("nested element <{}> is declared twice", child.name));
            }
            (child.verify)().map_err(|e| format!("<{}>: {}", child.name, e))?;
        }
        Ok(())
    }
}

impl<T: 'static> Default for Schema<T> {
    fn default() -> Self {
        Self::new()
    }
}
