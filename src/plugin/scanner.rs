//! Extension scanning
//!
//! Checks every type an extension offers before anything is registered: a
//! broken type fails the whole extension.

use super::extension::{Extension, TypeDescriptor, TypeKind};
use super::registry::Registry;
use super::TaskType;
use crate::error::ScanError;
use crate::runner::functions::FunctionSet;
use crate::ui::ListenerFactory;
use std::collections::HashSet;
use std::sync::Arc;

/// Types found in one extension, ready to register
#[derive(Default)]
pub struct Discovered {
    pub extension: String,
    pub tasks: Vec<(String, Arc<dyn TaskType>)>,
    pub functions: Vec<FunctionSet>,
    pub listeners: Vec<(String, ListenerFactory)>,
}

impl Discovered {
    pub fn len(&self) -> usize {
        self.tasks.len() + self.functions.len() + self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Validates extension types against each other and an existing registry
pub struct Scanner<'r> {
    registry: &'r Registry,
}

impl<'r> Scanner<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Scanner { registry }
    }

    pub fn scan(&self, extension: &dyn Extension) -> Result<Discovered, ScanError> {
        let mut discovered = Discovered {
            extension: extension.name().to_string(),
            ..Discovered::default()
        };
        let mut function_names = HashSet::new();

        for descriptor in extension.types() {
            if descriptor.is_abstract {
                tracing::trace!(
                    extension = extension.name(),
                    name = %descriptor.name,
                    "skipping abstract type"
                );
                continue;
            }

            if let Err(e) = self.check(&descriptor, &discovered, &mut function_names) {
                tracing::error!(
                    extension = extension.name(),
                    name = %descriptor.name,
                    kind = descriptor.kind_name(),
                    error = %e,
                    "failed to scan extension type"
                );
                return Err(e);
            }

            tracing::debug!(
                extension = extension.name(),
                name = %descriptor.name,
                kind = descriptor.kind_name(),
                "discovered type"
            );
            match descriptor.kind {
                TypeKind::Task(task) => discovered.tasks.push((descriptor.name, task)),
                TypeKind::Functions(set) => discovered.functions.push(set),
                TypeKind::Listener(factory) => discovered.listeners.push((descriptor.name, factory)),
            }
        }

        Ok(discovered)
    }

    fn check(
        &self,
        descriptor: &TypeDescriptor,
        discovered: &Discovered,
        function_names: &mut HashSet<String>,
    ) -> Result<(), ScanError> {
        let extension = discovered.extension.as_str();
        let kind = descriptor.kind_name();
        let name = descriptor.name.as_str();
        let invalid = |reason: String| ScanError::Invalid {
            extension: extension.to_string(),
            kind,
            name: name.to_string(),
            reason,
        };
        let duplicate = |name: &str| ScanError::Duplicate {
            extension: extension.to_string(),
            kind,
            name: name.to_string(),
        };

        if !is_valid_name(name) {
            return Err(invalid("not a valid name".to_string()));
        }

        match &descriptor.kind {
            TypeKind::Task(task) => {
                if self.registry.has_task(name) || discovered.tasks.iter().any(|(n, _)| n == name) {
                    return Err(duplicate(name));
                }
                task.verify().map_err(invalid)?;
            }
            TypeKind::Functions(set) => {
                for function in &set.functions {
                    if !is_valid_name(function.name) {
                        return Err(invalid(format!("'{}' is not a valid function name", function.name)));
                    }
                }
                for qualified in set.qualified_names() {
                    if self.registry.functions().contains(&qualified) || !function_names.insert(qualified.clone()) {
                        return Err(duplicate(&qualified));
                    }
                }
            }
            TypeKind::Listener(_) => {
                if self.registry.listener_names().contains(&name)
                    || discovered.listeners.iter().any(|(n, _)| n == name)
                {
                    return Err(duplicate(name));
                }
            }
        }
        Ok(())
    }
}

/// Letters, digits, `_`, `-` and `.`, starting with a letter or `_`
fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bind::{Element, Schema, Validator};
    use crate::plugin::Task;
    use crate::runner::functions::ParamType;
    use crate::runner::Context;
    use crate::ui::TracingListener;

    #[derive(Default)]
    struct Noop;

    impl Element for Noop {
        fn schema() -> Schema<Self> {
            Schema::<Self>::new()
        }
    }

    impl Task for Noop {
        fn execute(&mut self, _ctx: &mut Context<'_>) -> anyhow::Result<()> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct BadPattern;

    impl Element for BadPattern {
        fn schema() -> Schema<Self> {
            Schema::<Self>::new()
                .string("name", |_, _| {})
                .validate(Validator::Pattern("[unclosed"))
        }
    }

    impl Task for BadPattern {
        fn execute(&mut self, _ctx: &mut Context<'_>) -> anyhow::Result<()> {
            Ok(())
        }
    }

    struct TestExtension(Vec<TypeDescriptor>);

    impl Extension for TestExtension {
        fn name(&self) -> &str {
            "test"
        }

        fn types(&self) -> Vec<TypeDescriptor> {
            self.0.clone()
        }
    }

    fn scan(types: Vec<TypeDescriptor>) -> Result<Discovered, ScanError> {
        let registry = Registry::new();
        Scanner::new(&registry).scan(&TestExtension(types))
    }

    #[test]
    fn test_scan_collects_each_kind() {
        let discovered = scan(vec![
            TypeDescriptor::task::<Noop>("noop"),
            TypeDescriptor::functions(FunctionSet::new("demo").function(
                "one",
                &[],
                ParamType::Number,
                |_, _| Ok(crate::runner::expr::Value::Number(1.0)),
            )),
            TypeDescriptor::listener("trace", TracingListener::boxed),
        ])
        .unwrap();

        assert_eq!(discovered.tasks.len(), 1);
        assert_eq!(discovered.functions.len(), 1);
        assert_eq!(discovered.listeners.len(), 1);
        assert_eq!(discovered.extension, "test");
    }

    #[test]
    fn test_abstract_types_are_skipped() {
        let discovered = scan(vec![
            TypeDescriptor::task::<BadPattern>("base").abstract_type(),
            TypeDescriptor::task::<Noop>("noop"),
        ])
        .unwrap();
        assert_eq!(discovered.len(), 1);
    }

    #[test]
    fn test_broken_type_fails_the_scan() {
        let result = scan(vec![
            TypeDescriptor::task::<Noop>("noop"),
            TypeDescriptor::task::<BadPattern>("bad"),
        ]);
        match result {
            Err(ScanError::Invalid { name, kind, .. }) => {
                assert_eq!(name, "bad");
                assert_eq!(kind, "task");
            }
            other => panic!("expected Invalid, got {:?}", other.map(|d| d.len())),
        }
    }

    #[test]
    fn test_duplicate_task_names() {
        let result = scan(vec![
            TypeDescriptor::task::<Noop>("noop"),
            TypeDescriptor::task::<Noop>("noop"),
        ]);
        assert!(matches!(result, Err(ScanError::Duplicate { .. })));
    }

    #[test]
    fn test_duplicate_against_registry() {
        let registry = Registry::with_builtins().unwrap();
        let result = Scanner::new(&registry).scan(&TestExtension(vec![TypeDescriptor::task::<Noop>("echo")]));
        assert_eq!(
            result.err(),
            Some(ScanError::Duplicate {
                extension: "test".into(),
                kind: "task",
                name: "echo".into()
            })
        );
    }

    #[test]
    fn test_invalid_names() {
        assert!(is_valid_name("my-task.v2"));
        assert!(!is_valid_name("2fast"));
        assert!(!is_valid_name(""));
        assert!(matches!(
            scan(vec![TypeDescriptor::task::<Noop>("bad name")]),
            Err(ScanError::Invalid { .. })
        ));
    }
}
