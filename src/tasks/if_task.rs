//! `<if>` composite task

use crate::bind::{Element, Schema};
use crate::config::XmlElement;
use crate::plugin::Task;
use crate::runner::Context;

/// Run nested tasks when `test` is true
#[derive(Debug, Default)]
pub struct IfTask {
    test: bool,
    tasks: Vec<XmlElement>,
}

impl Element for IfTask {
    fn schema() -> Schema<Self> {
        Schema::<Self>::new()
            .boolean("test", |t, v| t.test = v)
            .required()
            .nested_tasks(|t, e| t.tasks.push(e))
    }
}

impl Task for IfTask {
    fn execute(&mut self, ctx: &mut Context<'_>) -> anyhow::Result<()> {
        if !self.test {
            tracing::debug!(tasks = self.tasks.len(), "condition is false");
            return Ok(());
        }
        ctx.execute_tasks(&self.tasks)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::error::{BindingError, BuildError, ExecutionError};
    use crate::tasks::testing::{element, TaskFixture};
    use crate::ui::Level;

    fn echo(message: &str) -> crate::config::XmlElement {
        element("echo").with_attribute("message", message)
    }

    #[test]
    fn test_runs_nested_tasks_when_true() {
        let mut fixture = TaskFixture::new();
        fixture.properties.set("count", "3", false);

        fixture
            .run(
                &element("if")
                    .with_attribute("test", "${count > 2}")
                    .with_child(echo("big"))
                    .with_child(echo("${count}")),
            )
            .unwrap();
        fixture
            .run(
                &element("if")
                    .with_attribute("test", "${count > 5}")
                    .with_child(echo("huge")),
            )
            .unwrap();

        assert_eq!(fixture.recorder.messages(Level::Info), vec!["big", "3"]);
        assert_eq!(fixture.recorder.tasks_started(), vec!["if", "echo", "echo", "if"]);
    }

    #[test]
    fn test_nested_tasks_see_earlier_siblings() {
        let mut fixture = TaskFixture::new();
        fixture
            .run(
                &element("if")
                    .with_attribute("test", "true")
                    .with_child(
                        element("property")
                            .with_attribute("name", "x")
                            .with_attribute("value", "1"),
                    )
                    .with_child(echo("x=${x}")),
            )
            .unwrap();
        assert_eq!(fixture.recorder.messages(Level::Info), vec!["x=1"]);
    }

    #[test]
    fn test_nested_unknown_task_fails() {
        let mut fixture = TaskFixture::new();
        let err = fixture
            .run(
                &element("if")
                    .with_attribute("test", "true")
                    .with_child(element("frobnicate")),
            )
            .unwrap_err();
        assert!(err.to_string().contains("frobnicate"));
    }

    #[test]
    fn test_nested_binding_error_is_not_suppressed() {
        let mut fixture = TaskFixture::new();
        let err = fixture
            .run(
                &element("if")
                    .with_attribute("test", "true")
                    .with_attribute("failonerror", "false")
                    .with_child(echo("x").with_attribute("foo", "bar")),
            )
            .unwrap_err();
        match err.innermost() {
            BuildError::Binding(BindingError::UnknownAttribute { attribute, element, .. }) => {
                assert_eq!(attribute, "foo");
                assert_eq!(element, "echo");
            }
            other => panic!("expected an unknown attribute, got {:?}", other),
        }
        assert!(fixture.recorder.messages(Level::Warning).is_empty());
    }

    #[test]
    fn test_nested_failure_keeps_its_own_location() {
        let mut fixture = TaskFixture::new();
        let err = fixture
            .run(
                &element("if")
                    .with_attribute("test", "true")
                    .with_child(element("fail").with_attribute("message", "inner")),
            )
            .unwrap_err();
        assert!(matches!(
            err,
            BuildError::Execution(ExecutionError::TaskFailed { ref task, .. }) if task == "fail"
        ));
    }

    #[test]
    fn test_failonerror_covers_nested_execution_failures() {
        let mut fixture = TaskFixture::new();
        fixture
            .run(
                &element("if")
                    .with_attribute("test", "true")
                    .with_attribute("failonerror", "false")
                    .with_child(element("fail").with_attribute("message", "inner"))
                    .with_child(echo("never")),
            )
            .unwrap();
        assert!(!fixture.recorder.messages(Level::Info).contains(&"never".to_string()));
        assert_eq!(fixture.recorder.messages(Level::Warning).len(), 1);
    }

    #[test]
    fn test_requires_test_attribute() {
        let mut fixture = TaskFixture::new();
        assert!(fixture.run(&element("if").with_child(echo("x"))).is_err());
    }
}
