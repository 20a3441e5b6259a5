//! Task dispatch
//!
//! Looks up each task element's type by tag name, binds a fresh instance and
//! runs it. Failures are wrapped with the task name and location; nothing is
//! retried. Errors from tasks nested in a composite pass through unchanged,
//! so `failonerror` on the composite only covers execution failures.

use crate::bind::Binder;
use crate::config::XmlElement;
use crate::error::{BuildError, ExecutionError};
use crate::runner::Context;
use crate::ui::{BuildEvent, Level};

pub const FAIL_ON_ERROR: &str = "failonerror";

/// Run task elements in document order, stopping at the first failure
pub fn execute_tasks(tasks: &[XmlElement], ctx: &mut Context<'_>) -> Result<(), BuildError> {
    for element in tasks {
        execute_task(element, ctx)?;
    }
    Ok(())
}

/// Bind and run a single task element
pub fn execute_task(element: &XmlElement, ctx: &mut Context<'_>) -> Result<(), BuildError> {
    let task_type = ctx
        .registry()
        .task(&element.name)
        .ok_or_else(|| ExecutionError::TaskNotFound {
            name: element.name.clone(),
            location: element.location.clone(),
        })?;

    let (task, fail_on_error) = {
        let binder = Binder::new(&*ctx.properties, &ctx.base_dir);
        match task_type.bind(&binder, element)? {
            Some(task) => (Some(task), binder.flag(element, FAIL_ON_ERROR, true)?),
            None => (None, true),
        }
    };

    let Some(mut task) = task else {
        ctx.emit(BuildEvent::TaskSkipped {
            task: element.name.clone(),
            location: element.location.clone(),
        });
        return Ok(());
    };

    ctx.emit(BuildEvent::TaskStarted {
        task: element.name.clone(),
        location: element.location.clone(),
    });
    ctx.push_task(&element.name, &element.location);

    let result = task.execute(ctx).map_err(|e| match e.downcast::<BuildError>() {
        // nested tasks of a composite already carry their own context
        Ok(nested) => nested,
        Err(source) => ExecutionError::TaskFailed {
            task: element.name.clone(),
            location: element.location.clone(),
            source,
        }
        .into(),
    });
    let result = match result {
        Err(BuildError::Execution(e)) if !fail_on_error => {
            ctx.log(Level::Warning, format!("{} (continuing, failonerror is false)", e));
            Ok(())
        }
        other => other,
    };

    ctx.pop_task();
    ctx.emit(BuildEvent::TaskFinished {
        task: element.name.clone(),
        success: result.is_ok(),
    });

    result
}
