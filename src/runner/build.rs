//! Build engine
//!
//! Runs a project: seeds the built-in properties, resolves the requested
//! targets, runs project-level tasks and then each target in order.

use crate::config::Settings;
use crate::error::{BuildError, Result};
use crate::plugin::Registry;
use crate::project::{Project, Target};
use crate::runner::{condition, dispatch, resolve, select_targets, Context};
use crate::ui::{BuildEvent, BuildListener, ListenerSet};
use std::time::Instant;

/// Executes builds against a registry, reporting to a set of listeners
pub struct Engine<'r> {
    registry: &'r Registry,
    listeners: ListenerSet,
    interpreter: Vec<String>,
    default_targets: Vec<String>,
}

impl<'r> Engine<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Engine {
            registry,
            listeners: ListenerSet::new(),
            interpreter: Vec::new(),
            default_targets: Vec::new(),
        }
    }

    /// Add a listener
    pub fn with_listener(mut self, listener: Box<dyn BuildListener>) -> Self {
        self.listeners.add(listener);
        self
    }

    /// Take the interpreter and fallback targets from settings
    pub fn with_settings(mut self, settings: &Settings) -> Self {
        self.interpreter = settings.interpreter();
        self.default_targets = settings.default_targets.clone();
        self
    }

    /// Run a build, reporting start and result to the listeners
    pub fn run(&mut self, project: &mut Project, requested: &[String]) -> Result<()> {
        let started = Instant::now();
        self.listeners.on_event(&BuildEvent::BuildStarted {
            project: project.name.clone(),
        });

        let result = self.execute(project, requested);

        self.listeners.on_event(&BuildEvent::BuildFinished {
            error: result.as_ref().err().map(|e| e.to_string()),
            duration: started.elapsed(),
        });
        result
    }

    fn execute(&mut self, project: &mut Project, requested: &[String]) -> Result<()> {
        seed_builtin_properties(project);
        project.properties.set_functions(self.registry.functions());

        // The whole graph is checked before anything runs
        let selected = select_targets(project, requested, &self.default_targets)?;
        let order = resolve(project, &selected)?;
        let plan: Vec<Target> = order
            .iter()
            .filter_map(|name| project.target(name).cloned())
            .collect();
        let global_tasks = project.global_tasks.clone();

        let mut ctx = Context::new(
            &mut project.properties,
            self.registry,
            &mut self.listeners,
            project.base_dir.clone(),
        )
        .with_interpreter(self.interpreter.clone());

        dispatch::execute_tasks(&global_tasks, &mut ctx)?;

        for target in &plan {
            run_target(target, &mut ctx).map_err(|e| BuildError::in_target(&target.name, e))?;
        }
        Ok(())
    }
}

fn run_target(target: &Target, ctx: &mut Context<'_>) -> Result<()> {
    ctx.properties.set("target.current", target.name.as_str(), true);

    let enabled = condition::is_enabled(
        target.if_condition.as_deref(),
        target.unless_condition.as_deref(),
        "target",
        &target.location,
        ctx.properties,
    )?;
    if !enabled {
        tracing::debug!(target_name = %target.name, "target disabled by condition");
        ctx.emit(BuildEvent::TargetSkipped {
            target: target.name.clone(),
        });
        return Ok(());
    }

    ctx.emit(BuildEvent::TargetStarted {
        target: target.name.clone(),
    });
    ctx.set_target(Some(&target.name));

    let result = dispatch::execute_tasks(&target.tasks, ctx);

    ctx.set_target(None);
    ctx.emit(BuildEvent::TargetFinished {
        target: target.name.clone(),
        success: result.is_ok(),
    });
    result
}

/// Read-only properties describing the build
fn seed_builtin_properties(project: &mut Project) {
    let props = &mut project.properties;
    props.set_read_only("antler.version", crate::VERSION);
    if let Some(file) = &project.build_file {
        props.set_read_only("antler.buildfile", file.display().to_string());
    }
    if let Some(name) = &project.name {
        props.set_read_only("project.name", name.as_str());
    }
    props.set_read_only("project.basedir", project.base_dir.display().to_string());
    if let Some(default) = &project.default_target {
        props.set_read_only("project.default", default.as_str());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{build_project, parse_document};
    use crate::error::{BindingError, ExecutionError, ResolutionError};
    use crate::ui::{Level, RecordingListener};

    fn load(xml: &str) -> Project {
        let root = parse_document(xml, None).unwrap();
        build_project(&root, None).unwrap()
    }

    fn run(xml: &str, targets: &[&str]) -> (Result<()>, RecordingListener, Project) {
        let registry = Registry::with_builtins().unwrap();
        let recorder = RecordingListener::new();
        let mut project = load(xml);
        let targets: Vec<String> = targets.iter().map(|t| t.to_string()).collect();
        let result = Engine::new(&registry)
            .with_listener(Box::new(recorder.clone()))
            .run(&mut project, &targets);
        (result, recorder, project)
    }

    #[test]
    fn test_targets_run_in_dependency_order() {
        let (result, recorder, _) = run(
            r#"<project default="dist">
                 <target name="init"><echo message="init"/></target>
                 <target name="compile" depends="init"><echo message="compile"/></target>
                 <target name="dist" depends="compile, init"><echo message="dist"/></target>
               </project>"#,
            &[],
        );
        result.unwrap();
        assert_eq!(recorder.targets_started(), vec!["init", "compile", "dist"]);
        assert_eq!(recorder.messages(Level::Info), vec!["init", "compile", "dist"]);
    }

    #[test]
    fn test_shared_target_runs_once() {
        let (result, recorder, _) = run(
            r#"<project>
                 <target name="init"><echo message="init ran"/></target>
                 <target name="a" depends="init"/>
                 <target name="b" depends="init"/>
               </project>"#,
            &["init", "a", "b"],
        );
        result.unwrap();
        assert_eq!(recorder.messages(Level::Info), vec!["init ran"]);
    }

    #[test]
    fn test_disabled_target_still_runs_dependencies() {
        let (result, recorder, _) = run(
            r#"<project>
                 <property name="build.docs" value="false"/>
                 <target name="init"><echo message="init"/></target>
                 <target name="docs" depends="init" if="${build.docs}"><echo message="docs"/></target>
               </project>"#,
            &["docs"],
        );
        result.unwrap();
        assert_eq!(recorder.messages(Level::Info), vec!["init"]);
        assert!(recorder
            .events()
            .contains(&BuildEvent::TargetSkipped { target: "docs".into() }));
    }

    #[test]
    fn test_target_condition_on_unset_property_fails() {
        let (result, _, _) = run(
            r#"<project>
                 <target name="docs" if="${build.docs}"><echo message="docs"/></target>
               </project>"#,
            &["docs"],
        );
        let err = result.unwrap_err();
        assert_eq!(err.target_chain(), vec!["docs"]);
        assert!(matches!(
            err.innermost(),
            BuildError::Binding(BindingError::Expression { .. })
        ));
    }

    #[test]
    fn test_cycle_detected_before_any_task() {
        let (result, recorder, _) = run(
            r#"<project>
                 <echo message="global"/>
                 <target name="A" depends="B"><echo message="a"/></target>
                 <target name="B" depends="A"><echo message="b"/></target>
               </project>"#,
            &["A"],
        );
        match result {
            Err(BuildError::Resolution(ResolutionError::CircularDependency { path })) => {
                assert!(path.contains(&"A".to_string()));
                assert!(path.contains(&"B".to_string()));
            }
            other => panic!("expected a cycle, got {:?}", other),
        }
        assert!(recorder.messages(Level::Debug).is_empty());
    }

    #[test]
    fn test_unknown_attribute_fails_in_target() {
        let (result, _, _) = run(
            r#"<project>
                 <target name="build"><echo message="x" foo="bar"/></target>
               </project>"#,
            &["build"],
        );
        let err = result.unwrap_err();
        assert_eq!(err.target_chain(), vec!["build"]);
        assert!(matches!(
            err.innermost(),
            BuildError::Binding(BindingError::UnknownAttribute { attribute, .. }) if attribute == "foo"
        ));
    }

    #[test]
    fn test_disabled_task_is_not_bound_or_run() {
        let (result, recorder, _) = run(
            r#"<project>
                 <target name="build"><echo message="x" foo="bar" if="false"/></target>
               </project>"#,
            &["build"],
        );
        result.unwrap();
        assert!(recorder.tasks_started().is_empty());
        assert!(recorder.messages(Level::Info).is_empty());
    }

    #[test]
    fn test_unknown_task() {
        let (result, _, _) = run(
            r#"<project><target name="build"><javac/></target></project>"#,
            &["build"],
        );
        assert!(matches!(
            result.unwrap_err().innermost(),
            BuildError::Execution(ExecutionError::TaskNotFound { name, .. }) if name == "javac"
        ));
    }

    #[test]
    fn test_failure_stops_pending_targets() {
        let (result, recorder, _) = run(
            r#"<project>
                 <target name="a"><fail message="stop here"/><echo message="after"/></target>
                 <target name="b" depends="a"><echo message="b"/></target>
               </project>"#,
            &["b"],
        );
        let err = result.unwrap_err();
        assert!(err.to_string().contains("stop here"));
        assert_eq!(err.target_chain(), vec!["a"]);
        assert!(recorder.messages(Level::Info).is_empty());
    }

    #[test]
    fn test_failonerror_false_continues() {
        let (result, recorder, _) = run(
            r#"<project>
                 <target name="a">
                   <fail message="ignored" failonerror="false"/>
                   <echo message="after"/>
                 </target>
               </project>"#,
            &["a"],
        );
        result.unwrap();
        assert_eq!(recorder.messages(Level::Info), vec!["after"]);
        assert_eq!(recorder.messages(Level::Warning).len(), 1);
    }

    #[test]
    fn test_builtin_properties_and_properties_flow_between_tasks() {
        let (result, recorder, project) = run(
            r#"<project name="demo">
                 <target name="a">
                   <property name="greeting" value="hi from ${target.current}"/>
                   <echo message="${project.name}: ${greeting}"/>
                 </target>
               </project>"#,
            &["a"],
        );
        result.unwrap();
        assert_eq!(recorder.messages(Level::Info), vec!["demo: hi from a"]);
        assert!(project.properties.is_read_only("project.name"));
        assert_eq!(
            project.properties.get("antler.version").unwrap().as_deref(),
            Some(crate::VERSION)
        );
    }

    #[test]
    fn test_seeded_properties_win_over_build_file() {
        let registry = Registry::with_builtins().unwrap();
        let recorder = RecordingListener::new();
        let mut project = load(
            r#"<project>
                 <property name="mode" value="debug"/>
                 <target name="a"><echo message="${mode}"/></target>
               </project>"#,
        );
        project.properties.set_read_only("mode", "release");

        Engine::new(&registry)
            .with_listener(Box::new(recorder.clone()))
            .run(&mut project, &["a".to_string()])
            .unwrap();
        assert_eq!(recorder.messages(Level::Info), vec!["release"]);
    }

    #[test]
    fn test_no_target() {
        let (result, _, _) = run(r#"<project><target name="a"/></project>"#, &[]);
        assert!(matches!(
            result,
            Err(BuildError::Resolution(ResolutionError::NoTarget))
        ));
    }

    #[test]
    fn test_settings_default_targets() {
        let registry = Registry::with_builtins().unwrap();
        let recorder = RecordingListener::new();
        let mut project = load(r#"<project><target name="a"><echo message="a"/></target></project>"#);
        let settings = Settings {
            default_targets: vec!["a".to_string()],
            ..Settings::default()
        };

        Engine::new(&registry)
            .with_settings(&settings)
            .with_listener(Box::new(recorder.clone()))
            .run(&mut project, &[])
            .unwrap();
        assert_eq!(recorder.targets_started(), vec!["a"]);
    }

    #[test]
    fn test_build_events_bracket_the_build() {
        let (result, recorder, _) = run(r#"<project><target name="a"/></project>"#, &["a"]);
        result.unwrap();
        let events = recorder.events();
        assert!(matches!(events.first(), Some(BuildEvent::BuildStarted { .. })));
        assert!(matches!(
            events.last(),
            Some(BuildEvent::BuildFinished { error: None, .. })
        ));
    }
}
