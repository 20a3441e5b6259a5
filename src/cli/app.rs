//! Main CLI application

use crate::config::{
    build_project, find_build_file, load_document, load_env_file, load_settings,
    parse_property_definition, Settings,
};
use crate::error::ConfigError;
use crate::plugin::Registry;
use crate::project::Project;
use crate::runner::Engine;
use crate::ui::{BuildListener, ConsoleListener, Verbosity};
use anyhow::Context as _;
use clap::{Arg, ArgAction, ArgMatches, Command};
use clap_complete::Shell;
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Parsed command-line options
#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    pub targets: Vec<String>,
    pub file: Option<PathBuf>,
    pub find: bool,
    /// `-D name=value` definitions, in command-line order
    pub defines: Vec<(String, String)>,
    pub env_files: Vec<PathBuf>,
    pub verbosity: Verbosity,
    pub listener: Option<String>,
    pub project_help: bool,
    pub completions: Option<Shell>,
}

impl Options {
    pub fn from_matches(matches: &ArgMatches) -> anyhow::Result<Self> {
        let defines = matches
            .get_many::<String>("define")
            .into_iter()
            .flatten()
            .map(|d| parse_property_definition(d))
            .collect::<Result<Vec<_>, ConfigError>>()?;

        Ok(Options {
            targets: strings(matches, "targets"),
            file: matches.get_one::<PathBuf>("file").cloned(),
            find: matches.get_flag("find"),
            defines,
            env_files: matches
                .get_many::<PathBuf>("env-file")
                .into_iter()
                .flatten()
                .cloned()
                .collect(),
            verbosity: get_verbosity(matches),
            listener: matches.get_one::<String>("listener").cloned(),
            project_help: matches.get_flag("projecthelp"),
            completions: matches.get_one::<Shell>("completions").copied(),
        })
    }
}

fn strings(matches: &ArgMatches, id: &str) -> Vec<String> {
    matches
        .get_many::<String>(id)
        .into_iter()
        .flatten()
        .cloned()
        .collect()
}

/// CLI application
pub struct App {
    options: Options,
    registry: Registry,
}

impl App {
    pub fn new(options: Options) -> anyhow::Result<Self> {
        let registry = Registry::with_builtins()?;
        Ok(App { options, registry })
    }

    /// Run the build. Returns `Ok(false)` when the build itself failed; the
    /// console listener has already reported that failure.
    pub fn run(self) -> anyhow::Result<bool> {
        let user_settings = load_settings(None)?;
        let build_file = self.locate_build_file(&user_settings)?;
        let project_dir = build_file.parent().map(Path::to_path_buf);
        let settings = load_settings(project_dir.as_deref())?;

        let root = load_document(&build_file)?;
        let mut project = build_project(&root, Some(&build_file))?;

        if self.options.project_help {
            print!("{}", format_project_help(&project));
            return Ok(true);
        }

        self.seed_properties(&mut project, &settings)?;

        let mut engine = Engine::new(&self.registry)
            .with_settings(&settings)
            .with_listener(Box::new(ConsoleListener::new(self.options.verbosity)));
        if let Some(listener) = self.extra_listener(&settings)? {
            engine = engine.with_listener(listener);
        }

        match engine.run(&mut project, &self.options.targets) {
            Ok(()) => Ok(true),
            Err(e) => {
                tracing::debug!(error = ?e, "build failed");
                Ok(false)
            }
        }
    }

    fn locate_build_file(&self, settings: &Settings) -> anyhow::Result<PathBuf> {
        match &self.options.file {
            Some(path) if path.is_file() => Ok(path.clone()),
            Some(path) => Err(ConfigError::NotFound(path.display().to_string()).into()),
            None => Ok(find_build_file(settings.build_file_name(), self.options.find)?),
        }
    }

    /// Seed properties: command line, env files, then settings. The first
    /// write wins, so the build file's own declarations come last.
    fn seed_properties(&self, project: &mut Project, settings: &Settings) -> anyhow::Result<()> {
        let props = &mut project.properties;
        for (name, value) in &self.options.defines {
            props.set_read_only(name.as_str(), value.as_str());
        }
        for path in &self.options.env_files {
            for (name, value) in load_env_file(path)? {
                props.set(name, value, false);
            }
        }
        for (name, value) in &settings.properties {
            props.set(name.as_str(), value.as_str(), false);
        }
        Ok(())
    }

    fn extra_listener(&self, settings: &Settings) -> anyhow::Result<Option<Box<dyn BuildListener>>> {
        let Some(name) = self.options.listener.as_ref().or(settings.listener.as_ref()) else {
            return Ok(None);
        };
        let listener = self.registry.listener(name).with_context(|| {
            format!(
                "Unknown listener '{}' (available: {})",
                name,
                self.registry.listener_names().join(", ")
            )
        })?;
        Ok(Some(listener))
    }
}

/// Build the clap command
pub fn build_command() -> Command {
    Command::new("antler")
        .version(env!("CARGO_PKG_VERSION"))
        .about("A declarative XML build tool")
        .arg(
            Arg::new("targets")
                .value_name("TARGET")
                .help("Targets to run (default: the project's default target)")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("file")
                .short('f')
                .long("file")
                .value_name("FILE")
                .value_parser(clap::value_parser!(PathBuf))
                .help("Path to the build file"),
        )
        .arg(
            Arg::new("find")
                .long("find")
                .help("Search parent directories for the build file")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("define")
                .short('D')
                .value_name("NAME=VALUE")
                .help("Set a read-only property")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("env-file")
                .long("env-file")
                .value_name("PATH")
                .value_parser(clap::value_parser!(PathBuf))
                .help("Load properties from a dotenv file")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .help("Only print warnings and errors")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("silent")
                .short('s')
                .long("silent")
                .help("Print no output")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Print verbose output")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("debug")
                .long("debug")
                .help("Print debug output and engine diagnostics")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("listener")
                .long("listener")
                .value_name("NAME")
                .help("Add a registered build listener"),
        )
        .arg(
            Arg::new("projecthelp")
                .short('p')
                .long("projecthelp")
                .help("List the project's targets")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("completions")
                .long("completions")
                .value_name("SHELL")
                .value_parser(clap::value_parser!(Shell))
                .help("Print shell completions and exit"),
        )
}

/// Get verbosity level from matches
fn get_verbosity(matches: &ArgMatches) -> Verbosity {
    if matches.get_flag("silent") {
        Verbosity::Silent
    } else if matches.get_flag("quiet") {
        Verbosity::Quiet
    } else if matches.get_flag("debug") {
        Verbosity::Debug
    } else if matches.get_flag("verbose") {
        Verbosity::Verbose
    } else {
        Verbosity::Normal
    }
}

/// Target listing for `--projecthelp`
pub fn format_project_help(project: &Project) -> String {
    let mut out = String::new();
    if let Some(description) = &project.description {
        out.push_str(description);
        out.push_str("\n\n");
    }

    let (main, other): (Vec<_>, Vec<_>) = project.targets().partition(|t| t.description.is_some());
    let width = project.targets().map(|t| t.name.len()).max().unwrap_or(0);

    if !main.is_empty() {
        out.push_str("Main targets:\n\n");
        for target in &main {
            let description = target.description.as_deref().unwrap_or_default();
            out.push_str(&format!(" {:<width$}  {}\n", target.name, description, width = width));
        }
        out.push('\n');
    }
    if !other.is_empty() {
        out.push_str("Other targets:\n\n");
        for target in &other {
            out.push_str(&format!(" {}\n", target.name));
        }
        out.push('\n');
    }
    if let Some(default) = &project.default_target {
        out.push_str(&format!("Default target: {}\n", default));
    }
    out
}

fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("antler=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    // a subscriber may already be installed when embedded
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .without_time()
        .try_init();
}

/// Run the CLI application with the process arguments
pub fn run() -> anyhow::Result<bool> {
    run_from(std::env::args_os())
}

/// Run the CLI application with provided arguments
pub fn run_from<I, T>(args: I) -> anyhow::Result<bool>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let mut command = build_command();
    let matches = command.clone().get_matches_from(args);
    init_tracing(matches.get_flag("debug"));

    let options = Options::from_matches(&matches)?;
    if let Some(shell) = options.completions {
        clap_complete::generate(shell, &mut command, "antler", &mut io::stdout());
        return Ok(true);
    }

    App::new(options)?.run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_document;

    fn options(args: &[&str]) -> Options {
        let matches = build_command().try_get_matches_from(args).unwrap();
        Options::from_matches(&matches).unwrap()
    }

    #[test]
    fn test_get_verbosity_normal() {
        let matches = build_command().get_matches_from(vec!["antler"]);
        assert_eq!(get_verbosity(&matches), Verbosity::Normal);
    }

    #[test]
    fn test_get_verbosity_flags() {
        assert_eq!(options(&["antler", "-q"]).verbosity, Verbosity::Quiet);
        assert_eq!(options(&["antler", "--silent", "-v"]).verbosity, Verbosity::Silent);
        assert_eq!(options(&["antler", "--debug"]).verbosity, Verbosity::Debug);
        assert_eq!(options(&["antler", "-v"]).verbosity, Verbosity::Verbose);
    }

    #[test]
    fn test_options_targets_and_defines() {
        let opts = options(&[
            "antler", "compile", "-D", "version=1.2", "dist", "-Dmode=a=b", "-f", "x.xml",
        ]);
        assert_eq!(opts.targets, vec!["compile", "dist"]);
        assert_eq!(
            opts.defines,
            vec![
                ("version".to_string(), "1.2".to_string()),
                ("mode".to_string(), "a=b".to_string())
            ]
        );
        assert_eq!(opts.file, Some(PathBuf::from("x.xml")));
        assert!(!opts.find);
    }

    #[test]
    fn test_invalid_define_is_rejected() {
        let matches = build_command()
            .try_get_matches_from(["antler", "-D", "novalue"])
            .unwrap();
        assert!(Options::from_matches(&matches).is_err());
    }

    #[test]
    fn test_completions_shell_is_parsed() {
        assert_eq!(options(&["antler", "--completions", "bash"]).completions, Some(Shell::Bash));
        assert!(build_command()
            .try_get_matches_from(["antler", "--completions", "tcsh"])
            .is_err());
    }

    #[test]
    fn test_project_help_lists_targets() {
        let root = parse_document(
            r#"<project name="demo" default="dist">
                 <description>Demo project</description>
                 <target name="compile" description="Compile sources"/>
                 <target name="dist" depends="compile" description="Package"/>
                 <target name="helper"/>
               </project>"#,
            None,
        )
        .unwrap();
        let project = build_project(&root, None).unwrap();
        let help = format_project_help(&project);

        assert!(help.starts_with("Demo project\n"));
        assert!(help.contains(" compile  Compile sources\n"));
        assert!(help.contains("Other targets:\n\n helper\n"));
        assert!(help.ends_with("Default target: dist\n"));
    }
}
