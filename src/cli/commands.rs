use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Framework adapter selection and dispatcher config generation for Ruby builds
#[derive(Parser, Debug)]
#[command(
    name = "rackpack",
    about = "Framework adapter selection and dispatcher config generation for Ruby builds",
    version,
    author,
    long_about = "rackpack reads a project's Gemfile.lock, picks the most specific framework \
                  adapter (Rack, Rails 2, Rails 3), resolves its default config vars and \
                  process types, and writes the http-dispatcher config the runtime uses to \
                  start the web process."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - suppress non-error output"
    )]
    pub quiet: bool,

    #[arg(long, global = true, help = "Emit logs as JSON")]
    pub log_json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Detect which framework adapter applies to a project",
        long_about = "Reads Gemfile.lock and reports the selected adapter along with every \
                      adapter whose detection matched.\n\n\
                      Examples:\n  \
                      rackpack detect\n  \
                      rackpack detect /path/to/app --format json"
    )]
    Detect(DetectArgs),

    #[command(
        about = "Resolve config vars, process types and web command",
        long_about = "Selects the adapter and folds its specialization chain into the final \
                      configuration.\n\n\
                      Examples:\n  \
                      rackpack resolve --format yaml\n  \
                      rackpack resolve --gem railties=3.2.1"
    )]
    Resolve(ResolveArgs),

    #[command(about = "Print the release document (YAML) for the build harness")]
    Release(ReleaseArgs),

    #[command(
        about = "Write the http-dispatcher config",
        long_about = "Writes .http-dispatcher.json into the project unless one already exists. \
                      APP_NAME must be set (or passed with --app-name).\n\n\
                      Examples:\n  \
                      APP_NAME=acme rackpack dispatcher\n  \
                      rackpack dispatcher --app-name acme --web-command 'bundle exec rackup'"
    )]
    Dispatcher(DispatcherArgs),

    #[command(about = "Resolve the adapter and install its dispatcher config")]
    Compile(CompileArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ProjectArgs {
    #[arg(
        value_name = "PATH",
        help = "Path to the project (defaults to current directory)"
    )]
    pub repository_path: Option<PathBuf>,

    #[arg(
        long = "gem",
        value_name = "NAME=VERSION",
        value_parser = parse_gem_override,
        help = "Treat a gem as locked at VERSION (repeatable, overrides Gemfile.lock)"
    )]
    pub gems: Vec<(String, String)>,
}

#[derive(Args, Debug, Clone)]
pub struct DispatcherInputs {
    #[arg(long, value_name = "NAME", help = "Application name (overrides APP_NAME)")]
    pub app_name: Option<String>,

    #[arg(
        long,
        value_name = "ENV",
        help = "Environment name (overrides RAILS_ENV/RACK_ENV, default production)"
    )]
    pub env_name: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct DetectArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    #[arg(short = 'f', long, value_enum, default_value = "human", help = "Output format")]
    pub format: OutputFormatArg,
}

#[derive(Args, Debug, Clone)]
pub struct ResolveArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    #[arg(short = 'f', long, value_enum, default_value = "human", help = "Output format")]
    pub format: OutputFormatArg,
}

#[derive(Args, Debug, Clone)]
pub struct ReleaseArgs {
    #[command(flatten)]
    pub project: ProjectArgs,
}

#[derive(Args, Debug, Clone)]
pub struct DispatcherArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    #[command(flatten)]
    pub inputs: DispatcherInputs,

    #[arg(
        long,
        value_name = "COMMAND",
        help = "Use this web command instead of resolving one from the adapter"
    )]
    pub web_command: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct CompileArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    #[command(flatten)]
    pub inputs: DispatcherInputs,

    #[arg(short = 'f', long, value_enum, default_value = "human", help = "Output format")]
    pub format: OutputFormatArg,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Json,
    Yaml,
    Human,
}

impl From<OutputFormatArg> for super::output::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => super::output::OutputFormat::Json,
            OutputFormatArg::Yaml => super::output::OutputFormat::Yaml,
            OutputFormatArg::Human => super::output::OutputFormat::Human,
        }
    }
}

fn parse_gem_override(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((name, version)) if !name.trim().is_empty() && !version.trim().is_empty() => {
            Ok((name.trim().to_string(), version.trim().to_string()))
        }
        _ => Err(format!(
            "Invalid gem override: {}. Expected NAME=VERSION, e.g. railties=3.2.1",
            s
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_args_verify() {
        CliArgs::command().debug_assert();
    }

    #[test]
    fn test_default_detect_args() {
        let args = CliArgs::parse_from(["rackpack", "detect"]);
        match args.command {
            Commands::Detect(detect_args) => {
                assert_eq!(detect_args.format, OutputFormatArg::Human);
                assert!(detect_args.project.repository_path.is_none());
                assert!(detect_args.project.gems.is_empty());
            }
            _ => panic!("Expected Detect command"),
        }
    }

    #[test]
    fn test_resolve_with_gem_overrides() {
        let args = CliArgs::parse_from([
            "rackpack",
            "resolve",
            "/tmp/app",
            "--gem",
            "railties=3.2.1",
            "--gem",
            "puma=1.6.3",
            "-f",
            "json",
        ]);
        match args.command {
            Commands::Resolve(resolve_args) => {
                assert_eq!(
                    resolve_args.project.repository_path,
                    Some(PathBuf::from("/tmp/app"))
                );
                assert_eq!(
                    resolve_args.project.gems,
                    vec![
                        ("railties".to_string(), "3.2.1".to_string()),
                        ("puma".to_string(), "1.6.3".to_string())
                    ]
                );
                assert_eq!(resolve_args.format, OutputFormatArg::Json);
            }
            _ => panic!("Expected Resolve command"),
        }
    }

    #[test]
    fn test_invalid_gem_override() {
        let result = CliArgs::try_parse_from(["rackpack", "resolve", "--gem", "railties"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_dispatcher_inputs() {
        let args = CliArgs::parse_from([
            "rackpack",
            "dispatcher",
            "--app-name",
            "acme",
            "--env-name",
            "staging",
            "--web-command",
            "bundle exec rackup",
        ]);
        match args.command {
            Commands::Dispatcher(dispatcher_args) => {
                assert_eq!(dispatcher_args.inputs.app_name.as_deref(), Some("acme"));
                assert_eq!(dispatcher_args.inputs.env_name.as_deref(), Some("staging"));
                assert_eq!(
                    dispatcher_args.web_command.as_deref(),
                    Some("bundle exec rackup")
                );
            }
            _ => panic!("Expected Dispatcher command"),
        }
    }

    #[test]
    fn test_verbose_and_quiet_conflict() {
        let result = CliArgs::try_parse_from(["rackpack", "-v", "-q", "detect"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args = CliArgs::parse_from(["rackpack", "compile", "--log-level", "debug"]);
        assert_eq!(args.log_level.as_deref(), Some("debug"));
    }
}
