use rackpack::cli::commands::{
    CliArgs, Commands, CompileArgs, DetectArgs, DispatcherArgs, DispatcherInputs, ProjectArgs,
    ReleaseArgs, ResolveArgs,
};
use rackpack::cli::output::OutputFormatter;
use rackpack::dispatcher::DispatcherConfigEmitter;
use rackpack::util::logging::{init_logging, parse_level, LoggingConfig};
use rackpack::{
    AdapterRegistry, BuildPipeline, FileSystem, PackError, RackpackConfig, RealFileSystem,
    ReleaseDocument, StaticOracle, VERSION,
};

use clap::Parser;
use std::env;
use std::path::PathBuf;
use tracing::{debug, error, info, Level};

fn main() {
    let args = CliArgs::parse();
    init_logging_from_args(&args);

    debug!("rackpack v{} starting", VERSION);
    debug!("Arguments: {:?}", args);

    let exit_code = match &args.command {
        Commands::Detect(detect_args) => handle_detect(detect_args),
        Commands::Resolve(resolve_args) => handle_resolve(resolve_args),
        Commands::Release(release_args) => handle_release(release_args),
        Commands::Dispatcher(dispatcher_args) => handle_dispatcher(dispatcher_args),
        Commands::Compile(compile_args) => handle_compile(compile_args),
    };

    std::process::exit(exit_code);
}

fn init_logging_from_args(args: &CliArgs) {
    let mut config = LoggingConfig::from_env().json(args.log_json);

    if let Some(level_str) = &args.log_level {
        config = config.level(parse_level(level_str));
    } else if args.verbose {
        config = config.level(Level::DEBUG);
    } else if args.quiet {
        config = config.level(Level::ERROR);
    }

    init_logging(config);
}

/// Resolves and validates the project directory
fn project_root(fs: &dyn FileSystem, project: &ProjectArgs) -> Result<PathBuf, i32> {
    let repo_path = match &project.repository_path {
        Some(path) => path.clone(),
        None => match env::current_dir() {
            Ok(dir) => dir,
            Err(e) => {
                error!("Failed to get current directory: {}", e);
                return Err(1);
            }
        },
    };

    debug!("Repository path: {}", repo_path.display());

    if !fs.exists(&repo_path) {
        error!("Repository path does not exist: {}", repo_path.display());
        return Err(1);
    }

    if !fs.is_dir(&repo_path) {
        error!(
            "Repository path is not a directory: {}",
            repo_path.display()
        );
        return Err(1);
    }

    match repo_path.canonicalize() {
        Ok(path) => {
            debug!("Canonicalized repository path: {}", path.display());
            Ok(path)
        }
        Err(e) => {
            error!("Failed to canonicalize repository path: {}", e);
            Err(1)
        }
    }
}

fn gem_overrides(project: &ProjectArgs) -> StaticOracle {
    project
        .gems
        .iter()
        .map(|(name, version)| (name.as_str(), version.as_str()))
        .collect()
}

/// Loads config from the environment and applies command line overrides
fn load_config(inputs: &DispatcherInputs) -> Result<RackpackConfig, i32> {
    let default_config = RackpackConfig::default();
    let config = RackpackConfig {
        app_name: inputs
            .app_name
            .clone()
            .unwrap_or(default_config.app_name),
        env_name: inputs.env_name.clone().or(default_config.env_name),
        ..default_config
    };

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        eprintln!("\nPlease check your environment variables and command-line arguments.");
        return Err(1);
    }

    Ok(config)
}

fn report_error(e: &PackError) -> i32 {
    if e.is_recoverable() {
        error!("{}; use a generic Ruby build instead", e);
    } else {
        error!("{}", e);
    }
    1
}

fn print_output(output: anyhow::Result<String>) -> i32 {
    match output {
        Ok(text) => {
            print!("{}", text);
            if !text.ends_with('\n') {
                println!();
            }
            0
        }
        Err(e) => {
            error!("Failed to format output: {:#}", e);
            1
        }
    }
}

fn handle_detect(args: &DetectArgs) -> i32 {
    info!("Starting adapter detection");

    let fs = RealFileSystem;
    let root = match project_root(&fs, &args.project) {
        Ok(root) => root,
        Err(code) => return code,
    };

    let registry = AdapterRegistry::with_defaults();
    let pipeline =
        BuildPipeline::new(&fs, &registry, &root).with_overrides(gem_overrides(&args.project));

    let report = match pipeline.detect() {
        Ok(report) => report,
        Err(e) => return report_error(&e),
    };

    if !report.is_detected() {
        info!("No adapter matched {}", root.display());
    }

    print_output(OutputFormatter::new(args.format.into()).format_detection(&report))
}

fn handle_resolve(args: &ResolveArgs) -> i32 {
    let fs = RealFileSystem;
    let root = match project_root(&fs, &args.project) {
        Ok(root) => root,
        Err(code) => return code,
    };

    let registry = AdapterRegistry::with_defaults();
    let pipeline =
        BuildPipeline::new(&fs, &registry, &root).with_overrides(gem_overrides(&args.project));

    match pipeline.resolve() {
        Ok(resolved) => {
            print_output(OutputFormatter::new(args.format.into()).format_resolved(&resolved))
        }
        Err(e) => report_error(&e),
    }
}

fn handle_release(args: &ReleaseArgs) -> i32 {
    let fs = RealFileSystem;
    let root = match project_root(&fs, &args.project) {
        Ok(root) => root,
        Err(code) => return code,
    };

    let registry = AdapterRegistry::with_defaults();
    let pipeline =
        BuildPipeline::new(&fs, &registry, &root).with_overrides(gem_overrides(&args.project));

    match pipeline.resolve() {
        Ok(resolved) => {
            print_output(OutputFormatter::format_release(&ReleaseDocument::from(&resolved)))
        }
        Err(e) => report_error(&e),
    }
}

fn handle_dispatcher(args: &DispatcherArgs) -> i32 {
    let fs = RealFileSystem;
    let root = match project_root(&fs, &args.project) {
        Ok(root) => root,
        Err(code) => return code,
    };
    let config = match load_config(&args.inputs) {
        Ok(config) => config,
        Err(code) => return code,
    };

    let registry = AdapterRegistry::with_defaults();
    let pipeline =
        BuildPipeline::new(&fs, &registry, &root).with_overrides(gem_overrides(&args.project));

    let outcome = match &args.web_command {
        Some(command) => DispatcherConfigEmitter::new(&fs)
            .with_file_name(config.dispatcher_file.clone())
            .install(
                &root,
                command,
                &config.app_name,
                config.env_name.as_deref(),
            ),
        None => pipeline
            .resolve()
            .and_then(|resolved| pipeline.install_dispatcher(&resolved, &config)),
    };

    match outcome {
        Ok(outcome) => {
            println!("{}", outcome.message());
            0
        }
        Err(e) => report_error(&e),
    }
}

fn handle_compile(args: &CompileArgs) -> i32 {
    info!("Starting compile");

    let fs = RealFileSystem;
    let root = match project_root(&fs, &args.project) {
        Ok(root) => root,
        Err(code) => return code,
    };
    let config = match load_config(&args.inputs) {
        Ok(config) => config,
        Err(code) => return code,
    };

    let registry = AdapterRegistry::with_defaults();
    let pipeline =
        BuildPipeline::new(&fs, &registry, &root).with_overrides(gem_overrides(&args.project));

    match pipeline.compile(&config) {
        Ok(summary) => {
            print_output(OutputFormatter::new(args.format.into()).format_compile(&summary))
        }
        Err(e) => report_error(&e),
    }
}
