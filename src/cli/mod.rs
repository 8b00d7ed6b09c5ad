pub mod commands;
pub mod output;

pub use commands::{
    CliArgs, Commands, CompileArgs, DetectArgs, DispatcherArgs, ProjectArgs, ReleaseArgs,
    ResolveArgs,
};
pub use output::{OutputFormat, OutputFormatter};
