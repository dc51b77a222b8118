use std::path::PathBuf;

use clap::{ArgGroup, Args, Subcommand};
use dstack::config::{FileConfigFactory, DEFAULT_PROFILE};

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod access;
pub mod config;
pub mod envinfo;
pub mod push;
pub mod version;

/// Settings shared by every command.
#[derive(Debug)]
pub struct Context {
    pub format: OutputFormat,
    pub config_path: Option<PathBuf>,
}

impl Context {
    pub fn config_factory(&self) -> FileConfigFactory {
        match &self.config_path {
            Some(path) => FileConfigFactory::with_path(path),
            None => FileConfigFactory::new(),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Manage profiles.
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Commit one object to a stack and push it.
    Push(PushArgs),
    /// Check that a profile may push to a stack.
    Access(AccessArgs),
    /// Show version information.
    Version(VersionArgs),
    /// Print build and environment diagnostics.
    Envinfo(EnvinfoArgs),
}

pub fn run(command: Command, context: &Context) -> CliResult<i32> {
    match command {
        Command::Config(command) => config::run(command, context),
        Command::Push(args) => push::run(args, context),
        Command::Access(args) => access::run(args, context),
        Command::Version(args) => version::run(args),
        Command::Envinfo(args) => envinfo::run(args, context),
    }
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// List profiles (tokens masked).
    List,
    /// Add a profile or replace one with the same name.
    Add(ConfigAddArgs),
    /// Remove a profile.
    Remove(ConfigRemoveArgs),
}

#[derive(Args, Debug)]
pub struct ConfigAddArgs {
    /// Profile name.
    #[arg(long, default_value = DEFAULT_PROFILE)]
    pub profile: String,
    /// User name on the server.
    #[arg(long)]
    pub user: String,
    /// API token.
    #[arg(long)]
    pub token: String,
    /// Server URL. Default: the public server.
    #[arg(long)]
    pub server: Option<String>,
}

#[derive(Args, Debug)]
pub struct ConfigRemoveArgs {
    /// Profile name.
    #[arg(long, default_value = DEFAULT_PROFILE)]
    pub profile: String,
}

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("payload").required(true).args(["file", "text", "json"])))]
pub struct PushArgs {
    /// Stack to push to; a leading '/' makes it absolute.
    pub stack: String,
    /// Commit a file; the content type follows the extension.
    #[arg(long, conflicts_with_all = ["text", "json"])]
    pub file: Option<PathBuf>,
    /// Commit a plain text string.
    #[arg(long, conflicts_with_all = ["file", "json"])]
    pub text: Option<String>,
    /// Commit a JSON document.
    #[arg(long, conflicts_with_all = ["file", "text"])]
    pub json: Option<String>,
    /// Attachment description.
    #[arg(long)]
    pub description: Option<String>,
    /// Attachment parameter as KEY=VALUE (repeatable).
    #[arg(long, value_name = "KEY=VALUE")]
    pub param: Vec<String>,
    /// Push message.
    #[arg(long)]
    pub message: Option<String>,
    /// Access level for the stack (e.g. public, private).
    #[arg(long)]
    pub access: Option<String>,
    /// Profile to push with.
    #[arg(long, default_value = DEFAULT_PROFILE)]
    pub profile: String,
    /// Skip the access check before pushing.
    #[arg(long)]
    pub no_check_access: bool,
    /// Request timeout (e.g. 30s, 500ms).
    #[arg(long, default_value = "30s")]
    pub timeout: String,
}

#[derive(Args, Debug)]
pub struct AccessArgs {
    /// Stack to check.
    pub stack: String,
    /// Profile to check with.
    #[arg(long, default_value = DEFAULT_PROFILE)]
    pub profile: String,
    /// Request timeout (e.g. 30s, 500ms).
    #[arg(long, default_value = "30s")]
    pub timeout: String,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

#[derive(Args, Debug, Default)]
pub struct EnvinfoArgs {}
