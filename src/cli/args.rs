//! CLI argument definitions using clap derive

use crate::error::Repository;
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Sur - sublet repository client for subtle
///
/// Search, install, build and submit sublets from the sublet repository.
#[derive(Parser, Debug)]
#[command(name = "sur")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "SUR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Install sublets from the repository or from package files
    Install(InstallArgs),

    /// Uninstall sublets
    Uninstall(InstallArgs),

    /// Create a sublet package from a specification
    Build(BuildArgs),

    /// Submit a sublet package to the repository
    Submit(SubmitArgs),

    /// Mark a repository sublet for review
    Annotate(AnnotateArgs),

    /// Search for sublets by name, pattern or tag
    Query(QueryArgs),

    /// List local or remote sublets
    List(ListArgs),

    /// Rebuild the local or remote cache
    Update(UpdateArgs),

    /// Upgrade installed sublets to newer versions
    Upgrade(UpgradeArgs),

    /// Show the notes of an installed sublet
    Notes(NotesArgs),

    /// Change the load order of installed sublets
    Reorder,

    /// Show or edit configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments shared by install and uninstall
#[derive(Args, Debug)]
pub struct InstallArgs {
    /// Sublet names, tags or package files
    #[arg(required = true)]
    pub names: Vec<String>,

    /// Only this exact version
    #[arg(short, long)]
    pub pin: Option<String>,

    /// Also match names against tags
    #[arg(short, long)]
    pub tags: bool,

    /// Reload sublets in subtle afterwards
    #[arg(short, long)]
    pub reload: bool,
}

/// Arguments for the build command
#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Specification file
    pub spec: PathBuf,

    /// Directory for the package (defaults to current directory)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the submit command
#[derive(Args, Debug)]
pub struct SubmitArgs {
    /// Sublet package (.sublet)
    pub package: PathBuf,
}

/// Arguments for the annotate command
#[derive(Args, Debug)]
pub struct AnnotateArgs {
    /// Sublet name
    pub name: String,

    /// Only this exact version
    #[arg(short, long)]
    pub pin: Option<String>,
}

/// Arguments for the query command
#[derive(Args, Debug)]
pub struct QueryArgs {
    /// Name, pattern or tag to look for
    pub query: String,

    /// Repository to search
    #[arg(long, value_enum, default_value = "remote")]
    pub repo: RepositoryArg,

    /// Only this exact version
    #[arg(short, long)]
    pub pin: Option<String>,

    /// Treat the query as a case-insensitive regular expression
    #[arg(short = 'e', long)]
    pub regex: bool,

    /// Also match the query against tags
    #[arg(short, long)]
    pub tags: bool,

    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the list command
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Repository to list
    #[arg(value_enum, default_value = "local")]
    pub repo: RepositoryArg,

    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the update command
#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Cache to rebuild
    #[arg(value_enum, default_value = "remote")]
    pub repo: RepositoryArg,
}

/// Arguments for the upgrade command
#[derive(Args, Debug)]
pub struct UpgradeArgs {
    /// Upgrade without asking
    #[arg(short, long)]
    pub yes: bool,

    /// Reload sublets in subtle afterwards
    #[arg(short, long)]
    pub reload: bool,
}

/// Arguments for the notes command
#[derive(Args, Debug)]
pub struct NotesArgs {
    /// Sublet name
    pub name: String,
}

/// Arguments for the config command
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Subcommand for config
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., repository.url)
        key: String,
        /// Value to set
        value: String,
    },
}

/// Arguments for the completions command
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}

/// Which cache a command works on
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RepositoryArg {
    /// Installed sublets
    Local,
    /// Sublets offered by the repository
    Remote,
}

impl From<RepositoryArg> for Repository {
    fn from(arg: RepositoryArg) -> Self {
        match arg {
            RepositoryArg::Local => Repository::Local,
            RepositoryArg::Remote => Repository::Remote,
        }
    }
}

/// Output format for listings
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable listing
    Table,
    /// JSON output
    Json,
    /// Simple text (one per line)
    Plain,
}
