//! Clap derive structures for the `printdesk` CLI.
//!
//! Defines the command tree and global flags. Shared with `build.rs` for
//! man page generation, so it depends on clap + clap_complete only.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// printdesk -- talk to a print-service backend from the command line
#[derive(Debug, Parser)]
#[command(
    name = "printdesk",
    version,
    about = "Query and control a printdesk print-service backend",
    long_about = "Resolve the backend address, run CRUD requests against its REST API,\n\
        follow the live status/log feed and drive the local print service.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Directory holding config.toml and the persisted base URL
    #[arg(long, env = "PRINTDESK_CONFIG_DIR", global = true)]
    pub config_dir: Option<PathBuf>,

    /// Fallback API base URL (a persisted override still wins)
    #[arg(long, global = true)]
    pub api_base: Option<String>,

    /// Output format for response bodies
    #[arg(long, short = 'o', default_value = "json", global = true)]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show or change the backend base URL
    Url(UrlArgs),

    /// GET a resource collection
    Get(QueryArgs),

    /// POST a JSON body
    Create(BodyArgs),

    /// PUT a JSON body
    Update(BodyArgs),

    /// DELETE a resource
    #[command(alias = "rm")]
    Delete(QueryArgs),

    /// Follow the live status and log feed
    Watch(WatchArgs),

    /// Start, stop or restart an OS service
    #[command(alias = "svc")]
    Service(ServiceArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── url ──────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct UrlArgs {
    #[command(subcommand)]
    pub command: UrlCommand,
}

#[derive(Debug, Subcommand)]
pub enum UrlCommand {
    /// Print the resolved base URL and where it comes from
    Show,

    /// Persist a base URL override
    Set {
        /// Base URL (e.g. http://192.168.1.20:4000)
        url: String,
    },

    /// Remove the override so the configured fallback applies
    Clear,

    /// Ask the local bridge where the server listens and persist it
    Discover,
}

// ── Resource commands ────────────────────────────────────────────────

/// Endpoint selection shared by every resource command.
#[derive(Debug, Args)]
pub struct EndpointArgs {
    /// Endpoint path (e.g. /api/printers)
    pub path: String,

    /// Target the print service instead of the main API
    #[arg(long)]
    pub print: bool,
}

#[derive(Debug, Args)]
pub struct QueryArgs {
    #[command(flatten)]
    pub endpoint: EndpointArgs,

    /// Query parameter (repeatable)
    #[arg(long = "query", short = 'q', value_name = "KEY=VALUE")]
    pub query: Vec<String>,
}

#[derive(Debug, Args)]
pub struct BodyArgs {
    #[command(flatten)]
    pub endpoint: EndpointArgs,

    /// Inline JSON body
    #[arg(long, short = 'd', conflicts_with = "from_file")]
    pub data: Option<String>,

    /// Read the JSON body from a file
    #[arg(long, short = 'F')]
    pub from_file: Option<PathBuf>,
}

// ── watch ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Stop after this many seconds (default: until Ctrl-C)
    #[arg(long = "for", value_name = "SECS")]
    pub duration: Option<u64>,
}

// ── service ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ServiceArgs {
    /// OS service name
    pub name: String,

    /// Operation to run
    pub action: ServiceAction,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ServiceAction {
    Start,
    Stop,
    Restart,
}

// ── completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
