//! Clap derive structures for the `hyypsync` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// hyypsync -- observe and control IDS Hyyp alarm panels
#[derive(Debug, Parser)]
#[command(
    name = "hyypsync",
    version,
    about = "Observe and control IDS Hyyp alarm panels from the command line",
    long_about = "Observe and control IDS Hyyp / ADT Secure Home alarm panels.\n\n\
        Shows partition state, zones and last events, arms and disarms\n\
        partitions, and bypasses zones.",
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
    /// Account profile to use
    #[arg(long, short = 'p', env = "HYYP_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Serve the account from a JSON fixture file (overrides profile)
    #[arg(long, env = "HYYP_FIXTURE", global = true)]
    pub fixture: Option<PathBuf>,

    /// Session token (overrides profile and keyring)
    #[arg(long, env = "HYYP_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "HYYP_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation and code prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Remote call timeout in seconds (overrides profile)
    #[arg(long, env = "HYYP_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
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
    /// Show the alarm state of every partition
    #[command(alias = "st")]
    Status,

    /// List zones and their bypass state
    #[command(alias = "z")]
    Zones(ZonesArgs),

    /// Show the last event reported by each partition
    Events,

    /// List exposed entities with their unique ids
    Entities,

    /// Arm a partition
    Arm(ArmArgs),

    /// Disarm a partition
    Disarm(PartitionArgs),

    /// Bypass or restore a zone
    Bypass(BypassArgs),

    /// Poll the account and print the status on every change
    Watch(WatchArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Shared Arguments ─────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct PartitionArgs {
    /// Partition id
    pub partition: String,

    /// Authorization code (falls back to the profile's code)
    #[arg(long, short = 'c')]
    pub code: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  READS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ZonesArgs {
    /// Only list zones of this partition
    #[arg(long)]
    pub partition: Option<String>,

    /// Only list bypassed zones
    #[arg(long)]
    pub bypassed: bool,
}

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Refresh period in seconds (overrides profile)
    #[arg(long, short = 'i')]
    pub interval: Option<u64>,

    /// Exit after this many updates
    #[arg(long, short = 'n')]
    pub count: Option<u32>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONTROL
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ArmArgs {
    #[command(subcommand)]
    pub command: ArmCommand,
}

#[derive(Debug, Subcommand)]
pub enum ArmCommand {
    /// Arm every zone
    Away(PartitionArgs),

    /// Arm with the partition's stay profile (night or home mode)
    #[command(alias = "night", alias = "home")]
    Stay(PartitionArgs),
}

#[derive(Debug, Args)]
pub struct BypassArgs {
    #[command(subcommand)]
    pub command: BypassCommand,
}

#[derive(Debug, Subcommand)]
pub enum BypassCommand {
    /// Bypass a zone so it is excluded from arming
    On(ZoneArgs),

    /// Restore a bypassed zone
    Off(ZoneArgs),
}

#[derive(Debug, Args)]
pub struct ZoneArgs {
    /// Partition id
    pub partition: String,

    /// Zone id
    pub zone: String,

    /// Authorization code (falls back to the profile's code)
    #[arg(long, short = 'c')]
    pub code: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current configuration (secrets masked)
    Show,

    /// Print the config file path
    Path,

    /// Store a session token in the system keyring
    SetToken {
        /// Profile name
        #[arg(long)]
        profile: Option<String>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
