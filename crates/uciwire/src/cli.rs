//! Clap derive structures for the `uciwire` CLI.
//!
//! Defines the command tree, global flags, and shared types.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// uciwire -- uci-style configuration editing over ubus JSON-RPC
#[derive(Debug, Parser)]
#[command(
    name = "uciwire",
    version,
    about = "Edit router UCI configuration over ubus JSON-RPC",
    long_about = "Reads and edits UCI configuration on a remote router through rpcd's\n\
        JSON-RPC endpoint. Mutations are staged locally, saved in one batch,\n\
        and optionally applied with automatic rollback unless confirmed.",
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
    /// Router profile to use
    #[arg(long, short = 'p', env = "UCIWIRE_PROFILE", global = true)]
    pub profile: Option<String>,

    /// JSON-RPC endpoint URL, e.g. https://192.168.1.1/ubus (overrides profile)
    #[arg(long, short = 'e', env = "UCIWIRE_ENDPOINT", global = true)]
    pub endpoint: Option<String>,

    /// Login user (overrides profile)
    #[arg(long, short = 'u', env = "UCIWIRE_USERNAME", global = true)]
    pub username: Option<String>,

    /// Login password
    #[arg(long, env = "UCIWIRE_PASSWORD", global = true, hide_env_values = true, hide = true)]
    pub password: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "UCIWIRE_OUTPUT",
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

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "UCIWIRE_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "UCIWIRE_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// `uci show` style lines (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
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
    /// Show a configuration or one of its sections
    #[command(alias = "s")]
    Show(ShowArgs),

    /// Print a single option value (or a section's type)
    Get(GetArgs),

    /// Set options, or create a named section with <config>.<section>=<type>
    Set(SetArgs),

    /// Delete a section or an option
    #[command(alias = "del", alias = "rm")]
    Delete(DeleteArgs),

    /// Add a section
    Add(AddArgs),

    /// Append a value to a list option
    AddList(ListValueArgs),

    /// Remove a value from a list option
    DelList(ListValueArgs),

    /// Move a section before or after another one
    Reorder(ReorderArgs),

    /// Show saved but unapplied changes on the router
    Changes(ChangesArgs),

    /// Apply saved changes with automatic rollback unless confirmed
    Apply(ApplyArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Shared Commit Arguments ──────────────────────────────────────────

/// Follow-up for mutation commands once the save succeeded.
#[derive(Debug, Args)]
pub struct CommitArgs {
    /// Apply and confirm the saved changes afterwards
    #[arg(long, short = 'a')]
    pub apply: bool,

    /// Rollback window for --apply, in seconds
    #[arg(long, value_name = "SECS", requires = "apply")]
    pub rollback_timeout: Option<u64>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  READ
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// <config> or <config>.<section>; sections accept @type[n]
    #[arg(value_name = "PATH")]
    pub path: String,

    /// Only list sections of this type
    #[arg(long, short = 't')]
    pub section_type: Option<String>,
}

#[derive(Debug, Args)]
pub struct GetArgs {
    /// <config>.<section>[.<option>]
    #[arg(value_name = "PATH")]
    pub path: String,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  MUTATIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct SetArgs {
    /// One or more <config>.<section>.<option>=<value> assignments
    #[arg(value_name = "ASSIGNMENT", required = true)]
    pub assignments: Vec<String>,

    #[command(flatten)]
    pub commit: CommitArgs,
}

#[derive(Debug, Args)]
pub struct DeleteArgs {
    /// <config>.<section>[.<option>]
    #[arg(value_name = "PATH")]
    pub path: String,

    #[command(flatten)]
    pub commit: CommitArgs,
}

#[derive(Debug, Args)]
pub struct AddArgs {
    /// Configuration to add the section to
    pub config: String,

    /// Section type
    #[arg(value_name = "TYPE")]
    pub section_type: String,

    /// Section name (anonymous if omitted)
    #[arg(long, short = 'n')]
    pub name: Option<String>,

    /// Initial <option>=<value> pairs
    #[arg(value_name = "OPTION=VALUE")]
    pub options: Vec<String>,

    #[command(flatten)]
    pub commit: CommitArgs,
}

#[derive(Debug, Args)]
pub struct ListValueArgs {
    /// <config>.<section>.<option>=<value>
    #[arg(value_name = "ASSIGNMENT")]
    pub assignment: String,

    #[command(flatten)]
    pub commit: CommitArgs,
}

#[derive(Debug, Args)]
#[command(group(clap::ArgGroup::new("anchor").args(["before", "after"])))]
pub struct ReorderArgs {
    /// <config>.<section> to move
    #[arg(value_name = "PATH")]
    pub path: String,

    /// Place before this section
    #[arg(long, value_name = "SECTION")]
    pub before: Option<String>,

    /// Place after this section
    #[arg(long, value_name = "SECTION")]
    pub after: Option<String>,

    #[command(flatten)]
    pub commit: CommitArgs,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CHANGES / APPLY
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ChangesArgs {
    /// Only show changes of this configuration
    pub config: Option<String>,
}

#[derive(Debug, Args)]
pub struct ApplyArgs {
    /// Rollback window in seconds (profile's apply_timeout if omitted)
    #[arg(long, short = 't', value_name = "SECS")]
    pub timeout: Option<u64>,
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

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },

    /// Store a profile's password in the system keyring
    SetPassword {
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
