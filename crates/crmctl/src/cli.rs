//! Clap derive structures for the `crmctl` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crmctl_core::{LeadStatus, Limit};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// crmctl -- admin console for the CRM backend
#[derive(Debug, Parser)]
#[command(
    name = "crmctl",
    version,
    about = "Administer CRM users, roles, leads and pipelines from the command line",
    long_about = "Admin console for the CRM backend.\n\n\
        Lists, creates, edits and deletes users, roles, contacts, leads,\n\
        pipelines, stages and filters, and drives the lead board.",
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
    /// Backend profile to use
    #[arg(long, short = 'p', env = "CRMCTL_PROFILE", global = true)]
    pub profile: Option<String>,

    /// API root URL (overrides profile)
    #[arg(long, short = 'u', env = "CRMCTL_BASE_URL", global = true)]
    pub base_url: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "CRMCTL_OUTPUT",
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

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "CRMCTL_TIMEOUT", global = true)]
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
    /// Plain text, one id per line (scripting)
    Plain,
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
    /// Sign in and save the session
    Login(LoginArgs),

    /// Sign out and forget the saved session
    Logout,

    /// Show the signed-in user
    Whoami,

    /// Manage users
    #[command(alias = "user")]
    Users(RecordArgs),

    /// Manage roles
    #[command(alias = "role")]
    Roles(RecordArgs),

    /// Manage contacts
    #[command(alias = "contact")]
    Contacts(RecordArgs),

    /// Manage leads and the lead board
    #[command(alias = "lead")]
    Leads(LeadsArgs),

    /// Manage pipelines
    #[command(alias = "pipeline")]
    Pipelines(RecordArgs),

    /// Manage pipeline stages
    #[command(alias = "stage")]
    Stages(StagesArgs),

    /// Manage lead sources, categories and tags
    #[command(alias = "filter")]
    Filters(RecordArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Session ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Login email (defaults to the profile's)
    pub email: Option<String>,

    /// Passwordless admin sign-in
    #[arg(long)]
    pub admin: bool,

    /// Mark an admin sign-in as coming from the client page
    #[arg(long, requires = "admin")]
    pub client_page: bool,
}

// ── Shared Record Arguments ──────────────────────────────────────────

/// Paging, filtering and sorting for list commands.
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Page number (1-based)
    #[arg(long)]
    pub page: Option<u32>,

    /// Page size, or "all"
    #[arg(long, short = 'l')]
    pub limit: Option<Limit>,

    /// Server-side filter, KEY=VALUE (repeatable)
    #[arg(long = "filter", short = 'f', value_name = "KEY=VALUE")]
    pub filters: Vec<String>,

    /// Sort the page by a column key
    #[arg(long, short = 's', value_name = "KEY")]
    pub sort: Option<String>,

    /// Reverse the sort order
    #[arg(long, requires = "sort")]
    pub desc: bool,
}

/// Record values for create and update.
#[derive(Debug, Args)]
pub struct WriteArgs {
    /// Field values as a JSON object
    #[arg(long, short = 'd', conflicts_with = "from_file")]
    pub data: Option<String>,

    /// Read field values from a JSON file
    #[arg(long, short = 'F')]
    pub from_file: Option<PathBuf>,

    /// Single field, KEY=VALUE; VALUE is parsed as JSON when it can be (repeatable)
    #[arg(long = "set", value_name = "KEY=VALUE")]
    pub set: Vec<String>,
}

#[derive(Debug, Subcommand)]
pub enum RecordCommand {
    /// List one page of records
    #[command(alias = "ls")]
    List(ListArgs),

    /// Show one record
    Get {
        /// Record id
        id: String,
    },

    /// Create a record
    Create(WriteArgs),

    /// Update a record; unset fields keep their current value
    Update {
        /// Record id
        id: String,

        #[command(flatten)]
        values: WriteArgs,
    },

    /// Delete a record
    #[command(alias = "rm")]
    Delete {
        /// Record id
        id: String,
    },

    /// Show the row actions available for a record
    Actions {
        /// Record id
        id: String,
    },
}

#[derive(Debug, Args)]
pub struct RecordArgs {
    #[command(subcommand)]
    pub command: RecordCommand,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  LEADS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct LeadsArgs {
    #[command(subcommand)]
    pub command: LeadsCommand,
}

#[derive(Debug, Subcommand)]
pub enum LeadsCommand {
    #[command(flatten)]
    Record(RecordCommand),

    /// Show the lead board of a pipeline
    Board {
        /// Pipeline id
        pipeline: String,
    },

    /// Move a lead to another stage
    Move {
        /// Lead id
        lead: String,

        /// Target stage id
        stage: String,
    },

    /// Open or close a lead
    Status {
        /// Lead id
        lead: String,

        /// open or closed
        status: LeadStatus,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  STAGES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct StagesArgs {
    #[command(subcommand)]
    pub command: StagesCommand,
}

#[derive(Debug, Subcommand)]
pub enum StagesCommand {
    #[command(flatten)]
    Record(RecordCommand),

    /// Put a stage at a board position
    Reorder {
        /// Stage id
        stage: String,

        /// Zero-based column index
        index: usize,
    },
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
    /// Create the config file with guided setup
    Init,

    /// Display the current configuration
    Show,

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name
        name: String,
    },

    /// Store a profile's password in the system keyring
    SetPassword {
        /// Profile name (defaults to the active profile)
        #[arg(long)]
        profile: Option<String>,
    },
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
