//! Clap derive structures for the `nce` CLI.
//!
//! Only depends on clap + clap_complete so `build.rs` can compile it for
//! man page generation.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// nce -- drive LWM2M devices through the 1NCE management API
#[derive(Debug, Parser)]
#[command(
    name = "nce",
    version,
    about = "Drive LWM2M devices through the 1NCE management API",
    long_about = "Authenticate against the 1NCE management API, provision a device's\n\
        pre-shared key, and run LWM2M actions (read, write, execute, observe)\n\
        against its resources. Action results are polled until the device\n\
        answers and LWM2M TLV payloads are decoded for display.",
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
    /// Device identifier (ICCID) to act on
    #[arg(long, short = 'd', env = "NCE_DEVICE", global = true)]
    pub device: Option<String>,

    /// Config file (defaults to the platform config directory)
    #[arg(long, env = "NCE_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// File holding the basic client credential
    #[arg(long, global = true, value_name = "PATH")]
    pub basic_token_file: Option<PathBuf>,

    /// File the access token is written to and read from
    #[arg(long, global = true, value_name = "PATH")]
    pub access_token_file: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "NCE_OUTPUT",
        default_value = "text",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color in status lines
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress status lines
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// HTTP timeout in seconds
    #[arg(long, env = "NCE_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Maximum number of status requests per action
    #[arg(
        long,
        global = true,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub poll_attempts: Option<u32>,

    /// Pause between status requests, in milliseconds
    #[arg(long, global = true)]
    pub poll_interval_ms: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text (default)
    Text,
    /// Pretty-printed JSON
    Json,
    /// YAML
    Yaml,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if stderr is a terminal)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Exchange the basic credential for an access token
    #[command(alias = "login")]
    Auth,

    /// Provision the device's pre-shared key
    Provision(ProvisionArgs),

    /// Read a resource
    Read(ResourceArgs),

    /// Write a value to a resource
    Write(WriteArgs),

    /// Execute a resource
    #[command(alias = "execute")]
    Exec(ResourceArgs),

    /// Start or stop observing a resource
    Observe(ObserveArgs),

    /// Run any action by name
    #[command(name = "do")]
    Do(DoArgs),

    /// Inspect the stored access token
    Token(TokenArgs),

    /// Manage configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  PROVISIONING
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ProvisionArgs {
    /// Hex-encoded pre-shared key (defaults to `default_psk` from config)
    #[arg(long, value_name = "HEX")]
    pub secret: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  ACTIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ResourceArgs {
    /// Resource address, e.g. /3/0/0
    pub resource: String,
}

#[derive(Debug, Args)]
pub struct WriteArgs {
    /// Resource address, e.g. /1/0/1
    pub resource: String,

    /// Value to write (omitted from the request when absent or empty)
    pub value: Option<String>,
}

#[derive(Debug, Args)]
pub struct ObserveArgs {
    #[command(subcommand)]
    pub command: ObserveCommand,
}

#[derive(Debug, Subcommand)]
pub enum ObserveCommand {
    /// Start observing a resource
    Start(ResourceArgs),

    /// Stop observing a resource
    Stop(ResourceArgs),
}

#[derive(Debug, Args)]
pub struct DoArgs {
    /// Action to perform
    pub action: ActionArg,

    /// Resource address
    pub resource: String,

    /// Value for write actions
    pub value: Option<String>,
}

/// Action names as the API spells them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ActionArg {
    Read,
    Write,
    #[value(alias = "exec")]
    Execute,
    ObserveStart,
    ObserveStop,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  TOKEN
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct TokenArgs {
    #[command(subcommand)]
    pub command: TokenCommand,
}

#[derive(Debug, Subcommand)]
pub enum TokenCommand {
    /// Report whether an access token is stored
    Status,
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
    /// Display the effective configuration
    Show,

    /// Print the config file path
    Path,

    /// Write a config file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Store the basic credential in the system keyring
    SetCredential,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
