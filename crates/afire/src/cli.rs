//! Clap derive structures for the `afire` CLI.
//!
//! Defines the command tree, global flags, and shared value enums.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// afire -- control AFIRE fireplaces through the vendor cloud
#[derive(Debug, Parser)]
#[command(
    name = "afire",
    version,
    about = "Control AFIRE fireplaces from the command line",
    long_about = "Lists the fireplaces bound to an AFIRE cloud account, reads their\n\
        state, and sends power, flame, and lighting commands.",
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
    #[arg(long, short = 'p', env = "AFIRE_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Cloud base URL (overrides profile)
    #[arg(long, env = "AFIRE_BASE_URL", global = true, hide = true)]
    pub base_url: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "AFIRE_OUTPUT",
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

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "AFIRE_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Plain text, one value per line (scripting)
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

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OnOff {
    On,
    Off,
}

impl OnOff {
    pub fn is_on(self) -> bool {
        self == Self::On
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum EffectArg {
    Smooth,
    Fade1,
    Fade2,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List fireplaces bound to the account
    #[command(alias = "ls")]
    Devices,

    /// Show one fireplace in detail
    Device(DeviceArg),

    /// Turn a fireplace on or off
    Power(SwitchArgs),

    /// Turn the RGB LED bank on or off
    Rgb(SwitchArgs),

    /// Turn the amber LED bank on or off
    Amber(SwitchArgs),

    /// Set flame height (0-5)
    Flame(LevelArgs),

    /// Set flame speed (0-5)
    Speed(LevelArgs),

    /// Set the RGB bank to the nearest palette colour
    Color(ColorArgs),

    /// Start a light effect
    Effect(EffectArgs),

    /// Switch the RGB light off
    LightOff(DeviceArg),

    /// Stream refresh results until interrupted
    Watch(WatchArgs),

    /// Validate credentials and list discovered fireplaces
    Login,

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Device commands ──────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct DeviceArg {
    /// Device ID or name
    pub device: String,
}

#[derive(Debug, Args)]
pub struct SwitchArgs {
    /// Device ID or name
    pub device: String,

    /// Desired state
    pub state: OnOff,
}

#[derive(Debug, Args)]
pub struct LevelArgs {
    /// Device ID or name
    pub device: String,

    /// Level between 0 and 5
    #[arg(value_parser = clap::value_parser!(i64).range(0..=5))]
    pub level: i64,
}

#[derive(Debug, Args)]
pub struct ColorArgs {
    /// Device ID or name
    pub device: String,

    /// Red (0-255)
    pub red: u8,

    /// Green (0-255)
    pub green: u8,

    /// Blue (0-255)
    pub blue: u8,
}

#[derive(Debug, Args)]
pub struct EffectArgs {
    /// Device ID or name
    pub device: String,

    /// Effect to start
    pub effect: EffectArg,
}

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Polling interval in seconds (overrides profile)
    #[arg(long, short = 'i', value_parser = clap::value_parser!(u64).range(1..))]
    pub interval: Option<u64>,

    /// Stop after this many refreshes
    #[arg(long, short = 'n')]
    pub count: Option<usize>,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current configuration (passwords redacted)
    Show,

    /// Store the profile's password in the system keyring
    SetPassword,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
