pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "metal-bench")]
#[command(about = "Compare server startup time with optimizations off and on")]
pub struct CliConfig {
    /// Path to a TOML bench configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Directory containing the server jar and its config file
    #[arg(long)]
    pub working_dir: Option<String>,

    /// Server jar, relative to the working directory
    #[arg(long)]
    pub jar: Option<String>,

    /// Java executable
    #[arg(long)]
    pub java: Option<String>,

    /// Server config file whose flags are toggled, relative to the working directory
    #[arg(long)]
    pub config_file: Option<String>,

    /// Seconds to wait for the startup line
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Runs per mode
    #[arg(long)]
    pub runs: Option<usize>,

    /// Leave the config with optimizations enabled instead of restoring it
    #[arg(long)]
    pub keep_config: bool,

    /// Write the full report as JSON
    #[arg(long)]
    pub json_out: Option<String>,

    /// Append one row per run to a CSV history file
    #[arg(long)]
    pub csv_out: Option<String>,

    /// Sample CPU and memory of the server process
    #[arg(long)]
    pub monitor: bool,

    /// Show what would run without starting the server
    #[arg(long)]
    pub dry_run: bool,

    /// Log as JSON lines on stderr
    #[arg(long)]
    pub log_json: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}
