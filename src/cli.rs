use std::path::PathBuf;

use clap::Parser;

use crate::types::LogLevel;

#[derive(Parser, Debug)]
#[command(
    name = "immich-smart-albums",
    version,
    about = "Keep Immich albums filled with the results of saved metadata searches"
)]
pub struct Cli {
    /// Path to the TOML configuration file
    #[arg(short = 'c', long, env = "SMART_ALBUMS_CONFIG", default_value = "config.toml")]
    pub config: PathBuf,

    /// Immich API key, overriding `api_key` in the config file.
    /// Prefer the IMMICH_API_KEY environment variable; flags are visible in
    /// process listings.
    #[arg(long, env = "IMMICH_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Log level (RUST_LOG takes precedence when set)
    #[arg(long, value_enum, default_value = "info")]
    pub log_level: LogLevel,

    /// Run a single sync pass over all albums and exit
    #[arg(long)]
    pub once: bool,

    /// Send readiness and status notifications to systemd
    #[arg(long)]
    pub notify_systemd: bool,
}
