// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Command-line arguments for `waitserve`.
///
/// Flags override the corresponding values from `--config`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "waitserve",
    version,
    about = "Serve a directory over HTTP; clients can long-poll for file changes.",
    long_about = None
)]
pub struct CliArgs {
    /// Directory to serve (not recursive for change tracking).
    #[arg(value_name = "ROOT", env = "WAITSERVE_ROOT")]
    pub root: Option<PathBuf>,

    /// Path to an optional config file (TOML).
    #[arg(long, value_name = "PATH", env = "WAITSERVE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Address to bind to.
    #[arg(short, long, value_name = "ADDR")]
    pub bind: Option<String>,

    /// Port to listen on.
    #[arg(short, long)]
    pub port: Option<u16>,

    /// URL path prefix stripped before resolving files under ROOT.
    #[arg(long, value_name = "PREFIX")]
    pub prefix: Option<String>,

    /// Give up on a long-poll after this many seconds (0 = never).
    #[arg(long, value_name = "SECS")]
    pub wait_timeout: Option<u64>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `WAITSERVE_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_root_and_overrides() {
        let args = CliArgs::try_parse_from([
            "waitserve",
            "./site",
            "--port",
            "9000",
            "--prefix",
            "/static/",
            "--log-level",
            "debug",
        ])
        .unwrap();

        assert_eq!(args.root, Some(PathBuf::from("./site")));
        assert_eq!(args.port, Some(9000));
        assert_eq!(args.prefix.as_deref(), Some("/static/"));
        assert!(matches!(args.log_level, Some(LogLevel::Debug)));
        assert!(args.bind.is_none());
    }
}
