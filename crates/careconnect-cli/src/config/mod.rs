//! CLI configuration management.
//!
//! ```text
//! Cli
//! ├── reqwest: ReqwestConfig   # Backend URL, timeout, user agent
//! ├── session: SessionConfig   # Re-check interval, token secret
//! ├── session_file: PathBuf    # Persistent credential slots
//! ├── log_format: LogFormat    # Text or JSON logs on stderr
//! └── command: Command         # What to do
//! ```
//!
//! All configuration can be provided via CLI arguments or environment variables.
//! Use `--help` to see all available options.

mod command;

use std::path::PathBuf;
use std::process;

use careconnect_core::session::SessionConfig;
use careconnect_reqwest::ReqwestConfig;
use clap::Parser;
pub use command::Command;

use crate::TRACING_TARGET_CONFIG;
use crate::telemetry::LogFormat;

/// Default location of the session file.
pub const DEFAULT_SESSION_FILE: &str = ".careconnect-session.json";

/// Complete CLI configuration.
#[derive(Debug, Clone, Parser)]
#[command(name = "careconnect")]
#[command(about = "Care Connect appointment client")]
#[command(version)]
pub struct Cli {
    /// Backend HTTP client configuration.
    #[clap(flatten)]
    pub reqwest: ReqwestConfig,

    /// Session gate configuration.
    #[clap(flatten)]
    pub session: SessionConfig,

    /// File holding the stored credential and cached profile
    #[arg(
        long = "session-file",
        env = "CARECONNECT_SESSION_FILE",
        default_value = DEFAULT_SESSION_FILE,
        global = true
    )]
    pub session_file: PathBuf,

    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    /// Format of the log lines written to stderr
    #[arg(
        long = "log-format",
        env = "CARECONNECT_LOG_FORMAT",
        value_enum,
        default_value_t = LogFormat::Text,
        global = true
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Loads environment variables from .env file (if enabled) and parses CLI arguments.
    ///
    /// The .env file is loaded before clap parses arguments so that its
    /// values act as environment defaults.
    pub fn init() -> Self {
        Self::load_dotenv();
        Self::parse()
    }

    /// Loads environment variables from .env file if the dotenv feature is enabled.
    #[cfg(feature = "dotenv")]
    fn load_dotenv() {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            eprintln!("Warning: failed to load .env file: {err}");
        }
    }

    /// No-op when dotenv feature is disabled.
    #[cfg(not(feature = "dotenv"))]
    fn load_dotenv() {}

    /// Logs configuration at debug level (no sensitive information).
    pub fn log(&self) {
        tracing::debug!(
            target: TRACING_TARGET_CONFIG,
            version = env!("CARGO_PKG_VERSION"),
            pid = process::id(),
            features = ?Self::enabled_features(),
            "Build information"
        );

        tracing::debug!(
            target: TRACING_TARGET_CONFIG,
            api_url = %self.reqwest.api_url,
            http_timeout_secs = self.reqwest.effective_timeout().as_secs(),
            recheck_interval_secs = self.session.recheck_interval().as_secs(),
            verify_signatures = self.session.token_secret.is_some(),
            session_file = %self.session_file.display(),
            log_format = ?self.log_format,
            command = self.command.name(),
            "Configuration loaded"
        );
    }

    /// Returns a list of enabled compile-time features.
    fn enabled_features() -> Vec<&'static str> {
        [cfg!(feature = "dotenv").then_some("dotenv")]
            .into_iter()
            .flatten()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["careconnect", "status"]).unwrap();
        assert_eq!(cli.session_file, PathBuf::from(DEFAULT_SESSION_FILE));
        assert_eq!(cli.reqwest.http_timeout, 30);
        assert_eq!(cli.session.recheck_interval_secs, 60);
        assert!(!cli.json);
        assert_eq!(cli.log_format, LogFormat::Text);
        assert!(matches!(cli.command, Command::Status { watch: false }));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "careconnect",
            "appointments",
            "--json",
            "--session-file",
            "/tmp/session.json",
            "--log-format",
            "json",
        ])
        .unwrap();

        assert!(cli.json);
        assert_eq!(cli.log_format, LogFormat::Json);
        assert_eq!(cli.session_file, PathBuf::from("/tmp/session.json"));
    }
}
