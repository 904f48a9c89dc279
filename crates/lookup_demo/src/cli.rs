//! Command-line interface for `lookup-demo`.
//!
//! # Examples
//!
//! ```bash
//! # Type "germ", wait for the remote catalog, pick the first result
//! lookup-demo
//!
//! # Print every frame and make the "spa" query fail
//! lookup-demo --frames --fail-on spa --script '<focus>spa<wait:500><blur><wait:250>'
//!
//! # Load tunables from a file
//! lookup-demo --config lookup.toml -vv
//! ```

use std::path::PathBuf;

use clap::{ArgAction, Parser};

/// The script used when none is given.
pub const DEFAULT_SCRIPT: &str = "<focus>germ<wait:500><down><enter><blur><wait:250>";

/// Scripted demo of a lookup field backed by a simulated country search.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "lookup-demo",
    version,
    about = "Drive a lookup field with a scripted input sequence"
)]
pub struct Cli {
    /// Path to a TOML configuration file
    ///
    /// Keys: `debounce_ms`, `blur_grace_ms`, `min_search_length`, `placeholder`,
    /// `no_options_message`, `loading_message`
    #[arg(long, short = 'c', env = "LOOKUP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Input script: plain characters are typed, `<...>` tokens are keys or
    /// directives (`<focus>`, `<blur>`, `<wait:MS>`, `<hover:N>`, `<click:N>`,
    /// `<clear>`), and `<<` types a literal `<`
    #[arg(long, short = 's', default_value = DEFAULT_SCRIPT)]
    pub script: String,

    /// Simulated remote search latency in milliseconds
    #[arg(long, default_value_t = 120, env = "LOOKUP_LATENCY_MS")]
    pub latency_ms: u64,

    /// Make the remote search fail for this query
    #[arg(long)]
    pub fail_on: Option<String>,

    /// Print the view after every update
    #[arg(long)]
    pub frames: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// The tracing filter implied by `--verbose`.
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["lookup-demo"]);
        assert_eq!(cli.script, DEFAULT_SCRIPT);
        assert_eq!(cli.latency_ms, 120);
        assert!(cli.config.is_none());
        assert!(!cli.frames);
        assert_eq!(cli.log_level(), "warn");
    }

    #[test]
    fn test_verbosity_counts() {
        let cli = Cli::parse_from(["lookup-demo", "-vv", "--fail-on", "spa"]);
        assert_eq!(cli.log_level(), "debug");
        assert_eq!(cli.fail_on.as_deref(), Some("spa"));
    }
}
