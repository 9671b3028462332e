//! CLI argument definitions using clap
//!
//! Commands:
//! - q2doc parse [--config <path>] [--ignore <key>]... [--max-limit <n>] [QUERY]...
//! - q2doc coerce <VALUE>...

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// q2doc - Translate URL query strings into document-store criteria and options
#[derive(Parser, Debug)]
#[command(name = "q2doc")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Parse query strings into criteria and options documents
    Parse {
        /// Path to a JSON configuration file
        #[arg(long, env = "Q2DOC_CONFIG")]
        config: Option<PathBuf>,

        /// Key to drop from both documents (repeatable)
        #[arg(long = "ignore", value_name = "KEY")]
        ignore: Vec<String>,

        /// Upper bound applied to `limit`
        #[arg(long, value_name = "N", allow_negative_numbers = true)]
        max_limit: Option<i64>,

        /// Query strings; read one per stdin line when omitted
        queries: Vec<String>,
    },

    /// Show the type inferred for each raw value
    Coerce {
        /// Raw (already decoded) values
        #[arg(required = true)]
        values: Vec<String>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command_args() {
        let cli = Cli::try_parse_from([
            "q2doc",
            "parse",
            "--ignore",
            "envelope",
            "--ignore",
            "_",
            "--max-limit",
            "50",
            "a=1&limit=100",
        ])
        .unwrap();

        match cli.command {
            Command::Parse {
                config,
                ignore,
                max_limit,
                queries,
            } => {
                assert!(config.is_none());
                assert_eq!(ignore, vec!["envelope", "_"]);
                assert_eq!(max_limit, Some(50));
                assert_eq!(queries, vec!["a=1&limit=100"]);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_coerce_requires_values() {
        assert!(Cli::try_parse_from(["q2doc", "coerce"]).is_err());
    }

    #[test]
    fn test_negative_max_limit_reaches_validation() {
        let cli = Cli::try_parse_from(["q2doc", "parse", "--max-limit", "-1"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Parse {
                max_limit: Some(-1),
                ..
            }
        ));
    }
}
