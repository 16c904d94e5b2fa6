//! # CLI Argument Definitions
//!
//! This module defines the command-line interface (CLI) structure using the `clap` crate.

use clap::{Parser, Subcommand};

/// The main CLI structure parsing command-line arguments.
#[derive(Debug, Parser)]
#[command(name = "cargo xtask")]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(arg_required_else_help = true)]
#[command(about = "Developer toolkit for the ASP workspace")]
pub struct Cli {
    /// The main subcommand to execute.
    #[command(subcommand)]
    pub command: AppCommands,
}

/// Enumeration of available application subcommands.
#[derive(Debug, Subcommand)]
pub enum AppCommands {
    /// Check every capability configuration, including the unguarded-consumer fixture
    Gates {
        /// Only run the compile checks
        #[arg(long)]
        skip_tests: bool,
    },
    /// Run tests with and without the ISIS capability (workspace by default)
    Test {
        /// Run tests for a specific crate (auto-prefixes with 'asp-' if missing)
        project: Option<String>,
    },
    /// Run doc tests with and without the ISIS capability (workspace by default)
    Doctest {
        /// Run doc tests for a specific crate (auto-prefixes with 'asp-' if missing)
        project: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_accepts_an_optional_project() {
        let cli = Cli::try_parse_from(["xtask", "test", "stereo"]).unwrap();
        assert!(matches!(cli.command, AppCommands::Test { project: Some(p) } if p == "stereo"));

        let cli = Cli::try_parse_from(["xtask", "gates", "--skip-tests"]).unwrap();
        assert!(matches!(cli.command, AppCommands::Gates { skip_tests: true }));
    }
}
