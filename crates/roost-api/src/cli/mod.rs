//! CLI command definitions for the `roost` binary.
//!
//! Uses clap derive macros for argument parsing. Subcommands are grouped by
//! noun (e.g., `roost user add`, `roost token issue`).

pub mod token;
pub mod user;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Pairwise messaging backend.
#[derive(Parser)]
#[command(name = "roost", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export trace spans via OpenTelemetry (stdout exporter).
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the REST API server.
    Serve {
        /// Port to listen on (overrides config.toml).
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to (overrides config.toml).
        #[arg(long)]
        host: Option<String>,
    },

    /// Manage directory users (development seeding).
    User {
        #[command(subcommand)]
        action: UserAction,
    },

    /// Manage access tokens.
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum UserAction {
    /// Add a user to the directory.
    Add {
        #[arg(long)]
        phone: String,

        #[arg(long)]
        email: String,

        /// Avatar image URL.
        #[arg(long)]
        avatar: Option<String>,
    },

    /// List all users.
    #[command(alias = "ls")]
    List,
}

#[derive(Subcommand)]
pub enum TokenAction {
    /// Issue a new bearer token for a user. Shown once.
    Issue {
        /// The user's id.
        user_id: String,
    },

    /// Revoke every token belonging to a user.
    Revoke {
        /// The user's id.
        user_id: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn serve_flags_are_optional() {
        let cli = Cli::try_parse_from(["roost", "serve"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Serve {
                port: None,
                host: None
            }
        ));

        let cli = Cli::try_parse_from(["roost", "-v", "serve", "--port", "9000"]).unwrap();
        assert_eq!(cli.verbose, 1);
        assert!(matches!(cli.command, Commands::Serve { port: Some(9000), .. }));
    }

    #[test]
    fn user_add_requires_phone_and_email() {
        assert!(Cli::try_parse_from(["roost", "user", "add", "--phone", "+1"]).is_err());
        let cli = Cli::try_parse_from([
            "roost", "user", "add", "--phone", "+1", "--email", "a@b.c", "--json",
        ])
        .unwrap();
        assert!(cli.json);
    }
}
