//! CLI module for the account-dao operator tool
//!
//! Provides subcommands for working with account tokens and credentials:
//! - `issue-token`: print a token for an email
//! - `inspect-token`: decode a token and report its expiration
//! - `hash-password`: print an Argon2 hash

pub mod password;
pub mod token;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;

/// Operator tool for the account lifecycle
#[derive(Parser)]
#[command(name = "account-dao")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print a token for an email, valid for the sign-up window by default
    IssueToken(token::IssueTokenArgs),

    /// Decode a token and report whether it has expired
    InspectToken(token::InspectTokenArgs),

    /// Print an Argon2 hash of a password
    HashPassword(password::HashPasswordArgs),
}

impl Cli {
    pub async fn run(self, config: &AppConfig) -> anyhow::Result<()> {
        match self.command {
            Command::IssueToken(args) => token::run_issue(config, &args).await,
            Command::InspectToken(args) => token::run_inspect(config, &args).await,
            Command::HashPassword(args) => password::run(config, &args).await,
        }
    }
}
