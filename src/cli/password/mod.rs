//! Password subcommand

use clap::Args;

use crate::config::{AccountConfig, AppConfig};
use crate::domain::user::validate_password;
use crate::domain::PasswordHasher;
use crate::infrastructure::user::Argon2Hasher;

#[derive(Args, Debug)]
pub struct HashPasswordArgs {
    pub plaintext: String,
}

/// Hash a password that satisfies the configured minimum length
pub fn hash(config: &AccountConfig, args: &HashPasswordArgs) -> anyhow::Result<String> {
    validate_password(Some(&args.plaintext), config.min_password_length)?;
    Ok(Argon2Hasher::new().hash(&args.plaintext)?)
}

pub async fn run(config: &AppConfig, args: &HashPasswordArgs) -> anyhow::Result<()> {
    println!("{}", hash(&config.accounts, args)?);
    Ok(())
}
