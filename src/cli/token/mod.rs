//! Token subcommands

use anyhow::bail;
use chrono::{DateTime, Duration, Utc};
use clap::Args;
use serde::Serialize;

use crate::config::{AccountConfig, AppConfig};
use crate::domain::user::validate_email;
use crate::domain::{Clock, SystemClock, TokenCodec, TokenPayload};
use crate::infrastructure::token::AesGcmTokenCodec;

#[derive(Args, Debug)]
pub struct IssueTokenArgs {
    /// Email the token is issued for
    #[arg(long)]
    pub email: String,

    /// Validity in minutes, defaults to the sign-up window
    #[arg(long)]
    pub minutes: Option<i64>,
}

#[derive(Args, Debug)]
pub struct InspectTokenArgs {
    pub token: String,
}

/// Decoded token as printed by `inspect-token`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenReport {
    pub email: String,
    pub expiration: DateTime<Utc>,
    pub expired: bool,
}

pub fn issue(
    config: &AccountConfig,
    args: &IssueTokenArgs,
    clock: &dyn Clock,
) -> anyhow::Result<String> {
    validate_email(&args.email)?;

    let window = match args.minutes {
        Some(minutes) if minutes <= 0 => bail!("--minutes must be positive"),
        Some(minutes) => Duration::minutes(minutes),
        None => config.sign_up_window(),
    };

    let codec = AesGcmTokenCodec::new(&config.token_secret)?;
    let payload = TokenPayload::issue(args.email.as_str(), clock.now(), window);

    Ok(codec.encode(&payload)?)
}

pub fn inspect(
    config: &AccountConfig,
    args: &InspectTokenArgs,
    clock: &dyn Clock,
) -> anyhow::Result<TokenReport> {
    let codec = AesGcmTokenCodec::new(&config.token_secret)?;
    let payload = codec.decode(&args.token)?;
    let expired = payload.is_expired_at(clock.now());

    Ok(TokenReport {
        email: payload.email,
        expiration: payload.expiration,
        expired,
    })
}

pub async fn run_issue(config: &AppConfig, args: &IssueTokenArgs) -> anyhow::Result<()> {
    let token = issue(&config.accounts, args, &SystemClock)?;
    println!("{}", token);
    Ok(())
}

pub async fn run_inspect(config: &AppConfig, args: &InspectTokenArgs) -> anyhow::Result<()> {
    let report = inspect(&config.accounts, args, &SystemClock)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::clock::mock::FixedClock;
    use crate::domain::DomainError;

    fn issue_args(email: &str, minutes: Option<i64>) -> IssueTokenArgs {
        IssueTokenArgs {
            email: email.to_string(),
            minutes,
        }
    }

    #[test]
    fn test_issued_token_can_be_inspected() {
        let config = AccountConfig::new("cli-secret");
        let clock = FixedClock::default();

        let token = issue(&config, &issue_args("ana@example.com", Some(15)), &clock).unwrap();
        let report = inspect(&config, &InspectTokenArgs { token }, &clock).unwrap();

        assert_eq!(report.email, "ana@example.com");
        assert_eq!(report.expiration, clock.now() + Duration::minutes(15));
        assert!(!report.expired);
    }

    #[test]
    fn test_inspect_reports_expired() {
        let config = AccountConfig::new("cli-secret");
        let clock = FixedClock::default();
        let token = issue(&config, &issue_args("ana@example.com", None), &clock).unwrap();

        clock.advance(config.sign_up_window() + Duration::seconds(1));
        let report = inspect(&config, &InspectTokenArgs { token }, &clock).unwrap();

        assert!(report.expired);
    }

    #[test]
    fn test_issue_rejects_bad_input() {
        let config = AccountConfig::new("cli-secret");
        let clock = FixedClock::default();

        assert!(issue(&config, &issue_args("nope", None), &clock).is_err());
        assert!(issue(&config, &issue_args("ana@example.com", Some(0)), &clock).is_err());
        assert!(issue(
            &AccountConfig::default(),
            &issue_args("ana@example.com", None),
            &clock
        )
        .is_err());
    }

    #[test]
    fn test_inspect_invalid_token() {
        let config = AccountConfig::new("cli-secret");
        let args = InspectTokenArgs {
            token: "garbage".to_string(),
        };

        let error = inspect(&config, &args, &FixedClock::default()).unwrap_err();
        assert_eq!(
            error.downcast_ref::<DomainError>(),
            Some(&DomainError::InvalidToken)
        );
    }
}
