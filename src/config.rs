use crate::args::Args;
use activity::api::{Error, Result};
use activity::calendar::parse_date;
use chrono::NaiveDate;
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;

/// Atlassian account the report is generated for.
#[derive(Debug)]
pub struct Credentials {
    pub user: String,
    pub token: SecretString,
}

/// Validated run configuration. Built once from [`Args`].
#[derive(Debug)]
pub struct Config {
    pub credentials: Credentials,
    pub site: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub pto_days: u32,
    pub story_points_field: String,
    pub page_size: u32,
    pub max_pages: u32,
    pub timeout: Duration,
}

impl TryFrom<Args> for Config {
    type Error = Error;

    fn try_from(args: Args) -> Result<Self> {
        let user = args.user.filter(|user| !user.trim().is_empty());
        let token = args.token.filter(|token| !token.expose_secret().trim().is_empty());
        let credentials = match (user, token) {
            (Some(user), Some(token)) => Credentials { user, token },
            (None, _) => return Err(Error::Auth("ATLASSIAN_USER is not set".to_string())),
            (_, None) => return Err(Error::Auth("ATLASSIAN_TOKEN is not set".to_string())),
        };
        let start = parse_date(&args.start_date)?;
        let end = parse_date(&args.end_date)?;
        if end < start {
            return Err(Error::InvalidRange(format!(
                "end date {} is before start date {}",
                end, start
            )));
        }
        Ok(Config {
            credentials,
            site: args.site,
            start,
            end,
            pto_days: args.ptos,
            story_points_field: args.story_points_field,
            page_size: args.page_size,
            max_pages: args.max_pages,
            timeout: Duration::from_secs(args.timeout),
        })
    }
}

#[cfg(test)]
fn args(user: Option<&str>, token: Option<&str>, start: &str, end: &str) -> Args {
    Args {
        start_date: start.to_string(),
        end_date: end.to_string(),
        user: user.map(String::from),
        token: token.map(|t| SecretString::new(t.to_string())),
        site: "example.atlassian.net".to_string(),
        ptos: 2,
        story_points_field: "customfield_10014".to_string(),
        page_size: 50,
        max_pages: 10,
        timeout: 5,
    }
}

#[test]
fn config_test() {
    let config = Config::try_from(args(Some("me@example.com"), Some("secret"), "2025-02-28", "2026-02-02")).unwrap();
    assert_eq!(config.credentials.user, "me@example.com");
    assert_eq!(config.credentials.token.expose_secret(), "secret");
    assert_eq!(config.start, NaiveDate::from_ymd_opt(2025, 2, 28).unwrap());
    assert_eq!(config.end, NaiveDate::from_ymd_opt(2026, 2, 2).unwrap());
    assert_eq!(config.pto_days, 2);
    assert_eq!(config.timeout, Duration::from_secs(5));
}

#[test]
fn missing_credentials_test() {
    let result = Config::try_from(args(None, Some("secret"), "2025-02-28", "2026-02-02"));
    assert!(matches!(result, Err(Error::Auth(_))));
    let result = Config::try_from(args(Some("me@example.com"), Some("  "), "2025-02-28", "2026-02-02"));
    assert!(matches!(result, Err(Error::Auth(_))));
}

#[test]
fn invalid_dates_test() {
    let result = Config::try_from(args(Some("me"), Some("secret"), "2025-02-30", "2026-02-02"));
    assert!(matches!(result, Err(Error::InvalidRange(_))));
    let result = Config::try_from(args(Some("me"), Some("secret"), "2026-02-02", "2025-02-28"));
    assert!(matches!(result, Err(Error::InvalidRange(_))));
}

#[test]
fn token_is_redacted_test() {
    let config = Config::try_from(args(Some("me"), Some("hunter2"), "2025-02-28", "2026-02-02")).unwrap();
    assert!(!format!("{:?}", config).contains("hunter2"));
}
