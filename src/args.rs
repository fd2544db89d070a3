use activity::jql::{DEFAULT_STORY_POINTS_FIELD, MAX_PAGE_SIZE};
use activity::search::DEFAULT_MAX_PAGES;
use jira_client::{DEFAULT_SITE, DEFAULT_TIMEOUT};
use clap::Parser;
use secrecy::SecretString;
use std::{fmt::Display, ops::RangeInclusive, str::FromStr};

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// Start date in YYYY-MM-DD format
    #[clap(default_value = "2025-02-28")]
    pub start_date: String,

    /// End date in YYYY-MM-DD format
    #[clap(default_value = "2026-02-02")]
    pub end_date: String,

    /// Atlassian user email
    #[clap(long, env = "ATLASSIAN_USER")]
    pub user: Option<String>,

    /// Atlassian API token
    #[clap(long, env = "ATLASSIAN_TOKEN", hide_env_values = true)]
    pub token: Option<SecretString>,

    /// Atlassian site host or base URL
    #[clap(long, env = "ATLASSIAN_SITE", default_value = DEFAULT_SITE)]
    pub site: String,

    /// Number of PTO days to exclude from calculations
    #[clap(long, default_value_t = 0)]
    pub ptos: u32,

    /// Issue field holding story points
    #[clap(long, default_value = DEFAULT_STORY_POINTS_FIELD)]
    pub story_points_field: String,

    /// Issues requested per search page
    #[clap(long, default_value_t = MAX_PAGE_SIZE, parse(try_from_str=page_size_in_range))]
    pub page_size: u32,

    /// Maximal page requests per search
    #[clap(long, default_value_t = DEFAULT_MAX_PAGES, parse(try_from_str=max_pages_in_range))]
    pub max_pages: u32,

    /// Per request timeout in seconds
    #[clap(long, default_value_t = DEFAULT_TIMEOUT.as_secs(), parse(try_from_str=timeout_in_range))]
    pub timeout: u64,
}

fn page_size_in_range(value: &str) -> clap::Result<u32, String> {
    parse_within(value, 1..=MAX_PAGE_SIZE, "--page-size")
}

fn max_pages_in_range(value: &str) -> clap::Result<u32, String> {
    parse_within(value, 1..=u32::MAX, "--max-pages")
}

fn timeout_in_range(value: &str) -> clap::Result<u64, String> {
    parse_within(value, 1..=3600, "--timeout")
}

/// Parses `value` and rejects it unless it falls inside `allowed`.
fn parse_within<T>(value: &str, allowed: RangeInclusive<T>, flag: &str) -> clap::Result<T, String>
where
    T: FromStr + PartialOrd + Display,
    T::Err: Display,
{
    let number = value
        .trim()
        .parse::<T>()
        .map_err(|err| format!("{} expects a number: {}", flag, err))?;
    if !allowed.contains(&number) {
        return Err(format!(
            "{} must be between {} and {}, got {}",
            flag,
            allowed.start(),
            allowed.end(),
            number
        ));
    }
    Ok(number)
}

#[test]
fn defaults_test() {
    let args = Args::try_parse_from(["jira_activity", "--user", "me@example.com", "--token", "secret"]).unwrap();
    assert_eq!(args.start_date, "2025-02-28");
    assert_eq!(args.end_date, "2026-02-02");
    assert_eq!(args.user.as_deref(), Some("me@example.com"));
    assert_eq!(args.ptos, 0);
    assert_eq!(args.page_size, 100);
    assert_eq!(args.max_pages, 100);
    assert_eq!(args.timeout, 30);
    assert_eq!(args.story_points_field, "customfield_10014");
}

#[test]
fn positional_dates_and_ptos_test() {
    let args = Args::try_parse_from(["jira_activity", "2025-01-01", "2025-06-30", "--ptos", "12"]).unwrap();
    assert_eq!(args.start_date, "2025-01-01");
    assert_eq!(args.end_date, "2025-06-30");
    assert_eq!(args.ptos, 12);
}

#[test]
fn out_of_range_test() {
    assert!(Args::try_parse_from(["jira_activity", "--page-size", "101"]).is_err());
    assert!(Args::try_parse_from(["jira_activity", "--max-pages", "0"]).is_err());
    assert!(Args::try_parse_from(["jira_activity", "--ptos", "-1"]).is_err());
}

#[test]
fn range_validator_test() {
    assert_eq!(parse_within("5", 1..=10, "--n"), Ok(5));
    assert_eq!(parse_within(" 10 ", 1..=10, "--n"), Ok(10));
    assert_eq!(
        parse_within("11", 1..=10, "--n"),
        Err("--n must be between 1 and 10, got 11".to_string())
    );
    assert!(parse_within::<u32>("x", 1..=10, "--n").unwrap_err().starts_with("--n expects a number"));
}
