use activity::aggregate::{count_by_type, sum_numeric_field, WeeklyRates};
use activity::api::{Client, Error, Result};
use activity::calendar::working_weeks;
use activity::jql::{self, Activity};
use activity::report;
use activity::search::{IssueSearch, LogReporter, Reporter};
use jira_client::{JiraClient, JiraClientBuilder};
use log::{error, warn};
use std::future::Future;
use std::io::{self, Write};

pub mod args;
pub mod config;

pub use args::Args;
pub use config::Config;

pub const BINARY_NAME: &str = "jira_activity";

/// Printed when credentials are missing or rejected.
pub const AUTH_HELP: &str = "\
Please set the following environment variables:
  export ATLASSIAN_USER=\"your-email@example.com\"
  export ATLASSIAN_TOKEN=\"your-api-token\"
  export ATLASSIAN_SITE=\"your-site.atlassian.net\"  # optional

Or pass them as command line arguments:
  --user \"your-email@example.com\"
  --token \"your-api-token\"
  --site \"your-site.atlassian.net\"

Generate an API token here:
  https://id.atlassian.com/manage-profile/security/api-tokens
";

/// Logs the outcome of a run and maps it to the process exit status. Setup
/// guidance for credential problems goes to `stderr`.
pub fn exit_status<W: Write>(result: &Result<()>, stderr: &mut W) -> u8 {
    match result {
        Ok(()) => 0,
        Err(Error::Auth(reason)) => {
            error!("Error: Atlassian authentication failed: {}", reason);
            writeln!(stderr, "\n{}", AUTH_HELP).ok();
            1
        }
        Err(err) => {
            error!("Error: {:?}", err);
            1
        }
    }
}

/// Drives `report` until it completes or `interrupt` fires. An interrupt
/// that resolves to an error is ignored and the report keeps running.
pub async fn run_until_interrupted<REPORT, INTERRUPT, W>(report: REPORT, interrupt: INTERRUPT, stderr: &mut W) -> u8
where
    REPORT: Future<Output = Result<()>>,
    INTERRUPT: Future<Output = io::Result<()>>,
    W: Write,
{
    tokio::select! {
        result = report => exit_status(&result, stderr),
        Ok(()) = interrupt => {
            warn!("Interrupted by user");
            0
        }
    }
}

pub fn build_client(config: &Config) -> Result<JiraClient> {
    JiraClientBuilder::default()
        .with_site(&config.site)
        .with_credentials(config.credentials.user.clone(), config.credentials.token.clone())
        .with_timeout(config.timeout)
        .build()
}

/// Runs the three searches for `args` against Jira and writes the report to `out`.
pub async fn activity_report<W: Write>(args: Args, out: &mut W) -> Result<()> {
    let config = Config::try_from(args)?;
    let client = build_client(&config)?;
    write_report(&config, client, LogReporter, out).await
}

/// Writes the report section by section. A section is written only once all
/// the data it shows has been fetched.
pub async fn write_report<CLIENT, REPORTER, W>(config: &Config, client: CLIENT, reporter: REPORTER, out: &mut W) -> Result<()>
where
    CLIENT: Client,
    REPORTER: Reporter,
    W: Write,
{
    emit(out, report::header(config.start, config.end))?;
    emit(out, report::connection(&config.site, &config.credentials.user))?;

    let weeks = working_weeks(config.start, config.end, config.pto_days)?;
    emit(out, report::period(&weeks, config.pto_days))?;

    let search = IssueSearch::new(client, reporter).with_max_pages(config.max_pages);
    let query = |activity| jql::query(activity, config.start, config.end, &config.story_points_field, config.page_size);

    let created = search.search(&query(Activity::Created)).await?;
    emit(out, report::tickets_created(&count_by_type(&created)))?;

    let resolved = search.search(&query(Activity::Resolved)).await?;
    emit(out, report::tickets_resolved(&count_by_type(&resolved)))?;

    let bugs = search.search(&query(Activity::BugsResolved)).await?;
    emit(out, report::bugs_resolved(bugs.len()))?;

    let (story_points, with_points) = sum_numeric_field(&resolved, &config.story_points_field);
    emit(out, report::story_points(story_points, with_points, resolved.len()))?;

    let rates = WeeklyRates::new(created.len(), resolved.len(), bugs.len(), story_points, weeks.working_weeks);
    emit(out, report::overall(rates.as_ref()))?;

    emit(out, report::footer(BINARY_NAME, config.start, config.end))
}

fn emit<W: Write>(out: &mut W, section: String) -> Result<()> {
    out.write_all(section.as_bytes())?;
    out.flush()?;
    Ok(())
}

#[test]
fn success_exits_zero_test() {
    let mut stderr = Vec::new();
    assert_eq!(exit_status(&Ok(()), &mut stderr), 0);
    assert!(stderr.is_empty());
}

#[test]
fn auth_error_exits_one_with_guidance_test() {
    let mut stderr = Vec::new();
    let result = Err(Error::Auth("Atlassian user and API token are required".to_string()));
    assert_eq!(exit_status(&result, &mut stderr), 1);
    let guidance = String::from_utf8(stderr).unwrap();
    assert!(guidance.contains("export ATLASSIAN_TOKEN="), "{}", guidance);
    assert!(guidance.contains("https://id.atlassian.com/manage-profile/security/api-tokens"));
}

#[test]
fn other_errors_exit_one_without_guidance_test() {
    let errors = vec![
        Error::Transport("Request to Jira timed out".to_string()),
        Error::Protocol("Unexpected search response".to_string()),
        Error::InvalidRange("end before start".to_string()),
        Error::Io(io::Error::new(io::ErrorKind::BrokenPipe, "stdout closed")),
    ];
    for err in errors {
        let mut stderr = Vec::new();
        assert_eq!(exit_status(&Err(err), &mut stderr), 1);
        assert!(stderr.is_empty());
    }
}

#[tokio::test]
async fn interrupt_exits_zero_test() {
    let mut stderr = Vec::new();
    let status = run_until_interrupted(std::future::pending::<Result<()>>(), async { io::Result::Ok(()) }, &mut stderr).await;
    assert_eq!(status, 0);
}

#[tokio::test]
async fn failed_interrupt_does_not_end_run_test() {
    let report = async {
        tokio::task::yield_now().await;
        Result::<()>::Err(Error::Transport("Request to Jira failed".to_string()))
    };
    let interrupt = async { io::Result::<()>::Err(io::Error::new(io::ErrorKind::Other, "no signal handler")) };
    let mut stderr = Vec::new();
    assert_eq!(run_until_interrupted(report, interrupt, &mut stderr).await, 1);
}
