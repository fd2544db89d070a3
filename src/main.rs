use clap::Parser;
use jira_activity_app::{run_until_interrupted, Args};
use std::process::ExitCode;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut stdout = std::io::stdout();
    let report = jira_activity_app::activity_report(args, &mut stdout);
    let status = run_until_interrupted(report, tokio::signal::ctrl_c(), &mut std::io::stderr()).await;
    ExitCode::from(status)
}
