use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use probatescraper::{
    driver::{DriverConfig, ErrorKind, Session, WebDriverSession},
    output::{self, OutputRow},
    pipeline::{case, property},
    retry::RetryPolicy,
};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

/// Session acquisition is flaky while chromedriver warms up.
const CONNECT_RETRY: RetryPolicy = RetryPolicy::new(
    5,
    Duration::from_secs(1),
    &[ErrorKind::Timeout, ErrorKind::NotInteractable],
);

#[derive(Parser, Debug)]
#[command(
    name = "probatescraper",
    about = "Scrape probate case filings for a date and cross-reference auditor property data"
)]
struct Args {
    /// Filing date to scrape, YYYYMMDD
    date: String,

    /// WebDriver endpoint to attach to
    #[arg(long, default_value = "http://localhost:9515")]
    webdriver_url: String,

    /// Run the browser headless
    #[arg(long)]
    headless: bool,

    /// Output CSV path
    #[arg(long, default_value = "case_data.csv")]
    out: PathBuf,

    /// Browser download directory (defaults to the working directory)
    #[arg(long)]
    download_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();

    let args = Args::parse();
    NaiveDate::parse_from_str(&args.date, "%Y%m%d")
        .with_context(|| format!("invalid date `{}`, expected YYYYMMDD", args.date))?;

    let download_dir = match &args.download_dir {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().context("resolving working directory")?,
    };
    let cfg = DriverConfig {
        webdriver_url: args.webdriver_url.clone(),
        headless: args.headless,
        download_dir,
    };

    let session = CONNECT_RETRY
        .run("webdriver connect", || WebDriverSession::connect(&cfg))
        .await
        .context("acquiring webdriver session")?;

    // The session is released whichever way the run ends.
    let result = run(&session, &args).await;
    if let Err(err) = session.close().await {
        warn!(%err, "failed to close webdriver session");
    }
    if let Err(err) = &result {
        error!(error = %format!("{err:#}"), "run failed");
    }
    result
}

async fn run(session: &impl Session, args: &Args) -> Result<()> {
    let cases = case::discover_cases(session, &args.date)
        .await
        .context("discovering case numbers")?;
    if cases.is_empty() {
        info!(date = %args.date, "no cases listed");
    }

    let mut records = case::process_all_cases(session, &cases).await;

    for record in &mut records {
        if let Err(err) = property::cross_reference(session, record).await {
            warn!(case = %record.caseno, %err, "property lookup failed");
        }
    }

    let rows: Vec<OutputRow> = records.iter().map(output::project).collect();
    output::write_rows(&args.out, &rows)?;
    info!("processing complete");
    Ok(())
}
