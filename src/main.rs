#![forbid(unsafe_code)]

use std::env;
use std::process::ExitCode;

use snakey::config::DashboardConfig;
use snakey::loader::DataSource;
use snakey::server::{self, AppState};
use snakey::validate::audit_scores;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const USAGE: &str = "usage: snakey [serve|check]";

fn init_tracing(log_json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

/// Report on every data file; fail if any is missing or unreadable.
fn run_check(config: &DashboardConfig) -> ExitCode {
    let source = DataSource::new(config.data_dir.clone());
    println!("Checking data files in {}", source.root().display());

    let checks = source.verify_sources();
    for check in &checks {
        match &check.records {
            Ok(n) => println!(
                "  ok    {:<36} {:>5} records, {} bytes",
                check.dataset.file_name(),
                n,
                check.bytes.unwrap_or(0)
            ),
            Err(e) => println!("  FAIL  {:<36} {e}", check.dataset.file_name()),
        }
    }

    if !checks.iter().all(|c| c.is_ok()) {
        println!("Some data files are missing or invalid.");
        return ExitCode::FAILURE;
    }

    let violations = audit_scores(&source);
    if violations.is_empty() {
        println!("All scores are within the 0-10 range.");
    } else {
        println!("{} score(s) outside the 0-10 range (see log).", violations.len());
    }
    println!("All data files loaded.");
    ExitCode::SUCCESS
}

async fn serve(config: DashboardConfig) -> Result<(), String> {
    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .map_err(|e| format!("bind {} failed: {e}", config.bind_addr))?;
    info!(
        bind = %config.bind_addr,
        data_dir = %config.data_dir.display(),
        "snakey dashboard listening"
    );
    server::run(listener, AppState::new(config))
        .await
        .map_err(|e| format!("server failed: {e}"))
}

#[tokio::main]
async fn main() -> ExitCode {
    let config = DashboardConfig::from_env();
    init_tracing(config.log_json);

    match env::args().nth(1).as_deref() {
        Some("check") => run_check(&config),
        None | Some("serve") => match serve(config).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                error!(error = %e, "dashboard stopped");
                ExitCode::FAILURE
            }
        },
        Some(other) => {
            eprintln!("unknown command {other:?}\n{USAGE}");
            ExitCode::from(2)
        }
    }
}
