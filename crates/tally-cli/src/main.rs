use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

mod cli;

use cli::args::Cli;
use cli::commands::{dispatch, exit_codes};

fn init_logging(log_level: &str) {
    let filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .json()
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_target(true)
        .with_current_span(false)
        .with_span_list(false)
        .with_writer(std::io::stderr) // stdout is reserved for --dry-run output
        .init();
}

#[tokio::main(flavor = "multi_thread")]
async fn main() {
    // .env must be in the process env before clap reads its `env = ...` fallbacks
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let code = match dispatch(cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(event = "update_failed", error = %format!("{e:#}"));
            eprintln!("fatal: {e:?}");
            if tally_core::errors::is_config_error(&e) {
                exit_codes::CONFIG_ERROR
            } else {
                exit_codes::RUN_ERROR
            }
        }
    };
    std::process::exit(code);
}
