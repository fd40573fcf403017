//! Tara CLI binary entry point.

use tara::cli::Cli;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "tara=info";

#[tokio::main]
async fn main() {
    let cli = Cli::parse_args();
    init_tracing(cli.log_level.as_deref());

    if let Err(e) = tara::cli::run(cli).await {
        eprintln!("❌ Error: {e}");
        if let Some(hint) = e.recovery_suggestion().hint() {
            eprintln!("\n{hint}");
        }
        std::process::exit(1);
    }
}

fn init_tracing(filter: Option<&str>) {
    let filter = match filter {
        Some(directives) => EnvFilter::new(directives),
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
    };
    // stdout carries the chat transcript.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
