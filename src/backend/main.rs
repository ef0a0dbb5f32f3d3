/**
 * scrutinize Server Entry Point
 *
 * Serves the review page for a git repository and stores review
 * annotations as git notes on the reviewed commits.
 */

#[cfg(feature = "ssr")]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use clap::Parser;
    use scrutinize::backend::server::{load_config, run, Cli};

    // Load environment variables from .env file if present
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    let default_level = if cli.debug { "debug" } else { "info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let config = load_config(&cli)?;
    tracing::debug!(?config, "Configuration loaded");

    run(config).await
}

#[cfg(not(feature = "ssr"))]
fn main() {
    eprintln!("Server requires the 'ssr' feature to be enabled.");
    eprintln!("Run with: cargo run --bin scrutinize --features ssr");
    std::process::exit(1);
}
