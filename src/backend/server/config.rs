/**
 * Server Configuration
 *
 * Command-line parsing and configuration layering for the review server.
 *
 * # Configuration Sources
 *
 * Lowest to highest precedence:
 * 1. Built-in defaults
 * 2. The optional TOML file (`<config dir>/scrutinize/config.toml`, or `--config`)
 * 3. Environment variables (`SCRUTINIZE_REF`, `SCRUTINIZE_WEBROOT`, `SCRUTINIZE_LISTEN`),
 *    including those loaded from `.env`
 * 4. Command-line flags
 *
 * Environment and flags are merged by clap, so one `Option` per setting
 * reaches the builder.
 */

use std::path::PathBuf;

use clap::Parser;

use crate::shared::config::{AppConfig, ConfigError, FileConfig};

/// Review commits in a git repository and keep the annotations in git notes
#[derive(Parser, Debug, Default)]
#[command(name = "scrutinize", version)]
pub struct Cli {
    /// Repository to review (any path inside it)
    #[arg(value_name = "REPO", default_value = ".")]
    pub repo: PathBuf,

    /// Notes ref prefix; the checked-out branch is appended to it
    #[arg(long = "ref", value_name = "REF", env = "SCRUTINIZE_REF")]
    pub notes_ref: Option<String>,

    /// Directory of static files to serve
    #[arg(long, value_name = "DIR", env = "SCRUTINIZE_WEBROOT")]
    pub webroot: Option<PathBuf>,

    /// Address to listen on (`host:port`, port 0 picks a free one)
    #[arg(long, value_name = "ADDR", env = "SCRUTINIZE_LISTEN")]
    pub listen: Option<String>,

    /// Log every request and enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Open the review page in a browser once listening
    #[arg(long)]
    pub open: bool,

    /// Configuration file to use instead of the default location
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Build the server configuration from the file, environment and flags
///
/// # Errors
///
/// `ConfigError` if the file cannot be parsed or a value is invalid.
pub fn load_config(cli: &Cli) -> Result<AppConfig, ConfigError> {
    let file = FileConfig::load(cli.config.as_deref())?;

    let mut builder = AppConfig::builder()
        .file(file)
        .repo_path(&cli.repo)
        .open_browser(cli.open);
    if let Some(notes_ref) = &cli.notes_ref {
        builder = builder.notes_ref(notes_ref);
    }
    if let Some(webroot) = &cli.webroot {
        builder = builder.webroot(webroot);
    }
    if let Some(listen) = &cli.listen {
        builder = builder.listen(listen);
    }
    if cli.debug {
        builder = builder.verbose(true);
    }
    builder.build()
}
