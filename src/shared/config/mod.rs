//! Application configuration module
//!
//! Provides the review server configuration and its builder. Values are
//! layered: built-in defaults, then an optional TOML file in the user's
//! config directory, then whatever the binary sets from the environment and
//! the command line.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Default prefix for the notes refs holding review messages
pub const DEFAULT_NOTES_REF: &str = "refs/notes/scrutinize";

/// Default directory with the static web UI
pub const DEFAULT_WEBROOT: &str = "s";

/// Default listen address; port 0 lets the OS choose
pub const DEFAULT_LISTEN: &str = "127.0.0.1:0";

/// Review server configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Path inside the repository to review; discovery walks up from here
    pub repo_path: PathBuf,
    /// Notes ref prefix; the checked-out branch name is appended to it
    pub notes_ref: String,
    /// Directory served for static files
    pub webroot: PathBuf,
    /// Address to listen on
    pub listen: SocketAddr,
    /// Log every request, not only failures
    pub verbose: bool,
    /// Launch a browser on the served URL
    pub open_browser: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            repo_path: PathBuf::from("."),
            notes_ref: DEFAULT_NOTES_REF.to_string(),
            webroot: PathBuf::from(DEFAULT_WEBROOT),
            listen: SocketAddr::from(([127, 0, 0, 1], 0)),
            verbose: false,
            open_browser: false,
        }
    }
}

impl AppConfig {
    /// Create a new AppConfigBuilder
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_notes_ref(&self.notes_ref)
    }

    /// Location of the optional configuration file
    pub fn file_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("scrutinize").join("config.toml"))
    }
}

fn validate_notes_ref(notes_ref: &str) -> Result<(), ConfigError> {
    let name = notes_ref
        .strip_prefix("refs/notes/")
        .ok_or_else(|| ConfigError::InvalidRef(notes_ref.to_string()))?;
    if name.is_empty()
        || name.ends_with('/')
        || name.split('/').any(|part| part.is_empty() || part.starts_with('.'))
        || name.contains(|c: char| c.is_whitespace() || "~^:?*[\\".contains(c))
    {
        return Err(ConfigError::InvalidRef(notes_ref.to_string()));
    }
    Ok(())
}

/// On-disk configuration file contents; every key is optional
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(rename = "ref")]
    pub notes_ref: Option<String>,
    pub webroot: Option<PathBuf>,
    pub listen: Option<String>,
    pub verbose: Option<bool>,
}

impl FileConfig {
    /// Parse a configuration file
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|e| ConfigError::File(e.to_string()))
    }

    /// Load the file at `path`, or the default location when `None`
    ///
    /// A missing file is not an error and yields an empty configuration.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path.map(Path::to_path_buf).or_else(AppConfig::file_path) {
            Some(path) => path,
            None => return Ok(Self::default()),
        };
        match std::fs::read_to_string(&path) {
            Ok(text) => {
                tracing::debug!(path = %path.display(), "loaded configuration file");
                Self::from_toml(&text)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(ConfigError::File(format!("{}: {}", path.display(), e))),
        }
    }
}

/// Builder for AppConfig
#[derive(Debug, Default)]
pub struct AppConfigBuilder {
    repo_path: Option<PathBuf>,
    notes_ref: Option<String>,
    webroot: Option<PathBuf>,
    listen: Option<String>,
    verbose: Option<bool>,
    open_browser: Option<bool>,
}

impl AppConfigBuilder {
    /// Take every value the file sets; later setters override them
    pub fn file(mut self, file: FileConfig) -> Self {
        self.notes_ref = file.notes_ref.or(self.notes_ref);
        self.webroot = file.webroot.or(self.webroot);
        self.listen = file.listen.or(self.listen);
        self.verbose = file.verbose.or(self.verbose);
        self
    }

    pub fn repo_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.repo_path = Some(path.into());
        self
    }

    /// Set the notes ref prefix
    pub fn notes_ref(mut self, notes_ref: impl Into<String>) -> Self {
        self.notes_ref = Some(notes_ref.into());
        self
    }

    pub fn webroot(mut self, webroot: impl Into<PathBuf>) -> Self {
        self.webroot = Some(webroot.into());
        self
    }

    /// Set the listen address (`host:port`)
    pub fn listen(mut self, listen: impl Into<String>) -> Self {
        self.listen = Some(listen.into());
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = Some(verbose);
        self
    }

    pub fn open_browser(mut self, open: bool) -> Self {
        self.open_browser = Some(open);
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<AppConfig, ConfigError> {
        let defaults = AppConfig::default();
        let listen = match self.listen {
            Some(listen) => listen
                .parse()
                .map_err(|_| ConfigError::InvalidListen(listen))?,
            None => defaults.listen,
        };

        let config = AppConfig {
            repo_path: self.repo_path.unwrap_or(defaults.repo_path),
            notes_ref: self.notes_ref.unwrap_or(defaults.notes_ref),
            webroot: self.webroot.unwrap_or(defaults.webroot),
            listen,
            verbose: self.verbose.unwrap_or(defaults.verbose),
            open_browser: self.open_browser.unwrap_or(defaults.open_browser),
        };
        config.validate()?;
        Ok(config)
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid notes ref prefix: {0} (expected refs/notes/<name>)")]
    InvalidRef(String),
    #[error("invalid listen address: {0}")]
    InvalidListen(String),
    #[error("invalid configuration file: {0}")]
    File(String),
}
