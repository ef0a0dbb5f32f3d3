//! Server Module
//!
//! Initialization and configuration of the Axum HTTP server.
//!
//! # Module Structure
//!
//! ```text
//! server/
//! ├── mod.rs          - Module exports and documentation
//! ├── state.rs        - AppState and FromRef implementations
//! ├── config.rs       - Command line and configuration layering
//! └── init.rs         - Server initialization and app creation
//! ```
//!
//! # Initialization Flow
//!
//! 1. **Configuration Loading**: defaults, config file, environment, flags
//! 2. **Repository**: discovered from the configured path
//! 3. **State Creation**: annotation store, write gate, session gate
//! 4. **Router Creation**: routes, static files, middleware
//! 5. **Serve**: until `POST /quit` or Ctrl-C

/// Application state management
pub mod state;

/// Command line and configuration loading
pub mod config;

/// Server initialization
pub mod init;

pub use config::{load_config, Cli};
pub use init::{create_app, run};
pub use state::{AppState, SharedStore};
