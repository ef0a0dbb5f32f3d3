/**
 * Server Initialization
 *
 * This module opens the repository under review, binds the listener and
 * runs the Axum server until `POST /quit` or Ctrl-C.
 *
 * # Initialization Process
 *
 * 1. Discover the git repository from the configured path
 * 2. Bind the listener (port 0 lets the OS pick one)
 * 3. Create the application state; the session cookie is named after the bound port
 * 4. Create the router
 * 5. Optionally open a browser on the served URL
 * 6. Serve until shutdown is requested
 */

use std::net::SocketAddr;

use axum::Router;
use tokio::net::TcpListener;

use crate::backend::notes::repo::GitNotes;
use crate::backend::routes::router::create_router;
use crate::backend::server::state::AppState;
use crate::shared::config::AppConfig;

/// Create the Axum application for the given state
pub fn create_app(app_state: AppState) -> Router<()> {
    tracing::info!(
        notes_ref = %app_state.store.prefix(),
        webroot = %app_state.webroot.display(),
        "Initializing review server"
    );
    create_router(app_state)
}

/// Open the repository, bind the listener and serve until shutdown
///
/// # Errors
///
/// Fails if the repository cannot be opened, the address cannot be bound,
/// or the server stops with an I/O error.
pub async fn run(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let notes = GitNotes::discover(&config.repo_path)?;
    tracing::info!(repository = %notes.path().display(), "Opened repository");

    let listener = TcpListener::bind(config.listen).await?;
    let addr = listener.local_addr()?;

    let app_state = AppState::new(
        Box::new(notes),
        config.notes_ref.clone(),
        addr.port(),
        config.webroot.clone(),
        config.verbose,
    );
    let shutdown = app_state.shutdown.clone();
    let app = create_app(app_state);

    let url = format!("http://{}/", addr);
    tracing::info!("Listening on {}", url);
    if config.open_browser {
        tokio::spawn(open_browser(url));
    }

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move {
        tokio::select! {
            _ = shutdown.notified() => {}
            _ = tokio::signal::ctrl_c() => {}
        }
        tracing::info!("Shutting down");
    })
    .await?;

    Ok(())
}

fn browser_command() -> (&'static str, &'static [&'static str]) {
    if cfg!(target_os = "macos") {
        ("open", &[])
    } else if cfg!(target_os = "windows") {
        ("cmd", &["/C", "start", ""])
    } else {
        ("xdg-open", &[])
    }
}

async fn open_browser(url: String) {
    let (program, args) = browser_command();
    let status = tokio::process::Command::new(program)
        .args(args)
        .arg(&url)
        .status()
        .await;
    match status {
        Ok(status) if status.success() => {}
        Ok(status) => tracing::warn!("Browser launcher {} exited with {}", program, status),
        Err(e) => tracing::warn!("Failed to launch browser with {}: {:?}", program, e),
    }
}
