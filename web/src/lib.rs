use log::*;
use std::time::Duration;
use tokio::task::JoinHandle;

use provider_auth::oauth::StateTokenGuard;

pub use service::AppState;

mod controller;
pub mod error;
pub mod router;

pub use error::{Error, Result};

/// Binds the configured interface and port and serves the login routes until the process
/// is stopped.
pub async fn init_server(app_state: AppState) -> std::io::Result<()> {
    let interface = app_state
        .config
        .interface
        .clone()
        .unwrap_or_else(|| "127.0.0.1".to_string());
    let listen_addr = format!("{}:{}", interface, app_state.config.port);

    info!("Server starting... listening for connections on http://{listen_addr}");

    let listener = tokio::net::TcpListener::bind(&listen_addr).await?;
    axum::serve(listener, router::define_routes(app_state)).await
}

/// Spawns a background task that drops abandoned login attempts every `interval`.
///
/// Expired attempts already fail verification; the sweep only bounds memory held by logins
/// that never return.
pub fn spawn_state_sweeper(guard: StateTokenGuard, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let removed = guard.cleanup_expired();
            if removed > 0 {
                debug!("Swept {removed} expired login attempts");
            }
        }
    })
}
