use log::*;
use service::{config::Config, logging::Logger, AppState};
use std::time::Duration;

#[tokio::main]
async fn main() {
    let config = Config::new();
    Logger::init_logger(&config as &Config);

    info!(
        "Starting OAuth login service [{}]...",
        config.runtime_env()
    );

    if config.is_production() && !config.redirect_uri().starts_with("https://") {
        warn!(
            "Redirect URI {} is not https in production; authorization codes will cross the network in plaintext",
            config.redirect_uri()
        );
    }

    let sweep_interval = Duration::from_secs(config.state_sweep_interval_seconds.max(1));

    let app_state = match AppState::new(config) {
        Ok(app_state) => app_state,
        Err(e) => {
            error!("Invalid OAuth provider configuration: {e}");
            std::process::exit(1);
        }
    };

    web::spawn_state_sweeper(app_state.state_guard.clone(), sweep_interval);

    if let Err(e) = web::init_server(app_state).await {
        error!("Server exited with error: {e}");
        std::process::exit(1);
    }
}
