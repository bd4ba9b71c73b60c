use std::time::Duration;

mod app;
mod auth;
mod categories;
mod config;
mod db;
mod error;
mod photos;
mod products;
mod state;
mod stats;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "catalog=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let app_state = state::AppState::init().await?;

    // Expired sessions are already rejected on access; this only bounds memory.
    let sessions = app_state.sessions.clone();
    let every = Duration::from_secs(app_state.config.session.sweep_interval_secs);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            let removed = sessions.sweep();
            if removed > 0 {
                tracing::debug!(removed, "swept expired sessions");
            }
        }
    });

    app::serve(app::build_app(app_state)).await
}
