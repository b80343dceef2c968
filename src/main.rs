use users_service::{app, config::AppConfig, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env()?;

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| config.default_log_filter().to_string());
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

    tracing::info!(
        profile = ?config.profile,
        debug = config.debug,
        testing = config.testing,
        "configuration loaded"
    );

    let host = config.host.clone();
    let port = config.port;
    let app_state = AppState::init(config).await?;

    app::serve(app::build_app(app_state), &host, port).await
}
