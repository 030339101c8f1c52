//! Entry point: load config, wire dependencies, and run the server.

use std::sync::Arc;

use credo::auth::{AlphanumericCodeGenerator, AuthService, TokenIssuer};
use credo::clock::SystemClock;
use credo::config::Config;
use credo::db::{self, PgAccountStore};
use credo::email::SmtpNotifier;
use credo::{create_app, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!("config: {}", e))?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))?;
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let pool = db::create_pool(&config.database_url).await?;
    let store = Arc::new(PgAccountStore::new(pool));
    let notifier =
        Arc::new(SmtpNotifier::new(&config).map_err(|e| anyhow::anyhow!("smtp: {}", e))?);
    let tokens = TokenIssuer::new(
        &config.secret_key,
        chrono::Duration::minutes(config.token_ttl_minutes),
        Arc::new(SystemClock),
    );
    let auth_service = AuthService::new(
        store,
        notifier,
        Arc::new(AlphanumericCodeGenerator),
        tokens,
    );

    let state = AppState::new(auth_service);
    let app = create_app(state);

    tracing::info!(addr = %config.server_addr, "listening");
    let listener = tokio::net::TcpListener::bind(config.server_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
