mod routes;
mod singleton;
mod state;

use anyhow::Result;
use cares_core::config::CaresConfig;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cares_server=info,cares_core=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = CaresConfig::load()?;
    let data_file = config.data_file_path();

    // Ensure only one instance writes this events file
    let _lock = singleton::acquire_lock(&data_file)?;

    let state = AppState::from_config(&config)?;
    if config.smtp.is_none() {
        tracing::warn!("no [smtp] relay configured, signup confirmations will only be logged");
    }

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = routes::app(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    tracing::info!(
        addr = %listener.local_addr()?,
        data_file = %data_file.display(),
        "cares-server listening"
    );

    axum::serve(listener, app).await?;

    Ok(())
}
