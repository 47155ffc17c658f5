use casting_axum::{router, AppState, Config};
use casting_catalog::Catalog;
use casting_oauth2::{Gate, KeyStore, RemoteJwks, TokenVerifier};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();

    let source = RemoteJwks::new(config.jwks_url())?;
    let keys = KeyStore::new(source, config.key_store_options());
    if let Err(err) = keys.refresh().await {
        let error: &dyn std::error::Error = &err;
        tracing::warn!(error, "initial key set fetch failed; keys will be fetched on demand");
    }
    let refresher = keys.spawn_refresh(config.refresh_interval());

    let state = AppState {
        gate: Gate::new(TokenVerifier::new(keys, config.validator())),
        catalog: Catalog::new(),
    };

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    tracing::info!(
        addr = %config.bind,
        issuer = %config.issuer,
        audience = %config.audience,
        algorithm = %config.algorithm,
        "serving casting catalog"
    );

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    refresher.abort();
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        {
            let error: &dyn std::error::Error = &err;
            tracing::error!(error, "unable to listen for shutdown signal");
        }
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
