use clap::Parser;
use posts_chaos::{app, config::Config, injection::Resolver, threshold::ThresholdProvider};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "posts_chaos=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::parse();

    tracing::info!(
        bind_address = %config.bind_address,
        parameter = %config.parameter_name,
        store = ?config.store,
        excluded_paths = ?config.excluded_paths,
        "configuration loaded"
    );

    let store = config.build_store()?;
    let provider = ThresholdProvider::new(store, config.parameter_name.clone())?
        .with_timeout(config.fetch_timeout());
    let state = app::AppState::new(Resolver::new(provider));
    let router = app::router(state, config.excluded_paths.clone());

    let listener = TcpListener::bind(config.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "cannot listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
