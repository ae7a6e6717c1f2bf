use anyhow::Context;

use stocktrack_infra::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    stocktrack_observability::init();

    let config = Config::from_env().context("invalid configuration")?;

    let services = stocktrack_api::app::build_services(&config).await?;
    let app = stocktrack_api::app::build_app(services);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("http server failed")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
