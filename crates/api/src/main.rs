use anyhow::Context;

use uniasia_api::app;
use uniasia_api::config::ApiConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    uniasia_observability::init();

    let config = ApiConfig::from_env().context("load configuration")?;
    let services = app::services::build_services(&config).await?;
    let router = app::build_app(&config.webhook_secret, services);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("bind {addr}"))?;

    tracing::info!(
        addr = %listener.local_addr()?,
        threshold = config.threshold.get(),
        "listening"
    );

    axum::serve(listener, router).await.context("server error")?;
    Ok(())
}
