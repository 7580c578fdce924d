use anyhow::Context;

use sparekeep_api::config::ApiConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ApiConfig::from_env();
    sparekeep_observability::init(config.log_format);
    config.log_defaults();

    let app = sparekeep_api::app::build_app(&config)
        .await
        .context("failed to wire services")?;

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, app).await?;
    Ok(())
}
