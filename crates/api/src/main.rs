use anyhow::Context;

use crudapi_api::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = match AppConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            crudapi_observability::init(Default::default());
            tracing::error!("invalid configuration: {e}");
            return Err(e.into());
        }
    };
    crudapi_observability::init(config.log_format);

    let store = crudapi_api::app::services::build_store(&config)
        .await
        .context("failed to initialize product store")?;
    let app = crudapi_api::app::build_app(store);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
