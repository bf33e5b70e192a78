mod api;
mod cache;
mod etag;
mod middleware;

use std::sync::Arc;

use anyhow::Context;
use keebstock_cms::CmsClient;
use keebstock_core::{default_layouts, load_app_config, load_categories, AppConfig};
use keebstock_sheets::SheetsClient;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::api::AppState;
use crate::cache::Caches;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = load_app_config().context("failed to load configuration")?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    config
        .require_credentials()
        .context("refusing to start in production")?;
    let missing = config.missing_credentials();
    if !missing.is_empty() {
        warn!(
            missing = ?missing,
            "starting without upstream credentials, affected routes will report configuration errors"
        );
    }

    let layouts = match config.categories_path.as_deref() {
        Some(path) => {
            let file = load_categories(path).with_context(|| {
                format!("failed to load category layouts from {}", path.display())
            })?;
            info!(path = %path.display(), count = file.categories.len(), "loaded category layouts");
            file.categories
        }
        None => default_layouts(),
    };

    let state = AppState {
        content: build_content_client(&config)?,
        inventory: build_inventory_client(&config)?,
        layouts: Arc::new(layouts),
        caches: Arc::new(Caches::new()),
        revalidate_secret: config.revalidate_secret.clone(),
    };

    let app = api::build_app(state, api::default_rate_limit_state());

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!(addr = %config.bind_addr, env = %config.env, "keebstock server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn build_content_client(config: &AppConfig) -> anyhow::Result<Option<Arc<CmsClient>>> {
    let (Some(space_id), Some(token)) = (
        config.content_space_id.as_deref(),
        config.content_token.as_deref(),
    ) else {
        return Ok(None);
    };
    let client = CmsClient::new(
        space_id,
        token,
        &config.content_environment,
        config.http_timeout_secs,
        &config.user_agent,
        config.http_max_retries,
        config.http_backoff_ms,
    )
    .context("failed to build content client")?;
    Ok(Some(Arc::new(client)))
}

fn build_inventory_client(config: &AppConfig) -> anyhow::Result<Option<Arc<SheetsClient>>> {
    let (Some(sheet_id), Some(api_key)) = (
        config.sheet_id.as_deref(),
        config.sheets_api_key.as_deref(),
    ) else {
        return Ok(None);
    };
    let client = SheetsClient::new(
        sheet_id,
        api_key,
        config.http_timeout_secs,
        &config.user_agent,
        config.http_max_retries,
        config.http_backoff_ms,
    )
    .context("failed to build inventory client")?;
    Ok(Some(Arc::new(client)))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install ctrl-c handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("shutdown signal received, draining connections");
}
