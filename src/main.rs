use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use offline_queue::config::ServiceConfig;
use offline_queue::server::{AppState, build_router};
use offline_queue::store::QueueStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "offline_queue=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServiceConfig::from_env()?;
    tracing::info!(
        state_dir = %config.state_dir.display(),
        stale_policy = ?config.queue.stale_policy,
        compact_after = config.compact_after,
        "Starting offline queue"
    );

    let store = QueueStore::open(&config.state_dir, config.queue, config.compact_after)
        .with_context(|| format!("opening state in {}", config.state_dir.display()))?;
    let app = build_router(AppState::new(store));

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("binding {}", config.listen_addr))?;
    tracing::info!("listening on {}", config.listen_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
