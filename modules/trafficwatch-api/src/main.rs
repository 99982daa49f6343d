use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use trafficwatch_api::{router, serve, AppState, SHUTDOWN_GRACE};
use trafficwatch_common::Config;
use trafficwatch_core::EventStore;
use trafficwatch_events::{MemoryEventStore, PgEventStore};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("trafficwatch=info".parse()?))
        .init();

    let config = Config::from_env()?;

    let store: Arc<dyn EventStore> = match &config.database_url {
        Some(url) => {
            let store = PgEventStore::connect(url).await?;
            store.migrate().await?;
            Arc::new(store)
        }
        None => {
            warn!("DATABASE_URL not set; reports are kept in memory and lost on restart");
            Arc::new(MemoryEventStore::new())
        }
    };

    let state = Arc::new(AppState::new(store, config.scan_timeout));
    let app = router(state);

    let addr = format!("{}:{}", config.web_host, config.web_port);
    info!("TrafficWatch API starting on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    serve(listener, app, shutdown_signal(), SHUTDOWN_GRACE).await?;

    info!("TrafficWatch API stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, draining connections");
}
