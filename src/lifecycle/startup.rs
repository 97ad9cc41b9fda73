//! Startup orchestration.
//!
//! # Responsibilities
//! - Initialize logging and metrics from the loaded configuration
//! - Build the registry, caches and invalidation worker in dependency order
//! - Register configured frontends, then start background tasks
//! - Bind the listener and serve until a shutdown signal arrives
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - The invalidation listener is subscribed after the initial frontends
//!   are registered (nothing is cached yet)
//! - Listeners start last (traffic only when ready)
//! - The invalidation worker gets a bounded drain window on shutdown

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;

use crate::auth::{AuthDefaults, AuthOptionsBinder};
use crate::cache::{self, IndexHtmlCache, InvalidationWorker};
use crate::config::watcher::ConfigWatcher;
use crate::config::{ConfigSync, GatewayConfig};
use crate::http::{AppState, GatewayServer};
use crate::lifecycle::{signals, Shutdown};
use crate::observability::{logging, metrics};
use crate::registry::FrontendRegistry;
use crate::routing::FrontendResolver;

/// Time the invalidation worker gets to drain after shutdown.
pub const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid metrics address {0:?}")]
    MetricsAddress(String),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("config watcher failed: {0}")]
    Watch(#[from] notify::Error),

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),

    #[error("server task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Everything the HTTP layer and background tasks share.
pub struct Subsystems {
    pub state: AppState,
    pub sync: ConfigSync,
    pub worker: InvalidationWorker,
}

/// Build the registry and its consumers and register configured frontends.
pub fn init_subsystems(config: &GatewayConfig) -> Subsystems {
    let registry = FrontendRegistry::new();
    let binder = Arc::new(AuthOptionsBinder::new(AuthDefaults::from_settings(
        config.auth.cookie.clone(),
        config.auth.oidc.clone(),
    )));
    let index_html = Arc::new(IndexHtmlCache::new(config.index_html.fetch_timeout()));

    let mut sync = ConfigSync::new(registry.clone());
    sync.apply(&config.frontends);

    let (sender, worker) = cache::channel(config.invalidation.queue_capacity);
    let worker = worker.with_cache(binder.clone()).with_cache(index_html.clone());
    registry.subscribe(Arc::new(sender));

    let state = AppState {
        resolver: FrontendResolver::new(registry),
        binder,
        index_html,
        listener: Arc::new(config.listener.clone()),
        admin: Arc::new(config.admin.clone()),
    };

    Subsystems { state, sync, worker }
}

/// Run the gateway until SIGINT/SIGTERM.
///
/// With `watch_path` set, `[[frontends]]` changes in that file are applied
/// to the running registry.
pub async fn run(config: GatewayConfig, watch_path: Option<PathBuf>) -> Result<(), StartupError> {
    logging::init_logging(&config.observability.log_level);
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        admin_enabled = config.admin.enabled,
        "bff-gateway starting"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config
            .observability
            .metrics_address
            .parse()
            .map_err(|_| StartupError::MetricsAddress(config.observability.metrics_address.clone()))?;
        metrics::init_metrics(addr);
    }

    let Subsystems { state, sync, worker } = init_subsystems(&config);
    tracing::info!(frontends = state.registry().len(), "Frontends registered");

    let shutdown = Shutdown::new();
    let worker_task = tokio::spawn(worker.run(shutdown.subscribe()));

    // Dropping the handle stops notifications.
    let _watcher = match &watch_path {
        Some(path) => Some(spawn_reload(path, sync, shutdown.subscribe())?),
        None => None,
    };

    let listener = TcpListener::bind(&config.listener.bind_address)
        .await
        .map_err(|source| StartupError::Bind {
            address: config.listener.bind_address.clone(),
            source,
        })?;

    let server = GatewayServer::new(state, Duration::from_secs(config.timeouts.request_secs));
    let mut server_task = tokio::spawn(server.run(listener, shutdown.subscribe()));

    let early_exit = tokio::select! {
        result = &mut server_task => Some(result),
        _ = signals::wait_for_signal() => None,
    };
    shutdown.trigger();

    let served = match early_exit {
        Some(result) => result,
        None => server_task.await,
    };

    match tokio::time::timeout(DRAIN_TIMEOUT, worker_task).await {
        Ok(Ok(stats)) => tracing::info!(
            events = stats.events,
            failures = stats.failures,
            "Invalidation worker stopped"
        ),
        Ok(Err(e)) => tracing::error!(error = %e, "Invalidation worker panicked"),
        Err(_) => tracing::warn!(timeout = ?DRAIN_TIMEOUT, "Invalidation worker did not drain in time"),
    }

    served?.map_err(StartupError::Serve)?;
    tracing::info!("Shutdown complete");
    Ok(())
}

fn spawn_reload(
    path: &Path,
    mut sync: ConfigSync,
    mut shutdown: broadcast::Receiver<()>,
) -> Result<notify::RecommendedWatcher, StartupError> {
    let (watcher, mut updates) = ConfigWatcher::new(path);
    let handle = watcher.run()?;

    tokio::spawn(async move {
        loop {
            tokio::select! {
                update = updates.recv() => match update {
                    Some(config) => {
                        sync.apply(&config.frontends);
                    }
                    None => break,
                },
                _ = shutdown.recv() => break,
            }
        }
        tracing::debug!("Config reload task stopped");
    });

    Ok(handle)
}
