//! HTTP server lifecycle.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tower_http::cors::{Any, CorsLayer};

use crate::audit::AuditSink;
use crate::config::Config;
use crate::error::{BridgeError, BridgeResult};
use crate::registry::Registry;
use crate::runner::ExecPolicy;

pub mod error;
mod tools;

/// Shared read-only state behind every handler. The registry and policy
/// are immutable after startup, so concurrent handlers need no locking.
pub struct ServerState {
    pub(crate) registry: Registry,
    pub(crate) policy: ExecPolicy,
    pub(crate) audit: Arc<dyn AuditSink>,
}

/// A running bridge server. Dropping the handle shuts the server down.
pub struct Server {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
}

impl Server {
    /// Bind the configured listen address, spawn the serve loop, and
    /// return a handle to it.
    pub async fn bind(
        config: &Config,
        registry: Registry,
        audit: Arc<dyn AuditSink>,
    ) -> BridgeResult<Self> {
        let state = Arc::new(ServerState {
            registry,
            policy: ExecPolicy::from_config(config),
            audit,
        });
        let app = router(state);

        let listener = TcpListener::bind(&config.listen_addr).await.map_err(|error| {
            BridgeError::Internal(format!("failed to bind {}: {error}", config.listen_addr))
        })?;
        let addr = listener
            .local_addr()
            .map_err(|error| BridgeError::Internal(format!("failed to read local addr: {error}")))?;
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        tokio::spawn(async move {
            let _ = axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                })
                .await;
        });

        tracing::info!(%addr, "toolbridge listening");
        Ok(Server {
            addr,
            shutdown: Some(shutdown_tx),
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn shutdown(&mut self) {
        if let Some(sender) = self.shutdown.take() {
            let _ = sender.send(());
        }
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn router(state: Arc<ServerState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    Router::new()
        .route("/v1/health", get(tools::health))
        .route("/v1/tools", get(tools::list_tools))
        .route("/v1/tools/:name", get(tools::get_tool))
        .route("/v1/tools/:name/run", post(tools::run_tool))
        .fallback(tools::fallback)
        .with_state(state)
        .layer(cors)
}
