//! HTTP transport
//!
//! Thin axum layer over the query façade and the credential service.

pub mod auth;
pub mod error;
pub mod nodes;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::{InfraError, InfraResult};

pub use error::{ApiError, NodesEnvelope};

pub(crate) type ServerState = Arc<ServiceContainer>;

/// Build the API router over `services`.
pub fn router(services: ServiceContainer) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    Router::new()
        .route("/health", get(health))
        .route("/api/auth/login/", post(auth::login))
        .route("/api/auth/logout/", post(auth::logout))
        .route("/api/nodes/", get(nodes::list))
        .route("/api/nodes/create/", post(nodes::create))
        .route("/api/nodes/:id/", get(nodes::get))
        .route("/api/nodes/:id/children/", get(nodes::children))
        .with_state(Arc::new(services))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Running HTTP server; stops when shut down or dropped.
pub struct Server {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<std::io::Result<()>>>,
}

impl Server {
    /// Bind `addr` (port 0 picks a free port) and serve in a background task.
    pub async fn start(services: ServiceContainer, addr: SocketAddr) -> InfraResult<Self> {
        let app = router(services);
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| InfraError::io(format!("bind {addr}"), e))?;
        let addr = listener
            .local_addr()
            .map_err(|e| InfraError::io("read bound address", e))?;
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let handle = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                })
                .await
        });

        info!(%addr, "listening");
        Ok(Server {
            addr,
            shutdown: Some(shutdown_tx),
            handle: Some(handle),
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn shutdown(&mut self) -> InfraResult<()> {
        if let Some(sender) = self.shutdown.take() {
            sender.send(()).map_err(|_| InfraError::Server {
                message: "failed to send server shutdown signal".to_string(),
            })
        } else {
            Ok(())
        }
    }

    /// Wait for the serving task to finish.
    pub async fn join(mut self) -> InfraResult<()> {
        let Some(handle) = self.handle.take() else {
            return Ok(());
        };
        handle
            .await
            .map_err(|e| InfraError::Server {
                message: e.to_string(),
            })?
            .map_err(|e| InfraError::io("serve", e))
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        let _ = self.shutdown();
    }
}

/// Serve until Ctrl-C, then drain in-flight requests.
pub async fn run(services: ServiceContainer, addr: SocketAddr) -> InfraResult<()> {
    let mut server = Server::start(services, addr).await?;
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| InfraError::io("wait for ctrl-c", e))?;
    info!("shutting down");
    server.shutdown()?;
    server.join().await
}

async fn health() -> &'static str {
    "ok"
}
