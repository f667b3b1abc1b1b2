//! Router server: listener, worker pool and router wired together

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::error::Result;
use crate::router::Router;
use crate::server::config::RouterConfig;
use crate::server::listener::Listener;
use crate::server::pool::WorkerPool;

/// Primary node accepting secondaries and routing commands to them
///
/// Owns its worker pool, so it is started and shut down from ordinary
/// (non-async) threads.
pub struct RouterServer {
    config: RouterConfig,
    router: Arc<Router>,
    pool: WorkerPool,
    local_addr: SocketAddr,
    stop_tx: Option<oneshot::Sender<()>>,
    accept_task: Option<JoinHandle<Result<()>>>,
}

impl RouterServer {
    /// Start listening with a fresh router
    pub fn start(config: RouterConfig) -> Result<Self> {
        Self::start_with_router(config, Arc::new(Router::new()))
    }

    /// Start listening with an existing router (e.g. one with observers attached)
    ///
    /// The listener holds the router weakly; once every strong reference is
    /// gone connection events are ignored.
    pub fn start_with_router(config: RouterConfig, router: Arc<Router>) -> Result<Self> {
        let pool = WorkerPool::new(config.worker_threads)?;
        let listener = pool.block_on(Listener::bind(config.clone(), Arc::downgrade(&router)))??;
        let local_addr = listener.local_addr()?;

        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let accept_task = pool.spawn(async move {
            listener
                .run_until(async {
                    let _ = stop_rx.await;
                })
                .await
        })?;

        tracing::info!(addr = %local_addr, workers = pool.threads(), "Router server started");

        Ok(Self {
            config,
            router,
            pool,
            local_addr,
            stop_tx: Some(stop_tx),
            accept_task: Some(accept_task),
        })
    }

    pub fn router(&self) -> &Arc<Router> {
        &self.router
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Worker pool, e.g. for awaiting replies from synchronous code
    pub fn pool(&self) -> &WorkerPool {
        &self.pool
    }

    /// Bound listen address
    pub fn local_endpoint(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stop accepting, drop every session, then stop the worker pool
    ///
    /// The router is closed afterwards and refuses new sessions.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        let Some(stop_tx) = self.stop_tx.take() else {
            return;
        };

        let _ = stop_tx.send(());
        if let Some(task) = self.accept_task.take() {
            if Handle::try_current().is_ok() {
                task.abort();
            } else {
                match self.pool.block_on(task) {
                    Ok(Ok(Ok(()))) => {}
                    Ok(Ok(Err(e))) => tracing::error!(error = %e, "Listener failed"),
                    Ok(Err(e)) => tracing::error!(error = %e, "Listener task failed"),
                    Err(e) => tracing::error!(error = %e, "Worker pool unavailable"),
                }
            }
        }

        // Connections accepted just before the stop signal may still try to
        // register; closing the router turns those into no-ops.
        self.router.close();
        self.pool.stop(self.config.shutdown_timeout);
        tracing::info!(addr = %self.local_addr, "Router server stopped");
    }
}

impl Drop for RouterServer {
    fn drop(&mut self) {
        self.stop();
    }
}
