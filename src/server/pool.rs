//! Worker pool driving connection I/O and callbacks

use std::future::Future;
use std::time::Duration;

use tokio::runtime::{Builder, Handle, Runtime};
use tokio::task::JoinHandle;

use crate::error::{Error, Result};

/// Multi-threaded runtime owned by the router server
pub struct WorkerPool {
    runtime: Option<Runtime>,
    threads: usize,
}

impl WorkerPool {
    /// Start a pool with `threads` workers (at least one)
    pub fn new(threads: usize) -> Result<Self> {
        let threads = threads.max(1);
        let runtime = Builder::new_multi_thread()
            .worker_threads(threads)
            .thread_name("router-worker")
            .enable_all()
            .build()?;

        tracing::debug!(threads = threads, "Worker pool started");
        Ok(Self {
            runtime: Some(runtime),
            threads,
        })
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    pub fn is_running(&self) -> bool {
        self.runtime.is_some()
    }

    /// Handle for spawning onto the pool from elsewhere
    pub fn handle(&self) -> Result<Handle> {
        Ok(self.runtime()?.handle().clone())
    }

    pub fn spawn<F>(&self, future: F) -> Result<JoinHandle<F::Output>>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        Ok(self.runtime()?.spawn(future))
    }

    /// Run `future` to completion on the pool
    ///
    /// Must not be called from inside an async context.
    pub fn block_on<F: Future>(&self, future: F) -> Result<F::Output> {
        Ok(self.runtime()?.block_on(future))
    }

    /// Run `future` on the pool for at most `timeout`
    ///
    /// Returns `None` if it did not finish in time. The timer is created
    /// inside the pool, so this is safe to call from plain threads.
    pub fn block_on_timeout<F: Future>(
        &self,
        timeout: Duration,
        future: F,
    ) -> Result<Option<F::Output>> {
        self.block_on(async move { tokio::time::timeout(timeout, future).await.ok() })
    }

    /// Stop all workers, waiting up to `timeout` for running tasks
    pub fn stop(&mut self, timeout: Duration) {
        if let Some(runtime) = self.runtime.take() {
            // Blocking shutdown is not allowed from inside another runtime.
            if Handle::try_current().is_ok() {
                runtime.shutdown_background();
            } else {
                runtime.shutdown_timeout(timeout);
            }
            tracing::debug!("Worker pool stopped");
        }
    }

    fn runtime(&self) -> Result<&Runtime> {
        self.runtime
            .as_ref()
            .ok_or_else(|| Error::Runtime("worker pool stopped".into()))
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.stop(Duration::from_secs(1));
    }
}
