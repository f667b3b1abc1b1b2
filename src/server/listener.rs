//! Secondary listener
//!
//! Handles the TCP accept loop and spawns a connection driver per secondary.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::{TcpListener, TcpStream};

use crate::error::Result;
use crate::server::config::RouterConfig;
use crate::server::connection::Connection;
use crate::server::handler::SessionHandler;
use crate::session::Primary;

/// Accepts secondary connections and reports them to a [`SessionHandler`]
pub struct Listener<H: SessionHandler> {
    config: RouterConfig,
    handler: Arc<H>,
    listener: TcpListener,
}

impl<H: SessionHandler> Listener<H> {
    /// Bind the configured endpoint
    pub async fn bind(config: RouterConfig, handler: H) -> Result<Self> {
        let listener = TcpListener::bind(config.endpoint()).await?;
        Ok(Self {
            config,
            handler: Arc::new(handler),
            listener,
        })
    }

    /// Actual bound address (resolves port 0)
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections until `shutdown` completes
    ///
    /// Connections already accepted keep running on their own tasks.
    pub async fn run_until<F>(&self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        tracing::info!(addr = %self.local_addr()?, "Listening for secondaries");

        tokio::select! {
            _ = shutdown => {
                tracing::info!("Listener stopped");
                Ok(())
            }
            result = self.accept_loop() => result,
        }
    }

    async fn accept_loop(&self) -> Result<()> {
        loop {
            match self.listener.accept().await {
                Ok((socket, peer_addr)) => {
                    self.handle_connection(socket, peer_addr);
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to accept connection");
                }
            }
        }
    }

    fn handle_connection(&self, socket: TcpStream, peer_addr: SocketAddr) {
        if self.config.tcp_nodelay {
            if let Err(e) = socket.set_nodelay(true) {
                tracing::error!(peer = %peer_addr, error = %e, "Failed to configure socket");
                return;
            }
        }

        let (session, rx) = Primary::channel(peer_addr);
        let session_id = session.id();
        tracing::debug!(session_id = %session_id, peer = %peer_addr, "New secondary connection");

        let connection = Connection::new(
            session,
            socket,
            rx,
            Arc::clone(&self.handler),
            self.config.max_response_size,
        );

        tokio::spawn(async move {
            if let Err(e) = connection.run().await {
                tracing::debug!(session_id = %session_id, error = %e, "Connection error");
            }
            tracing::debug!(session_id = %session_id, "Connection closed");
        });
    }
}
