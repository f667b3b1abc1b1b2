//! Primary-side handle for one secondary connection

use std::fmt;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

use bytes::Bytes;
use tokio::sync::mpsc;

use crate::protocol::CommandMessage;

/// Shared handle to a registered session
pub type SessionRef = Arc<Primary>;

/// Non-owning handle used for targeted dispatch
pub type WeakSessionRef = Weak<Primary>;

static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique session identity
///
/// Allocated from a monotonic counter, so a secondary that reconnects always
/// gets a fresh identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(u64);

impl SessionId {
    /// Allocate the next identity
    pub fn next() -> Self {
        SessionId(NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One primary↔secondary connection as seen by the router
///
/// Writes are queued onto the connection's writer task and never block.
/// Per-session ordering is preserved by the queue.
pub struct Primary {
    id: SessionId,
    peer_addr: SocketAddr,
    connected_at: Instant,
    tx: mpsc::UnboundedSender<CommandMessage>,
}

impl Primary {
    /// Create a session writing into `tx`
    pub fn new(peer_addr: SocketAddr, tx: mpsc::UnboundedSender<CommandMessage>) -> Self {
        Self {
            id: SessionId::next(),
            peer_addr,
            connected_at: Instant::now(),
            tx,
        }
    }

    /// Create a shared session together with the receiving end of its write queue
    pub fn channel(peer_addr: SocketAddr) -> (SessionRef, mpsc::UnboundedReceiver<CommandMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Arc::new(Self::new(peer_addr, tx)), rx)
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }

    /// Time since the connection was accepted
    pub fn uptime(&self) -> Duration {
        self.connected_at.elapsed()
    }

    /// Whether the transport is still draining the write queue
    pub fn is_open(&self) -> bool {
        !self.tx.is_closed()
    }

    /// Queue a message for the secondary
    ///
    /// Fails silently once the transport has gone away.
    pub fn write(&self, message: CommandMessage) {
        if self.tx.send(message).is_err() {
            tracing::debug!(session_id = %self.id, peer = %self.peer_addr, "Write to closed session dropped");
        }
    }
}

impl fmt::Debug for Primary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Primary")
            .field("id", &self.id)
            .field("peer_addr", &self.peer_addr)
            .field("open", &self.is_open())
            .finish()
    }
}

/// Reply delivered for a correlated dispatch
#[derive(Debug, Clone)]
pub struct SessionInfo {
    /// Session that answered
    pub session: SessionRef,
    /// Raw reply bytes
    pub payload: Bytes,
}
