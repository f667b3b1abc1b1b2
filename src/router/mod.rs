//! Session router
//!
//! The router tracks connected secondaries and sends commands to them.
//! All mutable state sits behind one coarse lock, so every registry change
//! and every dispatch sees a consistent view of the connected sessions.
//!
//! # Architecture
//!
//! ```text
//!                          Arc<Router>
//!                 ┌─────────────────────────────┐
//!                 │ Mutex<RouterState {         │
//!                 │   registry: [A, B, C],      │
//!                 │   cursor: next index,       │
//!                 │   pending: id → oneshot::Tx │
//!                 │ }>                          │
//!                 └──────────────┬──────────────┘
//!                                │
//!      ┌─────────────────────────┼─────────────────────────┐
//!      │                         │                         │
//!      ▼                         ▼                         ▼
//! [Listener]              [Application]              [Listener]
//! on_open / on_close      broadcast()                on_response
//!   registry add/remove   dispatch_round_robin()       pending.fulfill()
//!                         dispatch_targeted()            │
//!                           write + ReplyFuture ◄────────┘
//! ```
//!
//! # Delivery policies
//!
//! - **Broadcast**: one message, written to every registered session under a
//!   single lock acquisition.
//! - **Round-robin**: the session under the cursor, then the cursor advances.
//! - **Targeted**: a specific session addressed through a weak reference.
//!
//! Round-robin and targeted dispatch return a [`ReplyFuture`] immediately.
//! Nothing here times out or cancels; a dispatch that could not be delivered
//! yields a future that never resolves.

pub mod correlator;
pub mod cursor;
pub mod dispatch;
pub mod lifecycle;
pub mod registry;

pub use correlator::{PendingCorrelationMap, ReplyFuture};
pub use cursor::RoundRobinCursor;
pub use lifecycle::Observer;
pub use registry::SessionRegistry;

use parking_lot::{Mutex, RwLock};

/// State guarded by the router lock
#[derive(Debug, Default)]
struct RouterState {
    registry: SessionRegistry,
    cursor: RoundRobinCursor,
    pending: PendingCorrelationMap,
    /// Set at shutdown; no session may register afterwards
    closed: bool,
}

/// Routing core of the primary node
pub struct Router {
    state: Mutex<RouterState>,
    observers: RwLock<Vec<Observer>>,
}

impl Router {
    /// Create an empty router with no observers
    pub fn new() -> Self {
        Self {
            state: Mutex::new(RouterState::default()),
            observers: RwLock::new(Vec::new()),
        }
    }

    /// Create a router that notifies `observer` on every new session
    pub fn with_observer<F>(observer: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        let router = Self::new();
        router.add_observer(observer);
        router
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("Router")
            .field("sessions", &state.registry.len())
            .field("cursor", &state.cursor.position())
            .field("pending", &state.pending.len())
            .field("closed", &state.closed)
            .field("observers", &self.observers.read().len())
            .finish()
    }
}
