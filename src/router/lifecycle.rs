//! Session lifecycle and registry maintenance
//!
//! Sessions move `unregistered → registered → unregistered`; a reconnecting
//! secondary arrives as a new session with a new identity. Closing a session
//! leaves any reply still pending for it in place.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use super::Router;
use crate::session::{Primary, SessionRef};

/// Callback fired once per newly registered session
pub type Observer = Arc<dyn Fn() + Send + Sync>;

impl Router {
    /// Register an observer for new sessions
    pub fn add_observer<F>(&self, observer: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.observers.write().push(Arc::new(observer));
    }

    /// Register a session and notify observers
    ///
    /// Registering a session that is already present, or registering after
    /// [`close`](Self::close), changes nothing and does not notify.
    pub fn add_session(&self, session: SessionRef) -> bool {
        let id = session.id();
        let mut state = self.state.lock();
        if state.closed {
            drop(state);
            tracing::warn!(session_id = %id, "Router closed, session not registered");
            return false;
        }
        if !state.registry.add(session) {
            drop(state);
            tracing::warn!(session_id = %id, "Session already registered");
            return false;
        }
        let count = state.registry.len();
        drop(state);

        tracing::info!(session_id = %id, sessions = count, "Connected secondary servers");
        self.notify_observers();
        true
    }

    /// Unregister a session; no-op if it is not registered
    pub fn remove_session(&self, session: &Primary) -> bool {
        let mut state = self.state.lock();
        let removed = state.registry.remove(session);
        let count = state.registry.len();
        let pending = state.pending.contains(session.id());
        drop(state);

        if removed {
            tracing::info!(session_id = %session.id(), sessions = count, "Connected secondary servers");
            if pending {
                tracing::warn!(session_id = %session.id(), "Secondary left with a reply still pending");
            }
        }
        removed
    }

    /// Unregister every session
    pub fn clear_sessions(&self) -> usize {
        let cleared = self.state.lock().registry.clear();
        tracing::info!(sessions = cleared, "Disconnecting all secondary servers");
        cleared
    }

    /// Unregister every session and refuse new ones from now on
    pub fn close(&self) -> usize {
        let mut state = self.state.lock();
        state.closed = true;
        let cleared = state.registry.clear();
        drop(state);

        tracing::info!(sessions = cleared, "Router closed");
        cleared
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    /// Number of registered sessions
    pub fn session_count(&self) -> usize {
        self.state.lock().registry.len()
    }

    /// Snapshot of registered sessions in registration order
    pub fn sessions(&self) -> Vec<SessionRef> {
        self.state.lock().registry.iter().cloned().collect()
    }

    /// Connection-opened event from the listener
    pub fn on_session_open(&self, session: SessionRef) {
        self.add_session(session);
    }

    /// Connection-closed event from the listener
    pub fn on_session_close(&self, session: &Primary) {
        self.remove_session(session);
    }

    fn notify_observers(&self) {
        let observers: Vec<Observer> = self.observers.read().clone();
        for observer in observers {
            if panic::catch_unwind(AssertUnwindSafe(|| observer())).is_err() {
                tracing::warn!("Session observer panicked");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::SocketAddr;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn session() -> SessionRef {
        let addr: SocketAddr = "127.0.0.1:8000".parse().unwrap();
        Primary::channel(addr).0
    }

    #[test]
    fn test_open_close() {
        let router = Router::new();
        let a = session();
        let b = session();

        router.on_session_open(a.clone());
        router.on_session_open(b.clone());
        assert_eq!(router.session_count(), 2);

        router.on_session_close(&a);
        assert_eq!(router.session_count(), 1);
        assert_eq!(router.sessions()[0].id(), b.id());

        // Closing twice is harmless.
        router.on_session_close(&a);
        assert_eq!(router.session_count(), 1);
    }

    #[test]
    fn test_observer_called_per_session() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let router = Router::with_observer(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let a = session();
        router.on_session_open(a.clone());
        router.on_session_open(session());
        router.on_session_open(a);

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_observer_sees_registered_session() {
        let router = Arc::new(Router::new());
        let seen = Arc::new(AtomicUsize::new(0));
        let weak = Arc::downgrade(&router);
        let seen_clone = Arc::clone(&seen);
        router.add_observer(move || {
            if let Some(router) = weak.upgrade() {
                seen_clone.store(router.session_count(), Ordering::SeqCst);
            }
        });

        router.on_session_open(session());
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_panicking_observer_is_contained() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let router = Router::new();
        router.add_observer(|| panic!("observer failure"));
        router.add_observer(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        router.on_session_open(session());

        assert_eq!(router.session_count(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_close_keeps_pending_reply() {
        let router = Router::new();
        let a = session();
        router.on_session_open(a.clone());

        let _reply = router.dispatch_round_robin(crate::protocol::CommandId::GetToken, bytes::Bytes::new());
        router.on_session_close(&a);

        assert_eq!(router.pending_count(), 1);
    }

    #[test]
    fn test_clear() {
        let router = Router::new();
        router.on_session_open(session());
        router.on_session_open(session());

        assert_eq!(router.clear_sessions(), 2);
        assert_eq!(router.session_count(), 0);
    }

    #[test]
    fn test_open_after_close_refused() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let router = Router::with_observer(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        router.on_session_open(session());

        assert_eq!(router.close(), 1);
        assert!(router.is_closed());

        router.on_session_open(session());
        assert_eq!(router.session_count(), 0);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_concurrent_open_close() {
        let router = Arc::new(Router::new());
        let mut handles = Vec::new();

        for t in 0..8 {
            let router = Arc::clone(&router);
            handles.push(std::thread::spawn(move || {
                let mut kept = 0usize;
                for i in 0..50 {
                    let s = session();
                    router.on_session_open(s.clone());
                    router.on_session_open(s.clone());
                    if (i + t) % 2 == 0 {
                        router.on_session_close(&s);
                    } else {
                        kept += 1;
                    }
                }
                kept
            }));
        }

        let expected: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(router.session_count(), expected);
    }
}
