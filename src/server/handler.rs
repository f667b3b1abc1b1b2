//! Listener callback contract
//!
//! The listener owns accept and socket I/O. It reports what happens on each
//! connection through a [`SessionHandler`]; callbacks run on worker-pool
//! threads, possibly concurrently.

use std::sync::{Arc, Weak};

use bytes::Bytes;

use crate::router::Router;
use crate::session::SessionRef;

/// Receiver of connection events
pub trait SessionHandler: Send + Sync + 'static {
    /// A secondary connected; called before any of its replies
    fn on_open(&self, session: SessionRef);

    /// The connection ended; called exactly once per opened session
    fn on_close(&self, session: SessionRef);

    /// A complete reply frame arrived
    fn on_response(&self, session: SessionRef, payload: Bytes);
}

impl SessionHandler for Router {
    fn on_open(&self, session: SessionRef) {
        self.on_session_open(session);
    }

    fn on_close(&self, session: SessionRef) {
        self.on_session_close(&session);
    }

    fn on_response(&self, session: SessionRef, payload: Bytes) {
        self.on_response_payload(session, payload);
    }
}

/// Forwards to the router while it is alive; events after it is dropped are ignored
impl SessionHandler for Weak<Router> {
    fn on_open(&self, session: SessionRef) {
        if let Some(router) = self.upgrade() {
            router.on_open(session);
        }
    }

    fn on_close(&self, session: SessionRef) {
        if let Some(router) = self.upgrade() {
            router.on_close(session);
        }
    }

    fn on_response(&self, session: SessionRef, payload: Bytes) {
        if let Some(router) = self.upgrade() {
            router.on_response(session, payload);
        }
    }
}

impl<H: SessionHandler> SessionHandler for Arc<H> {
    fn on_open(&self, session: SessionRef) {
        (**self).on_open(session);
    }

    fn on_close(&self, session: SessionRef) {
        (**self).on_close(session);
    }

    fn on_response(&self, session: SessionRef, payload: Bytes) {
        (**self).on_response(session, payload);
    }
}
