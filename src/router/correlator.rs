//! Reply correlation
//!
//! Each correlated dispatch parks a one-shot sender here, keyed by the
//! identity of the target session. The next reply from that session fulfils
//! it. There is no timeout and no cancellation: an entry leaves the map only
//! when a reply arrives or a newer dispatch to the same session replaces it.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use tokio::sync::oneshot;

use super::Router;
use crate::session::{SessionId, SessionInfo, SessionRef};

/// Pending reply slots, at most one per session
#[derive(Debug, Default)]
pub struct PendingCorrelationMap {
    pending: HashMap<SessionId, oneshot::Sender<SessionInfo>>,
}

impl PendingCorrelationMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Park a reply slot for `id` and return the future it resolves
    ///
    /// A slot already waiting for `id` is replaced; its future never resolves.
    pub fn register(&mut self, id: SessionId) -> ReplyFuture {
        let (tx, rx) = oneshot::channel();
        if self.pending.insert(id, tx).is_some() {
            tracing::warn!(
                session_id = %id,
                "Pending reply overwritten, previous caller will not be answered"
            );
        }
        tracing::debug!(session_id = %id, pending = self.pending.len(), "Reply slot registered");
        ReplyFuture::waiting(rx)
    }

    /// Deliver a reply to the slot registered for `session`
    ///
    /// Returns `false` if nothing was waiting, in which case the payload is dropped.
    pub fn fulfill(&mut self, session: SessionRef, payload: Bytes) -> bool {
        let id = session.id();
        let size = payload.len();
        match self.pending.remove(&id) {
            Some(tx) => {
                tracing::debug!(session_id = %id, bytes = size, "Reply from secondary (with waiter)");
                if tx.send(SessionInfo { session, payload }).is_err() {
                    tracing::debug!(session_id = %id, "Reply waiter already gone");
                }
                true
            }
            None => {
                tracing::info!(session_id = %id, bytes = size, "Reply from secondary (without waiter), discarded");
                false
            }
        }
    }

    pub fn contains(&self, id: SessionId) -> bool {
        self.pending.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl Router {
    /// Route a reply payload from `session` to its pending caller
    ///
    /// Unsolicited replies are logged and dropped.
    pub fn on_response_payload(&self, session: SessionRef, payload: Bytes) -> bool {
        self.state.lock().pending.fulfill(session, payload)
    }

    /// Number of dispatches still waiting for a reply
    pub fn pending_count(&self) -> usize {
        self.state.lock().pending.len()
    }
}

/// Future resolving to the single reply of a correlated dispatch
///
/// It never resolves when nothing was sent (empty registry, expired target)
/// or when its slot was overwritten; callers wrap it in their own timeout.
#[derive(Debug)]
pub struct ReplyFuture {
    state: ReplyState,
}

#[derive(Debug)]
enum ReplyState {
    Waiting(oneshot::Receiver<SessionInfo>),
    Detached,
}

impl ReplyFuture {
    pub(crate) fn waiting(rx: oneshot::Receiver<SessionInfo>) -> Self {
        Self {
            state: ReplyState::Waiting(rx),
        }
    }

    /// A future with no reply slot behind it
    pub(crate) fn detached() -> Self {
        Self {
            state: ReplyState::Detached,
        }
    }

    /// Whether this future can no longer resolve
    pub fn is_detached(&self) -> bool {
        matches!(self.state, ReplyState::Detached)
    }

    /// Take the reply if it has already arrived
    pub fn try_take(&mut self) -> Option<SessionInfo> {
        match &mut self.state {
            ReplyState::Waiting(rx) => match rx.try_recv() {
                Ok(info) => {
                    self.state = ReplyState::Detached;
                    Some(info)
                }
                Err(oneshot::error::TryRecvError::Empty) => None,
                Err(oneshot::error::TryRecvError::Closed) => {
                    self.state = ReplyState::Detached;
                    None
                }
            },
            ReplyState::Detached => None,
        }
    }
}

impl Future for ReplyFuture {
    type Output = SessionInfo;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<SessionInfo> {
        let this = &mut *self;
        match &mut this.state {
            ReplyState::Waiting(rx) => match Pin::new(rx).poll(cx) {
                Poll::Ready(Ok(info)) => {
                    this.state = ReplyState::Detached;
                    Poll::Ready(info)
                }
                // Slot dropped without an answer: stays pending forever.
                Poll::Ready(Err(_)) => {
                    this.state = ReplyState::Detached;
                    Poll::Pending
                }
                Poll::Pending => Poll::Pending,
            },
            ReplyState::Detached => Poll::Pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Primary;
    use std::net::SocketAddr;
    use tokio_test::{assert_pending, assert_ready, task};

    fn session() -> SessionRef {
        let addr: SocketAddr = "127.0.0.1:6000".parse().unwrap();
        Primary::channel(addr).0
    }

    #[test]
    fn test_fulfill_once() {
        let mut map = PendingCorrelationMap::new();
        let a = session();

        let mut reply = task::spawn(map.register(a.id()));
        assert_pending!(reply.poll());

        assert!(map.fulfill(a.clone(), Bytes::from_static(b"ok1")));
        assert!(reply.is_woken());
        let info = assert_ready!(reply.poll());
        assert_eq!(info.session.id(), a.id());
        assert_eq!(info.payload, Bytes::from_static(b"ok1"));

        // Second, unsolicited reply is dropped.
        assert!(!map.fulfill(a, Bytes::from_static(b"ok2")));
        assert!(map.is_empty());
    }

    #[test]
    fn test_unsolicited_reply_discarded() {
        let mut map = PendingCorrelationMap::new();
        assert!(!map.fulfill(session(), Bytes::from_static(b"stray")));
    }

    #[test]
    fn test_overwrite_orphans_previous() {
        let mut map = PendingCorrelationMap::new();
        let a = session();

        let mut first = task::spawn(map.register(a.id()));
        let mut second = task::spawn(map.register(a.id()));
        assert_eq!(map.len(), 1);

        map.fulfill(a, Bytes::from_static(b"late"));

        assert_pending!(first.poll());
        assert!(first.is_detached());
        let info = assert_ready!(second.poll());
        assert_eq!(info.payload, Bytes::from_static(b"late"));
    }

    #[test]
    fn test_detached_never_resolves() {
        let mut reply = task::spawn(ReplyFuture::detached());
        assert_pending!(reply.poll());
        assert_pending!(reply.poll());
    }

    #[test]
    fn test_try_take() {
        let mut map = PendingCorrelationMap::new();
        let a = session();
        let mut reply = map.register(a.id());

        assert!(reply.try_take().is_none());
        map.fulfill(a, Bytes::from_static(b"x"));
        assert_eq!(reply.try_take().unwrap().payload, Bytes::from_static(b"x"));
        assert!(reply.is_detached());
    }

    #[tokio::test]
    async fn test_reply_across_tasks() {
        let mut map = PendingCorrelationMap::new();
        let a = session();
        let reply = map.register(a.id());

        let responder = tokio::spawn(async move {
            map.fulfill(a, Bytes::from_static(b"pong"));
        });

        let info = tokio::time::timeout(std::time::Duration::from_secs(1), reply)
            .await
            .unwrap();
        assert_eq!(info.payload, Bytes::from_static(b"pong"));
        responder.await.unwrap();
    }
}
