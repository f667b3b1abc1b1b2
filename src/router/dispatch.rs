//! Command delivery: broadcast, round-robin and targeted

use std::sync::Arc;

use bytes::Bytes;

use super::correlator::ReplyFuture;
use super::Router;
use crate::protocol::{CommandId, CommandMessage};
use crate::session::WeakSessionRef;

impl Router {
    /// Send a command to every registered session
    ///
    /// The message is built once and shared. Returns the number of sessions
    /// written to.
    pub fn broadcast(&self, id: CommandId, payload: impl Into<Bytes>) -> usize {
        let Some(message) = build_message(id, payload) else {
            return 0;
        };

        let state = self.state.lock();
        for session in state.registry.iter() {
            session.write(message.clone());
        }
        let recipients = state.registry.len();
        drop(state);

        if recipients == 0 {
            tracing::warn!(command = ?id, "Broadcast with no secondaries connected");
        } else {
            tracing::debug!(command = ?id, recipients = recipients, bytes = message.wire_len(), "Broadcast");
        }
        recipients
    }

    /// Send a command to the next session in round-robin order
    ///
    /// Returns immediately. With no sessions registered nothing is sent and
    /// the returned future never resolves.
    pub fn dispatch_round_robin(&self, id: CommandId, payload: impl Into<Bytes>) -> ReplyFuture {
        let Some(message) = build_message(id, payload) else {
            return ReplyFuture::detached();
        };

        let mut state = self.state.lock();
        let len = state.registry.len();
        let Some(index) = state.cursor.wrap(len) else {
            drop(state);
            tracing::warn!(command = ?id, "Round-robin dispatch with no secondaries connected");
            return ReplyFuture::detached();
        };

        let target = state.registry.get(index).cloned();
        let reply = match target {
            Some(session) => {
                let reply = state.pending.register(session.id());
                session.write(message);
                tracing::debug!(command = ?id, session_id = %session.id(), index = index, "Round-robin dispatch");
                reply
            }
            None => ReplyFuture::detached(),
        };
        state.cursor.advance();
        reply
    }

    /// Send a command to one specific session
    ///
    /// If the session is gone nothing is sent and the returned future never
    /// resolves.
    pub fn dispatch_targeted(
        &self,
        target: &WeakSessionRef,
        id: CommandId,
        payload: impl Into<Bytes>,
    ) -> ReplyFuture {
        let Some(message) = build_message(id, payload) else {
            return ReplyFuture::detached();
        };

        let mut state = self.state.lock();
        let Some(session) = target.upgrade() else {
            drop(state);
            tracing::warn!(command = ?id, "Targeted dispatch to expired session skipped");
            return ReplyFuture::detached();
        };

        let reply = state.pending.register(session.id());
        session.write(message);
        tracing::debug!(command = ?id, session_id = %session.id(), "Targeted dispatch");
        reply
    }

    /// Session the next round-robin dispatch would select
    ///
    /// Does not move the cursor. Returns an empty reference when no sessions
    /// are registered.
    pub fn peek_next_target(&self) -> WeakSessionRef {
        let state = self.state.lock();
        state
            .cursor
            .peek(state.registry.len())
            .and_then(|index| state.registry.get(index))
            .map(Arc::downgrade)
            .unwrap_or_default()
    }
}

/// Message for `id`, or `None` (logged) when the payload cannot be framed
fn build_message(id: CommandId, payload: impl Into<Bytes>) -> Option<CommandMessage> {
    match CommandMessage::new(id, payload) {
        Ok(message) => Some(message),
        Err(e) => {
            tracing::warn!(command = ?id, error = %e, "Command dropped");
            None
        }
    }
}
