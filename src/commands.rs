//! Typed command helpers
//!
//! Thin layer over the router that knows how each command is addressed and
//! how its payload is laid out.

use std::sync::Arc;

use bytes::Bytes;

use crate::protocol::CommandId;
use crate::router::{ReplyFuture, Router};
use crate::session::WeakSessionRef;

/// Command front-end of a primary node
#[derive(Debug, Clone)]
pub struct PrimaryCommands {
    router: Arc<Router>,
}

impl PrimaryCommands {
    pub fn new(router: Arc<Router>) -> Self {
        Self { router }
    }

    pub fn router(&self) -> &Arc<Router> {
        &self.router
    }

    /// Broadcast one frame of simulation data
    pub fn send_frame(&self, data: impl Into<Bytes>) -> usize {
        self.router.broadcast(CommandId::SendFrame, data)
    }

    /// Ask every secondary to load `map_name`
    pub fn send_load_map(&self, map_name: &str) -> usize {
        self.router
            .broadcast(CommandId::LoadMap, Bytes::copy_from_slice(map_name.as_bytes()))
    }

    /// Liveness probe to the next secondary
    pub fn send_is_alive(&self) -> ReplyFuture {
        self.router.dispatch_round_robin(CommandId::YouAlive, Bytes::new())
    }

    /// Request a streaming token for `stream_id` from the next secondary
    pub fn get_token(&self, stream_id: u32) -> ReplyFuture {
        self.router
            .dispatch_round_robin(CommandId::GetToken, stream_id_payload(stream_id))
    }

    pub fn enable_ros(&self, target: &WeakSessionRef, stream_id: u32) -> ReplyFuture {
        self.router
            .dispatch_targeted(target, CommandId::EnableRos, stream_id_payload(stream_id))
    }

    pub fn disable_ros(&self, target: &WeakSessionRef, stream_id: u32) -> ReplyFuture {
        self.router
            .dispatch_targeted(target, CommandId::DisableRos, stream_id_payload(stream_id))
    }

    pub fn is_enabled_ros(&self, target: &WeakSessionRef, stream_id: u32) -> ReplyFuture {
        self.router
            .dispatch_targeted(target, CommandId::IsEnabledRos, stream_id_payload(stream_id))
    }

    /// Secondary the next round-robin command will go to
    pub fn next_target(&self) -> WeakSessionRef {
        self.router.peek_next_target()
    }
}

fn stream_id_payload(stream_id: u32) -> Bytes {
    Bytes::copy_from_slice(&stream_id.to_le_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::CommandMessage;
    use crate::session::{Primary, SessionRef};
    use std::net::SocketAddr;
    use tokio::sync::mpsc;

    fn setup() -> (PrimaryCommands, SessionRef, mpsc::UnboundedReceiver<CommandMessage>) {
        let router = Arc::new(Router::new());
        let addr: SocketAddr = "127.0.0.1:2002".parse().unwrap();
        let (session, rx) = Primary::channel(addr);
        router.add_session(session.clone());
        (PrimaryCommands::new(router), session, rx)
    }

    #[test]
    fn test_load_map_payload() {
        let (commands, _session, mut rx) = setup();

        assert_eq!(commands.send_load_map("Town03"), 1);

        let msg = rx.try_recv().unwrap();
        assert_eq!(msg.command().unwrap().id, CommandId::LoadMap);
        assert_eq!(msg.payload(), &Bytes::from_static(b"Town03"));
    }

    #[test]
    fn test_get_token_payload() {
        let (commands, session, mut rx) = setup();

        let _reply = commands.get_token(0x0A0B);

        let msg = rx.try_recv().unwrap();
        assert_eq!(msg.command().unwrap().id, CommandId::GetToken);
        assert_eq!(msg.payload(), &Bytes::from_static(&[0x0B, 0x0A, 0, 0]));
        assert_eq!(commands.router().pending_count(), 1);
        assert_eq!(commands.next_target().upgrade().unwrap().id(), session.id());
    }

    #[test]
    fn test_ros_commands_target_session() {
        let (commands, session, mut rx) = setup();
        let target = Arc::downgrade(&session);

        let _ = commands.enable_ros(&target, 7);
        let _ = commands.is_enabled_ros(&target, 7);
        let _ = commands.disable_ros(&target, 7);

        let ids: Vec<CommandId> = std::iter::from_fn(|| rx.try_recv().ok())
            .map(|m| m.command().unwrap().id)
            .collect();
        assert_eq!(
            ids,
            vec![CommandId::EnableRos, CommandId::IsEnabledRos, CommandId::DisableRos]
        );
    }

    #[tokio::test]
    async fn test_is_alive_reply() {
        let (commands, session, _rx) = setup();

        let reply = commands.send_is_alive();
        commands
            .router()
            .on_response_payload(session, Bytes::from_static(b"alive"));

        assert_eq!(reply.await.payload, Bytes::from_static(b"alive"));
    }
}
