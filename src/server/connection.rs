//! Per-secondary connection driver
//!
//! Splits the socket: a writer task drains the session's command queue, the
//! read side decodes length-prefixed replies and hands them to the handler.

use std::sync::Arc;

use bytes::BytesMut;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::mpsc;

use crate::error::{Error, Result};
use crate::protocol::{CommandMessage, RESPONSE_PREFIX_SIZE};
use crate::server::handler::SessionHandler;
use crate::session::SessionRef;

pub(crate) struct Connection<H: SessionHandler> {
    session: SessionRef,
    socket: TcpStream,
    rx: mpsc::UnboundedReceiver<CommandMessage>,
    handler: Arc<H>,
    max_response_size: usize,
}

impl<H: SessionHandler> Connection<H> {
    pub(crate) fn new(
        session: SessionRef,
        socket: TcpStream,
        rx: mpsc::UnboundedReceiver<CommandMessage>,
        handler: Arc<H>,
        max_response_size: usize,
    ) -> Self {
        Self {
            session,
            socket,
            rx,
            handler,
            max_response_size,
        }
    }

    /// Drive the connection until the secondary goes away
    ///
    /// `on_open` fires before the first read and `on_close` exactly once at the end.
    pub(crate) async fn run(self) -> Result<()> {
        let Connection {
            session,
            socket,
            rx,
            handler,
            max_response_size,
        } = self;

        let (reader, writer) = socket.into_split();
        handler.on_open(Arc::clone(&session));

        let writer_task = tokio::spawn(write_loop(writer, rx, session.clone()));
        let result = read_loop(reader, &session, handler.as_ref(), max_response_size).await;

        writer_task.abort();
        handler.on_close(session);
        result
    }
}

async fn write_loop(
    mut writer: OwnedWriteHalf,
    mut rx: mpsc::UnboundedReceiver<CommandMessage>,
    session: SessionRef,
) {
    while let Some(message) = rx.recv().await {
        let result = async {
            writer.write_all(message.header()).await?;
            writer.write_all(message.payload()).await
        }
        .await;

        if let Err(e) = result {
            tracing::debug!(session_id = %session.id(), error = %e, "Write to secondary failed");
            break;
        }
    }
}

async fn read_loop<H: SessionHandler>(
    mut reader: OwnedReadHalf,
    session: &SessionRef,
    handler: &H,
    max_response_size: usize,
) -> Result<()> {
    loop {
        let mut prefix = [0u8; RESPONSE_PREFIX_SIZE];
        match reader.read_exact(&mut prefix).await {
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(()),
            Err(e) => return Err(e.into()),
        }

        let size = u32::from_le_bytes(prefix) as usize;
        if size > max_response_size {
            tracing::warn!(
                session_id = %session.id(),
                size = size,
                max = max_response_size,
                "Reply exceeds size limit, closing connection"
            );
            return Err(Error::ResponseTooLarge {
                size,
                max: max_response_size,
            });
        }

        let mut payload = BytesMut::zeroed(size);
        reader.read_exact(&mut payload).await?;
        handler.on_response(Arc::clone(session), payload.freeze());
    }
}
