//! Command router for a primary node and its pool of secondaries
//!
//! The primary accepts connections from secondary servers, keeps track of
//! the ones currently connected, and sends them commands:
//!
//! - to all of them ([`Router::broadcast`]),
//! - to the next one in round-robin order ([`Router::dispatch_round_robin`]),
//! - to a specific one ([`Router::dispatch_targeted`]).
//!
//! Round-robin and targeted dispatch return a [`ReplyFuture`] resolved by the
//! next reply from the chosen secondary. The router applies no timeout: await
//! it under `tokio::time::timeout`, or from synchronous code use
//! [`WorkerPool::block_on_timeout`].
//!
//! # Example
//! ```no_run
//! use std::time::Duration;
//! use bytes::Bytes;
//! use multigpu_router::{CommandId, RouterConfig, RouterServer};
//!
//! # fn main() -> multigpu_router::Result<()> {
//! let server = RouterServer::start(RouterConfig::with_port(2002))?;
//! let router = server.router();
//!
//! router.broadcast(CommandId::LoadMap, Bytes::from_static(b"Town10HD"));
//!
//! let reply = router.dispatch_round_robin(CommandId::YouAlive, Bytes::new());
//! let answer = server
//!     .pool()
//!     .block_on_timeout(Duration::from_secs(1), reply)?;
//! if let Some(info) = answer {
//!     println!("secondary {} answered", info.session.id());
//! }
//!
//! server.shutdown();
//! # Ok(())
//! # }
//! ```

pub mod commands;
pub mod error;
pub mod protocol;
pub mod router;
pub mod server;
pub mod session;

pub use commands::PrimaryCommands;
pub use error::{Error, Result};
pub use protocol::{CommandHeader, CommandId, CommandMessage};
pub use router::{ReplyFuture, Router};
pub use server::{Listener, RouterConfig, RouterServer, SessionHandler, WorkerPool};
pub use session::{Primary, SessionId, SessionInfo, SessionRef, WeakSessionRef};
