//! Network side of the primary node
//!
//! - [`Listener`] accepts secondaries and drives each connection.
//! - [`SessionHandler`] is how the listener reports open/close/reply events.
//! - [`WorkerPool`] runs connection I/O and callbacks.
//! - [`RouterServer`] wires a [`Router`](crate::router::Router) to all of the above.

pub mod config;
pub(crate) mod connection;
pub mod handler;
pub mod listener;
pub mod node;
pub mod pool;

pub use config::{RouterConfig, DEFAULT_PORT};
pub use handler::SessionHandler;
pub use listener::Listener;
pub use node::RouterServer;
pub use pool::WorkerPool;
