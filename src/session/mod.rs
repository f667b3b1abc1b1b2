//! Secondary sessions
//!
//! A session is one live primary↔secondary connection. Sessions are shared:
//! the router's registry holds one strong reference while the session is
//! registered, the connection driver holds another for as long as the socket
//! lives, and applications may keep [`WeakSessionRef`]s to address a specific
//! secondary later without keeping it alive.

pub mod primary;

pub use primary::{Primary, SessionId, SessionInfo, SessionRef, WeakSessionRef};
