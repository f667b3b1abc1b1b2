//! Primary/secondary wire protocol
//!
//! Commands travel primary → secondary as a fixed 8-byte header followed by
//! the raw payload. There is no extra framing: the secondary reads exactly
//! [`CommandHeader::SIZE`] bytes, then `size` payload bytes.
//!
//! ```text
//! +-------------+--------------+------------------+
//! | id (u32 LE) | size (u32 LE)| payload (size)   |
//! +-------------+--------------+------------------+
//! ```
//!
//! Replies travel secondary → primary as a `u32` little-endian length prefix
//! followed by the reply bytes.

pub mod command;
pub mod message;

pub use command::{CommandHeader, CommandId};
pub use message::CommandMessage;

/// Size of the length prefix in front of every reply frame
pub const RESPONSE_PREFIX_SIZE: usize = 4;

/// Default maximum accepted reply size (64 MiB)
pub const DEFAULT_MAX_RESPONSE_SIZE: usize = 64 * 1024 * 1024;
