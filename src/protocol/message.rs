//! Two-part command message
//!
//! A message is a header view plus a payload view. Both are `Bytes`, so the
//! same message can be handed to any number of sessions without copying the
//! payload; each clone only bumps reference counts.

use bytes::Bytes;

use super::command::{CommandHeader, CommandId};
use crate::error::{Error, Result};

/// Header + payload pair written to a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandMessage {
    header: Bytes,
    payload: Bytes,
}

impl CommandMessage {
    /// Build a message for `id` carrying `payload`
    ///
    /// Fails if the payload is longer than the header's `u32` size field.
    pub fn new(id: CommandId, payload: impl Into<Bytes>) -> Result<Self> {
        let payload = payload.into();
        let size = payload_size(payload.len())?;
        Ok(Self {
            header: CommandHeader::new(id, size).encode(),
            payload,
        })
    }

    /// Encoded header view
    pub fn header(&self) -> &Bytes {
        &self.header
    }

    /// Payload view
    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// Decoded header
    pub fn command(&self) -> Option<CommandHeader> {
        CommandHeader::decode(&self.header)
    }

    /// Total bytes on the wire
    pub fn wire_len(&self) -> usize {
        self.header.len() + self.payload.len()
    }

    /// Contiguous copy of the wire bytes (header followed by payload)
    pub fn to_vec(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.wire_len());
        out.extend_from_slice(&self.header);
        out.extend_from_slice(&self.payload);
        out
    }
}

/// Header size field for a payload of `len` bytes
pub(crate) fn payload_size(len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| Error::PayloadTooLarge { size: len })
}
