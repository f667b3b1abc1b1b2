//! Command identifiers and the fixed-size command header

use bytes::{Buf, BufMut, Bytes, BytesMut};

/// Command sent from the primary to its secondaries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandId {
    /// Per-frame simulation data
    SendFrame,
    /// Load a new map
    LoadMap,
    /// Request a streaming token for a sensor
    GetToken,
    /// Enable ROS publishing for a sensor
    EnableRos,
    /// Disable ROS publishing for a sensor
    DisableRos,
    /// Query ROS publishing state for a sensor
    IsEnabledRos,
    /// Liveness probe
    YouAlive,
    /// Value not known to this build, forwarded untouched
    Other(u32),
}

impl CommandId {
    /// Wire value
    pub fn as_u32(self) -> u32 {
        match self {
            CommandId::SendFrame => 0,
            CommandId::LoadMap => 1,
            CommandId::GetToken => 2,
            CommandId::EnableRos => 3,
            CommandId::DisableRos => 4,
            CommandId::IsEnabledRos => 5,
            CommandId::YouAlive => 6,
            CommandId::Other(v) => v,
        }
    }
}

impl From<u32> for CommandId {
    fn from(v: u32) -> Self {
        match v {
            0 => CommandId::SendFrame,
            1 => CommandId::LoadMap,
            2 => CommandId::GetToken,
            3 => CommandId::EnableRos,
            4 => CommandId::DisableRos,
            5 => CommandId::IsEnabledRos,
            6 => CommandId::YouAlive,
            other => CommandId::Other(other),
        }
    }
}

/// Fixed-size header preceding every command payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandHeader {
    /// Command identifier
    pub id: CommandId,
    /// Payload length in bytes
    pub size: u32,
}

impl CommandHeader {
    /// Encoded header size in bytes
    pub const SIZE: usize = 8;

    pub fn new(id: CommandId, size: u32) -> Self {
        Self { id, size }
    }

    /// Encode into its 8-byte wire form
    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(Self::SIZE);
        buf.put_u32_le(self.id.as_u32());
        buf.put_u32_le(self.size);
        buf.freeze()
    }

    /// Decode a header from the front of `data`
    ///
    /// Returns `None` if fewer than [`CommandHeader::SIZE`] bytes are available.
    pub fn decode(mut data: &[u8]) -> Option<Self> {
        if data.len() < Self::SIZE {
            return None;
        }
        let id = CommandId::from(data.get_u32_le());
        let size = data.get_u32_le();
        Some(Self { id, size })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_id_values() {
        assert_eq!(CommandId::SendFrame.as_u32(), 0);
        assert_eq!(CommandId::YouAlive.as_u32(), 6);
        assert_eq!(CommandId::from(2), CommandId::GetToken);
        assert_eq!(CommandId::from(42), CommandId::Other(42));
        assert_eq!(CommandId::Other(42).as_u32(), 42);
    }

    #[test]
    fn test_header_layout() {
        let header = CommandHeader::new(CommandId::LoadMap, 0x0102_0304);
        let encoded = header.encode();

        assert_eq!(encoded.len(), CommandHeader::SIZE);
        assert_eq!(&encoded[..], &[1, 0, 0, 0, 0x04, 0x03, 0x02, 0x01]);
        assert_eq!(CommandHeader::decode(&encoded), Some(header));
    }

    #[test]
    fn test_decode_short() {
        assert_eq!(CommandHeader::decode(&[0, 0, 0]), None);
    }
}
