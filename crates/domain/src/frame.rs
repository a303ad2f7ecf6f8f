//! RFC 826 packet layout.
//!
//! ```text
//! +-------+-------+-------+-------+-------+-------+-------+-------+
//! |         Hardware Type         |         Protocol Type         |
//! +-------+-------+-------+-------+-------+-------+-------+-------+
//! |  HLen |  PLen |     Opcode    |  sender hw (HLen) ...
//! +-------+-------+-------+-------+-------+-------+-------+-------+
//! |  sender proto (PLen) | target hw (HLen) | target proto (PLen) |
//! +-------+-------+-------+-------+-------+-------+-------+-------+
//! ```
//!
//! Addresses are variable length; all multi-byte header fields are big-endian.

use crate::address::Address;
use crate::errors::FrameError;
use bytes::{BufMut, Bytes, BytesMut};

pub const ARP_HEADER_LEN: usize = 8;

const HARDWARE_TYPE_OFFSET: usize = 0;
const PROTOCOL_TYPE_OFFSET: usize = 2;
const HARDWARE_ADDR_LEN_OFFSET: usize = 4;
const PROTOCOL_ADDR_LEN_OFFSET: usize = 5;
const OPCODE_OFFSET: usize = 6;

/// Operation field. Anything other than a request or reply (RARP, InARP, ...) is
/// kept as `Other` so the sender can still be merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArpOpcode {
    Request,
    Reply,
    Other(u16),
}

impl ArpOpcode {
    pub fn from_raw(op: u16) -> Self {
        match op {
            1 => Self::Request,
            2 => Self::Reply,
            other => Self::Other(other),
        }
    }

    pub fn as_raw(self) -> u16 {
        match self {
            Self::Request => 1,
            Self::Reply => 2,
            Self::Other(op) => op,
        }
    }
}

/// A decoded ARP packet. Sender/target addresses carry the frame's hardware type and
/// protocol type as their address kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArpFrame {
    pub hardware_type: u16,
    pub protocol_type: u16,
    pub opcode: ArpOpcode,
    pub sender_hardware: Address,
    pub sender_protocol: Address,
    pub target_hardware: Address,
    pub target_protocol: Address,
}

impl ArpFrame {
    pub fn parse(data: &[u8]) -> Result<Self, FrameError> {
        if data.len() < ARP_HEADER_LEN {
            return Err(FrameError::Truncated(data.len()));
        }

        let hardware_type = read_u16(data, HARDWARE_TYPE_OFFSET);
        let protocol_type = read_u16(data, PROTOCOL_TYPE_OFFSET);
        let hw_len = data[HARDWARE_ADDR_LEN_OFFSET] as usize;
        let proto_len = data[PROTOCOL_ADDR_LEN_OFFSET] as usize;
        let opcode = ArpOpcode::from_raw(read_u16(data, OPCODE_OFFSET));

        if hw_len == 0 || proto_len == 0 {
            return Err(FrameError::ZeroAddressLength);
        }

        let total = ARP_HEADER_LEN + 2 * hw_len + 2 * proto_len;
        if data.len() < total {
            return Err(FrameError::Truncated(data.len()));
        }

        let mut offset = ARP_HEADER_LEN;
        let mut take = |len: usize, kind: u16| {
            let addr = Address::new(kind, &data[offset..offset + len]);
            offset += len;
            addr
        };

        let sender_hardware = take(hw_len, hardware_type);
        let sender_protocol = take(proto_len, protocol_type);
        let target_hardware = take(hw_len, hardware_type);
        let target_protocol = take(proto_len, protocol_type);

        Ok(Self {
            hardware_type,
            protocol_type,
            opcode,
            sender_hardware,
            sender_protocol,
            target_hardware,
            target_protocol,
        })
    }

    /// Hardware address length as carried in the header.
    pub fn hardware_len(&self) -> u8 {
        self.sender_hardware.len()
    }

    pub fn protocol_len(&self) -> u8 {
        self.sender_protocol.len()
    }

    pub fn encoded_len(&self) -> usize {
        ARP_HEADER_LEN + 2 * self.hardware_len() as usize + 2 * self.protocol_len() as usize
    }

    /// Serializes the frame. The target hardware field is zero-filled when it is
    /// shorter than the sender's, which is how requests leave it unknown.
    pub fn encode(&self) -> Bytes {
        let hw_len = self.hardware_len() as usize;
        let mut buf = BytesMut::with_capacity(self.encoded_len());

        buf.put_u16(self.hardware_type);
        buf.put_u16(self.protocol_type);
        buf.put_u8(self.hardware_len());
        buf.put_u8(self.protocol_len());
        buf.put_u16(self.opcode.as_raw());
        buf.put_slice(self.sender_hardware.as_bytes());
        buf.put_slice(self.sender_protocol.as_bytes());

        let target_hw = self.target_hardware.as_bytes();
        if target_hw.len() == hw_len {
            buf.put_slice(target_hw);
        } else {
            buf.put_bytes(0, hw_len);
        }
        buf.put_slice(self.target_protocol.as_bytes());

        buf.freeze()
    }
}

fn read_u16(data: &[u8], start: usize) -> u16 {
    u16::from_be_bytes([data[start], data[start + 1]])
}
