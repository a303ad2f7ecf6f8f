use smallvec::SmallVec;
use std::fmt;

/// EtherType of IPv4, the protocol type most instances configure.
pub const IPV4_PROTOCOL_TYPE: u16 = 0x0800;

/// ARP hardware type of Ethernet links.
pub const ETHERNET_HARDWARE_TYPE: u16 = 1;

pub const ETHERNET_ADDRESS_LEN: usize = 6;
pub const IPV4_ADDRESS_LEN: usize = 4;

/// A typed, variable-length link or protocol address.
///
/// `kind` carries the hardware type for hardware addresses and the EtherType for
/// protocol addresses. The length is always `bytes.len()`, which ARP caps at 255.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Address {
    kind: u16,
    bytes: SmallVec<[u8; 16]>,
}

impl Address {
    pub fn new(kind: u16, bytes: &[u8]) -> Self {
        Self {
            kind,
            bytes: SmallVec::from_slice(bytes),
        }
    }

    /// Zero-length address of the given type. Matches everything when used as a pattern.
    pub fn wildcard(kind: u16) -> Self {
        Self {
            kind,
            bytes: SmallVec::new(),
        }
    }

    pub fn ipv4(octets: [u8; 4]) -> Self {
        Self::new(IPV4_PROTOCOL_TYPE, &octets)
    }

    pub fn ethernet(octets: [u8; 6]) -> Self {
        Self::new(ETHERNET_HARDWARE_TYPE, &octets)
    }

    pub fn kind(&self) -> u16 {
        self.kind
    }

    pub fn len(&self) -> u8 {
        self.bytes.len() as u8
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn is_wildcard(&self) -> bool {
        self.bytes.is_empty()
    }

    /// `pattern` matches `candidate` when it is absent or zero-length, or when type,
    /// length and bytes are all equal.
    pub fn matches(pattern: Option<&Address>, candidate: &Address) -> bool {
        match pattern {
            None => true,
            Some(p) if p.is_wildcard() => true,
            Some(p) => p.kind == candidate.kind && p.bytes == candidate.bytes,
        }
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({:#06x}, {})", self.kind, self)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.bytes.is_empty() {
            return f.write_str("*");
        }
        if self.kind == IPV4_PROTOCOL_TYPE && self.bytes.len() == IPV4_ADDRESS_LEN {
            let b = &self.bytes;
            return write!(f, "{}.{}.{}.{}", b[0], b[1], b[2], b[3]);
        }
        for (i, byte) in self.bytes.iter().enumerate() {
            if i > 0 {
                f.write_str(":")?;
            }
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}
