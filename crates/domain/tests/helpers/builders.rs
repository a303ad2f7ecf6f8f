/// Raw Ethernet/IPv4 ARP payload assembled byte by byte, independent of the codec.
pub struct RawFrame {
    bytes: Vec<u8>,
}

impl RawFrame {
    pub fn ethernet_ipv4(opcode: u16) -> Self {
        let mut bytes = vec![0x00, 0x01, 0x08, 0x00, 6, 4];
        bytes.extend_from_slice(&opcode.to_be_bytes());
        Self { bytes }
    }

    pub fn sender(mut self, mac: [u8; 6], ip: [u8; 4]) -> Self {
        self.bytes.extend_from_slice(&mac);
        self.bytes.extend_from_slice(&ip);
        self
    }

    pub fn target(mut self, mac: [u8; 6], ip: [u8; 4]) -> Self {
        self.bytes.extend_from_slice(&mac);
        self.bytes.extend_from_slice(&ip);
        self
    }

    pub fn padding(mut self, len: usize) -> Self {
        self.bytes.resize(self.bytes.len() + len, 0);
        self
    }

    pub fn build(self) -> Vec<u8> {
        self.bytes
    }
}
