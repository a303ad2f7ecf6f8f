#![allow(dead_code)]

mod mocks;

pub use mocks::{MockFrameSink, MockSweepPort};

use bytes::Bytes;
use ferrous_arp_domain::{Address, ArpFrame, ArpOpcode, LinkInfo};

pub const STATION_MAC: [u8; 6] = [0x02, 0x00, 0x00, 0x00, 0x00, 0x01];
pub const STATION_IP: [u8; 4] = [10, 0, 0, 1];

pub fn ethernet_link() -> LinkInfo {
    LinkInfo::ethernet(STATION_MAC)
}

/// Encoded reply from `sender` telling the station where `sender_ip` lives.
pub fn reply_from(sender_ip: [u8; 4], sender_mac: [u8; 6]) -> Bytes {
    ArpFrame {
        hardware_type: 1,
        protocol_type: 0x0800,
        opcode: ArpOpcode::Reply,
        sender_hardware: Address::ethernet(sender_mac),
        sender_protocol: Address::ipv4(sender_ip),
        target_hardware: Address::ethernet(STATION_MAC),
        target_protocol: Address::ipv4(STATION_IP),
    }
    .encode()
}
