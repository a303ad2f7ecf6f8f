use crate::address::{Address, IPV4_ADDRESS_LEN, IPV4_PROTOCOL_TYPE};
use crate::errors::ArpError;
use std::fmt;

/// Identifies one consumer of the ARP service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId(pub u64);

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "arp-instance-{}", self.0)
    }
}

/// Opaque signal handle a caller registers its resolution requests under.
/// Several requests may share one handle; cancelling by handle cancels all of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NotifyHandle(pub u64);

/// Per-instance configuration.
///
/// Zero timing fields mean "use the service default".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceConfig {
    pub protocol_type: u16,
    pub station_address: Vec<u8>,
    pub entry_timeout_ms: u32,
    pub retry_count: u32,
    pub retry_interval_ms: u32,
}

impl InstanceConfig {
    pub fn ipv4(station: [u8; 4]) -> Self {
        Self {
            protocol_type: IPV4_PROTOCOL_TYPE,
            station_address: station.to_vec(),
            entry_timeout_ms: 0,
            retry_count: 0,
            retry_interval_ms: 0,
        }
    }

    pub fn with_entry_timeout(mut self, ms: u32) -> Self {
        self.entry_timeout_ms = ms;
        self
    }

    pub fn with_retries(mut self, count: u32, interval_ms: u32) -> Self {
        self.retry_count = count;
        self.retry_interval_ms = interval_ms;
        self
    }

    pub fn station(&self) -> Address {
        Address::new(self.protocol_type, &self.station_address)
    }

    pub fn validate(&self) -> Result<(), ArpError> {
        if self.station_address.is_empty() || self.station_address.len() > u8::MAX as usize {
            return Err(ArpError::InvalidParameter(format!(
                "station address length {} out of range",
                self.station_address.len()
            )));
        }

        if self.protocol_type == IPV4_PROTOCOL_TYPE {
            if self.station_address.len() != IPV4_ADDRESS_LEN {
                return Err(ArpError::InvalidParameter(
                    "IPv4 station address must be 4 bytes".to_string(),
                ));
            }
            let unspecified = self.station_address.iter().all(|b| *b == 0);
            let broadcast = self.station_address.iter().all(|b| *b == 0xff);
            if unspecified || broadcast {
                return Err(ArpError::InvalidParameter(format!(
                    "{} is not a usable station address",
                    self.station()
                )));
            }
        }

        Ok(())
    }

    /// Same protocol identity (type + station address); timing fields may differ.
    pub fn same_identity(&self, other: &InstanceConfig) -> bool {
        self.protocol_type == other.protocol_type
            && self.station_address == other.station_address
    }
}

/// The local link as seen by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkInfo {
    pub hardware_type: u16,
    pub station_address: Address,
    pub broadcast_address: Address,
}

impl LinkInfo {
    pub fn ethernet(mac: [u8; 6]) -> Self {
        Self {
            hardware_type: crate::address::ETHERNET_HARDWARE_TYPE,
            station_address: Address::ethernet(mac),
            broadcast_address: Address::ethernet([0xff; 6]),
        }
    }

    pub fn hardware_len(&self) -> u8 {
        self.station_address.len()
    }
}
