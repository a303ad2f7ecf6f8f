use super::RecordingTransport;
use bytes::Bytes;
use ferrous_arp_domain::{Address, ArpFrame, ArpOpcode, EngineConfig, InstanceConfig, LinkInfo};
use ferrous_arp_infrastructure::arp::{ArpInstance, ArpService};
use std::sync::Arc;

pub const STATION_MAC: [u8; 6] = [0x02, 0x00, 0x00, 0x00, 0x00, 0x01];
pub const STATION_IP: [u8; 4] = [10, 0, 0, 1];

pub const PEER_IP: [u8; 4] = [10, 0, 0, 2];
pub const PEER_MAC: [u8; 6] = [0x02, 0x00, 0x00, 0x00, 0x00, 0x02];

pub const OTHER_IP: [u8; 4] = [10, 0, 0, 3];
pub const OTHER_MAC: [u8; 6] = [0x02, 0x00, 0x00, 0x00, 0x00, 0x03];

pub fn ethernet_link() -> LinkInfo {
    LinkInfo::ethernet(STATION_MAC)
}

pub fn engine_config() -> EngineConfig {
    EngineConfig::default()
}

pub struct Harness {
    pub service: Arc<ArpService>,
    pub transport: Arc<RecordingTransport>,
    pub instance: ArpInstance,
}

impl Harness {
    pub async fn new() -> Self {
        Self::with_engine(engine_config()).await
    }

    /// Service on an Ethernet link with one instance configured for `STATION_IP`.
    pub async fn with_engine(engine: EngineConfig) -> Self {
        let transport = Arc::new(RecordingTransport::new(ethernet_link()));
        let service = ArpService::new(engine, transport.clone()).unwrap();
        let instance = service.create_instance();
        instance
            .configure(Some(InstanceConfig::ipv4(STATION_IP)))
            .await
            .unwrap();
        Self {
            service,
            transport,
            instance,
        }
    }

    pub async fn sweeps(&self, count: usize) {
        for _ in 0..count {
            self.service.sweep().await;
        }
    }
}

pub struct FrameBuilder {
    frame: ArpFrame,
}

impl FrameBuilder {
    pub fn request(sender_ip: [u8; 4], sender_mac: [u8; 6], target_ip: [u8; 4]) -> Self {
        Self {
            frame: ArpFrame {
                hardware_type: 1,
                protocol_type: 0x0800,
                opcode: ArpOpcode::Request,
                sender_hardware: Address::ethernet(sender_mac),
                sender_protocol: Address::ipv4(sender_ip),
                target_hardware: Address::ethernet([0; 6]),
                target_protocol: Address::ipv4(target_ip),
            },
        }
    }

    pub fn reply(sender_ip: [u8; 4], sender_mac: [u8; 6], target_ip: [u8; 4]) -> Self {
        let mut builder = Self::request(sender_ip, sender_mac, target_ip);
        builder.frame.opcode = ArpOpcode::Reply;
        builder.frame.target_hardware = Address::ethernet(STATION_MAC);
        builder
    }

    pub fn opcode(mut self, opcode: u16) -> Self {
        self.frame.opcode = ArpOpcode::from_raw(opcode);
        self
    }

    pub fn hardware_type(mut self, hardware_type: u16) -> Self {
        self.frame.hardware_type = hardware_type;
        self.frame.sender_hardware =
            Address::new(hardware_type, self.frame.sender_hardware.as_bytes());
        self.frame.target_hardware =
            Address::new(hardware_type, self.frame.target_hardware.as_bytes());
        self
    }

    pub fn protocol_type(mut self, protocol_type: u16) -> Self {
        self.frame.protocol_type = protocol_type;
        self.frame.sender_protocol =
            Address::new(protocol_type, self.frame.sender_protocol.as_bytes());
        self.frame.target_protocol =
            Address::new(protocol_type, self.frame.target_protocol.as_bytes());
        self
    }

    pub fn build(self) -> Bytes {
        self.frame.encode()
    }
}
