use async_trait::async_trait;
use bytes::Bytes;
use ferrous_arp_domain::{Address, ArpError, LinkInfo};

/// An encoded ARP packet and the link-layer address it should be sent to.
/// Link framing is the transport's job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundFrame {
    pub destination: Address,
    pub payload: Bytes,
}

#[async_trait]
pub trait FrameTransport: Send + Sync {
    async fn transmit(&self, frame: OutboundFrame) -> Result<(), ArpError>;

    /// Next received ARP payload; `None` once the transport is closed.
    async fn receive(&self) -> Option<Bytes>;

    fn link(&self) -> LinkInfo;

    fn transport_name(&self) -> &'static str;
}
