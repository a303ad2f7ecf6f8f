//! In-process frame transport over tokio channels.
//!
//! The engine side implements `FrameTransport`; the peer side injects raw ARP
//! payloads and observes everything the engine transmits. Used for loopback wiring
//! and by the integration tests.

use async_trait::async_trait;
use bytes::Bytes;
use ferrous_arp_application::ports::{FrameTransport, OutboundFrame};
use ferrous_arp_domain::{ArpError, LinkInfo};
use tokio::sync::mpsc::{self, error::TryRecvError, UnboundedReceiver, UnboundedSender};
use tokio::sync::Mutex;
use tracing::trace;

pub struct ChannelTransport {
    link: LinkInfo,
    outbound: UnboundedSender<OutboundFrame>,
    inbound: Mutex<UnboundedReceiver<Bytes>>,
}

/// The far end of a `ChannelTransport`. Dropping it closes the transport: further
/// transmits fail and `receive` returns `None` once queued frames are drained.
pub struct ChannelPeer {
    inject: UnboundedSender<Bytes>,
    transmitted: UnboundedReceiver<OutboundFrame>,
}

impl ChannelTransport {
    pub fn new(link: LinkInfo) -> (Self, ChannelPeer) {
        let (outbound, transmitted) = mpsc::unbounded_channel();
        let (inject, inbound) = mpsc::unbounded_channel();

        let transport = Self {
            link,
            outbound,
            inbound: Mutex::new(inbound),
        };
        (transport, ChannelPeer { inject, transmitted })
    }
}

#[async_trait]
impl FrameTransport for ChannelTransport {
    async fn transmit(&self, frame: OutboundFrame) -> Result<(), ArpError> {
        trace!(
            destination = %frame.destination,
            len = frame.payload.len(),
            "Channel transmit"
        );
        self.outbound
            .send(frame)
            .map_err(|_| ArpError::Transport("channel peer closed".to_string()))
    }

    async fn receive(&self) -> Option<Bytes> {
        self.inbound.lock().await.recv().await
    }

    fn link(&self) -> LinkInfo {
        self.link.clone()
    }

    fn transport_name(&self) -> &'static str {
        "channel"
    }
}

impl ChannelPeer {
    /// Queues a raw ARP payload for the engine. False once the transport is gone.
    pub fn inject(&self, frame: impl Into<Bytes>) -> bool {
        self.inject.send(frame.into()).is_ok()
    }

    /// Next frame the engine transmitted, waiting for one if necessary.
    pub async fn next_transmitted(&mut self) -> Option<OutboundFrame> {
        self.transmitted.recv().await
    }

    pub fn try_transmitted(&mut self) -> Option<OutboundFrame> {
        match self.transmitted.try_recv() {
            Ok(frame) => Some(frame),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Everything transmitted so far, without waiting.
    pub fn drain_transmitted(&mut self) -> Vec<OutboundFrame> {
        std::iter::from_fn(|| self.try_transmitted()).collect()
    }
}
