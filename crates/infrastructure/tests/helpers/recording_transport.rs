use async_trait::async_trait;
use bytes::Bytes;
use ferrous_arp_application::ports::{FrameTransport, OutboundFrame};
use ferrous_arp_domain::{ArpError, ArpFrame, LinkInfo};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

/// Records every transmitted frame. Never receives anything; tests feed frames to
/// the service directly.
pub struct RecordingTransport {
    link: LinkInfo,
    sent: Mutex<Vec<OutboundFrame>>,
    transmit_count: AtomicU64,
    should_fail: AtomicBool,
}

impl RecordingTransport {
    pub fn new(link: LinkInfo) -> Self {
        Self {
            link,
            sent: Mutex::new(Vec::new()),
            transmit_count: AtomicU64::new(0),
            should_fail: AtomicBool::new(false),
        }
    }

    pub fn set_should_fail(&self, fail: bool) {
        self.should_fail.store(fail, Ordering::SeqCst);
    }

    /// Transmit attempts, including failed ones.
    pub fn transmit_count(&self) -> u64 {
        self.transmit_count.load(Ordering::SeqCst)
    }

    pub fn sent(&self) -> Vec<OutboundFrame> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_frames(&self) -> Vec<ArpFrame> {
        self.sent()
            .iter()
            .map(|f| ArpFrame::parse(&f.payload).unwrap())
            .collect()
    }

    pub fn clear(&self) {
        self.sent.lock().unwrap().clear();
    }
}

#[async_trait]
impl FrameTransport for RecordingTransport {
    async fn transmit(&self, frame: OutboundFrame) -> Result<(), ArpError> {
        self.transmit_count.fetch_add(1, Ordering::SeqCst);
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(ArpError::Transport("link down".to_string()));
        }
        self.sent.lock().unwrap().push(frame);
        Ok(())
    }

    async fn receive(&self) -> Option<Bytes> {
        None
    }

    fn link(&self) -> LinkInfo {
        self.link.clone()
    }

    fn transport_name(&self) -> &'static str {
        "recording"
    }
}
