use ferrous_arp_application::ports::{FrameDisposition, FrameSinkPort, FrameTransport};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, trace};

/// Single receive loop feeding inbound frames to the cache. Frames are processed
/// one at a time, in arrival order.
pub struct FrameReceiveJob {
    transport: Arc<dyn FrameTransport>,
    sink: Arc<dyn FrameSinkPort>,
    shutdown: CancellationToken,
}

impl FrameReceiveJob {
    pub fn new(transport: Arc<dyn FrameTransport>, sink: Arc<dyn FrameSinkPort>) -> Self {
        Self {
            transport,
            sink,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    pub async fn start(self: Arc<Self>) {
        info!(
            transport = self.transport.transport_name(),
            "Starting ARP frame receive job"
        );

        tokio::spawn(async move {
            let mut delivered: u64 = 0;
            loop {
                tokio::select! {
                    _ = self.shutdown.cancelled() => {
                        info!(delivered, "FrameReceiveJob: shutting down");
                        break;
                    }
                    frame = self.transport.receive() => {
                        let Some(frame) = frame else {
                            info!(delivered, "FrameReceiveJob: transport closed");
                            break;
                        };
                        let disposition = self.sink.deliver(&frame).await;
                        delivered += 1;
                        if disposition != FrameDisposition::Observed {
                            trace!(
                                disposition = disposition.as_str(),
                                len = frame.len(),
                                "Frame delivered"
                            );
                        }
                    }
                }
            }
        });
    }
}
