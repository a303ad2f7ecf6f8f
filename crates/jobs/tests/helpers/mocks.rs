use async_trait::async_trait;
use ferrous_arp_application::ports::{
    CacheSweepPort, FrameDisposition, FrameSinkPort, SweepOutcome,
};
use ferrous_arp_domain::ArpError;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

pub struct MockSweepPort {
    period_ms: u32,
    call_count: Arc<AtomicU64>,
    should_fail: Arc<RwLock<bool>>,
}

impl MockSweepPort {
    pub fn new(period_ms: u32) -> Self {
        Self {
            period_ms,
            call_count: Arc::new(AtomicU64::new(0)),
            should_fail: Arc::new(RwLock::new(false)),
        }
    }

    pub fn call_count(&self) -> u64 {
        self.call_count.load(Ordering::Relaxed)
    }

    pub async fn set_should_fail(&self, fail: bool) {
        *self.should_fail.write().await = fail;
    }
}

#[async_trait]
impl CacheSweepPort for MockSweepPort {
    fn period_ms(&self) -> u32 {
        self.period_ms
    }

    async fn run_sweep(&self) -> Result<SweepOutcome, ArpError> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        if *self.should_fail.read().await {
            return Err(ArpError::Transport("sweep failed".to_string()));
        }
        Ok(SweepOutcome::default())
    }
}

pub struct MockFrameSink {
    frames: Arc<RwLock<Vec<Vec<u8>>>>,
}

impl MockFrameSink {
    pub fn new() -> Self {
        Self {
            frames: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub async fn frames(&self) -> Vec<Vec<u8>> {
        self.frames.read().await.clone()
    }

    pub async fn count(&self) -> usize {
        self.frames.read().await.len()
    }
}

#[async_trait]
impl FrameSinkPort for MockFrameSink {
    async fn deliver(&self, frame: &[u8]) -> FrameDisposition {
        self.frames.write().await.push(frame.to_vec());
        FrameDisposition::Observed
    }
}
