use ferrous_arp_application::ports::CacheSweepPort;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval_at, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// Drives the ARP cache's periodic sweep: retry timers of pending entries and decay
/// of cached ones. One tick per `period_ms` of the sweeper.
pub struct ArpTimerJob {
    sweeper: Arc<dyn CacheSweepPort>,
    interval_ms: u64,
    shutdown: CancellationToken,
}

impl ArpTimerJob {
    pub fn new(sweeper: Arc<dyn CacheSweepPort>) -> Self {
        let interval_ms = u64::from(sweeper.period_ms()).max(1);
        Self {
            sweeper,
            interval_ms,
            shutdown: CancellationToken::new(),
        }
    }

    /// Overrides the wall-clock tick. The sweep still advances its counters by its
    /// own period, so this only speeds up or slows down simulated time.
    pub fn with_interval_ms(mut self, interval_ms: u64) -> Self {
        self.interval_ms = interval_ms.max(1);
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    pub async fn start(self: Arc<Self>) {
        info!(interval_ms = self.interval_ms, "Starting ARP timer job");

        tokio::spawn(async move {
            let period = Duration::from_millis(self.interval_ms);
            // First sweep one full period after start, not immediately.
            let mut interval = interval_at(Instant::now() + period, period);
            loop {
                tokio::select! {
                    _ = self.shutdown.cancelled() => {
                        info!("ArpTimerJob: shutting down");
                        break;
                    }
                    _ = interval.tick() => {
                        match self.sweeper.run_sweep().await {
                            Ok(outcome) => {
                                let changed = outcome.retransmitted
                                    + outcome.abandoned
                                    + outcome.expired;
                                if changed > 0 {
                                    debug!(
                                        retransmitted = outcome.retransmitted,
                                        abandoned = outcome.abandoned,
                                        expired = outcome.expired,
                                        pending = outcome.pending,
                                        cached = outcome.cached,
                                        "ARP sweep completed"
                                    );
                                }
                            }
                            Err(e) => {
                                error!(error = %e, "ARP sweep failed");
                            }
                        }
                    }
                }
            }
        });
    }
}
