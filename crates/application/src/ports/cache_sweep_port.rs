use async_trait::async_trait;
use ferrous_arp_domain::ArpError;

/// Outcome of one timer sweep over the cache tables.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SweepOutcome {
    pub retransmitted: usize,
    pub abandoned: usize,
    pub expired: usize,
    pub pending: usize,
    pub cached: usize,
}

/// Port for the periodic aging/retry sweep.
#[async_trait]
pub trait CacheSweepPort: Send + Sync {
    /// Length of one period in milliseconds.
    fn period_ms(&self) -> u32;

    /// Advance every table by one period.
    async fn run_sweep(&self) -> Result<SweepOutcome, ArpError>;
}
