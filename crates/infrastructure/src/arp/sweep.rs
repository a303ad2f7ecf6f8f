use super::resolution::RetryStep;
use super::state::{Effects, ServiceState};
use super::table::CacheTable;
use ferrous_arp_application::ports::SweepOutcome;
use tracing::debug;

impl ServiceState {
    /// Advances every table by one timer period.
    pub(crate) fn sweep(&mut self, effects: &mut Effects) -> SweepOutcome {
        let period = self.engine.timer_interval_ms;
        let mut outcome = SweepOutcome::default();

        for id in self.pending.ids() {
            let due = match self.pending.get_mut(id) {
                Some(entry) if entry.next_retry_time <= period => true,
                Some(entry) => {
                    entry.next_retry_time -= period;
                    false
                }
                None => continue,
            };

            if due {
                match self.on_retry_timeout(id, effects) {
                    RetryStep::Retransmitted => outcome.retransmitted += 1,
                    RetryStep::Abandoned => outcome.abandoned += 1,
                }
            }
        }

        outcome.expired += decay_table(&mut self.denied, period);
        outcome.expired += decay_table(&mut self.resolved, period);

        outcome.pending = self.pending.len();
        outcome.cached = self.denied.len() + self.resolved.len();
        outcome
    }
}

fn decay_table(table: &mut CacheTable, period: u32) -> usize {
    let mut expired = 0;

    for id in table.ids() {
        let Some(entry) = table.get_mut(id) else {
            continue;
        };
        if entry.is_static() {
            continue;
        }
        if entry.decay_time <= period {
            if let Some(entry) = table.remove(id) {
                debug_assert!(entry.waiters.is_empty(), "cached entry holds waiters");
                expired += 1;
            }
        } else {
            entry.decay_time -= period;
        }
    }

    if expired > 0 {
        debug!(table = %table.kind(), expired, "Cache entries expired");
    }
    expired
}
