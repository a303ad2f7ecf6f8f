use super::entry::{CacheEntry, EntryId, Waiter};
use super::state::{build_frame, Effects, ServiceState};
use ferrous_arp_domain::address::{ETHERNET_ADDRESS_LEN, ETHERNET_HARDWARE_TYPE, IPV4_PROTOCOL_TYPE};
use ferrous_arp_domain::{
    Address, ArpError, ArpOpcode, FindMode, InstanceId, NotifyHandle, ResolutionOutcome,
};
use tracing::debug;

/// How `request` disposed of the caller's waiter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    /// Answered synchronously; the waiter was dropped.
    Resolved(Address),
    /// The waiter is attached to a pending entry.
    Queued,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryStep {
    Retransmitted,
    Abandoned,
}

impl ServiceState {
    pub(crate) fn request(
        &mut self,
        owner: InstanceId,
        target: Option<&[u8]>,
        waiter: Waiter,
        effects: &mut Effects,
    ) -> Result<Admission, ArpError> {
        let config = self.configured(owner)?;

        let Some(target) = target else {
            return Ok(Admission::Resolved(self.link.broadcast_address.clone()));
        };

        if target.len() != config.station_address.len() {
            return Err(ArpError::InvalidParameter(format!(
                "target address is {} bytes, expected {}",
                target.len(),
                config.station_address.len()
            )));
        }

        if config.protocol_type == IPV4_PROTOCOL_TYPE {
            if target.iter().all(|b| *b == 0xff) {
                return Ok(Admission::Resolved(self.link.broadcast_address.clone()));
            }
            if let Some(mac) = self.ipv4_multicast_mac(target) {
                return Ok(Admission::Resolved(mac));
            }
        }

        let target = Address::new(config.protocol_type, target);

        if self.find_denied(Some(&target), None).is_some() {
            debug!(target = %target, "Resolution refused, address is denied");
            return Err(ArpError::AccessDenied);
        }

        if let Some(id) = self
            .resolved
            .find_next(None, FindMode::ByProtocol, Some(&target), None)
        {
            if let Some(entry) = self.resolved.get(id) {
                return Ok(Admission::Resolved(entry.hardware_address.clone()));
            }
        }

        let max_waiters = self.engine.max_waiters_per_entry;
        if let Some(id) = self
            .pending
            .find_next(None, FindMode::ByProtocol, Some(&target), None)
        {
            if let Some(entry) = self.pending.get_mut(id) {
                if entry.waiters.len() >= max_waiters {
                    return Err(ArpError::OutOfResources);
                }
                entry.waiters.push(waiter);
                debug!(
                    target = %target,
                    waiters = entry.waiters.len(),
                    "Joined pending resolution"
                );
                return Ok(Admission::Queued);
            }
        }

        if !self.has_capacity() {
            return Err(ArpError::OutOfResources);
        }

        let mut entry = CacheEntry::new(
            target,
            Address::wildcard(self.link.hardware_type),
            config.entry_timeout_ms,
        );
        entry.retry_count = config.retry_count;
        entry.next_retry_time = config.retry_interval_ms;
        entry.waiters.push(waiter);

        effects
            .frames
            .push(build_frame(&self.link, &config, &entry, ArpOpcode::Request));

        debug!(
            target = %entry.protocol_address,
            retries = entry.retry_count,
            "Started resolution"
        );

        let id = self.alloc_entry_id();
        self.pending.insert(id, entry);
        Ok(Admission::Queued)
    }

    /// Cancels every waiter matching the filter. Absent filters match everything.
    pub(crate) fn cancel(
        &mut self,
        owner: Option<InstanceId>,
        target: Option<&Address>,
        handle: Option<NotifyHandle>,
        effects: &mut Effects,
    ) -> usize {
        let mut canceled = 0;

        for id in self.pending.ids() {
            let Some(entry) = self.pending.get_mut(id) else {
                continue;
            };
            if !Address::matches(target, &entry.protocol_address) {
                continue;
            }

            let (matched, kept): (Vec<Waiter>, Vec<Waiter>) = std::mem::take(&mut entry.waiters)
                .into_iter()
                .partition(|w| w.matches(owner, handle));
            entry.waiters = kept;

            canceled += matched.len();
            effects.notifications.extend(
                matched
                    .into_iter()
                    .map(|w| (w, ResolutionOutcome::Canceled)),
            );

            if entry.waiters.is_empty() {
                debug!(target = %entry.protocol_address, "Pending resolution dropped, no waiters left");
                self.pending.remove(id);
            }
        }

        canceled
    }

    /// Retry timer of a pending entry fired: resend while retries remain, otherwise
    /// abandon the entry and time out its waiters.
    pub(crate) fn on_retry_timeout(&mut self, id: EntryId, effects: &mut Effects) -> RetryStep {
        let sender = self.pending.get(id).and_then(|entry| {
            entry
                .waiters
                .iter()
                .find_map(|w| self.instance_config(w.owner))
                .cloned()
        });

        let Some(entry) = self.pending.get_mut(id) else {
            return RetryStep::Abandoned;
        };

        match sender {
            Some(config) if entry.retry_count > 0 => {
                effects
                    .frames
                    .push(build_frame(&self.link, &config, entry, ArpOpcode::Request));
                entry.retry_count -= 1;
                entry.next_retry_time = config.retry_interval_ms;
                debug!(
                    target = %entry.protocol_address,
                    retries_left = entry.retry_count,
                    "Retransmitted request"
                );
                RetryStep::Retransmitted
            }
            _ => {
                if let Some(mut entry) = self.pending.remove(id) {
                    let waiters =
                        entry.drain_waiters(&ResolutionOutcome::TimedOut, &mut effects.notifications);
                    debug!(
                        target = %entry.protocol_address,
                        waiters,
                        "Resolution abandoned"
                    );
                }
                RetryStep::Abandoned
            }
        }
    }

    /// RFC 1112 mapping of an IPv4 multicast group onto an Ethernet address.
    fn ipv4_multicast_mac(&self, target: &[u8]) -> Option<Address> {
        let is_ethernet = self.link.hardware_type == ETHERNET_HARDWARE_TYPE
            && self.link.hardware_len() as usize == ETHERNET_ADDRESS_LEN;
        if !is_ethernet || target.len() != 4 || target[0] & 0xf0 != 0xe0 {
            return None;
        }
        Some(Address::ethernet([
            0x01,
            0x00,
            0x5e,
            target[1] & 0x7f,
            target[2],
            target[3],
        ]))
    }
}
