use super::entry::CacheEntry;
use super::state::{build_frame, Effects, ServiceState};
use ferrous_arp_application::ports::FrameDisposition;
use ferrous_arp_domain::{ArpFrame, ArpOpcode, FindMode, InstanceConfig, ResolutionOutcome};
use tracing::{debug, trace};

impl ServiceState {
    /// RFC 826 receive path. Never fails: anything unusable is dropped and reported
    /// only through the returned disposition.
    pub(crate) fn process_frame(&mut self, data: &[u8], effects: &mut Effects) -> FrameDisposition {
        let frame = match ArpFrame::parse(data) {
            Ok(frame) => frame,
            Err(e) => {
                trace!(error = %e, len = data.len(), "Dropping malformed ARP frame");
                return FrameDisposition::Malformed;
            }
        };

        if frame.hardware_type != self.link.hardware_type
            || frame.hardware_len() != self.link.hardware_len()
        {
            trace!(
                hardware_type = frame.hardware_type,
                hardware_len = frame.hardware_len(),
                "Dropping frame from a different link type"
            );
            return FrameDisposition::ForeignLink;
        }

        if self
            .find_denied(Some(&frame.sender_protocol), Some(&frame.sender_hardware))
            .is_some()
        {
            debug!(
                sender = %frame.sender_protocol,
                sender_hw = %frame.sender_hardware,
                "Dropping frame from denied sender"
            );
            return FrameDisposition::Denied;
        }

        let mut protocol_matched = false;
        let mut target_instance: Option<InstanceConfig> = None;
        for config in self.instances.values().filter_map(|i| i.config.as_ref()) {
            if config.protocol_type != frame.protocol_type
                || config.station_address.len() != frame.protocol_len() as usize
            {
                continue;
            }
            protocol_matched = true;
            if config.station_address.as_slice() == frame.target_protocol.as_bytes() {
                target_instance = Some(config.clone());
                break;
            }
        }

        if !protocol_matched {
            trace!(
                protocol_type = frame.protocol_type,
                "Dropping frame for an unconfigured protocol"
            );
            return FrameDisposition::UnknownProtocol;
        }

        // Merge happens whether or not the frame is addressed to us.
        let merged = self
            .resolved
            .find_next(None, FindMode::ByProtocol, Some(&frame.sender_protocol), None);
        if let Some(id) = merged {
            if let Some(entry) = self.resolved.get_mut(id) {
                entry.hardware_address = frame.sender_hardware.clone();
                entry.reset_decay();
                trace!(sender = %frame.sender_protocol, "Merged sender into resolved cache");
            }
        }

        let Some(target_config) = target_instance else {
            return if merged.is_some() {
                FrameDisposition::Merged
            } else {
                FrameDisposition::Observed
            };
        };

        let entry_id = match merged {
            Some(id) => id,
            None => {
                let pending = self.pending.find_next(
                    None,
                    FindMode::ByProtocol,
                    Some(&frame.sender_protocol),
                    None,
                );

                let taken = pending.and_then(|id| self.pending.remove(id).map(|e| (id, e)));
                let (id, mut entry) = match taken {
                    Some(found) => found,
                    None => {
                        if !self.has_capacity() {
                            debug!(
                                sender = %frame.sender_protocol,
                                "Cache full, dropping frame"
                            );
                            return FrameDisposition::NoCapacity;
                        }
                        let entry = CacheEntry::new(
                            frame.sender_protocol.clone(),
                            frame.sender_hardware.clone(),
                            target_config.entry_timeout_ms,
                        );
                        (self.alloc_entry_id(), entry)
                    }
                };

                entry.protocol_address = frame.sender_protocol.clone();
                entry.hardware_address = frame.sender_hardware.clone();
                entry.reset_decay();
                let notified = entry.drain_waiters(
                    &ResolutionOutcome::Resolved(frame.sender_hardware.clone()),
                    &mut effects.notifications,
                );

                debug!(
                    sender = %frame.sender_protocol,
                    sender_hw = %frame.sender_hardware,
                    waiters = notified,
                    "Address resolved"
                );

                self.resolved.insert(id, entry);
                id
            }
        };

        if frame.opcode != ArpOpcode::Request {
            return if merged.is_some() {
                FrameDisposition::Merged
            } else {
                FrameDisposition::Resolved
            };
        }

        if let Some(entry) = self.resolved.get(entry_id) {
            effects.frames.push(build_frame(
                &self.link,
                &target_config,
                entry,
                ArpOpcode::Reply,
            ));
            trace!(to = %entry.protocol_address, "Queued ARP reply");
        }
        FrameDisposition::Replied
    }
}
