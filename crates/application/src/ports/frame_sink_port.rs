use async_trait::async_trait;

/// What the engine did with an inbound frame. Purely informational: dropped frames
/// are never errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameDisposition {
    Malformed,
    ForeignLink,
    Denied,
    UnknownProtocol,
    Merged,
    Observed,
    Resolved,
    Replied,
    NoCapacity,
}

impl FrameDisposition {
    pub fn as_str(&self) -> &'static str {
        match self {
            FrameDisposition::Malformed => "malformed",
            FrameDisposition::ForeignLink => "foreign_link",
            FrameDisposition::Denied => "denied",
            FrameDisposition::UnknownProtocol => "unknown_protocol",
            FrameDisposition::Merged => "merged",
            FrameDisposition::Observed => "observed",
            FrameDisposition::Resolved => "resolved",
            FrameDisposition::Replied => "replied",
            FrameDisposition::NoCapacity => "no_capacity",
        }
    }
}

/// Port through which received frames enter the engine.
#[async_trait]
pub trait FrameSinkPort: Send + Sync {
    async fn deliver(&self, frame: &[u8]) -> FrameDisposition;
}
