use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArpError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Access denied")]
    AccessDenied,

    #[error("Out of resources")]
    OutOfResources,

    #[error("Instance is not configured")]
    NotStarted,

    #[error("No matching entry found")]
    NotFound,

    #[error("{0} requests are still pending")]
    Busy(usize),

    #[error("Transport error: {0}")]
    Transport(String),
}

/// Reasons an inbound frame is rejected by the codec. Never surfaced past the
/// frame processor.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    #[error("Frame too short: {0} bytes")]
    Truncated(usize),

    #[error("Zero-length address field")]
    ZeroAddressLength,
}
