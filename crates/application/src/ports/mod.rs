mod cache_sweep_port;
mod frame_sink_port;
mod frame_transport;

pub use cache_sweep_port::{CacheSweepPort, SweepOutcome};
pub use frame_sink_port::{FrameDisposition, FrameSinkPort};
pub use frame_transport::{FrameTransport, OutboundFrame};
