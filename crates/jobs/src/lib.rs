pub mod frame_receive;
pub mod runner;
pub mod timer_sweep;

pub use frame_receive::FrameReceiveJob;
pub use runner::JobRunner;
pub use timer_sweep::ArpTimerJob;
