pub mod channel;

pub use channel::{ChannelPeer, ChannelTransport};
