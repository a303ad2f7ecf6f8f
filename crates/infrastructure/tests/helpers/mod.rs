#![allow(dead_code)]

mod builders;
mod recording_transport;

pub use builders::*;
pub use recording_transport::RecordingTransport;
