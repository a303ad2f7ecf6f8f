//! Ferrous ARP Domain Layer
pub mod address;
pub mod cache_entry;
pub mod config;
pub mod errors;
pub mod frame;
pub mod instance;

pub use address::Address;
pub use cache_entry::{CacheEntrySnapshot, FindMode, ResolutionOutcome, TableKind};
pub use config::{ArpConfig, ConfigError, EngineConfig, LoggingConfig};
pub use errors::{ArpError, FrameError};
pub use frame::{ArpFrame, ArpOpcode};
pub use instance::{InstanceConfig, InstanceId, LinkInfo, NotifyHandle};
