pub mod engine;
pub mod errors;
pub mod logging;
pub mod root;

pub use engine::EngineConfig;
pub use errors::ConfigError;
pub use logging::LoggingConfig;
pub use root::ArpConfig;
