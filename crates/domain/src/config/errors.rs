/// Failures while loading, validating or saving an `ArpConfig`.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Cannot read ARP config {0}: {1}")]
    FileRead(String, String),

    #[error("Cannot write ARP config {0}: {1}")]
    FileWrite(String, String),

    #[error("Invalid TOML in ARP config {0}: {1}")]
    Parse(String, String),

    #[error("Cannot serialize ARP config: {0}")]
    Serialize(String),

    #[error("Invalid ARP engine setting: {0}")]
    Validation(String),
}
