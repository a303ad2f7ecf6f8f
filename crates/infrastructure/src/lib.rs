pub mod arp;
pub mod logging;
pub mod transport;
