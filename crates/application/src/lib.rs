//! Ferrous ARP Application Layer
pub mod ports;
