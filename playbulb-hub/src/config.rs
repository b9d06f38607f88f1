use std::net::SocketAddr;

use crate::machine::TargetAddress;

pub const DEFAULT_LISTEN: &str = "0.0.0.0:56666";

#[derive(Debug, Clone)]
pub struct Config {
    /// Hardware address of the lamp
    pub target: TargetAddress,
    pub listen: SocketAddr,
    /// Index into the host's bluetooth adapters
    pub adapter: usize,
    /// ATT MTU requested after each connect
    pub mtu: u16,
}

impl Config {
    pub fn new(target: &str) -> Self {
        Self {
            target: TargetAddress::new(target),
            listen: SocketAddr::from(([0, 0, 0, 0], 56666)),
            adapter: 0,
            mtu: playbulb_proto::ble::PREFERRED_MTU,
        }
    }
}
