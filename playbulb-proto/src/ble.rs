//! BLE GATT identifiers of the Playbulb lamp
//!
//! Both are 16-bit Bluetooth SIG short UUIDs; the hub expands them to full
//! 128-bit UUIDs before talking to the radio.

/// Colour control service: `ff07`
pub const SERVICE_UUID: u16 = 0xff07;

/// Colour characteristic (write with response): `fffc`
pub const COLOR_CHARACTERISTIC_UUID: u16 = 0xfffc;

/// ATT MTU requested right after connecting
pub const PREFERRED_MTU: u16 = 500;
