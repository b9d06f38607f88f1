//! Radio capability interface
//!
//! The lamp state machine never talks to a BLE stack directly. Commands go
//! through [`Radio`]; events (adapter state, discovery, connect, disconnect)
//! come back as [`RadioEvent`] through the lamp mailbox.

use btleplug::api::bleuuid::uuid_from_u16;
use uuid::Uuid;

use playbulb_proto::ble::{COLOR_CHARACTERISTIC_UUID, SERVICE_UUID};

/// Full 128-bit UUID of the lamp's colour service
pub const LAMP_SERVICE: Uuid = uuid_from_u16(SERVICE_UUID);

/// Full 128-bit UUID of the colour characteristic
pub const LAMP_COLOR_CHARACTERISTIC: Uuid = uuid_from_u16(COLOR_CHARACTERISTIC_UUID);

/// Power state of the local adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterState {
    PoweredOn,
    PoweredOff,
    Unknown,
}

/// A peripheral seen while scanning
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advertisement<P> {
    pub peripheral: P,
    /// Backend identifier of the peripheral in text form
    pub id: String,
    /// Hardware address as reported by the stack, e.g. `AA:BB:CC:DD:EE:FF`
    pub address: String,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RadioEvent<P> {
    StateChanged(AdapterState),
    Discovered(Advertisement<P>),
    Connected(P),
    Disconnected(P),
}

#[derive(Debug, thiserror::Error)]
pub enum RadioError {
    #[error("bluetooth stack error: {0}")]
    Btle(#[from] btleplug::Error),
    #[error("no bluetooth adapter at index {0}")]
    NoAdapter(usize),
    #[error("service {0} is not offered by the peripheral")]
    ServiceNotFound(Uuid),
    #[error("characteristic {characteristic} not found in service {service}")]
    CharacteristicNotFound { service: Uuid, characteristic: Uuid },
    #[error("{0}")]
    Other(String),
}

/// Commands the lamp needs from a BLE central
///
/// An empty `filter` slice means "everything".
pub trait Radio: Send + Sync + 'static {
    /// Handle identifying one peripheral to the backend
    type Peripheral: Clone + PartialEq + std::fmt::Debug + Send + Sync + 'static;

    fn start_scan(&self) -> impl Future<Output = Result<(), RadioError>> + Send;

    fn stop_scan(&self) -> impl Future<Output = Result<(), RadioError>> + Send;

    fn connect(
        &self,
        peripheral: &Self::Peripheral,
    ) -> impl Future<Output = Result<(), RadioError>> + Send;

    fn cancel_connection(
        &self,
        peripheral: &Self::Peripheral,
    ) -> impl Future<Output = Result<(), RadioError>> + Send;

    fn negotiate_mtu(
        &self,
        peripheral: &Self::Peripheral,
        mtu: u16,
    ) -> impl Future<Output = Result<(), RadioError>> + Send;

    /// Returns the UUIDs of the discovered services
    fn discover_services(
        &self,
        peripheral: &Self::Peripheral,
        filter: &[Uuid],
    ) -> impl Future<Output = Result<Vec<Uuid>, RadioError>> + Send;

    /// Returns the UUIDs of the characteristics of `service`
    fn discover_characteristics(
        &self,
        peripheral: &Self::Peripheral,
        service: Uuid,
        filter: &[Uuid],
    ) -> impl Future<Output = Result<Vec<Uuid>, RadioError>> + Send;

    fn write_characteristic(
        &self,
        peripheral: &Self::Peripheral,
        service: Uuid,
        characteristic: Uuid,
        value: &[u8],
        with_response: bool,
    ) -> impl Future<Output = Result<(), RadioError>> + Send;
}

/// Keeps only the UUIDs accepted by `filter` (all of them for an empty filter)
pub fn apply_filter(found: impl IntoIterator<Item = Uuid>, filter: &[Uuid]) -> Vec<Uuid> {
    found
        .into_iter()
        .filter(|uuid| filter.is_empty() || filter.contains(uuid))
        .collect()
}
