//! [`Radio`] backed by the host Bluetooth stack through btleplug

use std::pin::Pin;

use btleplug::api::{Central, CentralEvent, Manager as _, Peripheral as _, ScanFilter, WriteType};
use btleplug::platform::{Adapter, Manager, Peripheral, PeripheralId};
use futures::{Stream, StreamExt};
use uuid::Uuid;

use crate::lamp::Mailbox;
use crate::radio::{AdapterState, Advertisement, Radio, RadioError, RadioEvent, apply_filter};

type EventStream = Pin<Box<dyn Stream<Item = CentralEvent> + Send>>;

pub struct BtleRadio {
    adapter: Adapter,
}

impl BtleRadio {
    /// Opens adapter number `index` and starts forwarding its events to `mailbox`
    ///
    /// btleplug hands out adapters that are already usable, so a successful
    /// open is reported to the lamp as the adapter powering on.
    pub async fn open(index: usize, mailbox: Mailbox<PeripheralId>) -> Result<Self, RadioError> {
        let manager = Manager::new().await?;
        let adapter = manager
            .adapters()
            .await?
            .into_iter()
            .nth(index)
            .ok_or(RadioError::NoAdapter(index))?;

        match adapter.adapter_info().await {
            Ok(info) => tracing::info!(adapter = %info, "bluetooth adapter opened"),
            Err(e) => tracing::debug!("adapter info unavailable: {e}"),
        }

        let events = adapter.events().await?;
        tokio::spawn(pump(adapter.clone(), events, mailbox.clone()));
        mailbox.radio_event(RadioEvent::StateChanged(AdapterState::PoweredOn));

        Ok(Self { adapter })
    }

    async fn peripheral(&self, id: &PeripheralId) -> Result<Peripheral, RadioError> {
        Ok(self.adapter.peripheral(id).await?)
    }
}

async fn pump(adapter: Adapter, mut events: EventStream, mailbox: Mailbox<PeripheralId>) {
    while let Some(event) = events.next().await {
        let event = match event {
            CentralEvent::DeviceDiscovered(id) | CentralEvent::DeviceUpdated(id) => {
                match advertisement(&adapter, id).await {
                    Some(advertisement) => RadioEvent::Discovered(advertisement),
                    None => continue,
                }
            }
            CentralEvent::DeviceConnected(id) => RadioEvent::Connected(id),
            CentralEvent::DeviceDisconnected(id) => RadioEvent::Disconnected(id),
            _ => continue,
        };
        if !mailbox.radio_event(event) {
            return;
        }
    }
    tracing::warn!("bluetooth event stream ended");
    mailbox.radio_event(RadioEvent::StateChanged(AdapterState::Unknown));
}

async fn advertisement(adapter: &Adapter, id: PeripheralId) -> Option<Advertisement<PeripheralId>> {
    let peripheral = match adapter.peripheral(&id).await {
        Ok(peripheral) => peripheral,
        Err(e) => {
            tracing::trace!(?id, "discovered peripheral vanished: {e}");
            return None;
        }
    };
    let name = match peripheral.properties().await {
        Ok(properties) => properties.and_then(|p| p.local_name),
        Err(_) => None,
    };
    // CoreBluetooth hides the address (all zeros) but the id is stable
    Some(Advertisement {
        id: id.to_string(),
        peripheral: id,
        address: peripheral.address().to_string(),
        name,
    })
}

impl Radio for BtleRadio {
    type Peripheral = PeripheralId;

    async fn start_scan(&self) -> Result<(), RadioError> {
        Ok(self.adapter.start_scan(ScanFilter::default()).await?)
    }

    async fn stop_scan(&self) -> Result<(), RadioError> {
        Ok(self.adapter.stop_scan().await?)
    }

    async fn connect(&self, id: &PeripheralId) -> Result<(), RadioError> {
        Ok(self.peripheral(id).await?.connect().await?)
    }

    async fn cancel_connection(&self, id: &PeripheralId) -> Result<(), RadioError> {
        // also aborts a connect that is still being established
        Ok(self.peripheral(id).await?.disconnect().await?)
    }

    async fn negotiate_mtu(&self, id: &PeripheralId, mtu: u16) -> Result<(), RadioError> {
        // btleplug leaves the ATT MTU exchange to the platform stack, which
        // runs it on connect
        tracing::debug!(?id, mtu, "MTU negotiation left to the platform");
        Ok(())
    }

    async fn discover_services(
        &self,
        id: &PeripheralId,
        filter: &[Uuid],
    ) -> Result<Vec<Uuid>, RadioError> {
        let peripheral = self.peripheral(id).await?;
        peripheral.discover_services().await?;
        Ok(apply_filter(
            peripheral.services().into_iter().map(|s| s.uuid),
            filter,
        ))
    }

    async fn discover_characteristics(
        &self,
        id: &PeripheralId,
        service: Uuid,
        filter: &[Uuid],
    ) -> Result<Vec<Uuid>, RadioError> {
        let peripheral = self.peripheral(id).await?;
        let service = peripheral
            .services()
            .into_iter()
            .find(|s| s.uuid == service)
            .ok_or(RadioError::ServiceNotFound(service))?;
        Ok(apply_filter(
            service.characteristics.into_iter().map(|c| c.uuid),
            filter,
        ))
    }

    async fn write_characteristic(
        &self,
        id: &PeripheralId,
        service: Uuid,
        characteristic: Uuid,
        value: &[u8],
        with_response: bool,
    ) -> Result<(), RadioError> {
        let peripheral = self.peripheral(id).await?;
        let target = peripheral
            .characteristics()
            .into_iter()
            .find(|c| c.uuid == characteristic && c.service_uuid == service)
            .ok_or(RadioError::CharacteristicNotFound {
                service,
                characteristic,
            })?;
        let write_type = if with_response {
            WriteType::WithResponse
        } else {
            WriteType::WithoutResponse
        };
        Ok(peripheral.write(&target, value, write_type).await?)
    }
}
