//! Lamp connection state machine
//!
//! One transition method per input. Every method only updates the machine and
//! returns the radio commands to issue; executing them (and feeding their
//! outcomes back) is the job of [`crate::lamp::Lamp`].
//!
//! A connect cycle is numbered. Outcomes carry the number of the cycle that
//! issued them, and anything reported for an older cycle is dropped, so a
//! reconnect that cancels a stalled cycle cannot be confused by its late
//! results. Only the connect command's own result starts a session; the
//! radio's connect and disconnect events carry no cycle, so they never move
//! a cycle forward. At most one connect is in flight: a reconnect requested
//! meanwhile cancels it and connects again once its result is in.

use uuid::Uuid;

use playbulb_proto::Color;
use playbulb_proto::ble::PREFERRED_MTU;

use crate::radio::{
    AdapterState, Advertisement, LAMP_COLOR_CHARACTERISTIC, LAMP_SERVICE, RadioError,
};
use crate::store::ColorStore;

pub type Cycle = u64;

/// Hardware address of the lamp, compared case-insensitively
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetAddress(String);

impl TargetAddress {
    pub fn new(address: &str) -> Self {
        Self(address.trim().to_ascii_uppercase())
    }

    pub fn matches(&self, address: &str) -> bool {
        self.0.eq_ignore_ascii_case(address.trim())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TargetAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Disconnected,
    Scanning,
    Connecting,
    Connected,
    DiscoveringServices,
    DiscoveringCharacteristics,
    Writing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command<P> {
    StartScan,
    StopScan,
    CancelConnection {
        peripheral: P,
    },
    Connect {
        peripheral: P,
        cycle: Cycle,
    },
    NegotiateMtu {
        peripheral: P,
        mtu: u16,
        cycle: Cycle,
    },
    DiscoverServices {
        peripheral: P,
        cycle: Cycle,
    },
    DiscoverCharacteristics {
        peripheral: P,
        service: Uuid,
        cycle: Cycle,
    },
    Write {
        peripheral: P,
        service: Uuid,
        characteristic: Uuid,
        color: Color,
        with_response: bool,
        cycle: Cycle,
    },
}

/// Result of a command that belongs to a connect cycle
#[derive(Debug)]
pub enum Outcome {
    Connected(Result<(), RadioError>),
    MtuNegotiated(Result<(), RadioError>),
    ServicesDiscovered(Result<Vec<Uuid>, RadioError>),
    CharacteristicsDiscovered(Result<Vec<Uuid>, RadioError>),
    Written(Result<(), RadioError>),
}

pub struct Machine<P> {
    target: TargetAddress,
    store: ColorStore,
    mtu: u16,
    service: Uuid,
    characteristic: Uuid,
    state: LinkState,
    tracked: Option<P>,
    cycle: Cycle,
    /// cycle of the connect command whose result is still outstanding
    connecting: Option<Cycle>,
}

impl<P: Clone + PartialEq + std::fmt::Debug> Machine<P> {
    pub fn new(target: TargetAddress, store: ColorStore) -> Self {
        Self {
            target,
            store,
            mtu: PREFERRED_MTU,
            service: LAMP_SERVICE,
            characteristic: LAMP_COLOR_CHARACTERISTIC,
            state: LinkState::Disconnected,
            tracked: None,
            cycle: 0,
            connecting: None,
        }
    }

    pub fn with_mtu(mut self, mtu: u16) -> Self {
        self.mtu = mtu;
        self
    }

    pub fn state(&self) -> LinkState {
        self.state
    }

    pub fn tracked(&self) -> Option<&P> {
        self.tracked.as_ref()
    }

    pub fn cycle(&self) -> Cycle {
        self.cycle
    }

    pub fn on_state_changed(&mut self, adapter: AdapterState) -> Vec<Command<P>> {
        tracing::info!(?adapter, "adapter state changed");
        match adapter {
            AdapterState::PoweredOn => {
                tracing::info!(target_address = %self.target, "scanning for the lamp");
                self.state = LinkState::Scanning;
                vec![Command::StartScan]
            }
            _ => {
                // whatever was in flight cannot complete without the adapter
                self.cycle += 1;
                self.connecting = None;
                self.state = LinkState::Disconnected;
                vec![Command::StopScan]
            }
        }
    }

    pub fn on_discovered(&mut self, advertisement: Advertisement<P>) -> Vec<Command<P>> {
        if !self.target.matches(&advertisement.address)
            && !self.target.matches(&advertisement.id)
        {
            tracing::trace!(
                address = %advertisement.address,
                id = %advertisement.id,
                "ignoring peripheral"
            );
            return vec![];
        }

        if self.state != LinkState::Scanning {
            // repeated advertisement for the lamp we already hold
            self.tracked = Some(advertisement.peripheral);
            return vec![];
        }

        tracing::info!(
            address = %advertisement.address,
            name = advertisement.name.as_deref().unwrap_or("unknown"),
            "target device found"
        );
        self.tracked = Some(advertisement.peripheral);
        self.cycle += 1;
        self.state = LinkState::Connecting;
        let mut commands = vec![Command::StopScan];
        commands.extend(self.connect());
        commands
    }

    /// Informational: the session is started by [`Outcome::Connected`]
    pub fn on_connected(&mut self, peripheral: &P) -> Vec<Command<P>> {
        tracing::debug!(?peripheral, state = ?self.state, "connect event");
        vec![]
    }

    pub fn on_disconnected(&mut self, peripheral: &P) -> Vec<Command<P>> {
        if self.tracked.as_ref() != Some(peripheral) {
            return vec![];
        }
        if self.state != LinkState::Connected {
            // a cycle is running; its pending command reports a dead link itself
            tracing::debug!(?peripheral, state = ?self.state, "disconnect during a cycle");
            return vec![];
        }
        tracing::info!(?peripheral, "disconnected");
        self.state = LinkState::Disconnected;
        vec![]
    }

    /// A colour change was requested: drop the current link and connect again
    pub fn on_reconnect_requested(&mut self) -> Vec<Command<P>> {
        let Some(peripheral) = self.tracked.clone() else {
            tracing::info!("lamp not discovered yet, colour kept for the first connection");
            return vec![];
        };

        let mut commands = vec![];
        if self.state == LinkState::Scanning {
            commands.push(Command::StopScan);
        }
        self.cycle += 1;
        self.state = LinkState::Connecting;
        commands.push(Command::CancelConnection { peripheral });
        match self.connecting {
            Some(pending) => {
                tracing::debug!(
                    pending,
                    cycle = self.cycle,
                    "connect in flight, cancelling it first"
                );
            }
            None => commands.extend(self.connect()),
        }
        commands
    }

    pub fn on_outcome(&mut self, cycle: Cycle, outcome: Outcome) -> Vec<Command<P>> {
        let Some(peripheral) = self.tracked.clone() else {
            return vec![];
        };

        match outcome {
            Outcome::Connected(result) => self.on_connect_finished(cycle, result),
            _ if cycle != self.cycle => {
                tracing::debug!(cycle, current = self.cycle, ?outcome, "stale outcome dropped");
                vec![]
            }
            Outcome::MtuNegotiated(result) => {
                if let Err(e) = result {
                    tracing::warn!("Failed to set MTU, err: {e}");
                }
                if self.state != LinkState::Connected {
                    return vec![];
                }
                self.state = LinkState::DiscoveringServices;
                vec![Command::DiscoverServices { peripheral, cycle }]
            }
            Outcome::ServicesDiscovered(result) => {
                if self.state != LinkState::DiscoveringServices {
                    return vec![];
                }
                self.state = LinkState::Connected;
                let services = match result {
                    Ok(services) => services,
                    Err(e) => {
                        tracing::warn!("Failed to discover services, err: {e}");
                        return vec![];
                    }
                };
                if !services.contains(&self.service) {
                    tracing::debug!(service = %self.service, "lamp service not offered");
                    return vec![];
                }
                self.state = LinkState::DiscoveringCharacteristics;
                vec![Command::DiscoverCharacteristics {
                    peripheral,
                    service: self.service,
                    cycle,
                }]
            }
            Outcome::CharacteristicsDiscovered(result) => {
                if self.state != LinkState::DiscoveringCharacteristics {
                    return vec![];
                }
                self.state = LinkState::Connected;
                let characteristics = match result {
                    Ok(characteristics) => characteristics,
                    Err(e) => {
                        tracing::warn!("Failed to discover characteristics, err: {e}");
                        return vec![];
                    }
                };
                if !characteristics.contains(&self.characteristic) {
                    tracing::debug!(
                        characteristic = %self.characteristic,
                        "colour characteristic not offered"
                    );
                    return vec![];
                }
                self.state = LinkState::Writing;
                vec![Command::Write {
                    peripheral,
                    service: self.service,
                    characteristic: self.characteristic,
                    color: self.store.get(),
                    with_response: true,
                    cycle,
                }]
            }
            Outcome::Written(result) => {
                if self.state != LinkState::Writing {
                    return vec![];
                }
                self.state = LinkState::Connected;
                match result {
                    Ok(()) => tracing::info!("colour written"),
                    Err(e) => tracing::warn!("Failed to write colour, err: {e}"),
                }
                vec![]
            }
        }
    }

    fn on_connect_finished(
        &mut self,
        cycle: Cycle,
        result: Result<(), RadioError>,
    ) -> Vec<Command<P>> {
        let settled = self.connecting == Some(cycle);
        if settled {
            self.connecting = None;
        }

        if cycle != self.cycle {
            tracing::debug!(cycle, current = self.cycle, ?result, "connect of a replaced cycle");
            if settled && self.state == LinkState::Connecting {
                // the reconnect requested meanwhile only cancelled; connect now
                return self.connect();
            }
            return vec![];
        }
        if self.state != LinkState::Connecting {
            return vec![];
        }
        match result {
            Ok(()) => self.begin_session(),
            Err(e) => {
                tracing::warn!("Failed to connect, err: {e}");
                self.state = LinkState::Disconnected;
                vec![]
            }
        }
    }

    fn connect(&mut self) -> Vec<Command<P>> {
        let Some(peripheral) = self.tracked.clone() else {
            return vec![];
        };
        self.connecting = Some(self.cycle);
        vec![Command::Connect {
            peripheral,
            cycle: self.cycle,
        }]
    }

    fn begin_session(&mut self) -> Vec<Command<P>> {
        let Some(peripheral) = self.tracked.clone() else {
            return vec![];
        };
        tracing::info!(?peripheral, "connected");
        self.state = LinkState::Connected;
        vec![Command::NegotiateMtu {
            peripheral,
            mtu: self.mtu,
            cycle: self.cycle,
        }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LAMP: &str = "AA:BB:CC:DD:EE:FF";

    fn machine() -> (Machine<&'static str>, ColorStore) {
        let store = ColorStore::default();
        (Machine::new(TargetAddress::new("aa:bb:cc:dd:ee:ff"), store.clone()), store)
    }

    fn advert(peripheral: &'static str, address: &str) -> Advertisement<&'static str> {
        Advertisement {
            peripheral,
            id: peripheral.to_string(),
            address: address.to_string(),
            name: Some("PLAYBULB".to_string()),
        }
    }

    /// Powers on and discovers the lamp, returns the cycle of the first connect
    fn found(m: &mut Machine<&'static str>) -> Cycle {
        m.on_state_changed(AdapterState::PoweredOn);
        m.on_discovered(advert("lamp", LAMP));
        m.cycle()
    }

    /// Drives a connected cycle up to the write command
    fn run_cycle(m: &mut Machine<&'static str>, cycle: Cycle) -> Vec<Command<&'static str>> {
        let mtu = m.on_outcome(cycle, Outcome::Connected(Ok(())));
        assert!(matches!(mtu[..], [Command::NegotiateMtu { mtu: 500, .. }]));
        m.on_outcome(cycle, Outcome::MtuNegotiated(Ok(())));
        m.on_outcome(cycle, Outcome::ServicesDiscovered(Ok(vec![LAMP_SERVICE])));
        m.on_outcome(
            cycle,
            Outcome::CharacteristicsDiscovered(Ok(vec![LAMP_COLOR_CHARACTERISTIC])),
        )
    }

    #[test]
    fn power_on_scans_and_first_match_connects_once() {
        let (mut m, _) = machine();
        assert_eq!(m.on_state_changed(AdapterState::PoweredOn), vec![Command::StartScan]);
        assert_eq!(m.state(), LinkState::Scanning);

        let commands = m.on_discovered(advert("lamp", LAMP));
        assert_eq!(
            commands,
            vec![
                Command::StopScan,
                Command::Connect {
                    peripheral: "lamp",
                    cycle: 1
                }
            ]
        );
        assert_eq!(m.tracked(), Some(&"lamp"));

        // the same lamp keeps advertising until the scan really stops
        assert!(m.on_discovered(advert("lamp", LAMP)).is_empty());
        assert_eq!(m.state(), LinkState::Connecting);
    }

    #[test]
    fn other_peripherals_are_never_tracked() {
        let (mut m, _) = machine();
        m.on_state_changed(AdapterState::PoweredOn);
        assert!(m.on_discovered(advert("other", "11:22:33:44:55:66")).is_empty());
        assert_eq!(m.tracked(), None);
        assert_eq!(m.state(), LinkState::Scanning);
        assert!(m.on_connected(&"other").is_empty());
    }

    #[test]
    fn address_match_ignores_case() {
        let target = TargetAddress::new(" aa:bb:cc:dd:ee:ff ");
        assert!(target.matches("AA:BB:CC:DD:EE:FF"));
        assert!(target.matches("aA:bB:cC:dD:eE:fF"));
        assert!(!target.matches("AA:BB:CC:DD:EE:00"));
        assert_eq!(target.as_str(), LAMP);
    }

    #[test]
    fn full_cycle_writes_current_color_once() {
        let (mut m, store) = machine();
        let cycle = found(&mut m);
        store.set(Color::custom(0xff, 0x00, 0x80));

        let commands = run_cycle(&mut m, cycle);
        assert_eq!(
            commands,
            vec![Command::Write {
                peripheral: "lamp",
                service: LAMP_SERVICE,
                characteristic: LAMP_COLOR_CHARACTERISTIC,
                color: Color::new(0x00, 0xff, 0x00, 0x80),
                with_response: true,
                cycle,
            }]
        );
        assert_eq!(m.state(), LinkState::Writing);

        assert!(m.on_outcome(cycle, Outcome::Written(Ok(()))).is_empty());
        assert_eq!(m.state(), LinkState::Connected);

        // a second characteristics report in the same cycle never writes again
        assert!(
            m.on_outcome(
                cycle,
                Outcome::CharacteristicsDiscovered(Ok(vec![LAMP_COLOR_CHARACTERISTIC]))
            )
            .is_empty()
        );
    }

    #[test]
    fn color_is_read_when_characteristic_is_found() {
        let (mut m, store) = machine();
        let cycle = found(&mut m);
        store.set(Color::WHITE);
        m.on_outcome(cycle, Outcome::Connected(Ok(())));
        m.on_outcome(cycle, Outcome::MtuNegotiated(Ok(())));
        m.on_outcome(cycle, Outcome::ServicesDiscovered(Ok(vec![LAMP_SERVICE])));
        store.set(Color::DEFAULT);

        let commands = m.on_outcome(
            cycle,
            Outcome::CharacteristicsDiscovered(Ok(vec![LAMP_COLOR_CHARACTERISTIC])),
        );
        assert!(matches!(
            commands[..],
            [Command::Write { color: Color::DEFAULT, .. }]
        ));
    }

    #[test]
    fn missing_service_or_characteristic_writes_nothing() {
        let (mut m, _) = machine();
        let cycle = found(&mut m);
        m.on_outcome(cycle, Outcome::Connected(Ok(())));
        m.on_outcome(cycle, Outcome::MtuNegotiated(Ok(())));
        assert!(
            m.on_outcome(cycle, Outcome::ServicesDiscovered(Ok(vec![Uuid::nil()])))
                .is_empty()
        );
        assert_eq!(m.state(), LinkState::Connected);

        let cycle = {
            m.on_reconnect_requested();
            m.cycle()
        };
        m.on_outcome(cycle, Outcome::Connected(Ok(())));
        m.on_outcome(cycle, Outcome::MtuNegotiated(Ok(())));
        m.on_outcome(cycle, Outcome::ServicesDiscovered(Ok(vec![LAMP_SERVICE])));
        assert!(
            m.on_outcome(cycle, Outcome::CharacteristicsDiscovered(Ok(vec![])))
                .is_empty()
        );
        assert_eq!(m.state(), LinkState::Connected);
    }

    #[test]
    fn mtu_failure_is_not_fatal() {
        let (mut m, _) = machine();
        let cycle = found(&mut m);
        m.on_outcome(cycle, Outcome::Connected(Ok(())));
        let commands = m.on_outcome(
            cycle,
            Outcome::MtuNegotiated(Err(RadioError::Other("no mtu".to_string()))),
        );
        assert_eq!(
            commands,
            vec![Command::DiscoverServices {
                peripheral: "lamp",
                cycle
            }]
        );
    }

    #[test]
    fn discovery_failure_ends_the_cycle() {
        let (mut m, _) = machine();
        let cycle = found(&mut m);
        m.on_outcome(cycle, Outcome::Connected(Ok(())));
        m.on_outcome(cycle, Outcome::MtuNegotiated(Ok(())));
        let commands = m.on_outcome(
            cycle,
            Outcome::ServicesDiscovered(Err(RadioError::Other("gatt".to_string()))),
        );
        assert!(commands.is_empty());
        assert_eq!(m.state(), LinkState::Connected);
    }

    #[test]
    fn connect_event_alone_starts_nothing() {
        let (mut m, _) = machine();
        let cycle = found(&mut m);
        assert!(m.on_connected(&"lamp").is_empty());
        assert_eq!(m.state(), LinkState::Connecting);

        let commands = m.on_outcome(cycle, Outcome::Connected(Ok(())));
        assert!(matches!(commands[..], [Command::NegotiateMtu { .. }]));
        assert!(m.on_connected(&"lamp").is_empty());
        assert_eq!(m.state(), LinkState::Connected);
    }

    #[test]
    fn peripheral_id_matches_when_address_is_hidden() {
        let (mut m, _) = machine();
        m.on_state_changed(AdapterState::PoweredOn);
        let advertisement = Advertisement {
            peripheral: "uuid-1",
            id: LAMP.to_lowercase(),
            address: "00:00:00:00:00:00".to_string(),
            name: None,
        };
        assert_eq!(
            m.on_discovered(advertisement),
            vec![
                Command::StopScan,
                Command::Connect {
                    peripheral: "uuid-1",
                    cycle: 1
                }
            ]
        );
    }

    #[test]
    fn reconnect_cancels_then_connects_with_a_new_cycle() {
        let (mut m, _) = machine();
        let first = found(&mut m);
        run_cycle(&mut m, first);
        m.on_outcome(first, Outcome::Written(Ok(())));
        m.on_disconnected(&"lamp");
        assert_eq!(m.state(), LinkState::Disconnected);

        let commands = m.on_reconnect_requested();
        assert_eq!(
            commands,
            vec![
                Command::CancelConnection { peripheral: "lamp" },
                Command::Connect {
                    peripheral: "lamp",
                    cycle: first + 1
                },
            ]
        );

        // a second request while that connect is pending only cancels it
        let again = m.on_reconnect_requested();
        assert_eq!(again, vec![Command::CancelConnection { peripheral: "lamp" }]);
        assert_eq!(m.cycle(), first + 2);

        // and connects for its own cycle once the pending one settles
        assert_eq!(
            m.on_outcome(first + 1, Outcome::Connected(Ok(()))),
            vec![Command::Connect {
                peripheral: "lamp",
                cycle: first + 2
            }]
        );
    }

    /// Feeds every outcome back until the cycle goes quiet, returns the writes
    fn settle(
        m: &mut Machine<&'static str>,
        mut commands: Vec<Command<&'static str>>,
    ) -> Vec<(Cycle, Color)> {
        let mut writes = vec![];
        while let Some(command) = commands.pop() {
            let next = match command {
                Command::Connect { cycle, .. } => m.on_outcome(cycle, Outcome::Connected(Ok(()))),
                Command::NegotiateMtu { cycle, .. } => {
                    m.on_outcome(cycle, Outcome::MtuNegotiated(Ok(())))
                }
                Command::DiscoverServices { cycle, .. } => {
                    m.on_outcome(cycle, Outcome::ServicesDiscovered(Ok(vec![LAMP_SERVICE])))
                }
                Command::DiscoverCharacteristics { cycle, .. } => m.on_outcome(
                    cycle,
                    Outcome::CharacteristicsDiscovered(Ok(vec![LAMP_COLOR_CHARACTERISTIC])),
                ),
                Command::Write { cycle, color, .. } => {
                    writes.push((cycle, color));
                    m.on_outcome(cycle, Outcome::Written(Ok(())))
                }
                _ => vec![],
            };
            commands.extend(next);
        }
        writes
    }

    #[test]
    fn late_connect_event_and_cancel_disconnect_keep_the_new_cycle() {
        let (mut m, store) = machine();
        let first = found(&mut m);
        store.set(Color::WHITE);

        assert_eq!(
            m.on_reconnect_requested(),
            vec![Command::CancelConnection { peripheral: "lamp" }]
        );
        store.set(Color::custom(0x12, 0x34, 0x56));

        // the first connect lands, then the cancel tears it down
        assert!(m.on_connected(&"lamp").is_empty());
        assert!(m.on_disconnected(&"lamp").is_empty());
        assert_eq!(m.state(), LinkState::Connecting);

        let reconnect = m.on_outcome(first, Outcome::Connected(Ok(())));
        assert_eq!(
            reconnect,
            vec![Command::Connect {
                peripheral: "lamp",
                cycle: first + 1
            }]
        );
        assert!(m.on_connected(&"lamp").is_empty());

        let writes = settle(&mut m, reconnect);
        assert_eq!(writes, vec![(first + 1, Color::new(0x00, 0x12, 0x34, 0x56))]);
        assert_eq!(m.state(), LinkState::Connected);
    }

    #[test]
    fn reconnects_during_a_pending_connect_write_the_latest_color_once() {
        let (mut m, store) = machine();
        let first = found(&mut m);

        store.set(Color::WHITE);
        let one = m.on_reconnect_requested();
        store.set(Color::DEFAULT);
        let two = m.on_reconnect_requested();
        for commands in [&one, &two] {
            assert_eq!(commands, &vec![Command::CancelConnection { peripheral: "lamp" }]);
        }
        assert_eq!(m.cycle(), first + 2);

        // the cancel aborted the pending connect
        let reconnect = m.on_outcome(
            first,
            Outcome::Connected(Err(RadioError::Other("aborted".to_string()))),
        );
        assert_eq!(
            reconnect,
            vec![Command::Connect {
                peripheral: "lamp",
                cycle: first + 2
            }]
        );
        assert_eq!(settle(&mut m, reconnect), vec![(first + 2, Color::DEFAULT)]);

        // the skipped cycle never had a connect of its own
        assert!(m.on_outcome(first + 1, Outcome::Connected(Ok(()))).is_empty());
    }

    #[test]
    fn stale_outcomes_are_dropped() {
        let (mut m, _) = machine();
        let first = found(&mut m);
        m.on_outcome(first, Outcome::Connected(Ok(())));
        m.on_outcome(first, Outcome::MtuNegotiated(Ok(())));

        m.on_reconnect_requested();
        assert!(
            m.on_outcome(first, Outcome::ServicesDiscovered(Ok(vec![LAMP_SERVICE])))
                .is_empty()
        );
        assert_eq!(m.state(), LinkState::Connecting);

        // disconnect caused by the cancel does not end the new cycle
        assert!(m.on_disconnected(&"lamp").is_empty());
        assert_eq!(m.state(), LinkState::Connecting);
    }

    #[test]
    fn reconnect_before_discovery_does_nothing() {
        let (mut m, _) = machine();
        m.on_state_changed(AdapterState::PoweredOn);
        assert!(m.on_reconnect_requested().is_empty());
        assert_eq!(m.state(), LinkState::Scanning);
        assert_eq!(m.cycle(), 0);
    }

    #[test]
    fn adapter_power_loss_stops_scanning() {
        let (mut m, _) = machine();
        m.on_state_changed(AdapterState::PoweredOn);
        assert_eq!(
            m.on_state_changed(AdapterState::PoweredOff),
            vec![Command::StopScan]
        );
        assert_eq!(m.state(), LinkState::Disconnected);
        assert!(m.on_discovered(advert("lamp", LAMP)).is_empty());
    }
}
