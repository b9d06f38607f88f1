//! Lamp actor: the single owner of the state machine
//!
//! Radio events and command outcomes arrive through the [`Mailbox`], reconnect
//! requests from HTTP handlers through a [`LampHandle`]. Commands returned by
//! one transition run in order on a spawned task, so a slow discovery never
//! blocks the next event.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::machine::{Command, Cycle, Machine, Outcome};
use crate::radio::{Radio, RadioEvent};

pub enum Input<P> {
    Radio(RadioEvent<P>),
    Outcome { cycle: Cycle, outcome: Outcome },
}

/// Where radio backends and command tasks deliver their results
pub struct Mailbox<P> {
    tx: mpsc::UnboundedSender<Input<P>>,
}

impl<P> Clone for Mailbox<P> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<P> Mailbox<P> {
    /// Returns `false` once the lamp actor is gone
    pub fn radio_event(&self, event: RadioEvent<P>) -> bool {
        self.tx.send(Input::Radio(event)).is_ok()
    }

    fn outcome(&self, cycle: Cycle, outcome: Outcome) {
        if self.tx.send(Input::Outcome { cycle, outcome }).is_err() {
            tracing::debug!(cycle, "lamp actor gone, outcome dropped");
        }
    }
}

pub struct Inbox<P> {
    rx: mpsc::UnboundedReceiver<Input<P>>,
}

pub fn mailbox<P>() -> (Mailbox<P>, Inbox<P>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Mailbox { tx }, Inbox { rx })
}

#[derive(Debug, thiserror::Error)]
#[error("lamp actor is not running")]
pub struct LampGone;

enum Request {
    Reconnect,
}

/// Cheap handle the HTTP side uses to poke the lamp
#[derive(Clone)]
pub struct LampHandle {
    tx: mpsc::UnboundedSender<Request>,
}

impl LampHandle {
    /// Queues a cancel-and-reconnect cycle without waiting for it
    pub fn reconnect(&self) -> Result<(), LampGone> {
        self.tx.send(Request::Reconnect).map_err(|_| LampGone)
    }
}

pub struct Lamp<R: Radio> {
    radio: Arc<R>,
    machine: Machine<R::Peripheral>,
    mailbox: Mailbox<R::Peripheral>,
    inbox: Inbox<R::Peripheral>,
    requests: mpsc::UnboundedReceiver<Request>,
}

impl<R: Radio> Lamp<R> {
    pub fn new(
        radio: Arc<R>,
        machine: Machine<R::Peripheral>,
        mailbox: Mailbox<R::Peripheral>,
        inbox: Inbox<R::Peripheral>,
    ) -> (Self, LampHandle) {
        let (tx, requests) = mpsc::unbounded_channel();
        let lamp = Self {
            radio,
            machine,
            mailbox,
            inbox,
            requests,
        };
        (lamp, LampHandle { tx })
    }

    pub async fn run(mut self) {
        loop {
            let commands = tokio::select! {
                Some(input) = self.inbox.rx.recv() => self.dispatch(input),
                Some(request) = self.requests.recv() => match request {
                    Request::Reconnect => self.machine.on_reconnect_requested(),
                },
                else => break,
            };
            if !commands.is_empty() {
                self.spawn(commands);
            }
        }
        tracing::debug!("lamp actor stopped");
    }

    fn dispatch(&mut self, input: Input<R::Peripheral>) -> Vec<Command<R::Peripheral>> {
        match input {
            Input::Radio(RadioEvent::StateChanged(state)) => self.machine.on_state_changed(state),
            Input::Radio(RadioEvent::Discovered(advertisement)) => {
                self.machine.on_discovered(advertisement)
            }
            Input::Radio(RadioEvent::Connected(peripheral)) => {
                self.machine.on_connected(&peripheral)
            }
            Input::Radio(RadioEvent::Disconnected(peripheral)) => {
                self.machine.on_disconnected(&peripheral)
            }
            Input::Outcome { cycle, outcome } => self.machine.on_outcome(cycle, outcome),
        }
    }

    fn spawn(&self, commands: Vec<Command<R::Peripheral>>) {
        let radio = self.radio.clone();
        let mailbox = self.mailbox.clone();
        tokio::spawn(async move {
            for command in commands {
                execute(radio.as_ref(), command, &mailbox).await;
            }
        });
    }
}

async fn execute<R: Radio>(
    radio: &R,
    command: Command<R::Peripheral>,
    mailbox: &Mailbox<R::Peripheral>,
) {
    match command {
        Command::StartScan => {
            if let Err(e) = radio.start_scan().await {
                tracing::warn!("Failed to start scanning, err: {e}");
            }
        }
        Command::StopScan => {
            if let Err(e) = radio.stop_scan().await {
                tracing::warn!("Failed to stop scanning, err: {e}");
            }
        }
        Command::CancelConnection { peripheral } => {
            // usually nothing to cancel: the lamp drops the link after a write
            if let Err(e) = radio.cancel_connection(&peripheral).await {
                tracing::debug!(?peripheral, "cancel connection: {e}");
            }
        }
        Command::Connect { peripheral, cycle } => {
            let result = radio.connect(&peripheral).await;
            mailbox.outcome(cycle, Outcome::Connected(result));
        }
        Command::NegotiateMtu {
            peripheral,
            mtu,
            cycle,
        } => {
            let result = radio.negotiate_mtu(&peripheral, mtu).await;
            mailbox.outcome(cycle, Outcome::MtuNegotiated(result));
        }
        Command::DiscoverServices { peripheral, cycle } => {
            let result = radio.discover_services(&peripheral, &[]).await;
            mailbox.outcome(cycle, Outcome::ServicesDiscovered(result));
        }
        Command::DiscoverCharacteristics {
            peripheral,
            service,
            cycle,
        } => {
            let result = radio.discover_characteristics(&peripheral, service, &[]).await;
            mailbox.outcome(cycle, Outcome::CharacteristicsDiscovered(result));
        }
        Command::Write {
            peripheral,
            service,
            characteristic,
            color,
            with_response,
            cycle,
        } => {
            tracing::info!(%color, "writing colour");
            let result = radio
                .write_characteristic(
                    &peripheral,
                    service,
                    characteristic,
                    &color.to_bytes(),
                    with_response,
                )
                .await;
            mailbox.outcome(cycle, Outcome::Written(result));
        }
    }
}
