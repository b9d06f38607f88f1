//! `/living/stripe` request handling, independent of HTTP plumbing

use playbulb_proto::{Color, LampRequest};

use crate::lamp::LampHandle;
use crate::store::ColorStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Red,
    Green,
    Blue,
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Channel::Red => "R(ed)",
            Channel::Green => "G(reen)",
            Channel::Blue => "B(lue)",
        })
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ControlError {
    #[error("Please send a request body")]
    MissingBody,
    #[error("Cannot decode request body: {0}")]
    UndecodableBody(String),
    #[error("{}", describe_channels(.0))]
    BadChannel(Vec<Channel>),
}

fn describe_channels(channels: &[Channel]) -> String {
    channels
        .iter()
        .map(|c| format!("Cannot decode {c} param."))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Colour to store, and the rejection to report if the request was invalid
///
/// Even a rejected request resolves to a colour (always [`Color::OFF`]).
#[derive(Debug, PartialEq, Eq)]
pub struct Resolution {
    pub color: Color,
    pub rejection: Option<ControlError>,
}

impl Resolution {
    fn accepted(color: Color) -> Self {
        Self {
            color,
            rejection: None,
        }
    }

    fn rejected(rejection: ControlError) -> Self {
        Self {
            color: Color::OFF,
            rejection: Some(rejection),
        }
    }
}

/// Maps a raw request body to the colour it asks for
pub fn resolve(body: &[u8]) -> Resolution {
    match serde_json::from_slice::<LampRequest>(body) {
        Ok(request) => resolve_request(&request),
        Err(e) => Resolution::rejected(ControlError::UndecodableBody(e.to_string())),
    }
}

pub fn resolve_request(request: &LampRequest) -> Resolution {
    match request.action.as_str() {
        "off" => Resolution::accepted(Color::OFF),
        "on" => Resolution::accepted(Color::WHITE),
        "default" => Resolution::accepted(Color::DEFAULT),
        "custom" => {
            let red = decode_channel(&request.r);
            let green = decode_channel(&request.g);
            let blue = decode_channel(&request.b);
            match (red, green, blue) {
                (Some(r), Some(g), Some(b)) => Resolution::accepted(Color::custom(r, g, b)),
                (r, g, b) => {
                    let failed = [(r, Channel::Red), (g, Channel::Green), (b, Channel::Blue)]
                        .into_iter()
                        .filter(|(value, _)| value.is_none())
                        .map(|(_, channel)| channel)
                        .collect();
                    Resolution::rejected(ControlError::BadChannel(failed))
                }
            }
        }
        _ => Resolution::accepted(Color::OFF),
    }
}

/// Exactly two hex digits, either case
fn decode_channel(value: &str) -> Option<u8> {
    let bytes = data_encoding::HEXLOWER_PERMISSIVE
        .decode(value.as_bytes())
        .ok()?;
    match bytes[..] {
        [byte] => Some(byte),
        _ => None,
    }
}

/// Sole writer of the pending colour and sole trigger of reconnect cycles
#[derive(Clone)]
pub struct Control {
    store: ColorStore,
    lamp: LampHandle,
}

impl Control {
    pub fn new(store: ColorStore, lamp: LampHandle) -> Self {
        Self { store, lamp }
    }

    /// Stores the requested colour and queues a reconnect
    ///
    /// `None` means no body could be read at all; nothing changes then. Any
    /// body that was read triggers a reconnect, valid or not.
    pub fn apply(&self, body: Option<&[u8]>) -> Result<Color, ControlError> {
        let Some(body) = body else {
            return Err(ControlError::MissingBody);
        };

        let Resolution { color, rejection } = resolve(body);
        self.store.set(color);
        tracing::info!(%color, "colour requested");

        if let Err(e) = self.lamp.reconnect() {
            tracing::error!("cannot reach the lamp: {e}");
        }

        match rejection {
            Some(e) => Err(e),
            None => Ok(color),
        }
    }
}
