//! Playbulb protocol - colour values, request body and GATT identifiers

pub mod ble;

/// Colour as the lamp expects it on the wire: white, red, green, blue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub white: u8,
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Color {
    /// Lamp switched off
    pub const OFF: Color = Color::new(0x00, 0x00, 0x00, 0x00);

    /// All four channels at full brightness (`"action": "on"`)
    pub const WHITE: Color = Color::new(0xff, 0xff, 0xff, 0xff);

    /// Factory colour of the lamp (`"action": "default"`)
    pub const DEFAULT: Color = Color::new(0x10, 0x00, 0x00, 0xff);

    pub const fn new(white: u8, red: u8, green: u8, blue: u8) -> Self {
        Self {
            white,
            red,
            green,
            blue,
        }
    }

    /// RGB colour with the white channel forced to zero
    pub const fn custom(red: u8, green: u8, blue: u8) -> Self {
        Self::new(0x00, red, green, blue)
    }

    pub const fn to_bytes(self) -> [u8; 4] {
        [self.white, self.red, self.green, self.blue]
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:02x}{:02x}{:02x}{:02x}",
            self.white, self.red, self.green, self.blue
        )
    }
}

/// Body of `POST /living/stripe`
///
/// Every field is a string; absent fields decode as empty strings so that an
/// `{"action": "off"}` body is accepted as is.
#[derive(serde::Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct LampRequest {
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub r: String,
    #[serde(default)]
    pub g: String,
    #[serde(default)]
    pub b: String,
}
