//! Bytes the keyer sends back unprompted
//!
//! WinKeyer reports status changes and speed pot moves on its own. We only
//! log them; they never steer the translation.

use serde::Serialize;

/// Decoded status byte (0b110x_xxxx)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct KeyerStatus {
    /// Waiting on a buffered wait/pause command
    pub wait: bool,
    /// Key is down (tune or key-immediate)
    pub keydown: bool,
    /// Sending Morse
    pub busy: bool,
    /// Paddle break-in active
    pub breakin: bool,
    /// Input buffer more than 2/3 full
    pub xoff: bool,
}

/// Any byte read from the keyer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum KeyerByte {
    Status(KeyerStatus),
    /// Speed pot position (0..=63 relative to the pot's minimum)
    SpeedPot(u8),
    /// Echoed character or anything else
    Echo(u8),
}

impl KeyerByte {
    pub fn decode(byte: u8) -> Self {
        if byte & 0xE0 == 0xC0 {
            KeyerByte::Status(KeyerStatus {
                wait: byte & 0x10 != 0,
                keydown: byte & 0x08 != 0,
                busy: byte & 0x04 != 0,
                breakin: byte & 0x02 != 0,
                xoff: byte & 0x01 != 0,
            })
        } else if byte & 0xC0 == 0x80 {
            KeyerByte::SpeedPot(byte & 0x3F)
        } else {
            KeyerByte::Echo(byte)
        }
    }
}

impl std::fmt::Display for KeyerByte {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeyerByte::Status(s) => write!(
                f,
                "status busy={} breakin={} keydown={} wait={} xoff={}",
                s.busy, s.breakin, s.keydown, s.wait, s.xoff
            ),
            KeyerByte::SpeedPot(v) => write!(f, "speed_pot {}", v),
            KeyerByte::Echo(b) if b.is_ascii_graphic() || *b == b' ' => {
                write!(f, "echo '{}'", *b as char)
            }
            KeyerByte::Echo(b) => write!(f, "echo 0x{:02x}", b),
        }
    }
}
