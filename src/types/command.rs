//! Parsed cwdaemon commands

use serde::{Deserialize, Serialize};

use crate::types::DropReason;

/// One decoded cwdaemon datagram
///
/// Numeric fields have already been range-checked by the parser; anything
/// that failed validation arrives as `Unknown`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Command {
    /// Text to key, prosign triggers still unexpanded
    SendText(String),
    /// Keying speed in WPM
    SetSpeed(u8),
    /// Sidetone frequency in Hz, 0 = sidetone off
    SetTone(u16),
    /// Manual PTT on/off
    SetPtt(bool),
    /// Stop keying and discard buffered text
    Abort,
    /// Word space length in dits
    SetWordSpace(u8),
    /// cwdaemon weighting, -50..=50
    SetWeight(i8),
    /// Key down for N seconds
    Tune(u8),
    /// cwdaemon TX delay in ms
    SetTxDelay(u8),
    /// Restore session defaults
    Reset,
    /// Reply to the client once the next text has gone to the keyer
    EchoWhenDone(String),
    /// Anything we could not (or would not) decode
    Unknown { raw: Vec<u8>, reason: DropReason },
}

impl Command {
    /// Build an `Unknown` from the raw datagram
    pub fn unknown(raw: &[u8], reason: DropReason) -> Self {
        Command::Unknown {
            raw: raw.to_vec(),
            reason,
        }
    }

    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Command::SendText(_) => "send_text",
            Command::SetSpeed(_) => "set_speed",
            Command::SetTone(_) => "set_tone",
            Command::SetPtt(_) => "set_ptt",
            Command::Abort => "abort",
            Command::SetWordSpace(_) => "set_word_space",
            Command::SetWeight(_) => "set_weight",
            Command::Tune(_) => "tune",
            Command::SetTxDelay(_) => "set_tx_delay",
            Command::Reset => "reset",
            Command::EchoWhenDone(_) => "echo_when_done",
            Command::Unknown { .. } => "unknown",
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Command::Unknown { .. })
    }
}
