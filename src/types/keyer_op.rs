//! WinKeyer wire instructions
//!
//! The encoder never produces raw bytes directly. It produces `KeyerOp`s,
//! which keeps text runs tagged as plain or merged and makes the output
//! easy to assert on.

use serde::{Deserialize, Serialize};

/// WinKeyer host command bytes
pub mod wk {
    pub const ADMIN: u8 = 0x00;
    pub const ADMIN_HOST_OPEN: u8 = 0x02;
    pub const ADMIN_HOST_CLOSE: u8 = 0x03;

    pub const SIDETONE: u8 = 0x01;
    pub const SPEED: u8 = 0x02;
    pub const WEIGHTING: u8 = 0x03;
    pub const PTT_LEAD_TAIL: u8 = 0x04;
    pub const PIN_CONFIG: u8 = 0x09;
    pub const CLEAR_BUFFER: u8 = 0x0A;
    pub const MODE: u8 = 0x0E;
    pub const FIRST_EXTENSION: u8 = 0x10;
    pub const KEY_COMPENSATION: u8 = 0x11;

    // Buffered commands
    pub const PTT: u8 = 0x18;
    pub const KEY_BUFFERED: u8 = 0x19;
    pub const MERGE_LETTERS: u8 = 0x1B;
}

/// One instruction for the keyer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", content = "arg", rename_all = "snake_case")]
pub enum KeyerOp {
    HostOpen,
    HostClose,
    /// Sidetone frequency code (see `sidetone_code`)
    SetSidetone(u8),
    /// Speed in WPM
    SetSpeed(u8),
    /// WinKeyer weighting, 10..=90
    SetWeight(u8),
    /// Lead and tail in 10 ms units
    SetPttTiming { lead: u8, tail: u8 },
    PinConfig(u8),
    ClearBuffer,
    SetMode(u8),
    FirstExtension(u8),
    KeyCompensation(u8),
    Ptt(bool),
    /// Buffered key down for N seconds
    KeyDown(u8),
    /// Characters keyed with normal letter spacing
    PlainRun(String),
    /// Two characters keyed as one symbol
    MergedRun(String),
}

impl KeyerOp {
    /// Serial bytes for this instruction
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            KeyerOp::HostOpen => vec![wk::ADMIN, wk::ADMIN_HOST_OPEN],
            KeyerOp::HostClose => vec![wk::ADMIN, wk::ADMIN_HOST_CLOSE],
            KeyerOp::SetSidetone(code) => vec![wk::SIDETONE, *code],
            KeyerOp::SetSpeed(wpm) => vec![wk::SPEED, *wpm],
            KeyerOp::SetWeight(w) => vec![wk::WEIGHTING, *w],
            KeyerOp::SetPttTiming { lead, tail } => vec![wk::PTT_LEAD_TAIL, *lead, *tail],
            KeyerOp::PinConfig(bits) => vec![wk::PIN_CONFIG, *bits],
            KeyerOp::ClearBuffer => vec![wk::CLEAR_BUFFER],
            KeyerOp::SetMode(bits) => vec![wk::MODE, *bits],
            KeyerOp::FirstExtension(ms) => vec![wk::FIRST_EXTENSION, *ms],
            KeyerOp::KeyCompensation(ms) => vec![wk::KEY_COMPENSATION, *ms],
            KeyerOp::Ptt(on) => vec![wk::PTT, u8::from(*on)],
            KeyerOp::KeyDown(secs) => vec![wk::KEY_BUFFERED, *secs],
            KeyerOp::PlainRun(text) => text.bytes().collect(),
            KeyerOp::MergedRun(pair) => {
                let mut bytes = Vec::with_capacity(pair.len() + 1);
                bytes.push(wk::MERGE_LETTERS);
                bytes.extend(pair.bytes());
                bytes
            }
        }
    }

    /// Does this op put characters in the keyer's send buffer?
    pub fn is_text(&self) -> bool {
        matches!(self, KeyerOp::PlainRun(_) | KeyerOp::MergedRun(_))
    }
}

impl std::fmt::Display for KeyerOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeyerOp::HostOpen => write!(f, "host_open"),
            KeyerOp::HostClose => write!(f, "host_close"),
            KeyerOp::SetSidetone(code) => write!(f, "sidetone(0x{:02x})", code),
            KeyerOp::SetSpeed(wpm) => write!(f, "speed({})", wpm),
            KeyerOp::SetWeight(w) => write!(f, "weight({})", w),
            KeyerOp::SetPttTiming { lead, tail } => write!(f, "ptt_timing({}, {})", lead, tail),
            KeyerOp::PinConfig(bits) => write!(f, "pin_config(0b{:08b})", bits),
            KeyerOp::ClearBuffer => write!(f, "clear_buffer"),
            KeyerOp::SetMode(bits) => write!(f, "mode(0b{:08b})", bits),
            KeyerOp::FirstExtension(ms) => write!(f, "first_extension({})", ms),
            KeyerOp::KeyCompensation(ms) => write!(f, "key_compensation({})", ms),
            KeyerOp::Ptt(on) => write!(f, "ptt({})", if *on { "on" } else { "off" }),
            KeyerOp::KeyDown(secs) => write!(f, "key_down({}s)", secs),
            KeyerOp::PlainRun(text) => write!(f, "send({:?})", text),
            KeyerOp::MergedRun(pair) => write!(f, "merge({:?})", pair),
        }
    }
}
