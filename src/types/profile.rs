//! Static keyer hardware setup
//!
//! The profile is fixed at startup from configuration. Session commands
//! never change it; they only read it to rebuild register values such as
//! pin config and mode.

use serde::{Deserialize, Serialize};

use crate::{DEFAULT_SPEED, WEIGHT_MAX, WEIGHT_MIN};

/// Supported sidetone frequencies and their WinKeyer codes, ascending
pub const SIDETONE_TABLE: [(u16, u8); 10] = [
    (400, 0x0A),
    (444, 0x09),
    (500, 0x08),
    (571, 0x07),
    (666, 0x06),
    (800, 0x05),
    (1000, 0x04),
    (1333, 0x03),
    (2000, 0x02),
    (4000, 0x01),
];

/// Paddle keying mode (mode register bits 5:4)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyingMode {
    #[default]
    IambicB,
    IambicA,
    Ultimatic,
    Bug,
}

impl KeyingMode {
    fn bits(self) -> u8 {
        match self {
            KeyingMode::IambicB => 0b00,
            KeyingMode::IambicA => 0b01,
            KeyingMode::Ultimatic => 0b10,
            KeyingMode::Bug => 0b11,
        }
    }
}

/// Ultimatic priority (pin config bits 7:6)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UltimaticPriority {
    #[default]
    Normal,
    Dahs,
    Dits,
}

impl UltimaticPriority {
    fn bits(self) -> u8 {
        match self {
            UltimaticPriority::Normal => 0b00,
            UltimaticPriority::Dahs => 0b01,
            UltimaticPriority::Dits => 0b10,
        }
    }
}

/// PTT hang time for hand-sent code, in dits plus one word space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HangTime {
    #[default]
    One,
    Two,
    Four,
    Eight,
}

impl HangTime {
    /// Parse the dit count used on the command line and in config
    pub fn from_dits(dits: u8) -> Option<Self> {
        match dits {
            1 => Some(HangTime::One),
            2 => Some(HangTime::Two),
            4 => Some(HangTime::Four),
            8 => Some(HangTime::Eight),
            _ => None,
        }
    }

    fn bits(self) -> u8 {
        match self {
            HangTime::One => 0b00,
            HangTime::Two => 0b01,
            HangTime::Four => 0b10,
            HangTime::Eight => 0b11,
        }
    }
}

/// Hardware setup applied once after host open
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyerProfile {
    /// Sidetone at startup; `None` leaves sidetone off
    pub sidetone: Option<u16>,
    pub swap_paddles: bool,
    pub keying_mode: KeyingMode,
    /// 6-dit word space instead of 7
    pub contest_spacing: bool,
    pub autospace: bool,
    pub key1: bool,
    pub key2: bool,
    /// Automatic PTT while keying
    pub ptt_enable: bool,
    pub hang_time: HangTime,
    pub ultimatic_priority: UltimaticPriority,
    /// Swap the KEY1/KEY2 enable bit positions (matches later WK docs)
    pub corrected_key_bits: bool,
    pub first_extension_ms: Option<u8>,
    pub key_compensation_ms: Option<u8>,
    /// PTT lead/tail in ms, multiples of 10 up to 250
    pub ptt_lead_ms: u8,
    pub ptt_tail_ms: u8,
    /// Speed programmed at startup
    pub speed: u8,
}

impl Default for KeyerProfile {
    fn default() -> Self {
        Self {
            sidetone: None,
            swap_paddles: false,
            keying_mode: KeyingMode::IambicB,
            contest_spacing: false,
            autospace: false,
            key1: true,
            key2: false,
            ptt_enable: false,
            hang_time: HangTime::One,
            ultimatic_priority: UltimaticPriority::Normal,
            corrected_key_bits: false,
            first_extension_ms: None,
            key_compensation_ms: None,
            ptt_lead_ms: 0,
            ptt_tail_ms: 0,
            speed: DEFAULT_SPEED,
        }
    }
}

impl KeyerProfile {
    /// Pin config register with the given sidetone state
    pub fn pin_config(&self, sidetone_on: bool) -> u8 {
        let (key1_bit, key2_bit) = if self.corrected_key_bits { (3, 2) } else { (2, 3) };

        (self.ultimatic_priority.bits() << 6)
            | (self.hang_time.bits() << 4)
            | (u8::from(self.key2) << key2_bit)
            | (u8::from(self.key1) << key1_bit)
            | (u8::from(sidetone_on) << 1)
            | u8::from(self.ptt_enable)
    }

    /// Mode register with the given word spacing
    pub fn mode_register(&self, contest_spacing: bool) -> u8 {
        (self.keying_mode.bits() << 4)
            | (u8::from(self.swap_paddles) << 3)
            | (u8::from(self.autospace) << 1)
            | u8::from(contest_spacing)
    }

    /// Tone the session starts with (0 when sidetone is off)
    pub fn initial_tone(&self) -> u16 {
        self.sidetone.unwrap_or(0)
    }

    /// Word space in dits implied by the profile
    pub fn word_space(&self) -> u8 {
        if self.contest_spacing {
            crate::WORD_SPACE_CONTEST
        } else {
            crate::WORD_SPACE_STANDARD
        }
    }
}

/// Nearest WinKeyer sidetone code for a frequency; ties round up
pub fn sidetone_code(freq: u16) -> u8 {
    let (lowest, lowest_code) = SIDETONE_TABLE[0];
    if freq <= lowest {
        return lowest_code;
    }
    for pair in SIDETONE_TABLE.windows(2) {
        let (current, current_code) = pair[0];
        let (next, next_code) = pair[1];
        if freq < next {
            return if freq - current < next - freq {
                current_code
            } else {
                next_code
            };
        }
    }
    SIDETONE_TABLE[SIDETONE_TABLE.len() - 1].1
}

/// Map cwdaemon weighting (-50..=50) onto WinKeyer's 10..=90
pub fn winkeyer_weight(cwdaemon: i8) -> u8 {
    let v = i32::from(cwdaemon.clamp(WEIGHT_MIN, WEIGHT_MAX));
    (v * 80 / 100 + 50) as u8
}
