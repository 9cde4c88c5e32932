//! Session state: what we believe the keyer is currently set to

use serde::Serialize;

use crate::types::KeyerProfile;
use crate::DEFAULT_WEIGHT;

/// Mutable per-daemon state, owned by the daemon loop and passed to the
/// encoder explicitly
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionState {
    /// Speed in WPM
    pub speed: u8,
    /// Sidetone in Hz, 0 = off
    pub tone: u16,
    /// cwdaemon weighting
    pub weight: i8,
    /// Word space in dits
    pub word_space: u8,
    pub ptt_on: bool,
    /// cwdaemon TX delay; non-zero disables manual PTT
    pub tx_delay: u8,
    /// Echo text owed to the client after the next send
    pub pending_echo: Option<String>,
    /// Plain characters not yet handed to the keyer
    pending: String,
}

impl SessionState {
    /// Session defaults for a freshly opened keyer
    pub fn from_profile(profile: &KeyerProfile) -> Self {
        Self {
            speed: profile.speed,
            tone: profile.initial_tone(),
            weight: DEFAULT_WEIGHT,
            word_space: profile.word_space(),
            ptt_on: false,
            tx_delay: 0,
            pending_echo: None,
            pending: String::new(),
        }
    }

    /// Characters waiting in the plain run
    pub fn pending(&self) -> &str {
        &self.pending
    }

    pub fn push_pending(&mut self, c: char) {
        self.pending.push(c);
    }

    /// Take the plain run, leaving the buffer empty
    pub fn take_pending(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.pending))
        }
    }

    /// Discard the plain run without sending it
    pub fn clear_pending(&mut self) {
        self.pending.clear();
    }

    /// Is the sidetone currently on?
    pub fn sidetone_on(&self) -> bool {
        self.tone != 0
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::from_profile(&KeyerProfile::default())
    }
}
