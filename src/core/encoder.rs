//! WinKeyer encoder: `Command` + `SessionState` → `KeyerOp`s
//!
//! Rules:
//! - settings are emitted only when they change the stored value
//! - PTT is emitted only on a transition
//! - text is split into plain runs and merged prosign runs; a prosign is
//!   always its own merge group
//! - abort discards the pending run without sending it

use crate::core::prosign;
use crate::types::{
    sidetone_code, winkeyer_weight, Command, DropReason, KeyerOp, KeyerProfile, SessionState,
};
use crate::WORD_SPACE_CONTEST;

/// Result of encoding one command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Encoding {
    /// Instructions to write, in order
    pub ops: Vec<KeyerOp>,
    /// Input that was discarded along the way
    pub dropped: Vec<DropReason>,
}

impl Encoding {
    fn drop_once(&mut self, reason: DropReason) {
        if !self.dropped.contains(&reason) {
            self.dropped.push(reason);
        }
    }

    /// Nothing to write and nothing dropped
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty() && self.dropped.is_empty()
    }
}

/// Translates commands for one keyer profile
#[derive(Debug, Clone, Default)]
pub struct WinkeyerEncoder {
    profile: KeyerProfile,
}

impl WinkeyerEncoder {
    pub fn new(profile: KeyerProfile) -> Self {
        Self { profile }
    }

    pub fn profile(&self) -> &KeyerProfile {
        &self.profile
    }

    /// Fresh session for this encoder's profile
    pub fn initial_state(&self) -> SessionState {
        SessionState::from_profile(&self.profile)
    }

    /// Encode one command, updating `state` in place
    pub fn encode(&self, command: &Command, state: &mut SessionState) -> Encoding {
        let mut out = Encoding::default();

        match command {
            Command::SendText(text) => self.encode_text(text, state, &mut out),
            Command::SetSpeed(wpm) => self.set_speed(*wpm, state, &mut out),
            Command::SetTone(hz) => self.set_tone(*hz, state, &mut out),
            Command::SetWeight(w) => self.set_weight(*w, state, &mut out),
            Command::SetWordSpace(n) => self.set_word_space(*n, state, &mut out),
            Command::SetPtt(on) => {
                if state.tx_delay > 0 {
                    out.drop_once(DropReason::D004_PTT_BLOCKED_BY_DELAY);
                } else {
                    self.set_ptt(*on, state, &mut out);
                }
            }
            Command::Abort => {
                out.ops.push(KeyerOp::ClearBuffer);
                state.clear_pending();
            }
            Command::Tune(0) => out.drop_once(DropReason::D004_TUNE_ZERO),
            Command::Tune(secs) => {
                out.ops.push(KeyerOp::ClearBuffer);
                out.ops.push(KeyerOp::KeyDown(*secs));
                state.clear_pending();
            }
            Command::SetTxDelay(ms) => state.tx_delay = *ms,
            Command::Reset => self.reset(state, &mut out),
            Command::EchoWhenDone(text) => state.pending_echo = Some(text.clone()),
            Command::Unknown { reason, .. } => out.drop_once(*reason),
        }

        out
    }

    /// Host-mode setup written once after the handshake
    pub fn startup_ops(&self, state: &SessionState) -> Vec<KeyerOp> {
        let mut ops = Vec::new();

        if state.sidetone_on() {
            ops.push(KeyerOp::SetSidetone(sidetone_code(state.tone)));
        }
        ops.push(KeyerOp::PinConfig(self.profile.pin_config(state.sidetone_on())));
        ops.push(KeyerOp::SetMode(
            self.profile.mode_register(state.word_space == WORD_SPACE_CONTEST),
        ));
        if let Some(ms) = self.profile.first_extension_ms {
            ops.push(KeyerOp::FirstExtension(ms));
        }
        if let Some(ms) = self.profile.key_compensation_ms {
            ops.push(KeyerOp::KeyCompensation(ms));
        }
        if self.profile.ptt_lead_ms > 0 || self.profile.ptt_tail_ms > 0 {
            ops.push(KeyerOp::SetPttTiming {
                lead: self.profile.ptt_lead_ms / 10,
                tail: self.profile.ptt_tail_ms / 10,
            });
        }
        ops.push(KeyerOp::SetSpeed(state.speed));
        ops.push(KeyerOp::SetWeight(winkeyer_weight(state.weight)));

        ops
    }

    /// Final writes before the port is released: stop keying, drop PTT,
    /// leave host mode
    pub fn shutdown_ops(&self, state: &mut SessionState) -> Vec<KeyerOp> {
        state.clear_pending();
        state.ptt_on = false;
        vec![KeyerOp::ClearBuffer, KeyerOp::Ptt(false), KeyerOp::HostClose]
    }

    fn encode_text(&self, text: &str, state: &mut SessionState, out: &mut Encoding) {
        for c in text.chars() {
            if let Some(entry) = prosign::lookup(c) {
                flush_plain(state, out);
                out.ops.push(KeyerOp::MergedRun(entry.expansion.to_string()));
            } else if c == ' ' || c.is_ascii_graphic() {
                state.push_pending(c.to_ascii_uppercase());
            } else {
                // control bytes would reach the keyer as commands
                out.drop_once(DropReason::D005_NON_ASCII_DROPPED);
            }
        }
        flush_plain(state, out);
    }

    fn set_speed(&self, wpm: u8, state: &mut SessionState, out: &mut Encoding) {
        if state.speed != wpm {
            state.speed = wpm;
            out.ops.push(KeyerOp::SetSpeed(wpm));
        }
    }

    fn set_tone(&self, hz: u16, state: &mut SessionState, out: &mut Encoding) {
        if state.tone == hz {
            return;
        }
        let was_on = state.sidetone_on();
        state.tone = hz;

        if hz == 0 {
            out.ops.push(KeyerOp::PinConfig(self.profile.pin_config(false)));
        } else {
            out.ops.push(KeyerOp::SetSidetone(sidetone_code(hz)));
            if !was_on {
                out.ops.push(KeyerOp::PinConfig(self.profile.pin_config(true)));
            }
        }
    }

    fn set_weight(&self, weight: i8, state: &mut SessionState, out: &mut Encoding) {
        if state.weight != weight {
            state.weight = weight;
            out.ops.push(KeyerOp::SetWeight(winkeyer_weight(weight)));
        }
    }

    fn set_word_space(&self, dits: u8, state: &mut SessionState, out: &mut Encoding) {
        if state.word_space != dits {
            state.word_space = dits;
            out.ops.push(KeyerOp::SetMode(
                self.profile.mode_register(dits == WORD_SPACE_CONTEST),
            ));
        }
    }

    fn set_ptt(&self, on: bool, state: &mut SessionState, out: &mut Encoding) {
        if state.ptt_on != on {
            state.ptt_on = on;
            out.ops.push(KeyerOp::Ptt(on));
        }
    }

    fn reset(&self, state: &mut SessionState, out: &mut Encoding) {
        let defaults = self.initial_state();

        self.set_speed(defaults.speed, state, out);
        self.set_tone(defaults.tone, state, out);
        self.set_weight(defaults.weight, state, out);
        self.set_word_space(defaults.word_space, state, out);
        self.set_ptt(false, state, out);
        state.tx_delay = defaults.tx_delay;
    }
}

fn flush_plain(state: &mut SessionState, out: &mut Encoding) {
    if let Some(run) = state.take_pending() {
        out.ops.push(KeyerOp::PlainRun(run));
    }
}
