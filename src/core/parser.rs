//! Command parser: one cwdaemon datagram in, one `Command` out
//!
//! Escape commands are `ESC <selector> <argument>`. Anything else is text.
//! Arguments are validated here and rejected (never clamped): a bad value
//! becomes `Command::Unknown` so the session is left untouched.

use lazy_static::lazy_static;
use regex::Regex;

use crate::types::{Command, DropReason};
use crate::{
    SPEED_MAX, SPEED_MIN, TONE_MAX, TUNE_MAX_SECS, TX_DELAY_MAX_MS, WEIGHT_MAX, WEIGHT_MIN,
    WORD_SPACE_CONTEST, WORD_SPACE_STANDARD,
};

/// Escape byte that introduces a cwdaemon command
pub const ESC: u8 = 0x1B;

lazy_static! {
    /// Optional sign, then up to five digits
    static ref RE_NUMERIC: Regex = Regex::new(r"^[+-]?[0-9]{1,5}$").unwrap();

    /// PTT argument is a single 0 or 1
    static ref RE_SWITCH: Regex = Regex::new(r"^[01]$").unwrap();
}

/// Stateless parser for cwdaemon datagrams
#[derive(Debug, Default)]
pub struct CommandParser;

impl CommandParser {
    pub fn new() -> Self {
        Self
    }

    /// Decode one datagram; never fails
    pub fn parse(&self, datagram: &[u8]) -> Command {
        // Some clients pad datagrams with NULs
        let payload = match datagram.iter().position(|&b| b == 0) {
            Some(end) => &datagram[..end],
            None => datagram,
        };

        match payload.first() {
            None => Command::unknown(datagram, DropReason::D001_EMPTY_DATAGRAM),
            Some(&ESC) => self.parse_escape(payload),
            Some(_) => Command::SendText(strip_line_ending(payload)),
        }
    }

    fn parse_escape(&self, payload: &[u8]) -> Command {
        let Some(&selector) = payload.get(1) else {
            return Command::unknown(payload, DropReason::D001_MISSING_SELECTOR);
        };
        let arg = String::from_utf8_lossy(&payload[2..]);
        let arg = arg.trim();

        let ranged = |min: i64, max: i64| -> Result<i64, Command> {
            if !RE_NUMERIC.is_match(arg) {
                return Err(Command::unknown(payload, DropReason::D003_BAD_ARGUMENT));
            }
            match arg.parse::<i64>() {
                Ok(v) if (min..=max).contains(&v) => Ok(v),
                Ok(_) => Err(Command::unknown(payload, DropReason::D003_OUT_OF_RANGE)),
                Err(_) => Err(Command::unknown(payload, DropReason::D003_BAD_ARGUMENT)),
            }
        };

        let parsed = match selector {
            b'0' => Ok(Command::Reset),
            b'2' => ranged(i64::from(SPEED_MIN), i64::from(SPEED_MAX))
                .map(|v| Command::SetSpeed(v as u8)),
            b'3' => ranged(0, i64::from(TONE_MAX)).map(|v| Command::SetTone(v as u16)),
            b'4' => Ok(Command::Abort),
            b'6' => ranged(i64::from(WORD_SPACE_CONTEST), i64::from(WORD_SPACE_STANDARD))
                .map(|v| Command::SetWordSpace(v as u8)),
            b'7' => ranged(i64::from(WEIGHT_MIN), i64::from(WEIGHT_MAX))
                .map(|v| Command::SetWeight(v as i8)),
            b'a' => {
                if RE_SWITCH.is_match(arg) {
                    Ok(Command::SetPtt(arg == "1"))
                } else {
                    Err(Command::unknown(payload, DropReason::D003_BAD_ARGUMENT))
                }
            }
            b'c' => ranged(0, i64::from(TUNE_MAX_SECS)).map(|v| Command::Tune(v as u8)),
            b'd' => ranged(0, i64::from(TX_DELAY_MAX_MS)).map(|v| Command::SetTxDelay(v as u8)),
            b'h' => Ok(Command::EchoWhenDone(strip_line_ending(&payload[2..]))),
            // exit, keying device, obsolete, ssb, band, sound system, volume
            b'5' | b'8' | b'9' | b'b' | b'e' | b'f' | b'g' => Err(Command::unknown(
                payload,
                DropReason::D002_UNSUPPORTED_SELECTOR,
            )),
            _ => Err(Command::unknown(payload, DropReason::D002_UNKNOWN_SELECTOR)),
        };

        parsed.unwrap_or_else(|unknown| unknown)
    }
}

/// Decode text, dropping trailing CR/LF/tab but keeping trailing spaces
fn strip_line_ending(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .trim_end_matches(|c: char| c.is_whitespace() && c != ' ')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(bytes: &[u8]) -> Command {
        CommandParser::new().parse(bytes)
    }

    fn reason(cmd: &Command) -> Option<DropReason> {
        match cmd {
            Command::Unknown { reason, .. } => Some(*reason),
            _ => None,
        }
    }

    #[test]
    fn test_plain_text() {
        assert_eq!(parse(b"cq test"), Command::SendText("cq test".into()));
    }

    #[test]
    fn test_text_keeps_prosign_triggers() {
        assert_eq!(parse(b"DE*"), Command::SendText("DE*".into()));
    }

    #[test]
    fn test_text_strips_line_ending_only() {
        assert_eq!(parse(b"TEST \r\n"), Command::SendText("TEST ".into()));
        assert_eq!(parse(b"TEST\t"), Command::SendText("TEST".into()));
    }

    #[test]
    fn test_nul_padding_truncated() {
        assert_eq!(parse(b"599\0\0\0garbage"), Command::SendText("599".into()));
        assert_eq!(parse(b"\x1b225\0\0"), Command::SetSpeed(25));
    }

    #[test]
    fn test_empty_datagram() {
        assert_eq!(reason(&parse(b"")), Some(DropReason::D001_EMPTY_DATAGRAM));
        assert_eq!(reason(&parse(b"\0\0")), Some(DropReason::D001_EMPTY_DATAGRAM));
    }

    #[test]
    fn test_escape_without_selector() {
        assert_eq!(reason(&parse(b"\x1b")), Some(DropReason::D001_MISSING_SELECTOR));
    }

    #[test]
    fn test_speed() {
        assert_eq!(parse(b"\x1b225"), Command::SetSpeed(25));
        assert_eq!(parse(b"\x1b25"), Command::SetSpeed(5));
        assert_eq!(parse(b"\x1b299"), Command::SetSpeed(99));
        assert_eq!(parse(b"\x1b2 30\r\n"), Command::SetSpeed(30));
    }

    #[test]
    fn test_speed_out_of_range_rejected() {
        assert_eq!(reason(&parse(b"\x1b24")), Some(DropReason::D003_OUT_OF_RANGE));
        assert_eq!(reason(&parse(b"\x1b2100")), Some(DropReason::D003_OUT_OF_RANGE));
        assert_eq!(reason(&parse(b"\x1b2-5")), Some(DropReason::D003_OUT_OF_RANGE));
    }

    #[test]
    fn test_speed_bad_argument() {
        assert_eq!(reason(&parse(b"\x1b2")), Some(DropReason::D003_BAD_ARGUMENT));
        assert_eq!(reason(&parse(b"\x1b2fast")), Some(DropReason::D003_BAD_ARGUMENT));
        assert_eq!(reason(&parse(b"\x1b2999999")), Some(DropReason::D003_BAD_ARGUMENT));
    }

    #[test]
    fn test_tone() {
        assert_eq!(parse(b"\x1b3800"), Command::SetTone(800));
        assert_eq!(parse(b"\x1b30"), Command::SetTone(0));
        assert_eq!(reason(&parse(b"\x1b34001")), Some(DropReason::D003_OUT_OF_RANGE));
    }

    #[test]
    fn test_abort_and_reset() {
        assert_eq!(parse(b"\x1b4"), Command::Abort);
        assert_eq!(parse(b"\x1b0"), Command::Reset);
    }

    #[test]
    fn test_word_space() {
        assert_eq!(parse(b"\x1b66"), Command::SetWordSpace(6));
        assert_eq!(parse(b"\x1b67"), Command::SetWordSpace(7));
        assert_eq!(reason(&parse(b"\x1b68")), Some(DropReason::D003_OUT_OF_RANGE));
    }

    #[test]
    fn test_weight() {
        assert_eq!(parse(b"\x1b7-50"), Command::SetWeight(-50));
        assert_eq!(parse(b"\x1b7+10"), Command::SetWeight(10));
        assert_eq!(reason(&parse(b"\x1b751")), Some(DropReason::D003_OUT_OF_RANGE));
    }

    #[test]
    fn test_ptt() {
        assert_eq!(parse(b"\x1ba1"), Command::SetPtt(true));
        assert_eq!(parse(b"\x1ba0"), Command::SetPtt(false));
        assert_eq!(reason(&parse(b"\x1ba2")), Some(DropReason::D003_BAD_ARGUMENT));
        assert_eq!(reason(&parse(b"\x1ba")), Some(DropReason::D003_BAD_ARGUMENT));
    }

    #[test]
    fn test_tune_and_delay() {
        assert_eq!(parse(b"\x1bc5"), Command::Tune(5));
        assert_eq!(reason(&parse(b"\x1bc100")), Some(DropReason::D003_OUT_OF_RANGE));
        assert_eq!(parse(b"\x1bd20"), Command::SetTxDelay(20));
        assert_eq!(reason(&parse(b"\x1bd51")), Some(DropReason::D003_OUT_OF_RANGE));
    }

    #[test]
    fn test_echo_request() {
        assert_eq!(parse(b"\x1bhdone\r\n"), Command::EchoWhenDone("done".into()));
    }

    #[test]
    fn test_unsupported_selectors() {
        for sel in [b'5', b'8', b'9', b'b', b'e', b'f', b'g'] {
            let cmd = parse(&[ESC, sel, b'1']);
            assert_eq!(reason(&cmd), Some(DropReason::D002_UNSUPPORTED_SELECTOR), "{}", sel as char);
        }
    }

    #[test]
    fn test_unknown_selector_keeps_raw() {
        let cmd = parse(b"\x1bz12");
        assert_eq!(
            cmd,
            Command::Unknown {
                raw: b"\x1bz12".to_vec(),
                reason: DropReason::D002_UNKNOWN_SELECTOR,
            }
        );
    }

    #[test]
    fn test_invalid_utf8_never_panics() {
        assert!(matches!(parse(&[0xFF, 0xFE, b'A']), Command::SendText(_)));
        assert!(parse(&[ESC, b'2', 0xFF]).is_unknown());
        assert!(parse(&[ESC, 0xFF]).is_unknown());
    }
}
