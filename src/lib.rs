//! winkeyerdaemon: cwdaemon-compatible UDP front end for WinKeyer keyers
//!
//! UDP datagram → CommandParser → WinkeyerEncoder → KeyerOp bytes → serial port

pub mod config;
pub mod core;
pub mod error;
pub mod logging;
pub mod types;

// =============================================================================
// NETWORK
// =============================================================================

/// cwdaemon's well-known UDP port
pub const DEFAULT_PORT: u16 = 6789;

/// Default listen address (loopback only)
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1";

/// Largest datagram we bother reading
pub const MAX_DATAGRAM_LEN: usize = 1024;

// =============================================================================
// SERIAL
// =============================================================================

/// WinKeyer host interface baud rate
pub const WINKEYER_BAUD: u32 = 1200;

/// Firmware versions reported by host-open that we know how to drive
pub const SUPPORTED_FIRMWARE: [u8; 3] = [23, 30, 31];

/// Read timeout while waiting for the host-open version byte
pub const HANDSHAKE_TIMEOUT_MS: u64 = 1000;

/// Read timeout once host mode is open
pub const STATUS_TIMEOUT_MS: u64 = 100;

// =============================================================================
// LEGAL RANGES [cwdaemon side]
// =============================================================================

/// Keying speed bounds (WPM)
pub const SPEED_MIN: u8 = 5;
pub const SPEED_MAX: u8 = 99;

/// Sidetone bounds (Hz); 0 turns sidetone off
pub const TONE_MAX: u16 = 4000;

/// cwdaemon weighting bounds
pub const WEIGHT_MIN: i8 = -50;
pub const WEIGHT_MAX: i8 = 50;

/// Word space in dits: 6 is contest spacing, 7 is standard
pub const WORD_SPACE_CONTEST: u8 = 6;
pub const WORD_SPACE_STANDARD: u8 = 7;

/// Tune (key down) duration bound in seconds
pub const TUNE_MAX_SECS: u8 = 99;

/// cwdaemon TX delay bound (ms)
pub const TX_DELAY_MAX_MS: u8 = 50;

// =============================================================================
// SESSION DEFAULTS
// =============================================================================

/// cwdaemon's default speed
pub const DEFAULT_SPEED: u8 = 24;

/// cwdaemon's default tone
pub const DEFAULT_TONE: u16 = 800;

/// Neutral cwdaemon weighting
pub const DEFAULT_WEIGHT: i8 = 0;

// =============================================================================
// VERSION
// =============================================================================

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
