//! Reason codes for dropped commands and ignored input
//!
//! Every path that discards client input names one of these, so the debug
//! sink and the log can say exactly why nothing reached the keyer.

use serde::{Deserialize, Serialize};

/// Why a datagram (or part of one) produced no keyer output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(non_camel_case_types)]
pub enum DropReason {
    // =========================================================================
    // D001: Framing
    // =========================================================================
    /// Datagram was empty (or only NUL padding)
    D001_EMPTY_DATAGRAM,
    /// ESC byte with no selector after it
    D001_MISSING_SELECTOR,

    // =========================================================================
    // D002: Selectors
    // =========================================================================
    /// Selector is not part of the cwdaemon protocol
    D002_UNKNOWN_SELECTOR,
    /// cwdaemon selector this bridge does not implement
    D002_UNSUPPORTED_SELECTOR,

    // =========================================================================
    // D003: Arguments
    // =========================================================================
    /// Argument missing or not a number
    D003_BAD_ARGUMENT,
    /// Numeric argument outside the legal range
    D003_OUT_OF_RANGE,

    // =========================================================================
    // D004: Session policy
    // =========================================================================
    /// Manual PTT requested while TX delay is non-zero
    D004_PTT_BLOCKED_BY_DELAY,
    /// Tune for zero seconds
    D004_TUNE_ZERO,

    // =========================================================================
    // D005: Text
    // =========================================================================
    /// Characters outside printable ASCII removed from text
    D005_NON_ASCII_DROPPED,

    // =========================================================================
    // D006: Transport
    // =========================================================================
    /// Sender is not on loopback and remote hosts are not accepted
    D006_REMOTE_REJECTED,
}

impl DropReason {
    /// Get the code string (for logging)
    pub fn code(&self) -> &'static str {
        match self {
            Self::D001_EMPTY_DATAGRAM => "D001_EMPTY_DATAGRAM",
            Self::D001_MISSING_SELECTOR => "D001_MISSING_SELECTOR",
            Self::D002_UNKNOWN_SELECTOR => "D002_UNKNOWN_SELECTOR",
            Self::D002_UNSUPPORTED_SELECTOR => "D002_UNSUPPORTED_SELECTOR",
            Self::D003_BAD_ARGUMENT => "D003_BAD_ARGUMENT",
            Self::D003_OUT_OF_RANGE => "D003_OUT_OF_RANGE",
            Self::D004_PTT_BLOCKED_BY_DELAY => "D004_PTT_BLOCKED_BY_DELAY",
            Self::D004_TUNE_ZERO => "D004_TUNE_ZERO",
            Self::D005_NON_ASCII_DROPPED => "D005_NON_ASCII_DROPPED",
            Self::D006_REMOTE_REJECTED => "D006_REMOTE_REJECTED",
        }
    }

    /// Get human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Self::D001_EMPTY_DATAGRAM => "Empty datagram",
            Self::D001_MISSING_SELECTOR => "Escape without selector",
            Self::D002_UNKNOWN_SELECTOR => "Unknown escape selector",
            Self::D002_UNSUPPORTED_SELECTOR => "cwdaemon command not implemented",
            Self::D003_BAD_ARGUMENT => "Argument missing or not numeric",
            Self::D003_OUT_OF_RANGE => "Argument out of range",
            Self::D004_PTT_BLOCKED_BY_DELAY => "Manual PTT disabled while TX delay is set",
            Self::D004_TUNE_ZERO => "Tune for 0 seconds ignored",
            Self::D005_NON_ASCII_DROPPED => "Non-printable characters removed",
            Self::D006_REMOTE_REJECTED => "Remote sender rejected",
        }
    }
}

impl std::fmt::Display for DropReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code(), self.description())
    }
}
