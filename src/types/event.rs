//! Diagnostic events for the debug sink

use std::net::SocketAddr;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::types::DropReason;

/// What happened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// Datagram decoded
    Received,
    /// Input discarded (see reason)
    Dropped,
    /// Bytes written to the keyer
    Emitted,
    /// Byte read back from the keyer
    KeyerStatus,
    /// Echo reply sent to a client
    Replied,
}

/// One diagnostic event
#[derive(Debug, Clone, Serialize)]
pub struct DebugEvent {
    pub timestamp: DateTime<Utc>,
    pub kind: EventKind,
    /// Client that sent the datagram, if any
    pub peer: Option<SocketAddr>,
    pub detail: String,
    pub reason: Option<DropReason>,
}

impl DebugEvent {
    pub fn new(kind: EventKind, peer: Option<SocketAddr>, detail: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            kind,
            peer,
            detail: detail.into(),
            reason: None,
        }
    }

    /// Input discarded for `reason`; `raw` is shown escaped
    pub fn dropped(peer: Option<SocketAddr>, raw: &[u8], reason: DropReason) -> Self {
        Self {
            reason: Some(reason),
            ..Self::new(EventKind::Dropped, peer, escape_bytes(raw))
        }
    }

    /// Format for log lines
    pub fn to_parseable_string(&self) -> String {
        let peer = self
            .peer
            .map(|p| p.to_string())
            .unwrap_or_else(|| "-".to_string());
        match self.reason {
            Some(reason) => format!(
                "{:?} | peer={} | {} | reason={}",
                self.kind,
                peer,
                self.detail,
                reason.code()
            ),
            None => format!("{:?} | peer={} | {}", self.kind, peer, self.detail),
        }
    }
}

/// Printable rendering of raw datagram bytes
pub fn escape_bytes(raw: &[u8]) -> String {
    raw.iter().flat_map(|b| std::ascii::escape_default(*b)).map(char::from).collect()
}
