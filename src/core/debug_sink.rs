//! Debug sink: where diagnostic events go when `--debug` is on
//!
//! Observational only. Nothing reported here feeds back into the session
//! or the serial stream.

use std::io::Write;

use tracing::{debug, warn};

use crate::types::DebugEvent;

pub trait DebugSink: Send {
    fn report(&mut self, event: &DebugEvent);
}

impl DebugSink for Box<dyn DebugSink> {
    fn report(&mut self, event: &DebugEvent) {
        (**self).report(event);
    }
}

/// Discards everything (debug off)
#[derive(Debug, Default)]
pub struct NullSink;

impl DebugSink for NullSink {
    fn report(&mut self, _event: &DebugEvent) {}
}

/// Forwards events to the tracing subscriber
#[derive(Debug, Default)]
pub struct TracingSink;

impl DebugSink for TracingSink {
    fn report(&mut self, event: &DebugEvent) {
        debug!(target: "winkeyerdaemon::debug", "{}", event.to_parseable_string());
    }
}

/// Writes one JSON object per line
pub struct JsonSink<W: Write + Send> {
    out: W,
}

impl JsonSink<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> JsonSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> DebugSink for JsonSink<W> {
    fn report(&mut self, event: &DebugEvent) {
        let written = serde_json::to_writer(&mut self.out, event)
            .map_err(std::io::Error::from)
            .and_then(|()| self.out.write_all(b"\n"))
            .and_then(|()| self.out.flush());
        if let Err(e) = written {
            warn!("Debug sink write failed: {}", e);
        }
    }
}

/// Collects events in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    pub events: Vec<DebugEvent>,
}

impl DebugSink for MemorySink {
    fn report(&mut self, event: &DebugEvent) {
        self.events.push(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DropReason, EventKind};

    #[test]
    fn test_json_sink_writes_lines() {
        let mut sink = JsonSink::new(Vec::new());
        sink.report(&DebugEvent::dropped(None, b"\x1bq", DropReason::D002_UNKNOWN_SELECTOR));
        sink.report(&DebugEvent::new(EventKind::Emitted, None, "speed(20)"));

        let out = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["kind"], "dropped");
        assert_eq!(first["reason"], "D002_UNKNOWN_SELECTOR");
        let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second["detail"], "speed(20)");
    }

    #[test]
    fn test_memory_sink_collects() {
        let mut sink = MemorySink::default();
        sink.report(&DebugEvent::new(EventKind::Received, None, "abort"));
        assert_eq!(sink.events.len(), 1);
        assert_eq!(sink.events[0].kind, EventKind::Received);
    }
}
