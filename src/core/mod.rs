//! Core modules for the WinKeyer daemon

pub mod prosign;
pub mod parser;
pub mod encoder;
pub mod serial;
pub mod debug_sink;
pub mod daemon;

pub use prosign::{lookup as lookup_prosign, ProsignEntry, PROSIGNS};
pub use parser::CommandParser;
pub use encoder::{Encoding, WinkeyerEncoder};
pub use serial::{host_open, KeyerLink, SerialKeyer};
pub use debug_sink::{DebugSink, JsonSink, MemorySink, NullSink, TracingSink};
pub use daemon::{Daemon, LoopPhase};
