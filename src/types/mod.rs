//! Core types for winkeyerdaemon

mod command;
mod event;
mod keyer_op;
mod profile;
mod reason;
mod session;
mod status;

pub use command::Command;
pub use event::{DebugEvent, EventKind};
pub use keyer_op::{wk, KeyerOp};
pub use profile::{
    sidetone_code, winkeyer_weight, HangTime, KeyerProfile, KeyingMode, UltimaticPriority,
    SIDETONE_TABLE,
};
pub use reason::DropReason;
pub use session::SessionState;
pub use status::{KeyerByte, KeyerStatus};
