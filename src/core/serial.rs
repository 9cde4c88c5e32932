//! Serial transport to the keyer
//!
//! `KeyerLink` is the seam the daemon writes through. `SerialKeyer` is the
//! real device; tests plug in an in-memory link.

use std::io::{ErrorKind, Read, Write};
use std::time::Duration;

use serialport::{ClearBuffer, DataBits, FlowControl, Parity, SerialPort, StopBits};
use tracing::{debug, info};

use crate::error::{DaemonError, Result};
use crate::types::KeyerOp;
use crate::{HANDSHAKE_TIMEOUT_MS, STATUS_TIMEOUT_MS, SUPPORTED_FIRMWARE};

/// Byte transport to a WinKeyer
pub trait KeyerLink: Send {
    /// Write every byte or fail
    fn write_all(&mut self, bytes: &[u8]) -> Result<()>;

    /// Bytes the keyer has sent since the last call, without blocking
    fn read_available(&mut self) -> Result<Vec<u8>> {
        Ok(Vec::new())
    }

    /// Write a list of ops as one contiguous buffer
    fn write_ops(&mut self, ops: &[KeyerOp]) -> Result<()> {
        if ops.is_empty() {
            return Ok(());
        }
        let bytes: Vec<u8> = ops.iter().flat_map(KeyerOp::to_bytes).collect();
        self.write_all(&bytes)
    }
}

/// A WinKeyer on a serial port, in host mode
pub struct SerialKeyer {
    port: Box<dyn SerialPort>,
    firmware: u8,
}

impl SerialKeyer {
    /// Open the device and run the host-open handshake
    pub fn open(path: &str, baud: u32) -> Result<Self> {
        info!(device = path, baud, "Opening keyer");
        let mut port = serialport::new(path, baud)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::Two)
            .flow_control(FlowControl::None)
            .timeout(Duration::from_millis(HANDSHAKE_TIMEOUT_MS))
            .open()?;

        // leftover host-close from a previous session must not be read as
        // the version byte
        port.write_all(&KeyerOp::HostClose.to_bytes())?;
        port.flush()?;
        port.clear(ClearBuffer::Input)?;

        let firmware = host_open(&mut *port)?;
        port.set_timeout(Duration::from_millis(STATUS_TIMEOUT_MS))?;
        info!(firmware, "Keyer in host mode");

        Ok(Self { port, firmware })
    }

    /// Firmware version reported by host open
    pub fn firmware(&self) -> u8 {
        self.firmware
    }
}

impl KeyerLink for SerialKeyer {
    fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        self.port.write_all(bytes)?;
        self.port.flush()?;
        Ok(())
    }

    fn read_available(&mut self) -> Result<Vec<u8>> {
        let waiting = self.port.bytes_to_read()? as usize;
        if waiting == 0 {
            return Ok(Vec::new());
        }
        let mut buf = vec![0u8; waiting];
        self.port.read_exact(&mut buf)?;
        Ok(buf)
    }
}

/// Send host open and check the version byte the keyer answers with
pub fn host_open<P: Read + Write + ?Sized>(port: &mut P) -> Result<u8> {
    port.write_all(&KeyerOp::HostOpen.to_bytes())?;
    port.flush()?;

    let mut version = [0u8; 1];
    match port.read_exact(&mut version) {
        Ok(()) => {}
        Err(e) if matches!(e.kind(), ErrorKind::TimedOut | ErrorKind::UnexpectedEof) => {
            return Err(DaemonError::Handshake(format!("no version byte ({})", e)));
        }
        Err(e) => return Err(e.into()),
    }

    let version = version[0];
    debug!(version, "host_open returned");
    if SUPPORTED_FIRMWARE.contains(&version) {
        Ok(version)
    } else {
        Err(DaemonError::UnsupportedFirmware(version))
    }
}
