//! Daemon loop: UDP in, keyer bytes out
//!
//! One task owns the socket, the session and the serial link, so datagrams
//! are handled strictly one after another:
//! - IDLE → PROCESSING: datagram arrives
//! - PROCESSING → IDLE: its bytes have been handed to the link
//!
//! Shutdown is only observed while idle. Whatever ends the loop, a final
//! clear-buffer / PTT off / host close is attempted.

use std::future::Future;
use std::net::SocketAddr;

use tokio::net::{ToSocketAddrs, UdpSocket};
use tracing::{debug, error, info, warn};

use crate::core::encoder::{Encoding, WinkeyerEncoder};
use crate::core::{CommandParser, DebugSink, KeyerLink};
use crate::error::Result;
use crate::types::{Command, DebugEvent, DropReason, EventKind, KeyerByte, SessionState};
use crate::MAX_DATAGRAM_LEN;

/// Where the loop currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopPhase {
    Idle,
    Processing,
}

impl std::fmt::Display for LoopPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoopPhase::Idle => write!(f, "IDLE"),
            LoopPhase::Processing => write!(f, "PROCESSING"),
        }
    }
}

/// cwdaemon front end for one keyer
pub struct Daemon<L: KeyerLink, S: DebugSink> {
    socket: UdpSocket,
    link: L,
    sink: S,
    parser: CommandParser,
    encoder: WinkeyerEncoder,
    session: SessionState,
    accept_remote: bool,
    phase: LoopPhase,
    datagrams: u64,
}

impl<L: KeyerLink, S: DebugSink> Daemon<L, S> {
    /// Bind the UDP socket; the session starts from the encoder's profile
    pub async fn bind<A: ToSocketAddrs>(
        addr: A,
        link: L,
        sink: S,
        encoder: WinkeyerEncoder,
        accept_remote: bool,
    ) -> Result<Self> {
        let socket = UdpSocket::bind(addr).await?;
        let session = encoder.initial_state();
        Ok(Self {
            socket,
            link,
            sink,
            parser: CommandParser::new(),
            encoder,
            session,
            accept_remote,
            phase: LoopPhase::Idle,
            datagrams: 0,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn link(&self) -> &L {
        &self.link
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn phase(&self) -> LoopPhase {
        self.phase
    }

    /// Datagrams accepted so far
    pub fn datagrams(&self) -> u64 {
        self.datagrams
    }

    /// Program the keyer from the profile
    pub fn start(&mut self) -> Result<()> {
        let ops = self.encoder.startup_ops(&self.session);
        debug!(ops = ops.len(), "Writing keyer setup");
        self.link.write_ops(&ops)?;
        self.report_emitted(None, &ops);
        Ok(())
    }

    /// Serve datagrams until `shutdown` resolves or the link fails
    pub async fn run<F>(&mut self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut buf = vec![0u8; MAX_DATAGRAM_LEN];
        info!(addr = %self.local_addr()?, "Listening for cwdaemon datagrams");

        let outcome = loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown requested");
                    break Ok(());
                }
                received = self.socket.recv_from(&mut buf) => {
                    match received {
                        Ok((len, peer)) => {
                            if let Err(e) = self.handle_datagram(&buf[..len], peer).await {
                                error!("Keyer write failed: {}", e);
                                break Err(e);
                            }
                        }
                        // connectionless: a failed receive loses one datagram at most
                        Err(e) => warn!("UDP receive failed: {}", e),
                    }
                }
            }
        };

        let released = self.shutdown();
        if let (Err(_), Err(e)) = (&outcome, &released) {
            warn!("Could not release keyer: {}", e);
        }
        outcome.and(released)
    }

    /// Parse, encode and write one datagram
    pub async fn handle_datagram(&mut self, data: &[u8], peer: SocketAddr) -> Result<Encoding> {
        if !self.accept_remote && !peer.ip().is_loopback() {
            debug!(%peer, "Ignoring datagram from remote host");
            self.sink.report(&DebugEvent::dropped(
                Some(peer),
                data,
                DropReason::D006_REMOTE_REJECTED,
            ));
            return Ok(Encoding::default());
        }

        self.phase = LoopPhase::Processing;
        self.datagrams += 1;

        let command = self.parser.parse(data);
        debug!(%peer, command = command.name(), "Datagram received");
        match &command {
            Command::Unknown { raw, reason } => {
                self.sink.report(&DebugEvent::dropped(Some(peer), raw, *reason));
            }
            other => {
                self.sink
                    .report(&DebugEvent::new(EventKind::Received, Some(peer), format!("{:?}", other)));
            }
        }

        let encoding = self.encoder.encode(&command, &mut self.session);
        if !command.is_unknown() {
            for reason in &encoding.dropped {
                debug!(%peer, reason = reason.code(), "Input dropped");
                self.sink.report(&DebugEvent::dropped(Some(peer), data, *reason));
            }
        }

        let written = self.link.write_ops(&encoding.ops);
        self.phase = LoopPhase::Idle;
        written?;
        self.report_emitted(Some(peer), &encoding.ops);
        self.drain_keyer()?;

        if matches!(command, Command::SendText(_)) {
            if let Some(echo) = self.session.pending_echo.take() {
                self.reply(peer, &echo).await;
            }
        }

        Ok(encoding)
    }

    /// Stop keying and leave host mode
    pub fn shutdown(&mut self) -> Result<()> {
        let ops = self.encoder.shutdown_ops(&mut self.session);
        info!("Releasing keyer");
        self.link.write_ops(&ops)?;
        self.report_emitted(None, &ops);
        Ok(())
    }

    async fn reply(&mut self, peer: SocketAddr, echo: &str) {
        let message = format!("h{}\r\n", echo);
        match self.socket.send_to(message.as_bytes(), peer).await {
            Ok(_) => {
                debug!(%peer, "Echo reply sent");
                self.sink
                    .report(&DebugEvent::new(EventKind::Replied, Some(peer), message.trim_end()));
            }
            Err(e) => warn!(%peer, "Echo reply failed: {}", e),
        }
    }

    fn drain_keyer(&mut self) -> Result<()> {
        for byte in self.link.read_available()? {
            let decoded = KeyerByte::decode(byte);
            debug!("Keyer reported {}", decoded);
            self.sink
                .report(&DebugEvent::new(EventKind::KeyerStatus, None, decoded.to_string()));
        }
        Ok(())
    }

    fn report_emitted(&mut self, peer: Option<SocketAddr>, ops: &[crate::types::KeyerOp]) {
        if ops.is_empty() {
            return;
        }
        let detail = ops.iter().map(|op| op.to_string()).collect::<Vec<_>>().join(" ");
        self.sink.report(&DebugEvent::new(EventKind::Emitted, peer, detail));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::MemorySink;
    use crate::types::{KeyerOp, KeyerProfile};

    #[derive(Default)]
    struct RecordingLink {
        written: Vec<u8>,
        status: Vec<u8>,
        fail: bool,
    }

    impl KeyerLink for RecordingLink {
        fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
            if self.fail {
                return Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "unplugged").into());
            }
            self.written.extend_from_slice(bytes);
            Ok(())
        }

        fn read_available(&mut self) -> Result<Vec<u8>> {
            Ok(std::mem::take(&mut self.status))
        }
    }

    async fn daemon(link: RecordingLink) -> Daemon<RecordingLink, MemorySink> {
        Daemon::bind(
            "127.0.0.1:0",
            link,
            MemorySink::default(),
            WinkeyerEncoder::new(KeyerProfile::default()),
            false,
        )
        .await
        .unwrap()
    }

    fn local_peer() -> SocketAddr {
        "127.0.0.1:40000".parse().unwrap()
    }

    #[tokio::test]
    async fn test_datagram_reaches_link() {
        let mut d = daemon(RecordingLink::default()).await;
        let encoding = d.handle_datagram(b"\x1b230", local_peer()).await.unwrap();

        assert_eq!(encoding.ops, vec![KeyerOp::SetSpeed(30)]);
        assert_eq!(d.link().written, vec![0x02, 30]);
        assert_eq!(d.phase(), LoopPhase::Idle);
        assert_eq!(d.datagrams(), 1);
        assert_eq!(d.session().speed, 30);
    }

    #[tokio::test]
    async fn test_remote_peer_rejected() {
        let mut d = daemon(RecordingLink::default()).await;
        let remote: SocketAddr = "192.0.2.7:6789".parse().unwrap();
        let encoding = d.handle_datagram(b"CQ", remote).await.unwrap();

        assert!(encoding.is_empty());
        assert!(d.link().written.is_empty());
        assert_eq!(d.datagrams(), 0);
        assert_eq!(d.sink().events[0].reason, Some(DropReason::D006_REMOTE_REJECTED));
    }

    #[tokio::test]
    async fn test_malformed_datagram_reported_once() {
        let mut d = daemon(RecordingLink::default()).await;
        d.handle_datagram(b"\x1bq", local_peer()).await.unwrap();

        let dropped: Vec<_> = d
            .sink()
            .events
            .iter()
            .filter(|e| e.kind == EventKind::Dropped)
            .collect();
        assert_eq!(dropped.len(), 1);
        assert_eq!(dropped[0].reason, Some(DropReason::D002_UNKNOWN_SELECTOR));
        assert!(d.link().written.is_empty());
    }

    #[tokio::test]
    async fn test_keyer_bytes_are_reported() {
        let link = RecordingLink {
            status: vec![0xC4, 0x8A],
            ..RecordingLink::default()
        };
        let mut d = daemon(link).await;
        d.handle_datagram(b"E", local_peer()).await.unwrap();

        let status: Vec<_> = d
            .sink()
            .events
            .iter()
            .filter(|e| e.kind == EventKind::KeyerStatus)
            .collect();
        assert_eq!(status.len(), 2);
    }

    #[tokio::test]
    async fn test_write_failure_propagates() {
        let link = RecordingLink {
            fail: true,
            ..RecordingLink::default()
        };
        let mut d = daemon(link).await;
        assert!(d.handle_datagram(b"TEST", local_peer()).await.is_err());
        assert_eq!(d.phase(), LoopPhase::Idle);
    }

    #[tokio::test]
    async fn test_start_and_shutdown_frame_the_session() {
        let mut d = daemon(RecordingLink::default()).await;
        d.start().unwrap();
        let setup_len = d.link().written.len();
        assert!(setup_len > 0);

        d.shutdown().unwrap();
        assert_eq!(&d.link().written[setup_len..], &[0x0A, 0x18, 0x00, 0x00, 0x03]);
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown_signal() {
        let mut d = daemon(RecordingLink::default()).await;
        d.run(async {}).await.unwrap();
        assert!(d.link().written.ends_with(&[0x00, 0x03]));
    }
}
