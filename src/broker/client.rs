//! STOMP broker client for the particle topic
//!
//! Runs the session in a background thread with its own tokio runtime.
//! Connects, subscribes, then forwards each decoded batch into the
//! hand-off slot until the stream ends or shutdown is requested. Shutdown
//! removes the subscription and disconnects before closing the socket.

use std::fmt;
use std::io;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::watch;
use tracing::{debug, error, info, trace, warn};

use super::frame::{FrameDecoder, FrameError, StompFrame};
use crate::config::{PARTICLE_TOPIC, SUBSCRIPTION_ID};
use crate::feed::{parse_batch, CloseFlag, PushResult, SlotSender};

/// Broker connection state, shared with the GUI header.
#[derive(Clone, Debug)]
pub enum SessionState {
    Connecting,
    Connected,
    Disconnected,
    Error(String),
}

/// Session failure.
#[derive(Debug)]
pub enum BrokerError {
    Io(io::Error),
    Frame(FrameError),
    /// CONNECT was not answered with CONNECTED.
    Handshake(String),
    /// Broker sent an ERROR frame mid-session.
    Server(String),
    /// Peer closed the connection.
    ConnectionClosed,
}

impl fmt::Display for BrokerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BrokerError::Io(e) => write!(f, "io error: {}", e),
            BrokerError::Frame(e) => write!(f, "bad frame: {}", e),
            BrokerError::Handshake(msg) => write!(f, "handshake failed: {}", msg),
            BrokerError::Server(msg) => write!(f, "broker error: {}", msg),
            BrokerError::ConnectionClosed => write!(f, "connection closed"),
        }
    }
}

impl std::error::Error for BrokerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BrokerError::Io(e) => Some(e),
            BrokerError::Frame(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for BrokerError {
    fn from(e: io::Error) -> Self {
        BrokerError::Io(e)
    }
}

impl From<FrameError> for BrokerError {
    fn from(e: FrameError) -> Self {
        BrokerError::Frame(e)
    }
}

/// Broker client that runs in a background thread.
pub struct BrokerClient {
    state: Arc<Mutex<SessionState>>,
    shutdown: watch::Sender<bool>,
    handle: Option<JoinHandle<()>>,
}

impl BrokerClient {
    /// Connect and subscribe in the background.
    ///
    /// Spawns a thread with a tokio runtime to own the network session.
    /// Decoded frames land in `slot`; `close` mirrors the viewer's close
    /// signal so the session also winds down when the GUI is going away.
    pub fn connect(addr: &str, slot: SlotSender, close: CloseFlag) -> Self {
        let state = Arc::new(Mutex::new(SessionState::Connecting));
        let (shutdown, shutdown_rx) = watch::channel(false);

        let addr = addr.to_string();
        let state_clone = state.clone();

        let handle = std::thread::spawn(move || {
            let rt = match tokio::runtime::Runtime::new() {
                Ok(rt) => rt,
                Err(e) => {
                    error!(error = %e, "Failed to create tokio runtime");
                    *state_clone.lock() = SessionState::Error(e.to_string());
                    return;
                }
            };
            rt.block_on(async move {
                run_session(&addr, slot, state_clone, close, shutdown_rx).await;
            });
        });

        Self { state, shutdown, handle: Some(handle) }
    }

    /// Shared connection state for display.
    pub fn state(&self) -> Arc<Mutex<SessionState>> {
        self.state.clone()
    }

    /// Request an orderly shutdown (UNSUBSCRIBE, then DISCONNECT) and wait
    /// for the session thread to finish. Ending the session drops the
    /// slot's send end, which releases a consumer blocked on it.
    pub fn shutdown(mut self) {
        let _ = self.shutdown.send(true);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

#[derive(Default)]
struct SessionStats {
    messages: u64,
    interval: u64,
    delivered: u64,
    dropped: u64,
    decode_failures: u64,
}

async fn run_session(
    addr: &str,
    slot: SlotSender,
    state: Arc<Mutex<SessionState>>,
    close: CloseFlag,
    mut shutdown: watch::Receiver<bool>,
) {
    info!(addr = %addr, "Connecting to broker");

    let mut session = match Session::connect(addr).await {
        Ok(session) => {
            info!("Broker connected");
            *state.lock() = SessionState::Connected;
            session
        }
        Err(e) => {
            error!(error = %e, "Failed to connect");
            *state.lock() = SessionState::Error(e.to_string());
            return;
        }
    };

    if let Err(e) = session.subscribe(PARTICLE_TOPIC, SUBSCRIPTION_ID).await {
        error!(error = %e, "Failed to subscribe");
        *state.lock() = SessionState::Error(e.to_string());
        return;
    }
    info!(topic = PARTICLE_TOPIC, id = SUBSCRIPTION_ID, "Subscribed, waiting for messages...");

    let mut stats = SessionStats::default();
    let mut last_stats = Instant::now();
    let mut poll = tokio::time::interval(Duration::from_secs(1));

    loop {
        let incoming = tokio::select! {
            frame = session.next_frame() => frame,
            _ = poll.tick() => {
                if close.is_set() {
                    break;
                }
                if last_stats.elapsed() >= Duration::from_secs(5) {
                    let per_sec = stats.interval as f64 / last_stats.elapsed().as_secs_f64();
                    info!(
                        messages = stats.messages,
                        "/sec" = format!("{:.1}", per_sec),
                        frames = stats.delivered,
                        dropped = stats.dropped,
                        decode_failures = stats.decode_failures,
                        "stats"
                    );
                    stats.interval = 0;
                    last_stats = Instant::now();
                }
                continue;
            }
            _ = shutdown.changed() => break,
        };

        match incoming {
            Ok(frame) => {
                match handle_frame(&mut session, frame, &slot, &mut stats).await {
                    Ok(true) => {}
                    Ok(false) => break,
                    Err(e) => {
                        error!(error = %e, "Broker session error");
                        *state.lock() = SessionState::Error(e.to_string());
                        return;
                    }
                }
                if close.is_set() {
                    break;
                }
            }
            Err(BrokerError::ConnectionClosed) => {
                warn!("Broker closed the connection");
                *state.lock() = SessionState::Disconnected;
                return;
            }
            Err(e) => {
                error!(error = %e, "Broker session error");
                *state.lock() = SessionState::Error(e.to_string());
                return;
            }
        }
    }

    debug!("Closing broker session");
    session.close(SUBSCRIPTION_ID).await;
    *state.lock() = SessionState::Disconnected;
}

/// Handle one inbound frame. `Ok(false)` means the frame consumer is gone
/// and the session should wind down.
async fn handle_frame(
    session: &mut Session,
    frame: StompFrame,
    slot: &SlotSender,
    stats: &mut SessionStats,
) -> Result<bool, BrokerError> {
    match frame.command.as_str() {
        "MESSAGE" => {
            stats.messages += 1;
            stats.interval += 1;
            match parse_batch(&frame.body) {
                Ok(scatter) => {
                    trace!(particles = scatter.len(), "Decoded batch");
                    match slot.push(scatter) {
                        PushResult::Stored => stats.delivered += 1,
                        PushResult::Dropped => {
                            stats.dropped += 1;
                            trace!("Hand-off slot occupied, frame dropped");
                        }
                        PushResult::Closed => {
                            info!("Frame consumer gone");
                            return Ok(false);
                        }
                    }
                }
                Err(e) => {
                    stats.decode_failures += 1;
                    warn!(error = %e, "Failed to decode particle batch");
                }
            }
            // client-individual subscription: ack every handled message,
            // decode failures included.
            if let Some(ack) = frame.header("ack") {
                session.ack(ack).await?;
            }
            Ok(true)
        }
        "ERROR" => {
            let mut message = frame.header("message").unwrap_or("no message header").to_string();
            if !frame.body.is_empty() {
                message = format!("{}: {}", message, String::from_utf8_lossy(&frame.body));
            }
            Err(BrokerError::Server(message))
        }
        "RECEIPT" => {
            trace!(receipt = ?frame.header("receipt-id"), "Receipt");
            Ok(true)
        }
        other => {
            trace!(command = %other, "Ignoring frame");
            Ok(true)
        }
    }
}

/// One live STOMP session over TCP.
struct Session {
    read: OwnedReadHalf,
    write: OwnedWriteHalf,
    decoder: FrameDecoder,
}

impl Session {
    /// TCP connect plus the CONNECT/CONNECTED handshake.
    async fn connect(addr: &str) -> Result<Self, BrokerError> {
        let stream = TcpStream::connect(addr).await?;
        let (read, write) = stream.into_split();
        let mut session = Self { read, write, decoder: FrameDecoder::new() };

        let host = addr.split(':').next().unwrap_or(addr);
        session
            .send(
                StompFrame::new("CONNECT")
                    .with_header("accept-version", "1.2")
                    .with_header("host", host)
                    .with_header("heart-beat", "0,0"),
            )
            .await?;

        let reply = session.next_frame().await?;
        match reply.command.as_str() {
            "CONNECTED" => {
                debug!(version = ?reply.header("version"), "Broker handshake complete");
                Ok(session)
            }
            "ERROR" => Err(BrokerError::Handshake(
                reply.header("message").unwrap_or("broker refused connection").to_string(),
            )),
            other => Err(BrokerError::Handshake(format!("unexpected {} frame", other))),
        }
    }

    async fn subscribe(&mut self, destination: &str, id: &str) -> Result<(), BrokerError> {
        self.send(
            StompFrame::new("SUBSCRIBE")
                .with_header("destination", destination)
                .with_header("id", id)
                .with_header("ack", "client-individual"),
        )
        .await
    }

    async fn ack(&mut self, id: &str) -> Result<(), BrokerError> {
        self.send(StompFrame::new("ACK").with_header("id", id)).await
    }

    async fn send(&mut self, frame: StompFrame) -> Result<(), BrokerError> {
        self.write.write_all(&frame.encode()).await?;
        Ok(())
    }

    /// Read until the decoder yields a complete frame. Cancel-safe:
    /// partial bytes stay buffered in the decoder between polls.
    async fn next_frame(&mut self) -> Result<StompFrame, BrokerError> {
        loop {
            if let Some(frame) = self.decoder.next_frame()? {
                return Ok(frame);
            }
            let mut chunk = [0u8; 4096];
            let n = self.read.read(&mut chunk).await?;
            if n == 0 {
                return Err(BrokerError::ConnectionClosed);
            }
            self.decoder.feed(&chunk[..n]);
        }
    }

    /// Orderly teardown: remove the subscription, then DISCONNECT. Best
    /// effort; the socket closes on drop either way.
    async fn close(mut self, sub_id: &str) {
        if let Err(e) = self.send(StompFrame::new("UNSUBSCRIBE").with_header("id", sub_id)).await {
            debug!(error = %e, "Unsubscribe failed");
            return;
        }
        if let Err(e) = self.send(StompFrame::new("DISCONNECT")).await {
            debug!(error = %e, "Disconnect failed");
        }
    }
}
