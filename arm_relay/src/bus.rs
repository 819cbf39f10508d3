//! In-process software bus.
//!
//! One bounded inbound pipe feeds the relay's run loop; any number of
//! producers hold a [`PipeSender`]. Outbound messages leave through
//! [`BusTransport`], which encodes them with a telemetry header, stamps the
//! send time and routes them by kind to the actuator or ground downlink.
//!
//! Producers never block. A full pipe drops the frame and reports
//! [`BusError::PipeFull`].

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use arm_common::msg::{WireMessage, encode_command, encode_telemetry};
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TrySendError, bounded};
use thiserror::Error;
use tracing::warn;

use crate::transport::{Outbound, Transport};

/// Raw bytes of one message.
pub type Frame = Vec<u8>;

/// Bus failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BusError {
    /// Every sender is gone; no further frames can arrive.
    #[error("pipe closed: all senders disconnected")]
    PipeClosed,

    /// The pipe is at depth; the frame was dropped.
    #[error("pipe full ({depth} frames), frame dropped")]
    PipeFull { depth: usize },

    /// The receiving side is gone.
    #[error("downlink disconnected")]
    Disconnected,
}

// ─── Inbound Pipe ───────────────────────────────────────────────────

/// Create the inbound pipe with the given depth.
pub fn pipe(depth: usize) -> (PipeSender, Pipe) {
    let (tx, rx) = bounded(depth);
    (
        PipeSender {
            tx,
            depth,
            sequence: 0,
        },
        Pipe { rx },
    )
}

/// Producer handle. Each clone keeps its own sequence counter.
#[derive(Debug, Clone)]
pub struct PipeSender {
    tx: Sender<Frame>,
    depth: usize,
    sequence: u16,
}

impl PipeSender {
    /// Queue a raw frame without blocking.
    pub fn send_frame(&self, frame: Frame) -> Result<(), BusError> {
        self.tx.try_send(frame).map_err(|e| match e {
            TrySendError::Full(_) => BusError::PipeFull { depth: self.depth },
            TrySendError::Disconnected(_) => BusError::Disconnected,
        })
    }

    /// Encode `msg` with a command header and queue it.
    pub fn send<M: WireMessage>(&mut self, msg: &M) -> Result<(), BusError> {
        let frame = encode_command(msg, self.sequence);
        self.sequence = self.sequence.wrapping_add(1);
        self.send_frame(frame)
    }
}

/// Consumer side, owned by the run loop.
#[derive(Debug)]
pub struct Pipe {
    rx: Receiver<Frame>,
}

impl Pipe {
    /// Block until a frame arrives.
    pub fn receive(&self) -> Result<Frame, BusError> {
        self.rx.recv().map_err(|_| BusError::PipeClosed)
    }

    /// Block for at most `timeout`. `Ok(None)` on timeout.
    pub fn receive_timeout(&self, timeout: Duration) -> Result<Option<Frame>, BusError> {
        match self.rx.recv_timeout(timeout) {
            Ok(frame) => Ok(Some(frame)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(BusError::PipeClosed),
        }
    }

    /// Frames currently queued.
    #[inline]
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

// ─── Outbound Transport ─────────────────────────────────────────────

/// Receiving ends of the two outbound routes.
#[derive(Debug)]
pub struct Downlinks {
    /// Actuator commands, consumed by the actuator subsystem.
    pub actuator: Receiver<Frame>,
    /// Housekeeping telemetry, consumed by the ground.
    pub ground: Receiver<Frame>,
}

/// Microseconds since the Unix epoch.
#[inline]
pub fn now_us() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_micros() as u64)
        .unwrap_or(0)
}

/// Transport that encodes, time-stamps and routes outbound messages.
#[derive(Debug)]
pub struct BusTransport {
    actuator_tx: Sender<Frame>,
    ground_tx: Sender<Frame>,
    actuator_seq: u16,
    ground_seq: u16,
    dropped: u64,
}

impl BusTransport {
    /// Create the transport and its downlinks, each bounded to `depth`.
    pub fn new(depth: usize) -> (Self, Downlinks) {
        let (actuator_tx, actuator) = bounded(depth);
        let (ground_tx, ground) = bounded(depth);
        (
            Self {
                actuator_tx,
                ground_tx,
                actuator_seq: 0,
                ground_seq: 0,
                dropped: 0,
            },
            Downlinks { actuator, ground },
        )
    }

    /// Outbound frames dropped because a downlink was full or gone.
    #[inline]
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    fn push(&mut self, route: Route, frame: Frame) {
        let tx = match route {
            Route::Actuator => &self.actuator_tx,
            Route::Ground => &self.ground_tx,
        };
        if let Err(e) = tx.try_send(frame) {
            self.dropped += 1;
            let reason = match e {
                TrySendError::Full(_) => "full",
                TrySendError::Disconnected(_) => "disconnected",
            };
            warn!(?route, reason, dropped = self.dropped, "outbound frame dropped");
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Route {
    Actuator,
    Ground,
}

impl Transport for BusTransport {
    fn transmit(&mut self, msg: Outbound) {
        let ts = now_us();
        match msg {
            Outbound::ActuatorCommand(cmd) => {
                let frame = encode_telemetry(&cmd, self.actuator_seq, ts);
                self.actuator_seq = self.actuator_seq.wrapping_add(1);
                self.push(Route::Actuator, frame);
            }
            Outbound::Housekeeping(tlm) => {
                let frame = encode_telemetry(&tlm, self.ground_seq, ts);
                self.ground_seq = self.ground_seq.wrapping_add(1);
                self.push(Route::Ground, frame);
            }
        }
    }
}
