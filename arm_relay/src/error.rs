//! Rejection taxonomy for inbound messages.
//!
//! None of these is fatal. By the time [`RelayApp::process`](crate::dispatch::RelayApp::process)
//! returns one, the counters and the diagnostic event have already been applied;
//! the caller only logs it and moves on to the next message.

use thiserror::Error;

use crate::events::EventId;

/// Why an inbound message was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RelayError {
    /// Recognized kind, wrong total length.
    #[error(
        "Invalid Msg length: ID = 0x{msg_id:04X}, CC = {fcn_code}, Len = {actual}, Expected = {expected}"
    )]
    LengthMismatch {
        msg_id: u16,
        fcn_code: u8,
        actual: usize,
        expected: usize,
    },

    /// Ground command with a function code outside the known set.
    #[error("Invalid ground command code: CC = {fcn_code}")]
    UnknownCommandCode { fcn_code: u8 },

    /// Message id outside the closed set this app subscribes to.
    #[error("invalid command packet, MID = 0x{msg_id:04X}")]
    InvalidMessageKind { msg_id: u16 },
}

impl RelayError {
    /// Whether this rejection advances the ErrorCounter.
    ///
    /// Length mismatches and unknown command codes count; messages of an
    /// unrecognized kind never do.
    #[inline]
    pub const fn counts_as_error(&self) -> bool {
        matches!(
            self,
            Self::LengthMismatch { .. } | Self::UnknownCommandCode { .. }
        )
    }

    /// Event reported for this rejection.
    #[inline]
    pub const fn event_id(&self) -> EventId {
        match self {
            Self::LengthMismatch { .. } => EventId::LenErr,
            Self::UnknownCommandCode { .. } => EventId::CommandErr,
            Self::InvalidMessageKind { .. } => EventId::InvalidMsgId,
        }
    }
}
