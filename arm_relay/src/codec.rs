//! Inbound message validator: raw frame → typed [`Inbound`].
//!
//! Classifies a frame by message id (and function code for ground commands),
//! then checks that its total length equals the fixed length of that kind.
//! Payload values are not range-checked.
//!
//! This module is pure. Counting and event reporting for rejections is applied
//! by the dispatcher, which is the only caller.

use arm_common::consts::{
    MOVE_CC, NOOP_CC, RELAY_ACTUATOR_STATE_MID, RELAY_CMD_MID, RELAY_HR_TICK_MID,
    RELAY_SEND_HK_MID, SET_JOINTS_CC,
};
use arm_common::msg::{
    ActuatorReport, CMD_HEADER_LEN, CmdHeader, HrTick, MoveCmd, NoopCmd, SendHkCmd, SetJointsCmd,
    WireMessage, decode_command, peek_msg_id,
};

use crate::error::RelayError;

/// Message kinds the relay subscribes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MsgKind {
    GroundCommand,
    HousekeepingRequest,
    ActuatorReport,
    HighRateTick,
}

impl MsgKind {
    #[inline]
    pub const fn from_msg_id(msg_id: u16) -> Option<Self> {
        match msg_id {
            RELAY_CMD_MID => Some(Self::GroundCommand),
            RELAY_SEND_HK_MID => Some(Self::HousekeepingRequest),
            RELAY_ACTUATOR_STATE_MID => Some(Self::ActuatorReport),
            RELAY_HR_TICK_MID => Some(Self::HighRateTick),
            _ => None,
        }
    }
}

/// A validated inbound message.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Inbound {
    Noop,
    Move(MoveCmd),
    SetJoints(SetJointsCmd),
    ActuatorReport(ActuatorReport),
    HousekeepingRequest,
    Tick,
}

/// Compare a frame's actual length against the expected length of its kind.
#[inline]
pub fn verify_length(
    header: &CmdHeader,
    actual: usize,
    expected: usize,
) -> Result<(), RelayError> {
    if actual == expected {
        Ok(())
    } else {
        Err(RelayError::LengthMismatch {
            msg_id: header.msg_id,
            fcn_code: header.fcn_code,
            actual,
            expected,
        })
    }
}

/// Classify and validate one frame.
pub fn decode(frame: &[u8]) -> Result<Inbound, RelayError> {
    let Some(header) = CmdHeader::parse(frame) else {
        return Err(RelayError::LengthMismatch {
            msg_id: peek_msg_id(frame).unwrap_or(0),
            fcn_code: 0,
            actual: frame.len(),
            expected: CMD_HEADER_LEN,
        });
    };

    let kind = MsgKind::from_msg_id(header.msg_id).ok_or(RelayError::InvalidMessageKind {
        msg_id: header.msg_id,
    })?;

    match kind {
        MsgKind::GroundCommand => match header.fcn_code {
            NOOP_CC => typed::<NoopCmd>(&header, frame).map(|_| Inbound::Noop),
            MOVE_CC => typed::<MoveCmd>(&header, frame).map(Inbound::Move),
            SET_JOINTS_CC => typed::<SetJointsCmd>(&header, frame).map(Inbound::SetJoints),
            fcn_code => Err(RelayError::UnknownCommandCode { fcn_code }),
        },
        MsgKind::HousekeepingRequest => {
            typed::<SendHkCmd>(&header, frame).map(|_| Inbound::HousekeepingRequest)
        }
        MsgKind::ActuatorReport => {
            typed::<ActuatorReport>(&header, frame).map(Inbound::ActuatorReport)
        }
        MsgKind::HighRateTick => typed::<HrTick>(&header, frame).map(|_| Inbound::Tick),
    }
}

#[inline]
fn typed<M: WireMessage>(header: &CmdHeader, frame: &[u8]) -> Result<M, RelayError> {
    verify_length(header, frame.len(), M::LEN)?;
    decode_command::<M>(frame).map_err(|_| RelayError::LengthMismatch {
        msg_id: header.msg_id,
        fcn_code: header.fcn_code,
        actual: frame.len(),
        expected: M::LEN,
    })
}
