//! Wire layout for relay messages.
//!
//! Every inbound frame starts with an 8-byte command header; every outbound
//! frame starts with a 16-byte telemetry header carrying the send timestamp.
//! All multi-byte fields are little-endian and payloads are packed without
//! padding, so the total length of each message kind is a fixed constant that
//! the relay's validator compares against.
//!
//! ```text
//! command header   [0..2] msg_id  [2..4] sequence  [4] fcn_code  [5..8] reserved
//! telemetry header [0..2] msg_id  [2..4] sequence  [4..8] reserved  [8..16] timestamp_us
//! ```

use static_assertions::const_assert_eq;
use thiserror::Error;

use crate::consts::{
    JOINT_COUNT, MOVE_CC, NOOP_CC, RELAY_ACTUATOR_CMD_MID, RELAY_ACTUATOR_STATE_MID,
    RELAY_CMD_MID, RELAY_HK_TLM_MID, RELAY_HR_TICK_MID, RELAY_SEND_HK_MID, SET_JOINTS_CC,
};
use crate::joint::JointVector;

// ─── Sizes ──────────────────────────────────────────────────────────

/// Command header size [bytes].
pub const CMD_HEADER_LEN: usize = 8;

/// Telemetry header size [bytes].
pub const TLM_HEADER_LEN: usize = 16;

/// Encoded joint vector size [bytes].
pub const JOINT_VECTOR_LEN: usize = JOINT_COUNT * 4;

pub const NOOP_CMD_LEN: usize = CMD_HEADER_LEN;
pub const MOVE_CMD_LEN: usize = CMD_HEADER_LEN + 1;
pub const SET_JOINTS_CMD_LEN: usize = CMD_HEADER_LEN + JOINT_VECTOR_LEN;
pub const SEND_HK_LEN: usize = CMD_HEADER_LEN;
pub const HR_TICK_LEN: usize = CMD_HEADER_LEN;
pub const ACTUATOR_REPORT_LEN: usize = CMD_HEADER_LEN + JOINT_VECTOR_LEN + 1;
pub const ACTUATOR_CMD_LEN: usize = TLM_HEADER_LEN + JOINT_VECTOR_LEN;
pub const HK_TLM_LEN: usize = TLM_HEADER_LEN + 2 + JOINT_VECTOR_LEN + 1;

const_assert_eq!(JOINT_VECTOR_LEN, 28);
const_assert_eq!(MOVE_CMD_LEN, 9);
const_assert_eq!(SET_JOINTS_CMD_LEN, 36);
const_assert_eq!(ACTUATOR_REPORT_LEN, 37);
const_assert_eq!(ACTUATOR_CMD_LEN, 44);
const_assert_eq!(HK_TLM_LEN, 47);

// ─── Errors ─────────────────────────────────────────────────────────

/// Frame-level decoding failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum WireError {
    /// Frame length differs from the fixed length of its message kind.
    #[error("invalid length: {actual} bytes, expected {expected}")]
    LengthMismatch { actual: usize, expected: usize },

    /// Header carries a message id other than the one being decoded.
    #[error("unexpected msg_id 0x{actual:04X}, expected 0x{expected:04X}")]
    UnexpectedMsgId { actual: u16, expected: u16 },
}

// ─── Headers ────────────────────────────────────────────────────────

/// Primary header of every inbound frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CmdHeader {
    pub msg_id: u16,
    pub sequence: u16,
    /// Function code; 0 for messages that are not ground commands.
    pub fcn_code: u8,
}

impl CmdHeader {
    #[inline]
    pub const fn new(msg_id: u16, sequence: u16, fcn_code: u8) -> Self {
        Self {
            msg_id,
            sequence,
            fcn_code,
        }
    }

    /// Read the header from the front of `frame`. `None` if the frame is shorter
    /// than [`CMD_HEADER_LEN`].
    pub fn parse(frame: &[u8]) -> Option<Self> {
        let h = frame.get(..CMD_HEADER_LEN)?;
        Some(Self {
            msg_id: u16::from_le_bytes([h[0], h[1]]),
            sequence: u16::from_le_bytes([h[2], h[3]]),
            fcn_code: h[4],
        })
    }

    pub fn write(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.msg_id.to_le_bytes());
        out.extend_from_slice(&self.sequence.to_le_bytes());
        out.push(self.fcn_code);
        out.extend_from_slice(&[0u8; 3]);
    }
}

/// Primary header of every outbound frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TlmHeader {
    pub msg_id: u16,
    pub sequence: u16,
    /// Send time [µs], stamped by the transport.
    pub timestamp_us: u64,
}

impl TlmHeader {
    pub fn parse(frame: &[u8]) -> Option<Self> {
        let h = frame.get(..TLM_HEADER_LEN)?;
        let mut ts = [0u8; 8];
        ts.copy_from_slice(&h[8..16]);
        Some(Self {
            msg_id: u16::from_le_bytes([h[0], h[1]]),
            sequence: u16::from_le_bytes([h[2], h[3]]),
            timestamp_us: u64::from_le_bytes(ts),
        })
    }

    pub fn write(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.msg_id.to_le_bytes());
        out.extend_from_slice(&self.sequence.to_le_bytes());
        out.extend_from_slice(&[0u8; 4]);
        out.extend_from_slice(&self.timestamp_us.to_le_bytes());
    }
}

// ─── Message Trait ──────────────────────────────────────────────────

/// A fixed-length message with a packed little-endian payload.
pub trait WireMessage: Sized {
    /// Message id carried in the header.
    const MSG_ID: u16;
    /// Function code (ground commands only).
    const FCN_CODE: u8 = 0;
    /// Total frame length including the header.
    const LEN: usize;

    fn encode_payload(&self, out: &mut Vec<u8>);

    /// Decode from a payload slice of exactly `LEN - header` bytes.
    fn decode_payload(payload: &[u8]) -> Option<Self>;
}

/// Encode an inbound (command-header) frame.
pub fn encode_command<M: WireMessage>(msg: &M, sequence: u16) -> Vec<u8> {
    let mut out = Vec::with_capacity(M::LEN);
    CmdHeader::new(M::MSG_ID, sequence, M::FCN_CODE).write(&mut out);
    msg.encode_payload(&mut out);
    out
}

/// Decode an inbound frame, checking its exact length first.
pub fn decode_command<M: WireMessage>(frame: &[u8]) -> Result<M, WireError> {
    check_len(frame, M::LEN)?;
    check_msg_id(frame, M::MSG_ID)?;
    M::decode_payload(&frame[CMD_HEADER_LEN..]).ok_or(WireError::LengthMismatch {
        actual: frame.len(),
        expected: M::LEN,
    })
}

/// Encode an outbound (telemetry-header) frame.
pub fn encode_telemetry<M: WireMessage>(msg: &M, sequence: u16, timestamp_us: u64) -> Vec<u8> {
    let mut out = Vec::with_capacity(M::LEN);
    TlmHeader {
        msg_id: M::MSG_ID,
        sequence,
        timestamp_us,
    }
    .write(&mut out);
    msg.encode_payload(&mut out);
    out
}

/// Decode an outbound frame, returning its header and payload.
pub fn decode_telemetry<M: WireMessage>(frame: &[u8]) -> Result<(TlmHeader, M), WireError> {
    check_len(frame, M::LEN)?;
    check_msg_id(frame, M::MSG_ID)?;
    let mismatch = WireError::LengthMismatch {
        actual: frame.len(),
        expected: M::LEN,
    };
    let header = TlmHeader::parse(frame).ok_or(mismatch)?;
    let msg = M::decode_payload(&frame[TLM_HEADER_LEN..]).ok_or(mismatch)?;
    Ok((header, msg))
}

/// Read the message id of any frame (both header kinds share the first 2 bytes).
#[inline]
pub fn peek_msg_id(frame: &[u8]) -> Option<u16> {
    frame.get(..2).map(|b| u16::from_le_bytes([b[0], b[1]]))
}

#[inline]
fn check_len(frame: &[u8], expected: usize) -> Result<(), WireError> {
    if frame.len() == expected {
        Ok(())
    } else {
        Err(WireError::LengthMismatch {
            actual: frame.len(),
            expected,
        })
    }
}

#[inline]
fn check_msg_id(frame: &[u8], expected: u16) -> Result<(), WireError> {
    match peek_msg_id(frame) {
        Some(actual) if actual == expected => Ok(()),
        Some(actual) => Err(WireError::UnexpectedMsgId { actual, expected }),
        None => Err(WireError::LengthMismatch {
            actual: frame.len(),
            expected: 2,
        }),
    }
}

fn write_joints(joints: &JointVector, out: &mut Vec<u8>) {
    for j in joints.iter() {
        out.extend_from_slice(&j.to_le_bytes());
    }
}

fn read_joints(bytes: &[u8]) -> Option<JointVector> {
    let bytes = bytes.get(..JOINT_VECTOR_LEN)?;
    let mut joints = JointVector::ZERO;
    for (slot, chunk) in joints.0.iter_mut().zip(bytes.chunks_exact(4)) {
        *slot = f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }
    Some(joints)
}

// ─── Inbound Messages ───────────────────────────────────────────────

/// No-operation ground command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NoopCmd;

impl WireMessage for NoopCmd {
    const MSG_ID: u16 = RELAY_CMD_MID;
    const FCN_CODE: u8 = NOOP_CC;
    const LEN: usize = NOOP_CMD_LEN;

    fn encode_payload(&self, _out: &mut Vec<u8>) {}

    fn decode_payload(_payload: &[u8]) -> Option<Self> {
        Some(Self)
    }
}

/// Move to a preset pose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveCmd {
    pub pose_id: u8,
}

impl WireMessage for MoveCmd {
    const MSG_ID: u16 = RELAY_CMD_MID;
    const FCN_CODE: u8 = MOVE_CC;
    const LEN: usize = MOVE_CMD_LEN;

    fn encode_payload(&self, out: &mut Vec<u8>) {
        out.push(self.pose_id);
    }

    fn decode_payload(payload: &[u8]) -> Option<Self> {
        payload.first().map(|&pose_id| Self { pose_id })
    }
}

/// Move to an explicit joint vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SetJointsCmd {
    pub joints: JointVector,
}

impl WireMessage for SetJointsCmd {
    const MSG_ID: u16 = RELAY_CMD_MID;
    const FCN_CODE: u8 = SET_JOINTS_CC;
    const LEN: usize = SET_JOINTS_CMD_LEN;

    fn encode_payload(&self, out: &mut Vec<u8>) {
        write_joints(&self.joints, out);
    }

    fn decode_payload(payload: &[u8]) -> Option<Self> {
        read_joints(payload).map(|joints| Self { joints })
    }
}

/// Housekeeping report request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SendHkCmd;

impl WireMessage for SendHkCmd {
    const MSG_ID: u16 = RELAY_SEND_HK_MID;
    const LEN: usize = SEND_HK_LEN;

    fn encode_payload(&self, _out: &mut Vec<u8>) {}

    fn decode_payload(_payload: &[u8]) -> Option<Self> {
        Some(Self)
    }
}

/// High-rate control wakeup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HrTick;

impl WireMessage for HrTick {
    const MSG_ID: u16 = RELAY_HR_TICK_MID;
    const LEN: usize = HR_TICK_LEN;

    fn encode_payload(&self, _out: &mut Vec<u8>) {}

    fn decode_payload(_payload: &[u8]) -> Option<Self> {
        Some(Self)
    }
}

/// Live joint state reported by the actuator subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ActuatorReport {
    pub joints: JointVector,
    pub is_moving: bool,
}

impl WireMessage for ActuatorReport {
    const MSG_ID: u16 = RELAY_ACTUATOR_STATE_MID;
    const LEN: usize = ACTUATOR_REPORT_LEN;

    fn encode_payload(&self, out: &mut Vec<u8>) {
        write_joints(&self.joints, out);
        out.push(self.is_moving as u8);
    }

    fn decode_payload(payload: &[u8]) -> Option<Self> {
        let joints = read_joints(payload)?;
        let is_moving = *payload.get(JOINT_VECTOR_LEN)? != 0;
        Some(Self { joints, is_moving })
    }
}

// ─── Outbound Messages ──────────────────────────────────────────────

/// Joint goal forwarded to the actuator subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ActuatorCommand {
    pub goal: JointVector,
}

impl WireMessage for ActuatorCommand {
    const MSG_ID: u16 = RELAY_ACTUATOR_CMD_MID;
    const LEN: usize = ACTUATOR_CMD_LEN;

    fn encode_payload(&self, out: &mut Vec<u8>) {
        write_joints(&self.goal, out);
    }

    fn decode_payload(payload: &[u8]) -> Option<Self> {
        read_joints(payload).map(|goal| Self { goal })
    }
}

/// Housekeeping telemetry returned to the ground.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HousekeepingTlm {
    pub error_counter: u8,
    pub command_counter: u8,
    pub joints: JointVector,
    pub is_moving: bool,
}

impl WireMessage for HousekeepingTlm {
    const MSG_ID: u16 = RELAY_HK_TLM_MID;
    const LEN: usize = HK_TLM_LEN;

    fn encode_payload(&self, out: &mut Vec<u8>) {
        out.push(self.error_counter);
        out.push(self.command_counter);
        write_joints(&self.joints, out);
        out.push(self.is_moving as u8);
    }

    fn decode_payload(payload: &[u8]) -> Option<Self> {
        let error_counter = *payload.first()?;
        let command_counter = *payload.get(1)?;
        let joints = read_joints(payload.get(2..)?)?;
        let is_moving = *payload.get(2 + JOINT_VECTOR_LEN)? != 0;
        Some(Self {
            error_counter,
            command_counter,
            joints,
            is_moving,
        })
    }
}
