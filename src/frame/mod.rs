mod frame_head;
mod frame_payload;

pub use frame_head::*;
pub use frame_payload::*;

use crate::message::MessageKind;

/// Largest payload a control frame may carry.
pub const MAX_CONTROL_PAYLOAD_LEN: usize = 125;

#[derive(Copy, Clone, Debug, PartialEq, Eq, strum::Display, strum::FromRepr)]
#[repr(u8)]
pub enum Opcode {
    Continuation = 0x0,
    Text = 0x1,
    Binary = 0x2,
    Close = 0x8,
    Ping = 0x9,
    Pong = 0xA,
}

impl Opcode {
    pub fn is_control(self) -> bool {
        self as u8 & 0x8 != 0
    }
    pub fn message_kind(self) -> Option<MessageKind> {
        match self {
            Opcode::Text => Some(MessageKind::Text),
            Opcode::Binary => Some(MessageKind::Binary),
            _ => None,
        }
    }
    pub fn control_kind(self) -> Option<ControlKind> {
        match self {
            Opcode::Close => Some(ControlKind::Close),
            Opcode::Ping => Some(ControlKind::Ping),
            Opcode::Pong => Some(ControlKind::Pong),
            _ => None,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, strum::Display)]
pub enum ControlKind {
    Ping,
    Pong,
    Close,
}

// Control frame payloads are held inline, they never touch the buffer pools.
#[derive(Copy, Clone, Debug)]
pub(crate) struct ControlPayload {
    pub(crate) kind: ControlKind,
    pub(crate) len: u8,
    pub(crate) buffer: [u8; MAX_CONTROL_PAYLOAD_LEN],
}

impl ControlPayload {
    pub(crate) fn new(kind: ControlKind, len: usize) -> Self {
        Self {
            kind,
            len: len.min(MAX_CONTROL_PAYLOAD_LEN) as u8,
            buffer: [0u8; MAX_CONTROL_PAYLOAD_LEN],
        }
    }
    pub(crate) fn data(&self) -> &[u8] {
        &self.buffer[0..self.len()]
    }
    pub(crate) fn data_mut(&mut self) -> &mut [u8] {
        let len = self.len();
        &mut self.buffer[0..len]
    }
    pub(crate) fn len(&self) -> usize {
        self.len as usize
    }
}
