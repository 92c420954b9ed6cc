use crate::frame::Opcode;

/// Length in bytes of the fixed part of every frame head.
pub const FRAME_HEAD_START_LEN: usize = 2;
/// Length in bytes of a masking key.
pub const MASK_KEY_LEN: usize = 4;

// Largest payload length that fits in the 7 bit length field.
const MAX_INLINE_PAYLOAD_LEN: u8 = 125;

/// The fixed two byte start of a frame head.
///
/// The extended payload length and the masking key follow on the wire; how many bytes of each are
/// expected is reported by [`extended_len_bytes`][`Self::extended_len_bytes()`] and
/// [`masked`][`Self::masked`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FrameHead {
    pub fin: bool,
    /// RSV1, the per-message compression flag.
    pub compressed: bool,
    pub opcode: Opcode,
    pub masked: bool,
    /// The raw 7 bit length field.
    pub len_code: u8,
}

impl FrameHead {
    // RSV1 is only legal if a compression extension is active. RSV2 and RSV3 are never legal.
    pub fn parse(buffer: [u8; 2], compression: bool) -> Result<FrameHead, FrameHeadParseError> {
        let rsv_mask = match compression {
            true => 0x30,
            false => 0x70,
        };
        if buffer[0] & rsv_mask != 0 {
            return Err(FrameHeadParseError::RsvBit);
        }
        let opcode = match Opcode::from_repr(buffer[0] & 0x0F) {
            Some(opcode) => opcode,
            None => return Err(FrameHeadParseError::InvalidOpcode(buffer[0] & 0x0F)),
        };
        Ok(FrameHead {
            fin: buffer[0] & 0x80 != 0,
            compressed: buffer[0] & 0x40 != 0,
            opcode,
            masked: buffer[1] & 0x80 != 0,
            len_code: buffer[1] & 0x7F,
        })
    }
    pub fn extended_len_bytes(&self) -> usize {
        match self.len_code {
            126 => 2,
            127 => 8,
            _ => 0,
        }
    }
    // Payload length if it fits the 7 bit field.
    pub fn inline_payload_len(&self) -> Option<u64> {
        match self.len_code <= MAX_INLINE_PAYLOAD_LEN {
            true => Some(self.len_code as u64),
            false => None,
        }
    }
}

// Decodes a big-endian extended payload length of 2 or 8 bytes.
pub fn parse_extended_len(buffer: &[u8]) -> u64 {
    let mut payload_len = [0u8; 8];
    payload_len[8 - buffer.len()..].copy_from_slice(buffer);
    u64::from_be_bytes(payload_len)
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameHeadParseError {
    #[error("one or more RSV bit is set")]
    RsvBit,
    #[error("invalid opcode {0}")]
    InvalidOpcode(u8),
}
